//! Monitor lifecycle state and run summary

use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle of one monitor run: Idle -> Running -> Stopping -> Stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    #[default]
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl MonitorState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => MonitorState::Running,
            2 => MonitorState::Stopping,
            3 => MonitorState::Stopped,
            _ => MonitorState::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            MonitorState::Idle => 0,
            MonitorState::Running => 1,
            MonitorState::Stopping => 2,
            MonitorState::Stopped => 3,
        }
    }
}

/// State shared between the loop and its handle
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedState(Arc<AtomicU8>);

impl SharedState {
    pub(crate) fn get(&self) -> MonitorState {
        MonitorState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn set(&self, state: MonitorState) {
        self.0.store(state.as_u8(), Ordering::SeqCst);
    }
}

/// Counters collected over one monitor run
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MonitorReport {
    /// Lifecycle state when the report was taken
    pub state: MonitorState,
    pub frames_seen: u64,
    pub triggers: u64,
    pub suppressed: u64,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
    pub started_at: Option<String>,
    pub stopped_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_state_round_trips_every_variant() {
        let shared = SharedState::default();
        assert_eq!(shared.get(), MonitorState::Idle);

        for state in [
            MonitorState::Running,
            MonitorState::Stopping,
            MonitorState::Stopped,
        ] {
            shared.set(state);
            assert_eq!(shared.get(), state);
        }
    }

    #[test]
    fn report_serializes_counters() {
        let report = MonitorReport {
            triggers: 3,
            notifications_sent: 2,
            ..Default::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"triggers\":3"));
        assert!(json.contains("\"notifications_sent\":2"));
        assert!(json.contains("\"state\":\"idle\""));
    }
}
