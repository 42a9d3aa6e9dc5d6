//! Configuration constants and the monitor's startup configuration

use pnet::util::MacAddr;
use serde::Serialize;
use std::time::Duration;

use crate::error::ConfigError;

/// Minimum gap between two accepted button presses
pub const DEFAULT_DEBOUNCE_INTERVAL: Duration = Duration::from_secs(5);

/// Capture read buffer; an Ethernet MTU with plenty of headroom
pub const CAPTURE_BUFFER_SIZE: usize = 65536;

/// Read timeout on the capture channel. Bounds how long a stop request
/// can wait on a blocked read.
pub const CAPTURE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Upper bound on a single notification call
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Frames buffered between the capture thread and the monitor loop
pub const FRAME_QUEUE_DEPTH: usize = 100;

/// Base URL of the Slack Web API
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";

/// Leading netmask octets that must be 0xff (i.e. at most a /16)
pub const MIN_NETWORK_PREFIX_OCTETS: usize = 2;

/// Env var holding the Slack token
pub const TOKEN_ENV: &str = "SLACK_API_TOKEN";

/// Env var holding the button's hardware address
pub const DASH_ADDR_ENV: &str = "DASH_BUTTON_MAC_ADDR";

pub(crate) fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse_u64(name: &str, default: u64, min: u64, max: u64) -> u64 {
    match env_var(name).and_then(|v| v.parse::<u64>().ok()) {
        Some(v) => v.clamp(min, max),
        None => default,
    }
}

/// Runtime-tunable debounce interval.
/// Env: `DASHWATCH_DEBOUNCE_MS`
pub fn debounce_interval() -> Duration {
    Duration::from_millis(env_parse_u64(
        "DASHWATCH_DEBOUNCE_MS",
        DEFAULT_DEBOUNCE_INTERVAL.as_millis() as u64,
        1,
        3_600_000,
    ))
}

/// Runtime-tunable notification timeout.
/// Env: `DASHWATCH_NOTIFY_TIMEOUT_MS`
pub fn notify_timeout() -> Duration {
    Duration::from_millis(env_parse_u64(
        "DASHWATCH_NOTIFY_TIMEOUT_MS",
        DEFAULT_NOTIFY_TIMEOUT.as_millis() as u64,
        100,
        120_000,
    ))
}

/// Runtime-tunable capture poll interval.
/// Env: `DASHWATCH_POLL_INTERVAL_MS`
pub fn poll_interval() -> Duration {
    Duration::from_millis(env_parse_u64(
        "DASHWATCH_POLL_INTERVAL_MS",
        CAPTURE_POLL_INTERVAL.as_millis() as u64,
        10,
        5_000,
    ))
}

/// Runtime-tunable Slack API base URL.
/// Env: `DASHWATCH_SLACK_API_URL`
pub fn slack_api_url() -> String {
    env_var("DASHWATCH_SLACK_API_URL").unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string())
}

/// Parses a colon-separated six-octet hardware address
pub fn parse_mac(raw: &str) -> Result<MacAddr, ConfigError> {
    raw.trim()
        .parse::<MacAddr>()
        .map_err(|_| ConfigError::InvalidMac(raw.to_string()))
}

/// Immutable monitor configuration, built once at startup
#[derive(Debug, Clone, Serialize)]
pub struct MonitorConfig {
    pub interface: String,
    #[serde(serialize_with = "serialize_mac")]
    pub target_mac: MacAddr,
    pub channel: String,
    pub message: String,
    pub debounce_interval: Duration,
    pub notify_timeout: Duration,
    pub poll_interval: Duration,
}

fn serialize_mac<S: serde::Serializer>(mac: &MacAddr, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&mac.to_string())
}

impl MonitorConfig {
    pub fn new(
        interface: impl Into<String>,
        target_mac: MacAddr,
        channel: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            interface: interface.into(),
            target_mac,
            channel: channel.into(),
            message: message.into(),
            debounce_interval: DEFAULT_DEBOUNCE_INTERVAL,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            poll_interval: CAPTURE_POLL_INTERVAL,
        }
    }

    pub fn with_debounce_interval(mut self, interval: Duration) -> Self {
        self.debounce_interval = interval;
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Rejects empty fields and zero durations
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interface.trim().is_empty() {
            return Err(ConfigError::MissingArgument("interface"));
        }
        if self.channel.trim().is_empty() {
            return Err(ConfigError::MissingArgument("channel"));
        }
        if self.message.is_empty() {
            return Err(ConfigError::MissingArgument("message"));
        }
        if self.debounce_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "debounce interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.notify_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "notify timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "poll interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MonitorConfig {
        MonitorConfig::new(
            "eth0",
            MacAddr::new(0xb4, 0x79, 0xa7, 0x00, 0x00, 0x01),
            "#dash",
            "Ordering detergent...",
        )
    }

    #[test]
    fn parse_mac_accepts_colon_form() {
        let mac = parse_mac("b4:79:a7:00:00:01").expect("mac should parse");
        assert_eq!(mac, MacAddr::new(0xb4, 0x79, 0xa7, 0x00, 0x00, 0x01));
    }

    #[test]
    fn parse_mac_rejects_short_and_garbage() {
        assert!(matches!(
            parse_mac("b4:79:a7:00:00"),
            Err(ConfigError::InvalidMac(_))
        ));
        assert!(parse_mac("b4:79:a7:00:00:01:02").is_err());
        assert!(parse_mac("not-a-mac").is_err());
        assert!(parse_mac("").is_err());
    }

    #[test]
    fn defaults_are_applied() {
        let config = sample();
        assert_eq!(config.debounce_interval, Duration::from_secs(5));
        assert_eq!(config.poll_interval, CAPTURE_POLL_INTERVAL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_debounce_is_rejected() {
        let config = sample().with_debounce_interval(Duration::ZERO);
        let err = config.validate().expect_err("zero interval must fail");
        assert!(err.to_string().contains("debounce interval"));
    }

    #[test]
    fn zero_notify_timeout_is_rejected() {
        let config = sample().with_notify_timeout(Duration::ZERO);
        let err = config.validate().expect_err("zero timeout must fail");
        assert!(err.to_string().contains("notify timeout"));
    }

    #[test]
    fn empty_channel_is_rejected() {
        let mut config = sample();
        config.channel = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingArgument("channel"))
        ));
    }

    #[test]
    fn serializes_mac_as_text() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"target_mac\":\"b4:79:a7:00:00:01\""));
    }
}
