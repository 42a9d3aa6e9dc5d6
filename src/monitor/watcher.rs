//! The capture loop
//!
//! `Monitor::start` validates the interface, opens the capture and spawns
//! a task that runs filter -> debounce -> notify for each frame until the
//! stop signal fires or the capture ends.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::debounce::Debouncer;
use super::events::{MonitorReport, MonitorState, SharedState};
use super::stop::StopSignal;
use crate::capture::{spawn_frame_pump, EventFilter, FramePump, FrameSource, PnetCapture};
use crate::config::{MonitorConfig, FRAME_QUEUE_DEPTH};
use crate::error::{MonitorError, NotifyError};
use crate::models::{CapturedFrame, TriggerEvent};
use crate::network;
use crate::notify::Notifier;

/// A configured but not yet running monitor
pub struct Monitor {
    config: MonitorConfig,
    notifier: Arc<dyn Notifier>,
}

impl Monitor {
    pub fn new(config: MonitorConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    pub fn state(&self) -> MonitorState {
        MonitorState::Idle
    }

    /// Validates the interface, opens a live capture and starts the loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> Result<MonitorHandle, MonitorError> {
        self.config.validate()?;
        let interface = network::validate(&self.config.interface)?;
        let capture = PnetCapture::open(&interface, self.config.poll_interval)?;
        self.start_with_source(Box::new(capture))
    }

    /// Starts the loop over an already opened frame source
    pub fn start_with_source(
        self,
        source: Box<dyn FrameSource>,
    ) -> Result<MonitorHandle, MonitorError> {
        self.config.validate()?;

        let stop = StopSignal::new();
        let state = SharedState::default();
        let baseline = Instant::now();

        let (frames, pump) = spawn_frame_pump(source, stop.clone(), FRAME_QUEUE_DEPTH);

        state.set(MonitorState::Running);
        tracing::info!(
            "Watching {} for ARP requests from {} (debounce {:?})",
            self.config.interface,
            self.config.target_mac,
            self.config.debounce_interval
        );

        let worker = CaptureLoop {
            filter: EventFilter::new(self.config.target_mac),
            debouncer: Debouncer::new(self.config.debounce_interval, baseline),
            stop: stop.clone(),
            config: self.config,
            notifier: self.notifier,
            report: MonitorReport {
                started_at: Some(chrono::Utc::now().to_rfc3339()),
                ..Default::default()
            },
        };

        let task = tokio::spawn(worker.run(frames, state.clone()));

        Ok(MonitorHandle {
            stop,
            state,
            task,
            pump,
        })
    }
}

/// Handle to a running monitor
pub struct MonitorHandle {
    stop: StopSignal,
    state: SharedState,
    task: JoinHandle<MonitorReport>,
    pump: FramePump,
}

impl MonitorHandle {
    /// Clone of the stop signal, for signal handlers
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Requests shutdown. Safe to call any number of times.
    pub fn stop(&self) -> bool {
        self.stop.stop()
    }

    pub fn state(&self) -> MonitorState {
        self.state.get()
    }

    /// Waits for the loop to finish and the capture to be released
    pub async fn join(self) -> MonitorReport {
        let mut report = match self.task.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Monitor loop failed: {}", e);
                self.stop.stop();
                MonitorReport::default()
            }
        };

        let pump = self.pump;
        if let Err(e) = tokio::task::spawn_blocking(move || pump.join()).await {
            tracing::error!("Failed to join capture thread: {}", e);
        }

        self.state.set(MonitorState::Stopped);
        report.state = MonitorState::Stopped;
        report.stopped_at = Some(chrono::Utc::now().to_rfc3339());
        tracing::info!("Monitor stopped");
        report
    }
}

/// Sole owner of the debounce state
struct CaptureLoop {
    config: MonitorConfig,
    notifier: Arc<dyn Notifier>,
    filter: EventFilter,
    debouncer: Debouncer,
    stop: StopSignal,
    report: MonitorReport,
}

impl CaptureLoop {
    async fn run(
        mut self,
        mut frames: mpsc::Receiver<CapturedFrame>,
        state: SharedState,
    ) -> MonitorReport {
        let stop = self.stop.clone();
        loop {
            tokio::select! {
                biased;

                _ = stop.cancelled() => {
                    tracing::debug!("Stop requested");
                    break;
                }
                next = frames.recv() => match next {
                    Some(frame) => self.handle_frame(&frame).await,
                    None => {
                        tracing::info!("Capture ended");
                        break;
                    }
                },
            }
        }

        stop.stop();
        state.set(MonitorState::Stopping);
        drop(frames);
        self.report.state = MonitorState::Stopping;
        self.report
    }

    async fn handle_frame(&mut self, frame: &CapturedFrame) {
        self.report.frames_seen += 1;

        let Some(event) = self.filter.classify(frame) else {
            return;
        };
        self.report.triggers += 1;

        if !self.debouncer.accept(event.observed_at) {
            self.report.suppressed += 1;
            tracing::debug!(
                "Suppressed repeat press from {} ({})",
                event.sender_mac,
                event.sender_ip
            );
            return;
        }

        tracing::info!(
            "Button press from {} ({}) at {}",
            event.sender_mac,
            event.sender_ip,
            event.seen_at.format("%H:%M:%S")
        );
        self.post_message(&event).await;
    }

    async fn post_message(&mut self, event: &TriggerEvent) {
        let timeout = self.config.notify_timeout;
        let delivery = self
            .notifier
            .notify(&self.config.channel, &self.config.message);

        // A stop request abandons an in-flight delivery
        let result = tokio::select! {
            biased;

            _ = self.stop.cancelled() => {
                self.report.notifications_failed += 1;
                tracing::warn!(
                    "Stop requested; abandoning delivery for press from {}",
                    event.sender_mac
                );
                return;
            }
            delivered = tokio::time::timeout(timeout, delivery) => match delivered {
                Ok(result) => result,
                Err(_) => Err(NotifyError::Timeout(timeout)),
            },
        };

        match result {
            Ok(()) => {
                self.report.notifications_sent += 1;
                tracing::info!("Message posted.");
            }
            Err(e) => {
                self.report.notifications_failed += 1;
                tracing::error!(
                    "{} (press from {} dropped)",
                    e,
                    event.sender_mac
                );
            }
        }
    }
}
