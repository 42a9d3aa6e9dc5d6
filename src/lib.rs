//! dashwatch: detects button presses from ARP traffic
//!
//! A battery-powered Wi-Fi button wakes up, sends an ARP request and goes
//! back to sleep. This crate watches for that request and turns it into a
//! single chat notification per press:
//! - Interface validation (usable IPv4 network, not loopback, not too large)
//! - Live promiscuous capture via `pnet`
//! - ARP request filtering on the button's hardware address
//! - Debounce of request bursts
//! - Slack `chat.postMessage` delivery

pub mod app;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod network;
pub mod notify;

pub use capture::{EventFilter, FrameSource, PnetCapture};
pub use config::{parse_mac, MonitorConfig};
pub use error::{CaptureError, ConfigError, MonitorError, NotifyError, ValidationError};
pub use models::{CapturedFrame, InterfaceSummary, TriggerEvent, ValidatedInterface};
pub use monitor::{Debouncer, Monitor, MonitorHandle, MonitorReport, MonitorState, StopSignal};
pub use network::{validate, validate_interface};
pub use notify::{Notifier, SlackNotifier};
