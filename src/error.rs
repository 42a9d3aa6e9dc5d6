//! Error kinds for the detection pipeline
//!
//! Configuration, validation and capture-open errors are fatal at startup.
//! Notification errors are logged and the monitor keeps running.

use ipnetwork::Ipv4Network;
use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;
use thiserror::Error;

/// Malformed or missing operator input
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid hardware address '{0}': expected six colon-separated hex octets")]
    InvalidMac(String),

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// The interface cannot be used to observe the button's broadcast
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("interface '{0}' not found")]
    InterfaceNotFound(String),

    #[error("no IPv4 network found on interface '{0}'")]
    NoAddressFound(String),

    #[error("refusing loopback address {0}")]
    LoopbackRejected(Ipv4Addr),

    #[error("network {network} is too large; mask must start with 255.255")]
    NetworkTooLarge { network: Ipv4Network },
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open capture on '{interface}': {source}")]
    Open {
        interface: String,
        #[source]
        source: io::Error,
    },

    #[error("interface '{0}' does not provide an Ethernet channel")]
    UnsupportedChannel(String),

    #[error("capture read failed: {0}")]
    Read(#[from] io::Error),

    #[error("capture source closed")]
    Closed,
}

/// Delivery failure; never fatal to the monitor loop
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notification timed out after {0:?}")]
    Timeout(Duration),

    #[error("notification request failed with {status}: {body}")]
    Http { status: u16, body: String },

    #[error("messaging API rejected the post: {0}")]
    Api(String),

    #[error("no API token configured")]
    MissingToken,
}

/// Fatal errors raised while bringing the monitor up
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}
