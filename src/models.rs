//! Data models shared by the detection pipeline

use chrono::{DateTime, Utc};
use ipnetwork::Ipv4Network;
use pnet::datalink::NetworkInterface;
use pnet::util::MacAddr;
use serde::Serialize;
use std::net::Ipv4Addr;
use std::time::Instant;

/// An interface that passed network validation, held for the process lifetime
#[derive(Debug, Clone)]
pub struct ValidatedInterface {
    pub interface: NetworkInterface,
    /// Selected IPv4 address with its prefix (host bits kept)
    pub network: Ipv4Network,
}

impl ValidatedInterface {
    pub fn name(&self) -> &str {
        &self.interface.name
    }
}

/// A raw link-layer frame and the moment it was read
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub data: Vec<u8>,
    pub captured_at: Instant,
}

impl CapturedFrame {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            captured_at: Instant::now(),
        }
    }

    pub fn at(data: Vec<u8>, captured_at: Instant) -> Self {
        Self { data, captured_at }
    }
}

/// An ARP request from the watched button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    /// Monotonic timestamp used by the debounce gate
    pub observed_at: Instant,
    /// Wall-clock time for logs
    pub seen_at: DateTime<Utc>,
}

/// Interface summary for the `interfaces` command
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InterfaceSummary {
    pub name: String,
    pub network: Option<String>,
    pub is_loopback: bool,
    pub is_up: bool,
}
