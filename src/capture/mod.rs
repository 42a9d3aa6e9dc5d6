//! Live capture and ARP trigger classification
//!
//! The capture side produces raw Ethernet frames on a dedicated thread;
//! the filter turns matching ARP requests into trigger events.

pub mod filter;
pub mod source;

pub use filter::EventFilter;
pub use source::{spawn_frame_pump, FramePump, FrameSource, PnetCapture};
