//! Capture loop lifecycle: debounce, cancellation and notification

pub mod debounce;
pub mod events;
pub mod stop;
pub mod watcher;

pub use debounce::Debouncer;
pub use events::{MonitorReport, MonitorState};
pub use stop::StopSignal;
pub use watcher::{Monitor, MonitorHandle};
