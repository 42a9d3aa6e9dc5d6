//! Frame sources and the capture thread

use pnet::datalink::{self, Channel, DataLinkReceiver};
use std::io;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::CAPTURE_BUFFER_SIZE;
use crate::error::CaptureError;
use crate::models::{CapturedFrame, ValidatedInterface};
use crate::monitor::StopSignal;

/// Back-off after a failed read
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// A blocking producer of raw link-layer frames.
///
/// `Ok(None)` means nothing arrived within the source's poll interval,
/// `Err(CaptureError::Closed)` means the source is exhausted.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, CaptureError>;
}

/// Live promiscuous capture on one interface
pub struct PnetCapture {
    interface_name: String,
    rx: Box<dyn DataLinkReceiver>,
}

impl PnetCapture {
    /// Opens an Ethernet channel with a bounded read timeout so the
    /// capture thread can notice stop requests.
    pub fn open(
        interface: &ValidatedInterface,
        poll_interval: Duration,
    ) -> Result<Self, CaptureError> {
        let config = datalink::Config {
            read_buffer_size: CAPTURE_BUFFER_SIZE,
            read_timeout: Some(poll_interval),
            promiscuous: true,
            ..Default::default()
        };

        let rx = match datalink::channel(&interface.interface, config) {
            Ok(Channel::Ethernet(_tx, rx)) => rx,
            Ok(_) => return Err(CaptureError::UnsupportedChannel(interface.name().to_string())),
            Err(source) => {
                return Err(CaptureError::Open {
                    interface: interface.name().to_string(),
                    source,
                })
            }
        };

        tracing::info!(
            "Capture opened on {} (promiscuous, buffer {} bytes)",
            interface.name(),
            CAPTURE_BUFFER_SIZE
        );

        Ok(Self {
            interface_name: interface.name().to_string(),
            rx,
        })
    }
}

impl FrameSource for PnetCapture {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, CaptureError> {
        match self.rx.next() {
            Ok(packet) => Ok(Some(CapturedFrame::new(packet.to_vec()))),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(None)
            }
            Err(e) => Err(CaptureError::Read(e)),
        }
    }
}

impl Drop for PnetCapture {
    fn drop(&mut self) {
        tracing::debug!("Capture on {} released", self.interface_name);
    }
}

/// Handle to the capture thread
pub struct FramePump {
    handle: JoinHandle<()>,
}

impl FramePump {
    /// Waits for the capture thread to exit. The source has been dropped
    /// once this returns.
    pub fn join(self) {
        if self.handle.join().is_err() {
            tracing::error!("Capture thread panicked");
        }
    }
}

/// Runs `source` on its own thread, forwarding frames into a bounded queue.
///
/// The thread exits when `stop` fires, the source reports `Closed`, or the
/// receiver is dropped.
pub fn spawn_frame_pump(
    mut source: Box<dyn FrameSource>,
    stop: StopSignal,
    capacity: usize,
) -> (mpsc::Receiver<CapturedFrame>, FramePump) {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let handle = std::thread::spawn(move || {
        while !stop.is_stopped() {
            match source.next_frame() {
                Ok(Some(frame)) => {
                    if tx.blocking_send(frame).is_err() {
                        tracing::debug!("Frame queue closed");
                        break;
                    }
                }
                Ok(None) => {}
                Err(CaptureError::Closed) => {
                    tracing::debug!("Frame source exhausted");
                    break;
                }
                Err(e) => {
                    tracing::error!("Capture error: {}", e);
                    std::thread::sleep(READ_ERROR_BACKOFF);
                }
            }
        }
        drop(source);
    });

    (rx, FramePump { handle })
}
