//! Outbound notification boundary

mod slack;

pub use slack::{parse_post_message_response, post_message_body, SlackNotifier};

use std::future::Future;
use std::pin::Pin;

use crate::error::NotifyError;

/// Delivers one message to one channel. Implementations report failure
/// and never retry.
pub trait Notifier: Send + Sync {
    fn notify<'a>(
        &'a self,
        channel: &'a str,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;
}
