use reqwest::Client;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::Notifier;
use crate::error::NotifyError;

/// Posts messages through Slack's `chat.postMessage` as the token's app
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Client,
    endpoint: String,
    token: String,
}

impl SlackNotifier {
    pub fn new(
        token: impl Into<String>,
        api_url: &str,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(NotifyError::MissingToken);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat.postMessage", api_url.trim_end_matches('/')),
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// JSON body for `chat.postMessage`
pub fn post_message_body(channel: &str, message: &str) -> Value {
    json!({
        "channel": channel,
        "text": message,
        "as_user": true,
    })
}

/// Slack answers 200 even on failure; the verdict is in `ok` / `error`
pub fn parse_post_message_response(payload: &Value) -> Result<(), NotifyError> {
    match payload.get("ok").and_then(Value::as_bool) {
        Some(true) => Ok(()),
        _ => {
            let code = payload
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            Err(NotifyError::Api(code.to_string()))
        }
    }
}

impl Notifier for SlackNotifier {
    fn notify<'a>(
        &'a self,
        channel: &'a str,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.token)
                .json(&post_message_body(channel, message))
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(NotifyError::Http {
                    status: status.as_u16(),
                    body,
                });
            }

            let payload: Value = response.json().await?;
            parse_post_message_response(&payload)
        })
    }
}
