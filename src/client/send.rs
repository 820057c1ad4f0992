use serde_json::json;

use crate::{
    error::LinkError,
    events::EventKind,
    transport::{ChatReply, ChatRequest, Provenance},
};

use super::wrapper::ConnectionResilienceClient;

impl ConnectionResilienceClient {
    /// Sends a chat message with the configured user id.
    ///
    /// See [`send_message_as`](Self::send_message_as).
    pub async fn send_message(&self, text: &str) -> Result<ChatReply, LinkError> {
        let user_id = self.inner.config.user_id.clone();
        self.send_message_as(text, user_id).await
    }

    /// Sends a chat message, retrying with linear backoff.
    ///
    /// In fallback mode the reply comes from the fallback table without a
    /// network call. When every delivery attempt fails the client switches
    /// to fallback mode and returns a fallback reply instead of an error.
    ///
    /// # Errors
    ///
    /// [`LinkError::Offline`] when disconnected with fallback mode off, and
    /// [`LinkError::ShutDown`] after [`shutdown`](Self::shutdown).
    pub async fn send_message_as(
        &self,
        text: &str,
        user_id: Option<String>,
    ) -> Result<ChatReply, LinkError> {
        let state = {
            let record = self.inner.record.lock();
            if record.shut_down {
                return Err(LinkError::ShutDown);
            }
            record.state
        };

        if state.is_fallback() {
            return Ok(self.inner.fallback.reply(text));
        }
        if !state.is_connected() {
            return Err(LinkError::Offline);
        }

        let request = ChatRequest::new(text).with_user_id(user_id);
        let max_retries = self.inner.config.max_send_retries;

        for attempt in 1..=max_retries {
            if self.is_shut_down() {
                return Err(LinkError::ShutDown);
            }
            match self.inner.transport.chat(&request).await {
                Ok(mut reply) => {
                    reply.provenance = Provenance::Live;
                    self.apply(|record| {
                        record.log(EventKind::MessageSentSuccess, json!({ "attempt": attempt }));
                    });
                    return Ok(reply);
                }
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) => {
                    log::warn!("Message send attempt {attempt} failed: {err}");
                    self.apply(|record| {
                        record.log(
                            EventKind::MessageSendFailed,
                            json!({ "attempt": attempt, "error": err.to_string() }),
                        );
                    });
                }
            }

            if attempt == max_retries {
                break;
            }
            tokio::select! {
                _ = self.inner.cancel.cancelled() => return Err(LinkError::ShutDown),
                _ = tokio::time::sleep(self.inner.config.send_retry_delay(attempt)) => {}
            }
        }

        self.apply(|record| {
            if !record.shut_down {
                record.enable_fallback("send_retries_exhausted");
            }
        });
        Ok(self.inner.fallback.reply(text))
    }
}
