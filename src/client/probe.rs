use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::{error::LinkError, events::EventKind};

use super::state::ReconnectOutcome;
use super::wrapper::ConnectionResilienceClient;

impl ConnectionResilienceClient {
    /// Probes `/health` once and updates the connection state.
    ///
    /// A failed probe flips the client to disconnected and, unless a
    /// reconnection sequence is already running, starts one. Returns whether
    /// the backend answered.
    pub async fn perform_health_check(&self) -> bool {
        if self.is_shut_down() {
            return false;
        }
        match self.inner.transport.health().await {
            Ok(body) => {
                self.apply(|record| {
                    if record.shut_down {
                        return;
                    }
                    record.mark_connected("healthy");
                    record.last_health_check_at = Some(Utc::now());
                    record.last_health_instant = Some(Instant::now());
                    record.log(EventKind::HealthCheckSuccess, json!({ "body": body }));
                });
                true
            }
            Err(err) => {
                log::debug!("Health check failed: {err}");
                let reconnecting = self.apply(|record| {
                    if record.shut_down {
                        return true;
                    }
                    let (kind, reason) = match &err {
                        LinkError::Status { .. } => {
                            (EventKind::HealthCheckFailed, "health_check_failed")
                        }
                        _ => (EventKind::HealthCheckError, "health_check_error"),
                    };
                    record.mark_disconnected(reason);
                    record.log(kind, failure_payload(&err));
                    record.state.is_reconnecting()
                });
                if !reconnecting {
                    self.attempt_reconnection().await;
                }
                false
            }
        }
    }

    /// Re-verifies liveness on the monitor timer.
    ///
    /// A connected client pings `/status` and reconnects if the ping fails;
    /// a disconnected one reconnects directly. Overlaps with the health check
    /// on purpose: whichever timer fires first catches a drop.
    pub async fn monitor_connection(&self) {
        let state = {
            let record = self.inner.record.lock();
            if record.shut_down {
                return;
            }
            record.state
        };

        if state.is_connected() {
            if let Err(err) = self.inner.transport.status().await {
                log::debug!("Status ping failed: {err}");
                self.apply(|record| {
                    if record.shut_down {
                        return;
                    }
                    record.log(EventKind::StatusCheckFailed, failure_payload(&err));
                    record.mark_disconnected("connection_lost");
                });
                self.attempt_reconnection().await;
            }
        } else if !state.is_reconnecting() {
            self.attempt_reconnection().await;
        }
    }

    /// Runs one reconnection attempt.
    ///
    /// At most one sequence is in flight; concurrent callers get
    /// [`ReconnectOutcome::Skipped`]. A failure with attempts left schedules
    /// the next attempt after `reconnect_delay_ms × attempt` in the
    /// background; the last failure switches to fallback mode.
    pub async fn attempt_reconnection(&self) -> ReconnectOutcome {
        let (outcome, sequence) = self.attempt_once(None).await;
        if let (ReconnectOutcome::RetryIn(delay), Some(sequence)) = (outcome, sequence) {
            self.schedule_retry(sequence, delay);
        }
        outcome
    }

    /// Runs one probe for a fresh sequence (`None`) or for the retry of
    /// `sequence`, returning the sequence that owned the attempt.
    async fn attempt_once(&self, sequence: Option<u64>) -> (ReconnectOutcome, Option<u64>) {
        let max_attempts = self.inner.config.max_reconnect_attempts;
        let Some((attempt, sequence)) =
            self.apply(|record| record.begin_reconnect(max_attempts, sequence))
        else {
            return (ReconnectOutcome::Skipped, None);
        };
        log::info!("Attempting reconnection ({attempt}/{max_attempts})...");

        let outcome = match self.inner.transport.health().await {
            Ok(_) => {
                let outcome = self.apply(|record| record.finish_reconnect_success(sequence));
                if outcome == ReconnectOutcome::Restored {
                    log::info!("Successfully reconnected to DeenBot");
                }
                outcome
            }
            Err(err) => {
                log::warn!("Reconnection attempt {attempt} failed: {err}");
                let config = &self.inner.config;
                self.apply(|record| {
                    record.finish_reconnect_failure(sequence, &err, max_attempts, |n| {
                        config.reconnect_delay(n)
                    })
                })
            }
        };
        (outcome, Some(sequence))
    }

    fn schedule_retry(&self, sequence: u64, delay: Duration) {
        let client = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(async move {
            let mut delay = delay;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
                if cancel.is_cancelled() {
                    return;
                }
                if !client.apply(|record| record.end_reconnect(sequence)) {
                    log::debug!("Reconnection sequence {sequence} was overtaken");
                    return;
                }
                match client.attempt_once(Some(sequence)).await {
                    (ReconnectOutcome::RetryIn(next), _) => delay = next,
                    _ => return,
                }
            }
        });
        let mut slot = self.inner.retry.lock();
        if self.inner.cancel.is_cancelled() {
            handle.abort();
            return;
        }
        if let Some(previous) = slot.replace(handle) {
            // A fresh sequence owns the slot now; the replaced loop is stale.
            previous.abort();
        }
    }

    /// The host reports that network connectivity came back.
    ///
    /// Gives the backend a fresh set of reconnection attempts when fallback
    /// mode had given up on it.
    pub async fn network_online(&self) -> ReconnectOutcome {
        let proceed = self.apply(|record| {
            if record.shut_down {
                return false;
            }
            record.log(EventKind::NetworkOnline, Value::Null);
            if !record.state.is_reconnecting() {
                record.attempts = 0;
            }
            true
        });
        if !proceed {
            return ReconnectOutcome::Skipped;
        }
        log::info!("Internet connection restored");
        self.attempt_reconnection().await
    }

    /// The host reports that network connectivity was lost.
    pub fn network_offline(&self) {
        self.apply(|record| {
            if record.shut_down {
                return;
            }
            record.log(EventKind::NetworkOffline, Value::Null);
            record.mark_disconnected("internet_offline");
        });
        log::info!("Internet connection lost");
    }

    /// The host became visible again; re-checks health immediately.
    pub async fn resume(&self) -> bool {
        self.perform_health_check().await
    }
}

fn failure_payload(err: &LinkError) -> Value {
    match err {
        LinkError::Status { status, .. } => json!({ "status": status }),
        other => json!({ "error": other.to_string() }),
    }
}
