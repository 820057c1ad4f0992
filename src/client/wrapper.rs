use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::LinkConfig,
    error::LinkError,
    events::{ConnectionEvent, ConnectionNotice, EventKind},
    fallback::FallbackTable,
    transport::{ChatTransport, HttpTransport},
};

use super::state::{ConnectionState, LinkRecord};

const NOTICE_CAPACITY: usize = 32;

/// Keeps a best-effort connection to the chat backend.
///
/// Runs the health and monitor timers, reconnects with linear backoff,
/// retries sends, and answers from the fallback table once the backend is
/// given up on. Cloning is cheap and every clone drives the same connection.
#[derive(Clone)]
pub struct ConnectionResilienceClient {
    pub(super) inner: Arc<Inner>,
}

pub(super) struct Inner {
    pub(super) config: Arc<LinkConfig>,
    pub(super) transport: Arc<dyn ChatTransport>,
    pub(super) fallback: FallbackTable,
    pub(super) record: Mutex<LinkRecord>,
    notices: broadcast::Sender<ConnectionNotice>,
    pub(super) cancel: CancellationToken,
    timers: Mutex<Vec<JoinHandle<()>>>,
    pub(super) retry: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionResilienceClient {
    /// Creates a client talking HTTP to `config.server_url`.
    pub fn new(config: LinkConfig) -> Result<Self, LinkError> {
        config.validate()?;
        let config = Arc::new(config);
        let transport = HttpTransport::new(Arc::clone(&config))?;
        Ok(Self::build(config, Arc::new(transport)))
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(
        config: LinkConfig,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self, LinkError> {
        config.validate()?;
        Ok(Self::build(Arc::new(config), transport))
    }

    fn build(config: Arc<LinkConfig>, transport: Arc<dyn ChatTransport>) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let record = LinkRecord::new(config.history_capacity);
        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                fallback: FallbackTable::new(),
                record: Mutex::new(record),
                notices,
                cancel: CancellationToken::new(),
                timers: Mutex::new(Vec::new()),
                retry: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.inner.config
    }

    /// Starts the health check and connection monitor timers.
    ///
    /// The first health check fires immediately; the monitor first fires one
    /// period later. Calling `start` twice is a no-op. Must be called from
    /// within a Tokio runtime.
    pub fn start(&self) -> Result<(), LinkError> {
        tokio::runtime::Handle::try_current()
            .map_err(|e| LinkError::Runtime(e.to_string()))?;
        {
            let mut record = self.inner.record.lock();
            if record.shut_down {
                return Err(LinkError::ShutDown);
            }
            if record.started {
                log::debug!("Connection timers already running");
                return Ok(());
            }
            record.started = true;
        }

        log::info!(
            "Initializing DeenBot link to {}",
            self.inner.config.server_url
        );
        let health_period = self.inner.config.health_check_interval();
        let monitor_period = self.inner.config.monitor_interval();

        let health = self.spawn_timer(Instant::now(), health_period, |client| async move {
            client.perform_health_check().await;
        });
        let monitor = self.spawn_timer(
            Instant::now() + monitor_period,
            monitor_period,
            |client| async move {
                client.monitor_connection().await;
            },
        );
        self.inner.timers.lock().extend([health, monitor]);
        Ok(())
    }

    fn spawn_timer<F, Fut>(&self, first: Instant, period: Duration, job: F) -> JoinHandle<()>
    where
        F: Fn(ConnectionResilienceClient) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let client = self.clone();
        let cancel = self.inner.cancel.clone();
        tokio::spawn(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = job(client.clone()) => {}
                }
            }
        })
    }

    /// Cancels every timer and any pending reconnect retry.
    ///
    /// Safe to call repeatedly or before [`start`](Self::start). No network
    /// call is issued by this client after it returns.
    pub fn shutdown(&self) {
        let first = {
            let mut record = self.inner.record.lock();
            let first = !record.shut_down;
            if first {
                record.shut_down = true;
                record.log(EventKind::Shutdown, Value::Null);
            }
            first
        };
        self.inner.cancel.cancel();
        for handle in self.inner.timers.lock().drain(..) {
            handle.abort();
        }
        if let Some(handle) = self.inner.retry.lock().take() {
            handle.abort();
        }
        if first {
            log::info!("DeenBot link shut down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.record.lock().shut_down
    }

    /// Subscribes to connection notices.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionNotice> {
        self.inner.notices.subscribe()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.record.lock().state
    }

    /// Retained diagnostic events, oldest first.
    pub fn history(&self) -> Vec<ConnectionEvent> {
        self.inner.record.lock().history.snapshot()
    }

    /// Applies a mutation to the shared record and broadcasts the notices it
    /// queued before releasing the lock.
    pub(super) fn apply<T>(&self, f: impl FnOnce(&mut LinkRecord) -> T) -> T {
        let mut record = self.inner.record.lock();
        let out = f(&mut record);
        for notice in record.outbox.drain(..) {
            // No subscribers is fine.
            let _ = self.inner.notices.send(notice);
        }
        out
    }
}

impl std::fmt::Debug for ConnectionResilienceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionResilienceClient")
            .field("server_url", &self.inner.config.server_url)
            .field("state", &self.state())
            .finish()
    }
}
