//! Connection resilience for the DeenBot chat service.
//!
//! [`ConnectionResilienceClient`] keeps a best-effort connection to a remote
//! chat backend so callers always get *some* answer:
//!
//! - a health check timer probes `/health` and a monitor timer pings
//!   `/status`, so a dropped connection is caught by whichever fires first
//! - reconnection runs at most one sequence at a time, waiting
//!   `reconnect_delay_ms × attempt` between attempts
//! - sends are retried with their own linear backoff
//! - once the backend is given up on, replies come from a static
//!   [`FallbackTable`] tagged with [`Provenance::Fallback`]
//!
//! Connectivity changes are broadcast as [`ConnectionNotice`]s; a bounded
//! [`EventLog`] keeps the last events for diagnostics.
//!
//! ```no_run
//! use deenbot_link::{ConnectionResilienceClient, LinkConfig, LinkError};
//!
//! # async fn example() -> Result<(), LinkError> {
//! let client = ConnectionResilienceClient::new(LinkConfig::new("http://localhost:8080"))?;
//! let mut notices = client.subscribe();
//! client.start()?;
//!
//! let reply = client.send_message("When is Fajr?").await?;
//! if reply.is_fallback() {
//!     println!("(offline) {reply}");
//! }
//! while let Ok(notice) = notices.try_recv() {
//!     println!("{notice:?}");
//! }
//! client.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod fallback;
pub mod transport;

pub use client::{ConnectionResilienceClient, ConnectionState, ConnectionStats, ReconnectOutcome};
pub use config::LinkConfig;
pub use error::LinkError;
pub use events::{ConnectionEvent, ConnectionNotice, EventKind, EventLog};
pub use fallback::{FallbackTable, FallbackTopic};
pub use transport::{ChatReply, ChatRequest, ChatTransport, HttpTransport, Provenance};
