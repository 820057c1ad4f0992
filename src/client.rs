#[path = "client/state.rs"]
mod state;

#[path = "client/wrapper.rs"]
mod wrapper;

#[path = "client/probe.rs"]
mod probe;

#[path = "client/send.rs"]
mod send;

#[path = "client/stats.rs"]
mod stats;

pub use state::{ConnectionState, ReconnectOutcome};
pub use stats::ConnectionStats;
pub use wrapper::ConnectionResilienceClient;
