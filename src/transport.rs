//! Network seam between the connection state machine and the chat backend.

#[path = "transport/types.rs"]
mod types;

#[path = "transport/traits.rs"]
mod traits;

#[path = "transport/http.rs"]
mod http;

pub use http::HttpTransport;
pub use traits::ChatTransport;
pub use types::{ChatReply, ChatRequest, Provenance};
