#[path = "events/history.rs"]
mod history;

#[path = "events/notice.rs"]
mod notice;

pub use history::{ConnectionEvent, EventKind, EventLog};
pub use notice::ConnectionNotice;
