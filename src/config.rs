#[path = "config/types.rs"]
mod types;

#[path = "config/load.rs"]
mod load;

pub use types::LinkConfig;
