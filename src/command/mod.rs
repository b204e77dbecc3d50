//! Outbound commands and their line rendering.

mod serialize;
mod types;

pub use self::types::{normalize_room, Command};
