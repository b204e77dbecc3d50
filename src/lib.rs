//! # slirc-client
//!
//! An asynchronous client engine for IRC-style chat servers.
//!
//! ## Features
//!
//! - Line parser turning server lines into structured [`Record`]s, driven by
//!   a numeric reply table
//! - Room state tracking (topic and case-insensitive member sets)
//! - One handler per [`EventKind`], called in wire arrival order
//! - Optional Tokio integration: a cancellable receiver / command sender /
//!   heartbeat pipeline behind the [`Client`] facade
//!
//! The parser, room tracker, dispatcher and command rendering are sans-IO
//! and build without the `tokio` feature.

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Parsing server lines
//!
//! ```rust
//! use slirc_client::{parse_line, Code, Event, EventKind, Rooms};
//!
//! let record = parse_line(":irc.example.net 353 me = #dev :@alice +bob").unwrap();
//! assert_eq!(record.code_name(), "RPL_NAMREPLY");
//! assert_eq!(record.members(), ["alice", "bob"]);
//!
//! let mut rooms = Rooms::new();
//! rooms.observe(&record, "me");
//! assert!(rooms.get("#DEV").unwrap().has_member("Alice"));
//!
//! let event = Event::from_record(record).unwrap();
//! assert_eq!(event.kind(), EventKind::RoomActivity);
//! ```
//!
//! ### Rendering commands
//!
//! ```rust
//! use slirc_client::Command;
//!
//! assert_eq!(Command::Join(vec!["dev".into()]).to_string(), "JOIN #dev");
//! ```

pub mod casemap;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod parse;
pub mod record;
pub mod response;
pub mod room;
pub mod state;

#[cfg(feature = "tokio")]
pub mod client;
#[cfg(feature = "tokio")]
mod pipeline;
#[cfg(feature = "tokio")]
pub mod transport;

#[cfg(feature = "proptest")]
pub mod strategy;

pub use self::casemap::{irc_eq, irc_to_lower, NickKey};
pub use self::command::Command;
pub use self::config::ClientConfig;
pub use self::error::{ClientError, ParseError, ProtocolError, Result};
pub use self::event::{Beat, Dispatcher, Event, EventKind, Fault, Handler};
pub use self::parse::{parse_line, parse_line_at};
pub use self::record::{Code, Payload, Record, Verb};
pub use self::response::Response;
pub use self::room::{Room, Rooms, NO_TOPIC};
pub use self::state::SessionState;

#[cfg(feature = "tokio")]
pub use self::client::{Client, Handle};
#[cfg(feature = "tokio")]
pub use self::transport::{Connection, LineCodec, MAX_LINE_LEN};
