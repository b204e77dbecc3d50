//! Structured records produced by the line parser.
//!
//! Every parsed server line becomes one immutable [`Record`]. Its [`Code`]
//! tag says which family it belongs to: a numeric reply from the server, or
//! a verb message relaying some user's action.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::response::Response;

/// A user action relayed by the server, or a prefix-less server verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verb {
    /// Someone joined a room.
    Join,
    /// Someone left a room.
    Part,
    /// Someone disconnected from the server.
    Quit,
    /// A message to a room or to us.
    Privmsg,
    /// Server keep-alive probe.
    Ping,
    /// Server is closing the link.
    Error,
}

impl Verb {
    /// Match the verb token of a prefixed line (`nick!user@host VERB ...`).
    pub fn from_relayed(token: &str) -> Option<Verb> {
        [Verb::Join, Verb::Part, Verb::Quit, Verb::Privmsg]
            .into_iter()
            .find(|verb| token.eq_ignore_ascii_case(verb.as_str()))
    }

    /// Match the leading token of a prefix-less server line (`PING :x`).
    pub fn from_server(token: &str) -> Option<Verb> {
        [Verb::Ping, Verb::Error]
            .into_iter()
            .find(|verb| token.eq_ignore_ascii_case(verb.as_str()))
    }

    /// The verb as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Join => "JOIN",
            Verb::Part => "PART",
            Verb::Quit => "QUIT",
            Verb::Privmsg => "PRIVMSG",
            Verb::Ping => "PING",
            Verb::Error => "ERROR",
        }
    }

    /// The symbolic code name carried by records of this verb.
    pub fn code_name(&self) -> &'static str {
        match self {
            Verb::Join => "ROOMJOIN",
            Verb::Part => "ROOMPART",
            Verb::Quit => "ROOMQUIT",
            Verb::Privmsg => "PRIVMSG",
            Verb::Ping => "PING",
            Verb::Error => "ERROR",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric-or-symbolic record code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Code {
    /// A numeric server reply. Unknown numerics keep their raw value.
    Reply(u16),
    /// A verb message.
    Verb(Verb),
}

/// Code name used for numerics missing from the reply table.
pub const UNKNOWN_REPLY: &str = "RPL_UNKNOWN";

impl Code {
    /// Human code name: `RPL_WELCOME`, `ROOMJOIN`, ...
    pub fn name(&self) -> &'static str {
        match self {
            Code::Reply(code) => Response::from_code(*code)
                .map(|resp| resp.name())
                .unwrap_or(UNKNOWN_REPLY),
            Code::Verb(verb) => verb.code_name(),
        }
    }

    /// The table entry for a known numeric.
    pub fn response(&self) -> Option<Response> {
        match self {
            Code::Reply(code) => Response::from_code(*code),
            Code::Verb(_) => None,
        }
    }

    /// The verb, for verb messages.
    pub fn verb(&self) -> Option<Verb> {
        match self {
            Code::Verb(verb) => Some(*verb),
            Code::Reply(_) => None,
        }
    }
}

impl From<Response> for Code {
    fn from(resp: Response) -> Self {
        Code::Reply(resp.code())
    }
}

impl From<Verb> for Code {
    fn from(verb: Verb) -> Self {
        Code::Verb(verb)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Reply(code) => write!(f, "{:03}", code),
            Code::Verb(verb) => f.write_str(verb.code_name()),
        }
    }
}

/// Reply-specific fields extracted through the reply table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    /// Nothing beyond the common fields.
    #[default]
    None,
    /// Names reply: member nicks with status prefixes removed.
    Members(Vec<String>),
    /// List entry: visible member count of the room.
    ListEntry {
        /// Users in the room.
        users: u32,
    },
    /// Join forwarded: the room the server put us in instead.
    Forward {
        /// The room actually joined.
        to: String,
    },
}

/// One parsed server line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    /// Reply numeric or verb.
    pub code: Code,
    /// Originating server, for numeric replies.
    pub server: Option<String>,
    /// Nick context for replies, acting nick for verbs.
    pub nick: Option<String>,
    /// Target room, when the line concerns one.
    pub room: Option<String>,
    /// Free-text payload with one leading `:` removed.
    pub message: String,
    /// Specialised fields.
    pub payload: Payload,
    /// When the line was read.
    pub received_at: DateTime<Utc>,
}

impl Record {
    /// Human code name, see [`Code::name`].
    pub fn code_name(&self) -> &'static str {
        self.code.name()
    }

    /// True for numeric replies.
    pub fn is_reply(&self) -> bool {
        matches!(self.code, Code::Reply(_))
    }

    /// True for verb messages.
    pub fn is_verb(&self) -> bool {
        matches!(self.code, Code::Verb(_))
    }

    /// Names-reply members, empty for other records.
    pub fn members(&self) -> &[String] {
        match &self.payload {
            Payload::Members(nicks) => nicks,
            _ => &[],
        }
    }
}
