//! Event categories and the per-session handler registry.
//!
//! Records are mapped onto a fixed set of [`EventKind`]s. A [`Dispatcher`]
//! holds at most one handler per kind and calls it synchronously, so
//! handlers see events in wire arrival order. Handlers also receive the
//! current room state, which lets them read it without sharing it.

use std::fmt;

use crate::record::{Code, Record, Verb};
use crate::response::Response;
use crate::room::Rooms;

/// The fixed event categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Session opened, or a registration reply arrived.
    Connected,
    /// Message-of-the-day line.
    Motd,
    /// Join, part, quit, topic, names, room list or forwarded join.
    RoomActivity,
    /// A room operation was refused.
    RoomError,
    /// A message to a room or to us.
    DirectMessage,
    /// Keep-alive traffic in either direction.
    Heartbeat,
    /// Server error reply, server `ERROR`, or a failed write.
    ProtocolError,
    /// Session over. Emitted exactly once.
    Disconnected,
}

impl EventKind {
    /// Every kind, in registry order.
    pub const ALL: [EventKind; 8] = [
        EventKind::Connected,
        EventKind::Motd,
        EventKind::RoomActivity,
        EventKind::RoomError,
        EventKind::DirectMessage,
        EventKind::Heartbeat,
        EventKind::ProtocolError,
        EventKind::Disconnected,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    /// Snake-case name, as used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connected => "connected",
            EventKind::Motd => "motd",
            EventKind::RoomActivity => "room_activity",
            EventKind::RoomError => "room_error",
            EventKind::DirectMessage => "direct_message",
            EventKind::Heartbeat => "heartbeat",
            EventKind::ProtocolError => "protocol_error",
            EventKind::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keep-alive traffic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Beat {
    /// Our own probe went out to `server`.
    Sent {
        /// Probe target.
        server: String,
    },
    /// The server probed us; a reply has been queued.
    Ping(Record),
}

/// What went wrong, for [`Event::ProtocolError`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// A command could not be written. The session continues.
    WriteFailed {
        /// Action tag of the command, see [`Command::action`](crate::Command::action).
        command: &'static str,
        /// Rendered I/O error.
        reason: String,
    },
    /// An error reply or `ERROR` line from the server.
    Server(Record),
}

/// One delivered event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// `None` when the session itself opened, the reply otherwise.
    Connected(Option<Record>),
    /// Message-of-the-day line.
    Motd(Record),
    /// Room activity.
    RoomActivity(Record),
    /// Room error.
    RoomError(Record),
    /// Message to a room or to us.
    DirectMessage(Record),
    /// Keep-alive traffic.
    Heartbeat(Beat),
    /// Protocol error.
    ProtocolError(Fault),
    /// Session over. Carries the cause unless the caller asked to stop.
    Disconnected(Option<String>),
}

impl Event {
    /// The category this event is delivered under.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Connected(_) => EventKind::Connected,
            Event::Motd(_) => EventKind::Motd,
            Event::RoomActivity(_) => EventKind::RoomActivity,
            Event::RoomError(_) => EventKind::RoomError,
            Event::DirectMessage(_) => EventKind::DirectMessage,
            Event::Heartbeat(_) => EventKind::Heartbeat,
            Event::ProtocolError(_) => EventKind::ProtocolError,
            Event::Disconnected(_) => EventKind::Disconnected,
        }
    }

    /// The record behind this event, if any.
    pub fn record(&self) -> Option<&Record> {
        match self {
            Event::Connected(record) => record.as_ref(),
            Event::Motd(record)
            | Event::RoomActivity(record)
            | Event::RoomError(record)
            | Event::DirectMessage(record)
            | Event::Heartbeat(Beat::Ping(record))
            | Event::ProtocolError(Fault::Server(record)) => Some(record),
            _ => None,
        }
    }

    /// Map a parsed record to its event.
    ///
    /// Numerics missing from every category yield `None` and are not
    /// delivered.
    pub fn from_record(record: Record) -> Option<Event> {
        let kind = match record.code {
            Code::Verb(Verb::Join | Verb::Part | Verb::Quit) => EventKind::RoomActivity,
            Code::Verb(Verb::Privmsg) => EventKind::DirectMessage,
            Code::Verb(Verb::Ping) => return Some(Event::Heartbeat(Beat::Ping(record))),
            Code::Verb(Verb::Error) => EventKind::ProtocolError,
            Code::Reply(code) => reply_kind(code)?,
        };
        Some(match kind {
            EventKind::Connected => Event::Connected(Some(record)),
            EventKind::Motd => Event::Motd(record),
            EventKind::RoomActivity => Event::RoomActivity(record),
            EventKind::RoomError => Event::RoomError(record),
            EventKind::DirectMessage => Event::DirectMessage(record),
            _ => Event::ProtocolError(Fault::Server(record)),
        })
    }
}

fn reply_kind(code: u16) -> Option<EventKind> {
    use Response::*;

    let Some(resp) = Response::from_code(code) else {
        return (400..600).contains(&code).then_some(EventKind::ProtocolError);
    };
    Some(match resp {
        resp if resp.is_registration() => EventKind::Connected,
        RPL_LUSERCLIENT | RPL_LUSEROP | RPL_LUSERUNKNOWN | RPL_LUSERCHANNELS | RPL_LUSERME => {
            EventKind::Connected
        }
        RPL_MOTD | RPL_MOTDSTART | RPL_ENDOFMOTD => EventKind::Motd,
        RPL_LISTSTART | RPL_LIST | RPL_LISTEND | RPL_NOTOPIC | RPL_TOPIC | RPL_NAMREPLY
        | RPL_ENDOFNAMES | ERR_LINKCHANNEL => EventKind::RoomActivity,
        ERR_NOSUCHCHANNEL | ERR_TOOMANYCHANNELS | ERR_CHANNELISFULL | ERR_INVITEONLYCHAN
        | ERR_BANNEDFROMCHAN | ERR_BADCHANNELKEY | ERR_NEEDREGGEDNICK => EventKind::RoomError,
        resp if resp.is_error() => EventKind::ProtocolError,
        _ => return None,
    })
}

/// A registered event handler.
pub type Handler = Box<dyn FnMut(&Event, &Rooms) + Send + 'static>;

/// Per-session handler registry: one optional handler per [`EventKind`].
#[derive(Default)]
pub struct Dispatcher {
    handlers: [Option<Handler>; 8],
}

impl Dispatcher {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`, returning the one it replaces.
    pub fn register(&mut self, kind: EventKind, handler: Handler) -> Option<Handler> {
        self.handlers[kind.slot()].replace(handler)
    }

    /// Drop the handler for `kind`.
    pub fn unregister(&mut self, kind: EventKind) -> Option<Handler> {
        self.handlers[kind.slot()].take()
    }

    /// Whether a handler is registered for `kind`.
    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.handlers[kind.slot()].is_some()
    }

    /// Call the handler for the event's kind. Returns false when none is
    /// registered.
    pub fn dispatch(&mut self, event: &Event, rooms: &Rooms) -> bool {
        match &mut self.handlers[event.kind().slot()] {
            Some(handler) => {
                handler(event, rooms);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<&str> = EventKind::ALL
            .iter()
            .filter(|kind| self.is_registered(**kind))
            .map(EventKind::as_str)
            .collect();
        f.debug_struct("Dispatcher")
            .field("registered", &registered)
            .finish()
    }
}
