//! Verb message path.
//!
//! ```text
//! <nick>!<user>@<host> JOIN|PART|QUIT|PRIVMSG [room] [:message]
//! PING|ERROR [:message]
//! ```

use chrono::{DateTime, Utc};

use crate::error::ParseError;
use crate::record::{Code, Payload, Record, Verb};

use super::{strip_sentinel, token, trailing};

pub(super) fn parse(tokens: &[&str], received_at: DateTime<Utc>) -> Result<Record, ParseError> {
    if let Some(verb) = Verb::from_server(tokens[0]) {
        return Ok(Record {
            code: Code::Verb(verb),
            server: None,
            nick: None,
            room: None,
            message: trailing(tokens, 1),
            payload: Payload::None,
            received_at,
        });
    }

    let verb = Verb::from_relayed(tokens[1])
        .ok_or_else(|| ParseError::UnknownVerb(tokens[1].to_string()))?;

    let (room, message) = match verb {
        Verb::Join => (Some(target(tokens, verb)?), String::new()),
        Verb::Part | Verb::Privmsg => (Some(target(tokens, verb)?), trailing(tokens, 3)),
        Verb::Quit => (None, trailing(tokens, 2)),
        Verb::Ping | Verb::Error => return Err(ParseError::UnknownVerb(tokens[1].to_string())),
    };

    Ok(Record {
        code: Code::Verb(verb),
        server: None,
        nick: token::acting_nick(tokens[0]).map(str::to_string),
        room,
        message,
        payload: Payload::None,
        received_at,
    })
}

/// Token 2, which JOIN/PART/PRIVMSG require.
fn target(tokens: &[&str], verb: Verb) -> Result<String, ParseError> {
    tokens
        .get(2)
        .map(|room| strip_sentinel(room))
        .filter(|room| !room.is_empty())
        .map(str::to_string)
        .ok_or(ParseError::MissingTarget { verb })
}
