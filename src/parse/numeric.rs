//! Numeric reply path.
//!
//! ```text
//! :<server> <code> <nick> [fields per reply table...] [:message]
//! ```

use chrono::{DateTime, Utc};

use crate::record::{Code, Payload, Record};
use crate::response::{Layout, Response};

use super::{strip_sentinel, trailing};

/// Status prefixes servers put in front of nicks in a names reply.
const STATUS_PREFIXES: [char; 5] = ['@', '+', '%', '~', '&'];

/// Build the record for a numeric line. Never fails: numerics outside the
/// table keep their raw code and generic message.
pub(super) fn parse(tokens: &[&str], code: u16, received_at: DateTime<Utc>) -> Record {
    let mut record = Record {
        code: Code::Reply(code),
        server: Some(strip_sentinel(tokens[0]).to_string()),
        nick: tokens.get(2).map(|nick| nick.to_string()),
        room: None,
        message: trailing(tokens, 3),
        payload: Payload::None,
        received_at,
    };

    if let Some(resp) = Response::from_code(code) {
        apply_layout(&mut record, resp.layout(), tokens);
    }

    record
}

fn apply_layout(record: &mut Record, layout: Layout, tokens: &[&str]) {
    match layout {
        Layout::Plain => {}
        Layout::MotdText => {
            if tokens.get(3).map(|marker| strip_sentinel(marker)) == Some("-") {
                record.message = tokens[4..].join(" ");
            }
        }
        Layout::Room | Layout::Topic => {
            if let Some(room) = tokens.get(3) {
                record.room = Some(room.to_string());
                record.message = trailing(tokens, 4);
            }
        }
        Layout::Names => {
            if let Some(room) = tokens.get(4) {
                let members: Vec<String> = trailing(tokens, 5)
                    .split(' ')
                    .map(|nick| nick.trim_start_matches(STATUS_PREFIXES))
                    .filter(|nick| !nick.is_empty())
                    .map(str::to_string)
                    .collect();
                record.room = Some(room.to_string());
                record.message = members.join(",");
                record.payload = Payload::Members(members);
            }
        }
        Layout::ListEntry => {
            let users = tokens.get(4).and_then(|count| count.parse::<u32>().ok());
            if let (Some(room), Some(users)) = (tokens.get(3), users) {
                record.room = Some(room.to_string());
                record.message = trailing(tokens, 5);
                record.payload = Payload::ListEntry { users };
            }
        }
        Layout::Forward => {
            if let (Some(from), Some(to)) = (tokens.get(3), tokens.get(4)) {
                record.room = Some(from.to_string());
                record.message = trailing(tokens, 5);
                record.payload = Payload::Forward { to: to.to_string() };
            }
        }
    }
}
