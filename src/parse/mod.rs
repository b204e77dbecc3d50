//! Line parser: one raw server line in, one [`Record`] out.
//!
//! The line is split on single spaces. Prefix-less `PING` and `ERROR` lines
//! are verb messages whatever follows them. Otherwise, if the second token is
//! numeric the line is a numeric reply, else a verb message; exactly one of
//! the two paths applies. Lines matching neither grammar come back as a
//! [`ParseError`], which callers treat as noise.
//!
//! Parsing is pure: no shared state, no blocking, and the same input with
//! the same receipt time always yields the same record.

mod numeric;
mod token;
mod verb;

use chrono::{DateTime, Utc};

use crate::error::ParseError;
use crate::record::{Record, Verb};

/// Parse a server line, stamping it with the current time.
///
/// ```
/// use slirc_client::{parse_line, Code};
///
/// let record = parse_line(":irc.example.net 001 nick :Welcome").unwrap();
/// assert_eq!(record.code, Code::Reply(1));
/// assert_eq!(record.code_name(), "RPL_WELCOME");
/// assert_eq!(record.message, "Welcome");
/// ```
pub fn parse_line(line: &str) -> Result<Record, ParseError> {
    parse_line_at(line, Utc::now())
}

/// Parse a server line with an explicit receipt time.
pub fn parse_line_at(line: &str, received_at: DateTime<Utc>) -> Result<Record, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() < 2 {
        return Err(ParseError::TooFewTokens { got: tokens.len() });
    }

    if Verb::from_server(tokens[0]).is_some() {
        return verb::parse(&tokens, received_at);
    }
    match token::reply_code(tokens[1]) {
        Some(code) => Ok(numeric::parse(&tokens, code, received_at)),
        None => verb::parse(&tokens, received_at),
    }
}

/// Remove exactly one leading `:`.
pub(crate) fn strip_sentinel(s: &str) -> &str {
    s.strip_prefix(':').unwrap_or(s)
}

/// Tokens from `start` on, rejoined and sentinel-stripped.
fn trailing(tokens: &[&str], start: usize) -> String {
    match tokens.get(start..) {
        Some(rest) => strip_sentinel(&rest.join(" ")).to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Code, Payload, Verb};
    use crate::response::Response;

    fn at() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn parse(line: &str) -> Record {
        parse_line_at(line, at()).expect("line should parse")
    }

    #[test]
    fn test_welcome() {
        let record = parse(":irc.example.net 001 nick :Welcome");
        assert_eq!(record.code, Code::Reply(1));
        assert_eq!(record.code_name(), "RPL_WELCOME");
        assert_eq!(record.server.as_deref(), Some("irc.example.net"));
        assert_eq!(record.nick.as_deref(), Some("nick"));
        assert_eq!(record.message, "Welcome");
        assert_eq!(record.room, None);
        assert_eq!(record.received_at, at());
    }

    #[test]
    fn test_only_one_sentinel_is_stripped() {
        let record = parse(":srv 001 nick ::-) hello");
        assert_eq!(record.message, ":-) hello");
    }

    #[test]
    fn test_motd_line_skips_marker() {
        let record = parse(":srv 372 nick :- Be excellent to each other");
        assert_eq!(record.code, Response::RPL_MOTD.into());
        assert_eq!(record.message, "Be excellent to each other");

        let record = parse(":srv 372 nick :no marker here");
        assert_eq!(record.message, "no marker here");
    }

    #[test]
    fn test_topic_reply() {
        let record = parse(":srv 332 nick #dev :Rust all the things");
        assert_eq!(record.room.as_deref(), Some("#dev"));
        assert_eq!(record.message, "Rust all the things");
    }

    #[test]
    fn test_names_reply() {
        let record = parse(":srv 353 nick = #dev :@alice +bob carol");
        assert_eq!(record.room.as_deref(), Some("#dev"));
        assert_eq!(record.message, "alice,bob,carol");
        assert_eq!(
            record.payload,
            Payload::Members(vec!["alice".into(), "bob".into(), "carol".into()])
        );
    }

    #[test]
    fn test_list_entry() {
        let record = parse(":srv 322 nick #rust 42 :The Rust language");
        assert_eq!(record.room.as_deref(), Some("#rust"));
        assert_eq!(record.payload, Payload::ListEntry { users: 42 });
        assert_eq!(record.message, "The Rust language");
    }

    #[test]
    fn test_list_entry_with_bad_count_falls_back() {
        let record = parse(":srv 322 nick #rust many :topic");
        assert_eq!(record.room, None);
        assert_eq!(record.payload, Payload::None);
        assert_eq!(record.message, "#rust many :topic");
    }

    #[test]
    fn test_forward() {
        let record = parse(":srv 470 nick #linux ##linux :Forwarding to another channel");
        assert_eq!(record.room.as_deref(), Some("#linux"));
        assert_eq!(record.payload, Payload::Forward { to: "##linux".into() });
        assert_eq!(record.message, "Forwarding to another channel");
    }

    #[test]
    fn test_unknown_numeric_keeps_raw_code() {
        let record = parse(":srv 999 nick some #thing :odd");
        assert_eq!(record.code, Code::Reply(999));
        assert_eq!(record.code_name(), "RPL_UNKNOWN");
        assert_eq!(record.message, "some #thing :odd");
        assert_eq!(record.payload, Payload::None);
    }

    #[test]
    fn test_short_numeric_line() {
        let record = parse(":srv 001");
        assert_eq!(record.nick, None);
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_join() {
        let record = parse("nick!user@host JOIN #dev");
        assert_eq!(record.code, Code::Verb(Verb::Join));
        assert_eq!(record.code_name(), "ROOMJOIN");
        assert_eq!(record.nick.as_deref(), Some("nick"));
        assert_eq!(record.room.as_deref(), Some("#dev"));
        assert_eq!(record.server, None);
    }

    #[test]
    fn test_part_quit_privmsg() {
        let record = parse(":bob!b@h part #dev :see you");
        assert_eq!(record.code, Code::Verb(Verb::Part));
        assert_eq!(record.room.as_deref(), Some("#dev"));
        assert_eq!(record.message, "see you");

        let record = parse(":bob!b@h QUIT :Ping timeout: 240 seconds");
        assert_eq!(record.code, Code::Verb(Verb::Quit));
        assert_eq!(record.room, None);
        assert_eq!(record.message, "Ping timeout: 240 seconds");

        let record = parse(":bob!b@h PRIVMSG #dev :hi there");
        assert_eq!(record.code, Code::Verb(Verb::Privmsg));
        assert_eq!(record.room.as_deref(), Some("#dev"));
        assert_eq!(record.message, "hi there");
    }

    #[test]
    fn test_server_ping_and_error() {
        let record = parse("PING :irc.example.net");
        assert_eq!(record.code, Code::Verb(Verb::Ping));
        assert_eq!(record.message, "irc.example.net");

        let record = parse("ERROR :Closing Link: nick (Quit)");
        assert_eq!(record.code, Code::Verb(Verb::Error));
        assert_eq!(record.message, "Closing Link: nick (Quit)");
    }

    #[test]
    fn test_numeric_ping_token_is_still_ping() {
        let record = parse("PING 12345");
        assert_eq!(record.code, Code::Verb(Verb::Ping));
        assert_eq!(record.message, "12345");
        assert_eq!(record.server, None);

        let record = parse("ERROR 404");
        assert_eq!(record.code, Code::Verb(Verb::Error));
    }

    #[test]
    fn test_not_parseable() {
        assert_eq!(parse_line_at("", at()), Err(ParseError::Empty));
        assert_eq!(parse_line_at("\r\n", at()), Err(ParseError::Empty));
        assert_eq!(
            parse_line_at("garbage\n", at()),
            Err(ParseError::TooFewTokens { got: 1 })
        );
        assert_eq!(
            parse_line_at(":bob!b@h NOTICE #dev :hi", at()),
            Err(ParseError::UnknownVerb("NOTICE".into()))
        );
        assert_eq!(
            parse_line_at(":bob!b@h JOIN", at()),
            Err(ParseError::MissingTarget { verb: Verb::Join })
        );
    }
}
