//! Proptest strategies for server lines and commands.

use proptest::prelude::*;

use crate::command::Command;

/// A plausible nick: a letter, then letters, digits or `_-[]`.
pub fn nick() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_\\-\\[\\]]{0,15}"
}

/// A room name with or without its leading `#`.
pub fn room() -> impl Strategy<Value = String> {
    "#{0,2}[a-z][a-z0-9_\\-]{0,15}"
}

/// Free text without line breaks.
pub fn text() -> impl Strategy<Value = String> {
    "[ -~]{0,64}"
}

/// A relayed `JOIN`, `PART`, `QUIT` or `PRIVMSG` line.
pub fn verb_line() -> impl Strategy<Value = String> {
    (nick(), room(), text(), 0..4u8).prop_map(|(nick, room, text, verb)| {
        let prefix = format!(":{}!u@host", nick);
        match verb {
            0 => format!("{} JOIN {}", prefix, room),
            1 => format!("{} PART {} :{}", prefix, room, text),
            2 => format!("{} QUIT :{}", prefix, text),
            _ => format!("{} PRIVMSG {} :{}", prefix, room, text),
        }
    })
}

/// A numeric reply line with any three-digit code.
pub fn numeric_line() -> impl Strategy<Value = String> {
    (1..1000u16, nick(), text()).prop_map(|(code, nick, text)| {
        format!(":irc.example.net {:03} {} :{}", code, nick, text)
    })
}

/// An outbound command built from the strategies above.
pub fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        prop::collection::vec(room(), 1..4).prop_map(Command::Join),
        (room(), text()).prop_map(|(room, message)| Command::Part { room, message }),
        (room(), text()).prop_map(|(target, text)| Command::Privmsg { target, text }),
        prop::collection::vec(room(), 0..3).prop_map(Command::List),
        prop::collection::vec(room(), 0..3).prop_map(Command::Names),
        text().prop_map(Command::Quit),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;

    proptest! {
        #[test]
        fn test_generated_lines_parse(line in prop_oneof![verb_line(), numeric_line()]) {
            prop_assert!(parse_line(&line).is_ok());
        }

        #[test]
        fn test_generated_commands_render_one_line(command in command()) {
            let line = command.to_string();
            prop_assert!(!line.contains('\n'));
            prop_assert!(!line.contains('\r'));
        }
    }
}
