use std::fmt::{self, Write};

use super::types::{normalize_room, Command};

/// Write a command with space-separated middle arguments and a trailing
/// argument that always carries the `:` marker.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    match args.split_last() {
        Some((suffix, middle)) => {
            f.write_str(cmd)?;
            for arg in middle {
                f.write_char(' ')?;
                f.write_str(arg)?;
            }
            f.write_str(" :")?;
            f.write_str(suffix)
        }
        None => f.write_str(cmd),
    }
}

/// Write a command whose single optional argument is a comma-joined list.
fn write_cmd_list(f: &mut fmt::Formatter<'_>, cmd: &str, items: &[String]) -> fmt::Result {
    f.write_str(cmd)?;
    if items.is_empty() {
        return Ok(());
    }
    f.write_char(' ')?;
    f.write_str(&items.join(","))
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Pass(password) => write!(f, "PASS {}", password),
            Command::Nick(nick) => write!(f, "NICK {}", nick),
            Command::User { nick, client_id } => {
                write_cmd_freeform(f, "USER", &[nick, "0", "*", client_id])
            }
            Command::Join(rooms) => {
                let rooms: Vec<String> = rooms.iter().map(|room| normalize_room(room)).collect();
                write_cmd_list(f, "JOIN", &rooms)
            }
            Command::Part { room, message } => {
                write_cmd_freeform(f, "PART", &[&normalize_room(room), message])
            }
            Command::List(scopes) => write_cmd_list(f, "LIST", scopes),
            Command::Names(scopes) => write_cmd_list(f, "NAMES", scopes),
            Command::Invite { nick, room } => write!(f, "INVITE {} {}", nick, room),
            Command::Kick {
                room,
                nick,
                message,
            } => write_cmd_freeform(f, "KICK", &[room, nick, message]),
            Command::Privmsg { target, text } => write_cmd_freeform(f, "PRIVMSG", &[target, text]),
            Command::Pong(server) => write!(f, "PONG {}", server),
            Command::Quit(message) => write_cmd_freeform(f, "QUIT", &[message]),
        }
    }
}
