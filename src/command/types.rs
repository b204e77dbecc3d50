//! Outbound command types.

/// One outbound intent, rendered to exactly one protocol line.
///
/// Built by the [`Client`](crate::Client) facade and consumed once by the
/// command sender. `Display` renders the line without its terminator; the
/// line codec appends `\r\n`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    // === Authentication ===
    /// `PASS password`
    Pass(String),
    /// `NICK nickname`
    Nick(String),
    /// `USER nickname 0 * :client identifier`
    User {
        /// Nick used as the user name.
        nick: String,
        /// Free-form real-name field.
        client_id: String,
    },

    // === Rooms ===
    /// `JOIN #room[,#room...]`
    Join(Vec<String>),
    /// `PART #room :message`
    Part {
        /// Room to leave.
        room: String,
        /// Parting message.
        message: String,
    },
    /// `LIST [scope[,scope...]]`
    List(Vec<String>),
    /// `NAMES [scope[,scope...]]`
    Names(Vec<String>),
    /// `INVITE nick #room`
    Invite {
        /// Who to invite.
        nick: String,
        /// Where to.
        room: String,
    },
    /// `KICK #room nick :message`
    Kick {
        /// Room to kick from.
        room: String,
        /// Who to kick.
        nick: String,
        /// Reason.
        message: String,
    },

    // === Messaging ===
    /// `PRIVMSG target :message`
    Privmsg {
        /// Room or nick.
        target: String,
        /// Message text.
        text: String,
    },

    // === Connection ===
    /// `PONG servername`
    Pong(String),
    /// `QUIT :message`
    Quit(String),
}

impl Command {
    /// Authentication sequence: `PASS` (only for a non-empty password),
    /// then `NICK` and `USER`.
    pub fn authentication(nick: &str, password: Option<&str>, client_id: &str) -> Vec<Command> {
        let mut commands = Vec::with_capacity(3);
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            commands.push(Command::Pass(password.to_string()));
        }
        commands.push(Command::Nick(nick.to_string()));
        commands.push(Command::User {
            nick: nick.to_string(),
            client_id: client_id.to_string(),
        });
        commands
    }

    /// The action tag of this command.
    pub fn action(&self) -> &'static str {
        match self {
            Command::Pass(_) => "pass",
            Command::Nick(_) => "nick",
            Command::User { .. } => "user",
            Command::Join(_) => "join",
            Command::Part { .. } => "part",
            Command::List(_) => "list",
            Command::Names(_) => "names",
            Command::Invite { .. } => "invite",
            Command::Kick { .. } => "kick",
            Command::Privmsg { .. } => "message",
            Command::Pong(_) => "pong",
            Command::Quit(_) => "quit",
        }
    }
}

/// Give a room name its leading `#` if it lacks one.
///
/// ```
/// use slirc_client::command::normalize_room;
///
/// assert_eq!(normalize_room("dev"), "#dev");
/// assert_eq!(normalize_room("#dev"), "#dev");
/// ```
pub fn normalize_room(name: &str) -> String {
    if name.starts_with('#') {
        name.to_string()
    } else {
        format!("#{}", name)
    }
}
