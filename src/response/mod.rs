//! IRC numeric reply codes understood by the client engine.
//!
//! The table maps each known numeric to its RFC name and to the [`Layout`]
//! that tells the parser which extra fields the reply carries. Numerics that
//! are not in the table still parse; they just carry no specialised fields.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

#![allow(non_camel_case_types)]

use std::str::FromStr;

/// IRC server reply code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum Response {
    // === Connection Registration (001-099) ===
    /// 001 - Welcome to the IRC network
    RPL_WELCOME = 1,
    /// 002 - Your host is running version
    RPL_YOURHOST = 2,
    /// 003 - Server creation date
    RPL_CREATED = 3,
    /// 004 - Server info (name, version, user modes, channel modes)
    RPL_MYINFO = 4,
    /// 005 - Bounce / server supported features
    RPL_BOUNCE = 5,

    // === Luser replies ===
    /// 251 - Luser client count
    RPL_LUSERCLIENT = 251,
    /// 252 - Luser operator count
    RPL_LUSEROP = 252,
    /// 253 - Luser unknown connections
    RPL_LUSERUNKNOWN = 253,
    /// 254 - Luser channel count
    RPL_LUSERCHANNELS = 254,
    /// 255 - Luser local info
    RPL_LUSERME = 255,

    // === Room replies ===
    /// 321 - List start
    RPL_LISTSTART = 321,
    /// 322 - List entry
    RPL_LIST = 322,
    /// 323 - List end
    RPL_LISTEND = 323,
    /// 331 - No topic set
    RPL_NOTOPIC = 331,
    /// 332 - Room topic
    RPL_TOPIC = 332,
    /// 353 - Names reply
    RPL_NAMREPLY = 353,
    /// 366 - End of names
    RPL_ENDOFNAMES = 366,

    // === Message of the day ===
    /// 372 - MOTD line
    RPL_MOTD = 372,
    /// 375 - MOTD start
    RPL_MOTDSTART = 375,
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376,

    // === Errors ===
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403,
    /// 405 - Joined too many channels
    ERR_TOOMANYCHANNELS = 405,
    /// 433 - Nickname in use
    ERR_NICKNAMEINUSE = 433,
    /// 470 - Join forwarded to another channel
    ERR_LINKCHANNEL = 470,
    /// 471 - Channel is full
    ERR_CHANNELISFULL = 471,
    /// 473 - Invite only channel
    ERR_INVITEONLYCHAN = 473,
    /// 474 - Banned from channel
    ERR_BANNEDFROMCHAN = 474,
    /// 475 - Bad channel key
    ERR_BADCHANNELKEY = 475,
    /// 477 - Need registered nick / cannot join
    ERR_NEEDREGGEDNICK = 477,
}

/// Where the specialised fields of a reply sit in its token list.
///
/// Offsets are into the space-split line, where token 0 is the server
/// prefix, token 1 the numeric and token 2 the nick context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Message is everything after the nick context.
    Plain,
    /// MOTD text: token 3 is a `:-`-style marker, message starts at token 4.
    MotdText,
    /// Room at token 3, message after it.
    Room,
    /// Room at token 3, topic text after it.
    Topic,
    /// Visibility marker at token 3, room at token 4, members after it.
    Names,
    /// Room at token 3, member count at token 4, topic after it.
    ListEntry,
    /// Requested room at token 3, forwarded room at token 4, message after.
    Forward,
}

impl Response {
    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Look up a numeric in the table.
    pub fn from_code(code: u16) -> Option<Response> {
        Some(match code {
            1 => Response::RPL_WELCOME,
            2 => Response::RPL_YOURHOST,
            3 => Response::RPL_CREATED,
            4 => Response::RPL_MYINFO,
            5 => Response::RPL_BOUNCE,
            251 => Response::RPL_LUSERCLIENT,
            252 => Response::RPL_LUSEROP,
            253 => Response::RPL_LUSERUNKNOWN,
            254 => Response::RPL_LUSERCHANNELS,
            255 => Response::RPL_LUSERME,
            321 => Response::RPL_LISTSTART,
            322 => Response::RPL_LIST,
            323 => Response::RPL_LISTEND,
            331 => Response::RPL_NOTOPIC,
            332 => Response::RPL_TOPIC,
            353 => Response::RPL_NAMREPLY,
            366 => Response::RPL_ENDOFNAMES,
            372 => Response::RPL_MOTD,
            375 => Response::RPL_MOTDSTART,
            376 => Response::RPL_ENDOFMOTD,
            403 => Response::ERR_NOSUCHCHANNEL,
            405 => Response::ERR_TOOMANYCHANNELS,
            433 => Response::ERR_NICKNAMEINUSE,
            470 => Response::ERR_LINKCHANNEL,
            471 => Response::ERR_CHANNELISFULL,
            473 => Response::ERR_INVITEONLYCHAN,
            474 => Response::ERR_BANNEDFROMCHAN,
            475 => Response::ERR_BADCHANNELKEY,
            477 => Response::ERR_NEEDREGGEDNICK,
            _ => return None,
        })
    }

    /// The RFC name of this reply, e.g. `RPL_WELCOME`.
    pub fn name(&self) -> &'static str {
        match self {
            Response::RPL_WELCOME => "RPL_WELCOME",
            Response::RPL_YOURHOST => "RPL_YOURHOST",
            Response::RPL_CREATED => "RPL_CREATED",
            Response::RPL_MYINFO => "RPL_MYINFO",
            Response::RPL_BOUNCE => "RPL_BOUNCE",
            Response::RPL_LUSERCLIENT => "RPL_LUSERCLIENT",
            Response::RPL_LUSEROP => "RPL_LUSEROP",
            Response::RPL_LUSERUNKNOWN => "RPL_LUSERUNKNOWN",
            Response::RPL_LUSERCHANNELS => "RPL_LUSERCHANNELS",
            Response::RPL_LUSERME => "RPL_LUSERME",
            Response::RPL_LISTSTART => "RPL_LISTSTART",
            Response::RPL_LIST => "RPL_LIST",
            Response::RPL_LISTEND => "RPL_LISTEND",
            Response::RPL_NOTOPIC => "RPL_NOTOPIC",
            Response::RPL_TOPIC => "RPL_TOPIC",
            Response::RPL_NAMREPLY => "RPL_NAMREPLY",
            Response::RPL_ENDOFNAMES => "RPL_ENDOFNAMES",
            Response::RPL_MOTD => "RPL_MOTD",
            Response::RPL_MOTDSTART => "RPL_MOTDSTART",
            Response::RPL_ENDOFMOTD => "RPL_ENDOFMOTD",
            Response::ERR_NOSUCHCHANNEL => "ERR_NOSUCHCHANNEL",
            Response::ERR_TOOMANYCHANNELS => "ERR_TOOMANYCHANNELS",
            Response::ERR_NICKNAMEINUSE => "ERR_NICKNAMEINUSE",
            Response::ERR_LINKCHANNEL => "ERR_LINKCHANNEL",
            Response::ERR_CHANNELISFULL => "ERR_CHANNELISFULL",
            Response::ERR_INVITEONLYCHAN => "ERR_INVITEONLYCHAN",
            Response::ERR_BANNEDFROMCHAN => "ERR_BANNEDFROMCHAN",
            Response::ERR_BADCHANNELKEY => "ERR_BADCHANNELKEY",
            Response::ERR_NEEDREGGEDNICK => "ERR_NEEDREGGEDNICK",
        }
    }

    /// How the parser extracts fields for this reply.
    pub fn layout(&self) -> Layout {
        match self {
            Response::RPL_MOTD | Response::RPL_MOTDSTART => Layout::MotdText,
            Response::RPL_TOPIC => Layout::Topic,
            Response::RPL_NAMREPLY => Layout::Names,
            Response::RPL_LIST => Layout::ListEntry,
            Response::ERR_LINKCHANNEL => Layout::Forward,
            Response::RPL_NOTOPIC
            | Response::RPL_ENDOFNAMES
            | Response::ERR_NOSUCHCHANNEL
            | Response::ERR_TOOMANYCHANNELS
            | Response::ERR_CHANNELISFULL
            | Response::ERR_INVITEONLYCHAN
            | Response::ERR_BANNEDFROMCHAN
            | Response::ERR_BADCHANNELKEY
            | Response::ERR_NEEDREGGEDNICK => Layout::Room,
            _ => Layout::Plain,
        }
    }

    /// Check if this is an error reply (4xx, 5xx)
    #[inline]
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }

    /// Check if this is a connection registration reply (001-099)
    #[inline]
    pub fn is_registration(&self) -> bool {
        self.code() < 100
    }
}

impl FromStr for Response {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u16 = s.parse().map_err(|_| ParseResponseError::InvalidFormat)?;
        Response::from_code(code).ok_or(ParseResponseError::UnknownCode(code))
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// Error when parsing a response code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseResponseError {
    /// The string was not a valid number
    #[error("invalid response code format")]
    InvalidFormat,
    /// The numeric code is not a known response
    #[error("unknown response code: {0}")]
    UnknownCode(u16),
}
