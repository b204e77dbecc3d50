//! Error types for the IRC client engine.
//!
//! This module defines the line-parser outcome for lines that match neither
//! grammar, transport framing errors, and the errors surfaced by the
//! [`Client`](crate::Client) facade.

use thiserror::Error;

use crate::record::Verb;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Why a server line could not be turned into a [`Record`](crate::Record).
///
/// These are expected protocol noise: the receiver discards them silently.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The line was empty.
    #[error("empty line")]
    Empty,

    /// The line had fewer tokens than any grammar needs.
    #[error("too few tokens: got {got}")]
    TooFewTokens {
        /// Number of space-separated tokens found.
        got: usize,
    },

    /// The verb position held a verb this client does not handle.
    #[error("unknown verb: {0}")]
    UnknownVerb(String),

    /// A verb that needs a target room arrived without one.
    #[error("{verb} without a target")]
    MissingTarget {
        /// The verb missing its target.
        verb: Verb,
    },
}

/// Transport framing errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the maximum allowed length.
    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong {
        /// Bytes buffered without finding a line terminator.
        actual: usize,
        /// Configured maximum.
        limit: usize,
    },
}

/// Errors surfaced by the client facade.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The server address could not be reached.
    #[error("failed to connect to {addr}: {source}")]
    Dial {
        /// `host:port` that was dialled.
        addr: String,
        /// The underlying connect error.
        #[source]
        source: std::io::Error,
    },

    /// The dial did not complete within the configured timeout.
    #[error("connecting to {addr} timed out after {after:?}")]
    DialTimeout {
        /// `host:port` that was dialled.
        addr: String,
        /// The dial timeout that elapsed.
        after: std::time::Duration,
    },

    /// `use_tls` is set but the engine only dials plain TCP.
    #[error("TLS must be negotiated by the caller; hand the secured stream to start_with_stream")]
    TlsUnsupported,

    /// Framing error on the connection.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// `start` was called on a session that is already running.
    #[error("session already started")]
    AlreadyStarted,

    /// `start` was called on a session that has closed. Build a new client.
    #[error("session has finished")]
    SessionFinished,

    /// A command was issued while no session is running.
    #[error("not connected")]
    NotConnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::TooFewTokens { got: 1 };
        assert_eq!(err.to_string(), "too few tokens: got 1");

        let err = ParseError::MissingTarget { verb: Verb::Join };
        assert_eq!(err.to_string(), "JOIN without a target");

        let err = ProtocolError::LineTooLong {
            actual: 9000,
            limit: 8191,
        };
        assert_eq!(err.to_string(), "line too long: 9000 bytes (limit 8191)");
    }

    #[test]
    fn test_dial_error_chaining() {
        let io_err =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = ClientError::Dial {
            addr: "irc.example.net:6667".to_string(),
            source: io_err,
        };

        let source = std::error::Error::source(&err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), "connection refused");
        assert!(err.to_string().starts_with("failed to connect to irc.example.net:6667"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
        let protocol_err: ProtocolError = io_err.into();
        assert!(matches!(protocol_err, ProtocolError::Io(_)));

        let client_err: ClientError = protocol_err.into();
        match client_err {
            ClientError::Protocol(ProtocolError::Io(_)) => {}
            _ => panic!("Expected Protocol(Io) variant"),
        }
    }
}
