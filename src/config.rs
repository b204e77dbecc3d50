//! Session configuration.

use std::time::Duration;

/// Port used when neither a port nor TLS is configured.
pub const DEFAULT_PORT: u16 = 6667;
/// Port used when TLS is requested and no port is configured.
pub const DEFAULT_TLS_PORT: u16 = 6697;

/// Everything a [`Client`](crate::Client) needs to open a session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port. Resolved by [`ClientConfig::port`] when unset.
    pub port: Option<u16>,
    /// Whether the caller wants an encrypted link.
    pub use_tls: bool,
    /// Nick to register with.
    pub nick: String,
    /// Server password. `PASS` is only sent when this is non-empty.
    pub password: Option<String>,
    /// Real-name field of `USER`.
    pub client_id: String,
    /// Upper bound on establishing the TCP connection.
    pub dial_timeout: Duration,
    /// Keep-alive probe period. Zero disables the heartbeat.
    pub heartbeat_interval: Duration,
    /// Close the session when nothing has been read for this long.
    pub silence_timeout: Option<Duration>,
    /// Bound of the outbound command queue.
    pub queue_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "irc.libera.chat".to_string(),
            port: None,
            use_tls: false,
            nick: String::new(),
            password: None,
            client_id: env!("CARGO_PKG_NAME").to_string(),
            dial_timeout: Duration::from_secs(180),
            heartbeat_interval: Duration::from_secs(120),
            silence_timeout: Some(Duration::from_secs(300)),
            queue_capacity: 64,
        }
    }
}

impl ClientConfig {
    /// Defaults with the given nick and host.
    pub fn new(nick: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            host: host.into(),
            ..Self::default()
        }
    }

    /// The configured port, or the default for the TLS setting.
    pub fn port(&self) -> u16 {
        match (self.port, self.use_tls) {
            (Some(port), _) => port,
            (None, true) => DEFAULT_TLS_PORT,
            (None, false) => DEFAULT_PORT,
        }
    }

    /// `host:port` as dialled.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port())
    }

    /// Password to send, if any.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}
