//! The session's connection: dialling, keepalive and line framing.
//!
//! A [`Connection`] owns the stream exclusively. Once the session opens it
//! is split so that the receiver owns the read half and the writers share
//! the write half.

mod codec;

use std::io;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, warn};

pub use self::codec::{single_line, LineCodec};

use crate::command::Command;
use crate::config::ClientConfig;
use crate::error::{ClientError, ProtocolError};

/// Longest accepted inbound line, terminator included.
pub const MAX_LINE_LEN: usize = 8191;

/// Framed read half, owned by the receiver.
pub type LineReader<S> = FramedRead<ReadHalf<S>, LineCodec>;
/// Framed write half, shared by the command sender and heartbeat.
pub type LineWriter<S> = FramedWrite<WriteHalf<S>, LineCodec>;

/// Dial the configured server within the configured timeout.
pub async fn dial(config: &ClientConfig) -> Result<TcpStream, ClientError> {
    let addr = config.address();
    debug!(%addr, timeout = ?config.dial_timeout, "dialling");

    let stream = match tokio::time::timeout(config.dial_timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(ClientError::Dial { addr, source }),
        Err(_) => {
            return Err(ClientError::DialTimeout {
                addr,
                after: config.dial_timeout,
            })
        }
    };

    if let Err(e) = enable_keepalive(&stream) {
        warn!("failed to enable TCP keepalive: {}", e);
    }
    Ok(stream)
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));

    sock.set_tcp_keepalive(&keepalive)
}

/// A line-framed duplex stream.
pub struct Connection<S> {
    reader: LineReader<S>,
    writer: LineWriter<S>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite,
{
    /// Wrap `stream` with the default codec.
    pub fn new(stream: S) -> Self {
        let (read, write) = tokio::io::split(stream);
        Self {
            reader: FramedRead::new(read, LineCodec::new()),
            writer: FramedWrite::new(write, LineCodec::new()),
        }
    }

    /// Read the next line. `None` means the peer closed the stream.
    pub async fn read_line(&mut self) -> Option<Result<String, ProtocolError>> {
        self.reader.next().await
    }

    /// Write and flush one command.
    pub async fn write_command(&mut self, command: Command) -> Result<(), ProtocolError> {
        self.writer.send(command).await
    }

    /// Write several commands, flushing once at the end.
    pub async fn write_all(&mut self, commands: Vec<Command>) -> Result<(), ProtocolError> {
        for command in commands {
            self.writer.feed(command).await?;
        }
        SinkExt::<Command>::flush(&mut self.writer).await
    }

    /// Shut the write half down.
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        SinkExt::<Command>::close(&mut self.writer).await
    }

    /// Hand the halves to the pipeline.
    pub fn into_split(self) -> (LineReader<S>, LineWriter<S>) {
        (self.reader, self.writer)
    }
}
