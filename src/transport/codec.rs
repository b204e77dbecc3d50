//! Line framing for the connection.
//!
//! Inbound bytes are split on `\n` with any trailing `\r` removed. Bytes
//! that are not valid UTF-8 are replaced rather than rejected. Outbound
//! commands are rendered, cut at the first embedded line break, and
//! terminated with `\r\n`.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::command::Command;
use crate::error::ProtocolError;

use super::MAX_LINE_LEN;

/// Newline-delimited text codec.
#[derive(Clone, Debug)]
pub struct LineCodec {
    next_index: usize,
    max_len: usize,
}

impl LineCodec {
    /// Codec with the default maximum line length.
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Codec accepting lines of at most `max_len` bytes, terminator included.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// Maximum accepted line length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn take_line(&mut self, src: &mut BytesMut, len: usize) -> Result<String, ProtocolError> {
        self.next_index = 0;
        if len > self.max_len {
            return Err(ProtocolError::LineTooLong {
                actual: len,
                limit: self.max_len,
            });
        }
        let bytes = src.split_to(len);
        let line = String::from_utf8_lossy(&bytes);
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        let start = self.next_index.min(src.len());
        match src[start..].iter().position(|&b| b == b'\n') {
            Some(offset) => self.take_line(src, start + offset + 1).map(Some),
            None if src.len() > self.max_len => Err(ProtocolError::LineTooLong {
                actual: src.len(),
                limit: self.max_len,
            }),
            None => {
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let len = src.len();
        self.take_line(src, len).map(Some)
    }
}

impl Encoder<Command> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, command: Command, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let rendered = command.to_string();
        let line = single_line(&rendered);
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// `line` up to its first CR or LF.
pub fn single_line(line: &str) -> &str {
    match line.find(['\r', '\n']) {
        Some(end) => &line[..end],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut LineCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = codec.decode(buf).unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_decode_crlf_and_lf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :a\r\nPING :b\nPING :c");
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["PING :a", "PING :b"]);
        assert_eq!(&buf[..], b"PING :c");

        buf.extend_from_slice(b"\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("PING :c"));
    }

    #[test]
    fn test_decode_eof_delivers_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("ERROR :bye");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(codec.decode_eof(&mut buf).unwrap().as_deref(), Some("ERROR :bye"));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_lossy_utf8() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b":n!u@h PRIVMSG #a :caf\xe9\r\n"[..]);
        let line = codec.decode(&mut buf).unwrap().unwrap();
        assert!(line.starts_with(":n!u@h PRIVMSG #a :caf"));
        assert!(line.ends_with('\u{FFFD}'));
    }

    #[test]
    fn test_decode_line_too_long() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::from("0123456789abcdefXYZ");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::LineTooLong { actual: 19, limit: 16 })
        ));

        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::from("0123456789abcdef\r\n");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::LineTooLong { actual: 18, .. })
        ));
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(Command::Join(vec!["dev".into()]), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"JOIN #dev\r\n");
    }

    #[test]
    fn test_encode_drops_injected_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        let command = Command::Privmsg {
            target: "#dev".into(),
            text: "hi\r\nQUIT :pwned".into(),
        };
        codec.encode(command, &mut buf).unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #dev :hi\r\n");
        assert_eq!(single_line("a\nb"), "a");
        assert_eq!(single_line("plain"), "plain");
    }
}
