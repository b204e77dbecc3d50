use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::command::Command;
use crate::event::{Beat, Dispatcher, Event, Fault};
use crate::parse::parse_line;
use crate::record::{Code, Record, Verb};
use crate::response::Response;
use crate::room::Rooms;
use crate::transport::LineReader;

use super::{report_end, SessionEnd, Signal};

/// Sole reader of the connection and sole owner of room state and handlers.
pub(super) struct Receiver<S> {
    pub(super) reader: LineReader<S>,
    pub(super) signals: mpsc::UnboundedReceiver<Signal>,
    pub(super) commands: mpsc::Sender<Command>,
    pub(super) ends: mpsc::Sender<SessionEnd>,
    pub(super) cancel: CancellationToken,
    pub(super) last_seen: watch::Sender<Instant>,
    pub(super) server: watch::Sender<String>,
    pub(super) nick: String,
    pub(super) dispatcher: Dispatcher,
    pub(super) rooms: Rooms,
}

impl<S> Receiver<S>
where
    S: AsyncRead,
{
    /// Read until the stream ends, a read fails or the session is cancelled.
    ///
    /// Hands the registry and room state back so the supervisor can deliver
    /// the final event.
    pub(super) async fn run(mut self) -> (Dispatcher, Rooms) {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(signal) = self.signals.recv() => self.handle_signal(signal),
                line = self.reader.next() => match line {
                    Some(Ok(line)) => self.handle_line(&line),
                    Some(Err(e)) => {
                        warn!(error = %e, "read failed");
                        report_end(&self.ends, SessionEnd::ReadFailed(e.to_string()));
                        break;
                    }
                    None => {
                        debug!("server closed the stream");
                        report_end(&self.ends, SessionEnd::StreamClosed);
                        break;
                    }
                },
            }
        }

        // Work queued before shutdown still lands ahead of the disconnect.
        while let Ok(signal) = self.signals.try_recv() {
            self.handle_signal(signal);
        }
        debug!("receiver stopped");
        (self.dispatcher, self.rooms)
    }

    fn handle_line(&mut self, line: &str) {
        self.last_seen.send_replace(Instant::now());

        let record = match parse_line(line) {
            Ok(record) => record,
            Err(e) => {
                trace!(%line, error = %e, "discarding line");
                return;
            }
        };

        match record.code {
            Code::Reply(code) if code == Response::RPL_WELCOME.code() => self.learn_identity(&record),
            Code::Verb(Verb::Ping) => self.answer_ping(&record),
            _ => {}
        }

        self.rooms.observe(&record, &self.nick);

        match Event::from_record(record) {
            Some(event) => {
                self.dispatcher.dispatch(&event, &self.rooms);
            }
            None => trace!(%line, "no event for line"),
        }
    }

    fn learn_identity(&mut self, welcome: &Record) {
        if let Some(server) = welcome.server.as_deref().filter(|s| !s.is_empty()) {
            debug!(server, "server name learned");
            self.server.send_replace(server.to_string());
        }
        if let Some(nick) = welcome.nick.as_deref().filter(|n| !n.is_empty()) {
            self.nick = nick.to_string();
        }
    }

    /// Queue the reply without waiting; a full queue is reported, not awaited.
    fn answer_ping(&mut self, ping: &Record) {
        let token = match ping.message.as_str() {
            "" => self.server.borrow().clone(),
            token => token.to_string(),
        };
        match self.commands.try_send(Command::Pong(token)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("command queue full; ping left unanswered");
                let event = Event::ProtocolError(Fault::WriteFailed {
                    command: "pong",
                    reason: "command queue full".to_string(),
                });
                self.dispatcher.dispatch(&event, &self.rooms);
            }
            Err(TrySendError::Closed(_)) => debug!("command queue closed; ping left unanswered"),
        }
    }

    fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Register(kind, handler) => {
                trace!(%kind, "handler registered");
                self.dispatcher.register(kind, handler);
            }
            Signal::Joined(rooms) => {
                for room in &rooms {
                    self.rooms.ensure(room);
                }
            }
            Signal::Parted(room) => {
                self.rooms.remove(&room);
            }
            Signal::WriteFailed { command, reason } => {
                let event = Event::ProtocolError(Fault::WriteFailed { command, reason });
                self.dispatcher.dispatch(&event, &self.rooms);
            }
            Signal::HeartbeatSent { server } => {
                let event = Event::Heartbeat(Beat::Sent { server });
                self.dispatcher.dispatch(&event, &self.rooms);
            }
            Signal::Snapshot(reply) => {
                // The caller may have given up waiting.
                let _ = reply.send(self.rooms.clone());
            }
        }
    }
}
