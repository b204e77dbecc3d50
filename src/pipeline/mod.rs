//! The per-session I/O pipeline.
//!
//! Three tasks run for every open session:
//!
//! - the **receiver** owns the read half, the room state and the handler
//!   registry; it parses, tracks and dispatches each line in arrival order;
//! - the **command sender** drains the outbound queue into the write half;
//! - the **heartbeat** periodically probes the server and watches for
//!   silence.
//!
//! They share one [`CancellationToken`]. A fourth task, the supervisor,
//! waits for the first [`SessionEnd`], raises the token, joins all three
//! tasks and only then emits the session's single disconnected event.

mod heartbeat;
mod receiver;
mod sender;

use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::ClientConfig;
use crate::event::{Dispatcher, Event, EventKind, Handler};
use crate::room::Rooms;
use crate::state::SessionState;
use crate::transport::{Connection, LineWriter};

use self::heartbeat::Heartbeat;
use self::receiver::Receiver;

/// Write half shared by the command sender and the heartbeat.
pub(crate) type SharedWriter<S> = Arc<Mutex<LineWriter<S>>>;

/// Work handed to the receiver's sequence by other tasks.
pub(crate) enum Signal {
    /// Install or replace a handler.
    Register(EventKind, Handler),
    /// Local join: track these rooms before the server acknowledges.
    Joined(Vec<String>),
    /// Local part: forget this room.
    Parted(String),
    /// A command could not be written.
    WriteFailed {
        command: &'static str,
        reason: String,
    },
    /// A heartbeat probe went out.
    HeartbeatSent { server: String },
    /// Copy the room state out.
    Snapshot(oneshot::Sender<Rooms>),
}

/// Why a session is ending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    /// The server closed the stream.
    StreamClosed,
    /// Reading failed.
    ReadFailed(String),
    /// Nothing was read for this long.
    Silent(Duration),
    /// The caller asked to stop.
    Requested,
}

impl SessionEnd {
    /// The reason carried by the disconnected event.
    pub(crate) fn reason(&self) -> Option<String> {
        match self {
            SessionEnd::StreamClosed => Some("connection closed by server".to_string()),
            SessionEnd::ReadFailed(reason) => Some(format!("read failed: {}", reason)),
            SessionEnd::Silent(after) => Some(format!("no data received for {:?}", after)),
            SessionEnd::Requested => None,
        }
    }
}

/// Report a session end. Only the first report is acted on.
pub(crate) fn report_end(ends: &mpsc::Sender<SessionEnd>, end: SessionEnd) {
    if let Err(e) = ends.try_send(end) {
        debug!(error = %e, "session end already reported");
    }
}

/// Move `state` to `next` if the transition is allowed.
pub(crate) fn advance(state: &watch::Sender<SessionState>, next: SessionState) -> bool {
    state.send_if_modified(|current| {
        if current.can_advance_to(next) {
            debug!(from = %current, to = %next, "session state");
            *current = next;
            true
        } else {
            warn!(from = %current, to = %next, "refused session state transition");
            false
        }
    })
}

/// Channels the facade keeps to talk to a running session.
pub(crate) struct Session {
    pub(crate) commands: mpsc::Sender<Command>,
    pub(crate) signals: mpsc::UnboundedSender<Signal>,
    pub(crate) ends: mpsc::Sender<SessionEnd>,
    pub(crate) cancel: CancellationToken,
    pub(crate) supervisor: JoinHandle<()>,
}

/// Spawn the three pipeline tasks and their supervisor.
pub(crate) fn spawn<S>(
    conn: Connection<S>,
    config: &ClientConfig,
    dispatcher: Dispatcher,
    state: Arc<watch::Sender<SessionState>>,
) -> Session
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, writer) = conn.into_split();
    let writer: SharedWriter<S> = Arc::new(Mutex::new(writer));
    let cancel = CancellationToken::new();

    let (commands_tx, commands_rx) = mpsc::channel(config.queue_capacity.max(1));
    let (signals_tx, signals_rx) = mpsc::unbounded_channel();
    let (ends_tx, ends_rx) = mpsc::channel(4);
    let (server_tx, server_rx) = watch::channel(config.host.clone());
    let (seen_tx, seen_rx) = watch::channel(Instant::now());

    let receiver = Receiver {
        reader,
        signals: signals_rx,
        commands: commands_tx.clone(),
        ends: ends_tx.clone(),
        cancel: cancel.clone(),
        last_seen: seen_tx,
        server: server_tx,
        nick: config.nick.clone(),
        dispatcher,
        rooms: Rooms::new(),
    };
    let heartbeat = Heartbeat {
        interval: config.heartbeat_interval,
        silence_timeout: config.silence_timeout,
        writer: Arc::clone(&writer),
        server: server_rx,
        last_seen: seen_rx,
        signals: signals_tx.clone(),
        ends: ends_tx.clone(),
        cancel: cancel.clone(),
    };

    let tasks = Tasks {
        receiver: tokio::spawn(receiver.run()),
        sender: tokio::spawn(sender::run(
            commands_rx,
            Arc::clone(&writer),
            signals_tx.clone(),
            cancel.clone(),
        )),
        heartbeat: tokio::spawn(heartbeat.run()),
    };
    let supervisor = tokio::spawn(supervise(ends_rx, tasks, writer, cancel.clone(), state));

    Session {
        commands: commands_tx,
        signals: signals_tx,
        ends: ends_tx,
        cancel,
        supervisor,
    }
}

struct Tasks {
    receiver: JoinHandle<(Dispatcher, Rooms)>,
    sender: JoinHandle<()>,
    heartbeat: JoinHandle<()>,
}

async fn supervise<S>(
    mut ends: mpsc::Receiver<SessionEnd>,
    tasks: Tasks,
    writer: SharedWriter<S>,
    cancel: CancellationToken,
    state: Arc<watch::Sender<SessionState>>,
) where
    S: AsyncWrite + Send + 'static,
{
    let end = tokio::select! {
        end = ends.recv() => end.unwrap_or(SessionEnd::Requested),
        _ = cancel.cancelled() => SessionEnd::Requested,
    };
    info!(cause = ?end, "session closing");
    advance(&state, SessionState::Closing);
    cancel.cancel();

    let (receiver, sender, heartbeat) = tokio::join!(tasks.receiver, tasks.sender, tasks.heartbeat);
    for (task, result) in [("sender", sender), ("heartbeat", heartbeat)] {
        if let Err(e) = result {
            warn!(task, error = %e, "pipeline task did not finish cleanly");
        }
    }

    {
        let mut writer = writer.lock().await;
        if let Err(e) = SinkExt::<Command>::close(&mut *writer).await {
            debug!(error = %e, "closing write half");
        }
    }

    let event = Event::Disconnected(end.reason());
    match receiver {
        Ok((mut dispatcher, rooms)) => {
            dispatcher.dispatch(&event, &rooms);
        }
        Err(e) => warn!(error = %e, "receiver did not finish cleanly; disconnect not delivered"),
    }

    advance(&state, SessionState::Closed);
    info!("session closed");
}
