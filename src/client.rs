//! The caller-facing client.
//!
//! A [`Client`] runs exactly one session:
//!
//! ```text
//! idle -> connecting -> connected -> closing -> closed
//! ```
//!
//! Handlers are registered with [`Client::on`], before or after start.
//! Commands go through the outbound queue and are written by the pipeline.
//! A [`Handle`] is a cheap clone of the command side for use from other
//! tasks.
//!
//! ```no_run
//! use slirc_client::{Client, ClientConfig, Event, EventKind};
//!
//! # async fn demo() -> slirc_client::Result<()> {
//! let mut client = Client::new(ClientConfig::new("ferris", "irc.libera.chat"));
//! client.on(EventKind::DirectMessage, |event, _rooms| {
//!     if let Event::DirectMessage(record) = event {
//!         println!("<{}> {}", record.nick.as_deref().unwrap_or("?"), record.message);
//!     }
//! });
//! client.start().await?;
//! client.join("rust").await?;
//! client.wait().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::command::{normalize_room, Command};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::event::{Dispatcher, Event, EventKind};
use crate::pipeline::{self, advance, SessionEnd, Signal};
use crate::room::Rooms;
use crate::state::SessionState;
use crate::transport::{self, Connection};

/// Command side of a running session.
#[derive(Clone)]
pub struct Handle {
    commands: mpsc::Sender<Command>,
    signals: mpsc::UnboundedSender<Signal>,
}

impl Handle {
    /// Queue any command.
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ClientError::NotConnected)
    }

    fn signal(&self, signal: Signal) -> Result<()> {
        self.signals
            .send(signal)
            .map_err(|_| ClientError::NotConnected)
    }

    /// Register `handler` for `kind`, replacing any previous one.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Result<()>
    where
        F: FnMut(&Event, &Rooms) + Send + 'static,
    {
        self.signal(Signal::Register(kind, Box::new(handler)))
    }

    /// `JOIN #room`. A missing `#` is added.
    pub async fn join(&self, room: &str) -> Result<()> {
        self.join_many([room]).await
    }

    /// `JOIN #a,#b,...`
    pub async fn join_many<I, R>(&self, rooms: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let rooms: Vec<String> = rooms
            .into_iter()
            .map(|room| normalize_room(room.as_ref()))
            .collect();
        if rooms.is_empty() {
            return Ok(());
        }
        self.signal(Signal::Joined(rooms.clone()))?;
        self.send(Command::Join(rooms)).await
    }

    /// `PART #room :message`
    pub async fn part(&self, room: &str, message: &str) -> Result<()> {
        let room = normalize_room(room);
        self.signal(Signal::Parted(room.clone()))?;
        self.send(Command::Part {
            room,
            message: message.to_string(),
        })
        .await
    }

    /// `PRIVMSG target :text`
    pub async fn privmsg(&self, target: &str, text: &str) -> Result<()> {
        self.send(Command::Privmsg {
            target: target.to_string(),
            text: text.to_string(),
        })
        .await
    }

    /// `LIST [scope,...]`
    pub async fn list<I, R>(&self, scopes: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.send(Command::List(scopes.into_iter().map(Into::into).collect()))
            .await
    }

    /// `NAMES [scope,...]`
    pub async fn names<I, R>(&self, scopes: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.send(Command::Names(scopes.into_iter().map(Into::into).collect()))
            .await
    }

    /// `INVITE nick room`
    pub async fn invite(&self, nick: &str, room: &str) -> Result<()> {
        self.send(Command::Invite {
            nick: nick.to_string(),
            room: room.to_string(),
        })
        .await
    }

    /// `KICK room nick :message`
    pub async fn kick(&self, room: &str, nick: &str, message: &str) -> Result<()> {
        self.send(Command::Kick {
            room: room.to_string(),
            nick: nick.to_string(),
            message: message.to_string(),
        })
        .await
    }

    /// `QUIT :message`. The server closes the link afterwards.
    pub async fn quit(&self, message: &str) -> Result<()> {
        self.send(Command::Quit(message.to_string())).await
    }

    /// A copy of the room state as the receiver currently sees it.
    pub async fn rooms(&self) -> Result<Rooms> {
        let (tx, rx) = oneshot::channel();
        self.signal(Signal::Snapshot(tx))?;
        rx.await.map_err(|_| ClientError::NotConnected)
    }
}

/// One session with one server.
pub struct Client {
    config: ClientConfig,
    state: Arc<watch::Sender<SessionState>>,
    dispatcher: Dispatcher,
    handle: Option<Handle>,
    ends: Option<mpsc::Sender<SessionEnd>>,
    cancel: Option<CancellationToken>,
    supervisor: Option<tokio::task::JoinHandle<()>>,
}

impl Client {
    /// An idle client.
    pub fn new(config: ClientConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            config,
            state: Arc::new(state),
            dispatcher: Dispatcher::new(),
            handle: None,
            ends: None,
            cancel: None,
            supervisor: None,
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Follow lifecycle changes.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Register `handler` for `kind`, replacing any previous one.
    ///
    /// Before start the handler is stored directly; afterwards it is handed
    /// to the receiver and takes effect before the next line is processed.
    pub fn on<F>(&mut self, kind: EventKind, handler: F)
    where
        F: FnMut(&Event, &Rooms) + Send + 'static,
    {
        match &self.handle {
            Some(handle) => {
                if handle.on(kind, handler).is_err() {
                    warn!(%kind, "session over; handler dropped");
                }
            }
            None => {
                self.dispatcher.register(kind, Box::new(handler));
            }
        }
    }

    /// Command handle for the running session.
    pub fn handle(&self) -> Option<Handle> {
        self.handle.clone()
    }

    fn running(&self) -> Result<&Handle> {
        self.handle.as_ref().ok_or(ClientError::NotConnected)
    }

    fn check_startable(&self) -> Result<()> {
        match self.state() {
            SessionState::Idle => Ok(()),
            SessionState::Closed => Err(ClientError::SessionFinished),
            _ => Err(ClientError::AlreadyStarted),
        }
    }

    /// Dial the configured server, authenticate and start the pipeline.
    ///
    /// A dial failure emits a disconnected event with the reason, closes
    /// the session and is returned.
    pub async fn start(&mut self) -> Result<()> {
        self.check_startable()?;
        if self.config.use_tls {
            return Err(ClientError::TlsUnsupported);
        }
        advance(&self.state, SessionState::Connecting);

        match transport::dial(&self.config).await {
            Ok(stream) => self.open(stream).await,
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Like [`start`](Self::start), over a stream the caller already
    /// connected (and secured, if needed).
    pub async fn start_with_stream<S>(&mut self, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        self.check_startable()?;
        advance(&self.state, SessionState::Connecting);
        self.open(stream).await
    }

    async fn open<S>(&mut self, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let mut conn = Connection::new(stream);
        let auth = Command::authentication(
            &self.config.nick,
            self.config.password(),
            &self.config.client_id,
        );
        if let Err(e) = conn.write_all(auth).await {
            return Err(self.fail(e.into()));
        }

        advance(&self.state, SessionState::Connected);
        info!(host = %self.config.host, nick = %self.config.nick, "session open");

        let mut dispatcher = std::mem::take(&mut self.dispatcher);
        dispatcher.dispatch(&Event::Connected(None), &Rooms::new());

        let session = pipeline::spawn(conn, &self.config, dispatcher, Arc::clone(&self.state));
        self.handle = Some(Handle {
            commands: session.commands,
            signals: session.signals,
        });
        self.ends = Some(session.ends);
        self.cancel = Some(session.cancel);
        self.supervisor = Some(session.supervisor);
        Ok(())
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        warn!(error = %err, "session could not open");
        self.dispatcher
            .dispatch(&Event::Disconnected(Some(err.to_string())), &Rooms::new());
        advance(&self.state, SessionState::Closed);
        err
    }

    /// Stop the session and wait until every pipeline task has exited.
    ///
    /// The disconnected event carries no reason. Does nothing if the
    /// session never started or has already closed.
    pub async fn stop(&mut self) {
        if let Some(ends) = &self.ends {
            pipeline::report_end(ends, SessionEnd::Requested);
        }
        self.wait().await;
    }

    /// Wait for the session to close on its own.
    pub async fn wait(&mut self) {
        if let Some(supervisor) = self.supervisor.take() {
            if let Err(e) = supervisor.await {
                warn!(error = %e, "supervisor did not finish cleanly");
            }
        }
        self.handle = None;
        self.ends = None;
    }

    /// `JOIN #room`. A missing `#` is added.
    pub async fn join(&self, room: &str) -> Result<()> {
        self.running()?.join(room).await
    }

    /// `JOIN #a,#b,...`
    pub async fn join_many<I, R>(&self, rooms: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        self.running()?.join_many(rooms).await
    }

    /// `PART #room :message`
    pub async fn part(&self, room: &str, message: &str) -> Result<()> {
        self.running()?.part(room, message).await
    }

    /// `PRIVMSG target :text`
    pub async fn privmsg(&self, target: &str, text: &str) -> Result<()> {
        self.running()?.privmsg(target, text).await
    }

    /// `LIST [scope,...]`
    pub async fn list<I, R>(&self, scopes: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.running()?.list(scopes).await
    }

    /// `NAMES [scope,...]`
    pub async fn names<I, R>(&self, scopes: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.running()?.names(scopes).await
    }

    /// `INVITE nick room`
    pub async fn invite(&self, nick: &str, room: &str) -> Result<()> {
        self.running()?.invite(nick, room).await
    }

    /// `KICK room nick :message`
    pub async fn kick(&self, room: &str, nick: &str, message: &str) -> Result<()> {
        self.running()?.kick(room, nick, message).await
    }

    /// `QUIT :message`
    pub async fn quit(&self, message: &str) -> Result<()> {
        self.running()?.quit(message).await
    }

    /// Queue any command.
    pub async fn send(&self, command: Command) -> Result<()> {
        self.running()?.send(command).await
    }

    /// A copy of the room state as the receiver currently sees it.
    pub async fn rooms(&self) -> Result<Rooms> {
        self.running()?.rooms().await
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
    }
}
