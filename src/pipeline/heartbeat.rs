use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::command::Command;

use super::sender::write_line;
use super::{report_end, SessionEnd, SharedWriter, Signal};

/// Periodic keep-alive probe and silence watchdog.
pub(super) struct Heartbeat<S> {
    pub(super) interval: Duration,
    pub(super) silence_timeout: Option<Duration>,
    pub(super) writer: SharedWriter<S>,
    pub(super) server: watch::Receiver<String>,
    pub(super) last_seen: watch::Receiver<Instant>,
    pub(super) signals: mpsc::UnboundedSender<Signal>,
    pub(super) ends: mpsc::Sender<SessionEnd>,
    pub(super) cancel: CancellationToken,
}

impl<S> Heartbeat<S>
where
    S: AsyncWrite,
{
    pub(super) async fn run(self) {
        if self.interval.is_zero() {
            debug!("heartbeat disabled");
            return;
        }

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if let Some(idle) = self.silent_for() {
                warn!(?idle, "no data from server");
                report_end(&self.ends, SessionEnd::Silent(idle));
                break;
            }

            let server = self.server.borrow().clone();
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                result = write_line(&self.writer, Command::Pong(server.clone())) => result,
            };

            let signal = match result {
                Ok(()) => Signal::HeartbeatSent { server },
                Err(e) => {
                    warn!(error = %e, "heartbeat write failed");
                    Signal::WriteFailed {
                        command: "pong",
                        reason: e.to_string(),
                    }
                }
            };
            if self.signals.send(signal).is_err() {
                break;
            }
        }
        debug!("heartbeat stopped");
    }

    /// How long the server has been quiet, if longer than allowed.
    fn silent_for(&self) -> Option<Duration> {
        let limit = self.silence_timeout?;
        let idle = self.last_seen.borrow().elapsed();
        (idle > limit).then_some(idle)
    }
}
