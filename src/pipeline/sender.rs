use futures_util::SinkExt;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::command::Command;
use crate::error::ProtocolError;

use super::{SharedWriter, Signal};

/// Drain the outbound queue in order, one flushed line per command.
///
/// A failed write is reported to the receiver and the loop carries on.
pub(super) async fn run<S>(
    mut commands: mpsc::Receiver<Command>,
    writer: SharedWriter<S>,
    signals: mpsc::UnboundedSender<Signal>,
    cancel: CancellationToken,
) where
    S: AsyncWrite,
{
    loop {
        let command = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            command = commands.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };

        let action = command.action();
        trace!(command = action, "writing");
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = write_line(&writer, command) => result,
        };

        if let Err(e) = result {
            warn!(command = action, error = %e, "write failed");
            let failure = Signal::WriteFailed {
                command: action,
                reason: e.to_string(),
            };
            if signals.send(failure).is_err() {
                debug!("receiver gone; write failure not reported");
            }
        }
    }
    debug!("command sender stopped");
}

/// Write and flush one line under the writer lock.
///
/// On failure the unsent bytes are discarded, so a failed line is never
/// delivered ahead of a later command.
pub(super) async fn write_line<S>(writer: &SharedWriter<S>, command: Command) -> Result<(), ProtocolError>
where
    S: AsyncWrite,
{
    let mut writer = writer.lock().await;
    let result = writer.send(command).await;
    if result.is_err() {
        writer.write_buffer_mut().clear();
    }
    result
}
