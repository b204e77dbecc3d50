//! A minimal line-mode chat client.
//!
//! ```text
//! cargo run --example simple_client -- irc.libera.chat ferris
//! ```
//!
//! Commands on stdin: `/join #room`, `/part #room [message]`, `/list`,
//! `/names #room`, `/msg target text`, `/quit [message]`. Anything else is
//! sent to the last joined room.

use anyhow::{bail, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use slirc_client::{Beat, Client, ClientConfig, Event, EventKind, Fault};

fn print_event(event: &Event) {
    match event {
        Event::Connected(None) => println!("* connected"),
        Event::Connected(Some(record)) | Event::Motd(record) => println!("  {}", record.message),
        Event::RoomActivity(record) => println!(
            "* [{}] {} {} {}",
            record.room.as_deref().unwrap_or("-"),
            record.code_name(),
            record.nick.as_deref().unwrap_or(""),
            record.message
        ),
        Event::RoomError(record) => println!(
            "! {} {}: {}",
            record.code_name(),
            record.room.as_deref().unwrap_or("-"),
            record.message
        ),
        Event::DirectMessage(record) => println!(
            "<{}> {}: {}",
            record.room.as_deref().unwrap_or("?"),
            record.nick.as_deref().unwrap_or("?"),
            record.message
        ),
        Event::Heartbeat(Beat::Ping(_)) => {}
        Event::Heartbeat(Beat::Sent { server }) => tracing::debug!(%server, "keep-alive sent"),
        Event::ProtocolError(Fault::Server(record)) => {
            println!("! {} {}", record.code_name(), record.message)
        }
        Event::ProtocolError(Fault::WriteFailed { command, reason }) => {
            println!("! could not send {}: {}", command, reason)
        }
        Event::Disconnected(reason) => {
            println!("* disconnected{}", reason.as_deref().map(|r| format!(": {}", r)).unwrap_or_default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(host), Some(nick)) = (args.next(), args.next()) else {
        bail!("usage: simple_client <host> <nick>");
    };

    let mut client = Client::new(ClientConfig::new(nick, host));
    for kind in EventKind::ALL {
        client.on(kind, |event, _rooms| print_event(event));
    }
    client.start().await?;

    let Some(handle) = client.handle() else {
        bail!("session did not start");
    };
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut current: Option<String> = None;
        while let Ok(Some(line)) = lines.next_line().await {
            let (cmd, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));
            let result = match cmd {
                "/join" => {
                    current = Some(rest.to_string());
                    handle.join(rest).await
                }
                "/part" => {
                    let (room, message) = rest.split_once(' ').unwrap_or((rest, "bye"));
                    handle.part(room, message).await
                }
                "/list" => handle.list(rest.split_whitespace()).await,
                "/names" => handle.names(rest.split_whitespace()).await,
                "/msg" => match rest.split_once(' ') {
                    Some((target, text)) => handle.privmsg(target, text).await,
                    None => continue,
                },
                "/quit" => {
                    let result = handle.quit(rest).await;
                    if result.is_ok() {
                        break;
                    }
                    result
                }
                _ => match &current {
                    Some(room) => handle.privmsg(room, &line).await,
                    None => {
                        println!("! join a room first");
                        continue;
                    }
                },
            };
            if let Err(e) = result {
                println!("! {}", e);
                break;
            }
        }
    });

    client.wait().await;
    Ok(())
}
