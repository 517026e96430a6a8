//! mpv JSON IPC client.
//!
//! mpv speaks newline-delimited JSON over a Unix socket when started with
//! `--input-ipc-server`. The connector observes `time-pos` and `pause`,
//! caches the latest position for the tracker's synchronous reads, and
//! forwards pause flips as [`PlayerEvent::StateChange`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;

use scrimnote_core::playback::PlaybackWidget;
use scrimnote_core::{Error, Result};

use super::PlayerEvent;

pub const TRACING_TARGET: &str = "scrimnote::player";

/// Delay between connection attempts while mpv is starting.
pub const RETRY_PERIOD: Duration = Duration::from_millis(500);

const OBSERVE_TIME_POS: u64 = 1;
const OBSERVE_PAUSE: u64 = 2;

/// What one line from mpv means to us.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Update {
    Position(Option<f64>),
    Paused(bool),
    CommandFailed(String),
    Shutdown,
}

#[derive(Debug, Deserialize)]
struct Message {
    event: Option<String>,
    name: Option<String>,
    #[serde(default)]
    data: Value,
    error: Option<String>,
}

pub(crate) fn parse_line(line: &str) -> Option<Update> {
    let message: Message = serde_json::from_str(line).ok()?;
    match message.event.as_deref() {
        Some("property-change") => match message.name.as_deref()? {
            "time-pos" => Some(Update::Position(message.data.as_f64())),
            "pause" => message.data.as_bool().map(Update::Paused),
            _ => None,
        },
        Some("shutdown") => Some(Update::Shutdown),
        Some(_) => None,
        None => message
            .error
            .filter(|e| e != "success")
            .map(Update::CommandFailed),
    }
}

pub(crate) fn encode(args: &[Value]) -> String {
    let mut line = json!({ "command": args }).to_string();
    line.push('\n');
    line
}

struct Inner {
    socket: PathBuf,
    position: Mutex<Option<f64>>,
    commands: UnboundedSender<String>,
}

/// Handle to a connected mpv. Cloning shares the connection.
#[derive(Clone)]
pub struct MpvPlayer {
    inner: Arc<Inner>,
}

impl fmt::Debug for MpvPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpvPlayer")
            .field("socket", &self.inner.socket)
            .field("position", &self.current_time())
            .finish()
    }
}

impl MpvPlayer {
    fn new(socket: PathBuf, commands: UnboundedSender<String>) -> Self {
        Self {
            inner: Arc::new(Inner { socket, position: Mutex::new(None), commands }),
        }
    }

    fn set_position(&self, position: Option<f64>) {
        if let Ok(mut slot) = self.inner.position.lock() {
            *slot = position;
        }
    }

    fn command(&self, args: &[Value]) -> Result<()> {
        self.inner.commands.send(encode(args)).map_err(|_| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mpv connection closed",
            ))
        })
    }
}

impl PlaybackWidget for MpvPlayer {
    fn current_time(&self) -> Option<f64> {
        self.inner.position.lock().ok().and_then(|p| *p)
    }

    fn seek_to(&self, seconds: f64) -> Result<()> {
        self.command(&[json!("seek"), json!(seconds), json!("absolute")])?;
        // mpv confirms with a time-pos change; until then report the target.
        self.set_position(Some(seconds));
        Ok(())
    }

    fn toggle_pause(&self) -> Result<()> {
        self.command(&[json!("cycle"), json!("pause")])
    }
}

/// Connects to mpv at `socket`, retrying until it listens.
///
/// Posts [`PlayerEvent::Ready`] once connected, then state changes, then
/// [`PlayerEvent::Closed`] when mpv goes away. The task stops early if the
/// receiving side of `tx` is dropped.
pub fn spawn_connector<E>(socket: PathBuf, tx: UnboundedSender<E>) -> JoinHandle<()>
where
    E: From<PlayerEvent> + Send + 'static,
{
    tokio::spawn(async move {
        let Some(stream) = connect(&socket, &tx).await else {
            return;
        };
        tracing::info!(target: TRACING_TARGET, socket = %socket.display(), "Connected to mpv");

        let (read_half, mut write_half) = stream.into_split();
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            while let Some(line) = cmd_rx.recv().await {
                if let Err(err) = write_half.write_all(line.as_bytes()).await {
                    tracing::warn!(target: TRACING_TARGET, error = %err, "Write to mpv failed");
                    break;
                }
            }
        });

        let player = MpvPlayer::new(socket, cmd_tx);
        for (id, property) in [(OBSERVE_TIME_POS, "time-pos"), (OBSERVE_PAUSE, "pause")] {
            player.command(&[json!("observe_property"), json!(id), json!(property)]).ok();
        }
        if tx.send(E::from(PlayerEvent::Ready(player.clone()))).is_err() {
            return;
        }

        let mut lines = BufReader::new(read_half).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(target: TRACING_TARGET, error = %err, "Read from mpv failed");
                    break;
                }
            };
            match parse_line(&line) {
                Some(Update::Position(position)) => player.set_position(position),
                Some(Update::Paused(paused)) => {
                    if tx.send(E::from(PlayerEvent::StateChange { paused })).is_err() {
                        return;
                    }
                }
                Some(Update::CommandFailed(error)) => {
                    tracing::warn!(target: TRACING_TARGET, %error, "mpv rejected a command");
                }
                Some(Update::Shutdown) => break,
                None => {}
            }
        }

        tracing::info!(target: TRACING_TARGET, "mpv connection closed");
        tx.send(E::from(PlayerEvent::Closed)).ok();
    })
}

async fn connect<E>(socket: &Path, tx: &UnboundedSender<E>) -> Option<UnixStream> {
    loop {
        match UnixStream::connect(socket).await {
            Ok(stream) => return Some(stream),
            Err(err) => {
                tracing::trace!(target: TRACING_TARGET, error = %err, "mpv not listening yet");
                if tx.is_closed() {
                    return None;
                }
                tokio::time::sleep(RETRY_PERIOD).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::UnixListener;

    #[test]
    fn parses_property_changes() {
        assert_eq!(
            parse_line(r#"{"event":"property-change","id":1,"name":"time-pos","data":83.417}"#),
            Some(Update::Position(Some(83.417)))
        );
        assert_eq!(
            parse_line(r#"{"event":"property-change","id":1,"name":"time-pos"}"#),
            Some(Update::Position(None))
        );
        assert_eq!(
            parse_line(r#"{"event":"property-change","id":2,"name":"pause","data":true}"#),
            Some(Update::Paused(true))
        );
        assert_eq!(parse_line(r#"{"event":"shutdown"}"#), Some(Update::Shutdown));
    }

    #[test]
    fn ignores_acks_and_noise() {
        assert_eq!(parse_line(r#"{"data":null,"request_id":0,"error":"success"}"#), None);
        assert_eq!(parse_line(r#"{"event":"playback-restart"}"#), None);
        assert_eq!(parse_line("not json"), None);
        assert_eq!(
            parse_line(r#"{"error":"property unavailable"}"#),
            Some(Update::CommandFailed("property unavailable".into()))
        );
    }

    #[test]
    fn encodes_commands_as_lines() {
        assert_eq!(
            encode(&[json!("seek"), json!(95.0), json!("absolute")]),
            "{\"command\":[\"seek\",95.0,\"absolute\"]}\n"
        );
    }

    #[tokio::test]
    async fn talks_to_a_listening_socket() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mpv.sock");
        let listener = UnixListener::bind(&path).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel::<PlayerEvent>();
        let task = spawn_connector(path, tx);

        let (server, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = server.into_split();
        let mut from_client = BufReader::new(read_half).lines();
        assert_eq!(
            from_client.next_line().await.unwrap().unwrap(),
            r#"{"command":["observe_property",1,"time-pos"]}"#
        );
        assert_eq!(
            from_client.next_line().await.unwrap().unwrap(),
            r#"{"command":["observe_property",2,"pause"]}"#
        );

        let Some(PlayerEvent::Ready(player)) = rx.recv().await else {
            panic!("expected ready");
        };
        assert_eq!(player.current_time(), None);

        write_half
            .write_all(
                b"{\"event\":\"property-change\",\"id\":1,\"name\":\"time-pos\",\"data\":12.5}\n\
                  {\"event\":\"property-change\",\"id\":2,\"name\":\"pause\",\"data\":true}\n",
            )
            .await
            .unwrap();
        assert!(matches!(rx.recv().await, Some(PlayerEvent::StateChange { paused: true })));
        assert_eq!(player.current_time(), Some(12.5));

        player.seek_to(40.0).unwrap();
        assert_eq!(
            from_client.next_line().await.unwrap().unwrap(),
            r#"{"command":["seek",40.0,"absolute"]}"#
        );

        drop(write_half);
        drop(from_client);
        assert!(matches!(rx.recv().await, Some(PlayerEvent::Closed)));
        task.await.unwrap();
    }
}
