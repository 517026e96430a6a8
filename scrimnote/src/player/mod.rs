//! External video player.
//!
//! The engine only needs a [`PlaybackWidget`](scrimnote_core::playback::PlaybackWidget);
//! here that is mpv, reached over its JSON IPC socket. This module can also
//! start mpv itself so one command opens both the footage and the comments.

mod mpv;

use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, Command};

pub use mpv::{spawn_connector, MpvPlayer};

/// Events the player connection posts to the main loop.
#[derive(Debug)]
pub enum PlayerEvent {
    /// Connected; the handle is the video widget.
    Ready(MpvPlayer),
    StateChange { paused: bool },
    /// mpv exited or closed the socket.
    Closed,
}

/// Starts `mpv` playing `video` with its IPC server on `socket`.
///
/// The child is killed when the returned handle is dropped.
///
/// # Errors
///
/// Returns an error if the mpv binary cannot be spawned.
pub fn launch(mpv_path: &Path, socket: &Path, video: &str) -> std::io::Result<Child> {
    tracing::info!(
        target: mpv::TRACING_TARGET,
        mpv = %mpv_path.display(),
        socket = %socket.display(),
        video,
        "Launching mpv"
    );
    Command::new(mpv_path)
        .arg(format!("--input-ipc-server={}", socket.display()))
        .arg("--force-window=yes")
        .arg("--keep-open=yes")
        .arg(video)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
}
