//! Configuration for scrimnote.
//!
//! Settings come from two layers, later ones winning:
//!
//! ```text
//! $XDG_CONFIG_HOME/scrimnote/config.toml   # theme, API, identity, player
//! command line / SCRIMNOTE_TOKEN            # per-session overrides
//! ```
//!
//! A missing file yields defaults. A file that fails to parse also yields
//! defaults, plus a warning the caller logs once the logger is up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use scrimnote_core::types::{Identity, ScrimId};

/// Command line for one scrim session.
#[derive(Debug, Clone, Parser)]
#[command(name = "scrimnote")]
#[command(about = "Timestamped scrim review comments, synced to mpv")]
#[command(version)]
pub struct Cli {
    /// Scrim to open.
    pub scrim_id: String,

    /// Video file or URL to launch mpv with.
    #[arg(long)]
    pub video: Option<String>,

    /// mpv JSON IPC socket path.
    #[arg(long)]
    pub socket: Option<PathBuf>,

    /// Comment API base URL.
    #[arg(long)]
    pub api: Option<String>,

    /// Config file to read instead of the XDG default.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bearer token for the comment API.
    #[arg(long, env = "SCRIMNOTE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl Cli {
    pub fn scrim_id(&self) -> ScrimId {
        ScrimId::new(self.scrim_id.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api".to_owned(),
            token: None,
            timeout_secs: 15,
        }
    }
}

impl ApiSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerSection {
    /// IPC socket mpv listens on.
    pub socket: PathBuf,
    /// Start mpv ourselves when a video is given.
    pub launch: bool,
    pub mpv_path: PathBuf,
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            socket: std::env::temp_dir().join("scrimnote-mpv.sock"),
            launch: true,
            mpv_path: PathBuf::from("mpv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    /// Holds the log file.
    pub data_dir: PathBuf,
    pub api: ApiSection,
    pub identity: Identity,
    pub player: PlayerSection,
    /// Set from `--video` only.
    #[serde(skip)]
    pub video: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            data_dir: PathBuf::from(".scrimnote"),
            api: ApiSection::default(),
            identity: Identity::default(),
            player: PlayerSection::default(),
            video: None,
        }
    }
}

impl Config {
    /// Reads `path`, falling back to defaults.
    ///
    /// Returns the config and, when the file existed but could not be used,
    /// a warning describing why.
    pub fn load(path: &Path) -> (Self, Option<String>) {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return (Self::default(), None),
            Err(err) => {
                return (Self::default(), Some(format!("cannot read {}: {err}", path.display())));
            }
        };
        match toml::from_str::<Config>(&raw) {
            Ok(config) => (config, None),
            Err(err) => (
                Self::default(),
                Some(format!("config parse error in {}: {err}", path.display())),
            ),
        }
    }

    /// Applies command-line flags, then fills a blank username from `$USER`.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(video) = &cli.video {
            self.video = Some(video.clone());
        }
        if let Some(socket) = &cli.socket {
            self.player.socket = socket.clone();
        }
        if let Some(api) = &cli.api {
            self.api.base_url = api.clone();
        }
        if let Some(token) = &cli.token {
            self.api.token = Some(token.clone());
        }
        if self.identity.username.trim().is_empty() {
            self.identity.username = std::env::var("USER").unwrap_or_default();
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("scrimnote.log")
    }
}

/// Returns the path to the scrimnote config file.
///
/// Prefers `$XDG_CONFIG_HOME/scrimnote/config.toml`; falls back to
/// `~/.config/scrimnote/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("scrimnote").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrimnote_core::types::Role;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let (config, warning) = Config::load(&dir.path().join("absent.toml"));
        assert_eq!(config, Config::default());
        assert!(warning.is_none());
    }

    #[test]
    fn reads_all_sections() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"
            theme = "dark"
            data_dir = "/tmp/sn"

            [api]
            base_url = "https://scrims.example/api"
            token = "abc"
            timeout_secs = 4

            [identity]
            username = "coachk"
            role = "coach"

            [player]
            socket = "/tmp/mpv.sock"
            launch = false
            "#,
        );
        let (config, warning) = Config::load(&path);
        assert!(warning.is_none());
        assert_eq!(config.theme, "dark");
        assert_eq!(config.log_path(), PathBuf::from("/tmp/sn/scrimnote.log"));
        assert_eq!(config.api.token.as_deref(), Some("abc"));
        assert_eq!(config.api.timeout(), Duration::from_secs(4));
        assert_eq!(config.identity.role, Role::Coach);
        assert!(!config.player.launch);
        assert_eq!(config.player.mpv_path, PathBuf::from("mpv"));
    }

    #[test]
    fn parse_error_falls_back_with_warning() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(&dir, "theme = [unterminated");
        let (config, warning) = Config::load(&path);
        assert_eq!(config, Config::default());
        assert!(warning.unwrap().contains("parse error"));
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(&dir, "[api]\nbase_url = \"http://file\"\n[identity]\nusername = \"mika\"\n");
        let (mut config, _) = Config::load(&path);

        let cli = Cli::parse_from([
            "scrimnote",
            " 42 ",
            "--api",
            "http://flag",
            "--socket",
            "/run/mpv.sock",
            "--video",
            "vod.mkv",
            "--token",
            "t",
        ]);
        config.apply_cli(&cli);

        assert_eq!(cli.scrim_id(), ScrimId::new("42"));
        assert_eq!(config.api.base_url, "http://flag");
        assert_eq!(config.api.token.as_deref(), Some("t"));
        assert_eq!(config.player.socket, PathBuf::from("/run/mpv.sock"));
        assert_eq!(config.video.as_deref(), Some("vod.mkv"));
        assert_eq!(config.identity.username, "mika");
    }
}
