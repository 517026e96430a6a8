//! scrimnote: timestamped review comments for scrim footage.
//!
//! Entry point for the `scrimnote` binary. Wires together configuration
//! (`config`), file logging (`logging`), the terminal lifecycle (`tui`), the
//! unified event bus (`event`), the mpv connection (`player`) and the comment
//! API client from `scrimnote-core`.
//!
//! # Startup sequence
//!
//! 1. Parse flags and load the config file. Read-only, safe before terminal init.
//! 2. Start file logging; stdout and stderr belong to the terminal from here on.
//! 3. `install_panic_hook()` so a panic restores the terminal first.
//! 4. `register_sigterm()`; the flag is polled in the event loop.
//! 5. `init_tui()` enters the alternate screen and enables raw mode.
//! 6. Spawn the input task, optionally launch mpv, start the player connector,
//!    and request the roster and the comment list.
//!
//! `restore_tui()` runs after the event loop exits, however it exits. The
//! loop only leaves through `break`; the draw error is carried out of it.

mod app;
mod config;
mod event;
mod logging;
mod player;
mod theme;
mod tui;
mod ui;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;

use scrimnote_core::api::{ApiConfig, HttpApi, RosterSource};
use scrimnote_core::store::CommentSync;

use crate::app::AppState;
use crate::config::{config_path, Cli, Config};
use crate::event::AppEvent;
use crate::player::PlayerEvent;
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

const TRACING_TARGET: &str = "scrimnote";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(config_path);
    let (mut config, warning) = Config::load(&path);
    config.apply_cli(&cli);

    logging::init(&config.log_path())?;
    if let Some(warning) = warning {
        tracing::warn!(target: TRACING_TARGET, %warning, "Using default configuration");
    }
    tracing::info!(
        target: TRACING_TARGET,
        scrim = %cli.scrim_id(),
        user = %config.identity.username,
        api = %config.api.base_url,
        "Starting scrimnote"
    );

    let api_config = ApiConfig::new(&config.api.base_url)
        .context("invalid API base URL")?
        .with_timeout(config.api.timeout());
    let api_config = match &config.api.token {
        Some(token) => api_config.with_token(token.clone()),
        None => api_config,
    };
    let api = HttpApi::new(api_config).context("cannot build HTTP client")?;
    let sync = CommentSync::new(Arc::new(api.clone()), cli.scrim_id());
    let theme = theme::Theme::from_name(&config.theme);

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm().context("cannot register SIGTERM handler")?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let tx = handler.tx;
    let mut rx = handler.rx;

    let mut state = AppState::new(config.identity.clone(), sync, tx.clone());

    // Held for the whole session; dropping it kills mpv.
    let _mpv = match (&config.video, config.player.launch) {
        (Some(video), true) => {
            match player::launch(&config.player.mpv_path, &config.player.socket, video) {
                Ok(child) => Some(child),
                Err(err) => {
                    state.notify(format!("cannot start mpv: {err}"), true);
                    None
                }
            }
        }
        _ => None,
    };
    let mut connector = player::spawn_connector(config.player.socket.clone(), tx.clone());

    {
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = api.user_mappings().await;
            tx.send(AppEvent::Roster(result)).ok();
        });
    }
    state.reload();

    let mut outcome: anyhow::Result<()> = Ok(());
    'event_loop: loop {
        tokio::select! {
            // Heartbeat so SIGTERM is noticed even when no events arrive.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(err) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            outcome = Err(err.into());
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Key(key)) => {
                        if handle_key(key, &mut state) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Mouse(mouse)) => {
                        handle_mouse(mouse, &mut state);
                    }
                    // The next render picks up the new size from the frame.
                    Some(AppEvent::Resize) => {}
                    Some(AppEvent::Tick) => state.expire_notice(Instant::now()),
                    Some(AppEvent::Engine(event)) => state.on_engine(event),
                    Some(AppEvent::Player(PlayerEvent::Ready(player))) => {
                        state.on_player_ready(Arc::new(player));
                    }
                    Some(AppEvent::Player(PlayerEvent::StateChange { paused })) => {
                        state.engine.on_state_change(paused);
                    }
                    Some(AppEvent::Player(PlayerEvent::Closed)) => {
                        state.on_player_closed();
                        connector = player::spawn_connector(config.player.socket.clone(), tx.clone());
                    }
                    Some(AppEvent::Comments { op, result }) => state.apply_comments(op, result),
                    Some(AppEvent::Roster(result)) => state.apply_roster(result),
                    None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    state.engine.teardown();
    connector.abort();
    tui::restore_tui()?;
    tracing::info!(target: TRACING_TARGET, "Exiting");
    outcome
}
