//! Event bus for scrimnote.
//!
//! Terminal input, timer ticks, engine timers, player IPC and network results
//! are all normalised into one `AppEvent` enum and sent over a tokio unbounded
//! MPSC channel. The main loop is the only receiver and owns all state, so
//! every handler runs to completion before the next event is looked at.
//!
//! Two independent intervals drive the render and logic cycles:
//! - **Render interval** (33 ms, about 30 FPS) triggers a `terminal.draw()` call.
//! - **Tick interval** (250 ms) expires transient notices.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;

use scrimnote_core::engine::EngineEvent;
use scrimnote_core::types::{Comment, CommentId, MentionUser};

use crate::player::PlayerEvent;

/// Which store request a comment result answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Load,
    Create,
    Update(CommentId),
    Remove(CommentId),
}

/// All events the application can receive from any source.
#[derive(Debug)]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    Key(KeyEvent),
    /// A mouse event from the terminal (click, scroll, move).
    Mouse(MouseEvent),
    /// Terminal was resized. The next frame reads the new size.
    Resize,
    /// Logic tick (4 Hz).
    Tick,
    /// Render tick.
    Render,
    /// Sampler or highlight-expiry timer from the engine.
    Engine(EngineEvent),
    Player(PlayerEvent),
    /// A fresh comment list, or the failure of the request that wanted one.
    Comments {
        op: StoreOp,
        result: scrimnote_core::Result<Vec<Comment>>,
    },
    Roster(scrimnote_core::Result<Vec<MentionUser>>),
}

impl From<EngineEvent> for AppEvent {
    fn from(event: EngineEvent) -> Self {
        AppEvent::Engine(event)
    }
}

impl From<PlayerEvent> for AppEvent {
    fn from(event: PlayerEvent) -> Self {
        AppEvent::Player(event)
    }
}

/// Holds the sender and receiver ends of the unified event channel.
pub struct EventHandler {
    /// Send half. Clone this for each background task that produces events.
    pub tx: mpsc::UnboundedSender<AppEvent>,
    /// Receive half, owned by the main loop.
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background tokio task that feeds terminal input and the
/// render/tick intervals into the channel.
///
/// `reader.next().fuse()` keeps `select!` from polling a finished stream.
/// Only `KeyEventKind::Press` is forwarded so Windows does not double-fire.
/// The task exits once the receiver is gone.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(250));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            let sent = tokio::select! {
                _ = tick_tick => tx.send(AppEvent::Tick),
                _ = render_tick => tx.send(AppEvent::Render),
                maybe_event = crossterm_event => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        tx.send(AppEvent::Key(key))
                    }
                    Some(Ok(Event::Resize(_, _))) => tx.send(AppEvent::Resize),
                    Some(Ok(Event::Mouse(mouse))) => tx.send(AppEvent::Mouse(mouse)),
                    _ => Ok(()),
                },
            };
            if sent.is_err() {
                break;
            }
        }
    });
}
