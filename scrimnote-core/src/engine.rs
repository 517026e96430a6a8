//! Per-view synchronization state.
//!
//! One [`SyncEngine`] exists for each open scrim view. It owns the playback
//! tracker and the highlight controller, and with them both timer handles
//! (sampler and highlight expiry). Dropping or tearing down the engine
//! cancels both.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::error::Result;
use crate::highlight::{HighlightController, ListLayout, Transition};
use crate::playback::{PlaybackTracker, PlaybackWidget};
use crate::types::{Comment, CommentId};

/// Events the engine's own timers post back to the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// The 1 Hz sampler fired; read the widget position.
    Sample,
    /// A highlight expiry timer fired.
    HighlightExpired { id: CommentId, arm: u64 },
}

pub struct SyncEngine<E> {
    tracker: PlaybackTracker<E>,
    highlight: HighlightController<E>,
}

impl<E> SyncEngine<E>
where
    E: From<EngineEvent> + Send + 'static,
{
    /// A fresh view: idle, not scroll-locked, no widget yet.
    pub fn new(events: UnboundedSender<E>) -> Self {
        Self {
            tracker: PlaybackTracker::new(events.clone()),
            highlight: HighlightController::new(events),
        }
    }

    pub fn tracker(&self) -> &PlaybackTracker<E> {
        &self.tracker
    }

    pub fn highlight(&self) -> &HighlightController<E> {
        &self.highlight
    }

    pub fn highlight_mut(&mut self) -> &mut HighlightController<E> {
        &mut self.highlight
    }

    pub fn on_widget_ready(&mut self, widget: Arc<dyn PlaybackWidget>) {
        self.tracker.on_ready(widget);
    }

    pub fn on_state_change(&mut self, paused: bool) {
        if self.tracker.on_state_change(paused) {
            self.highlight.set_paused(paused);
        }
    }

    /// Handles a timer event against the current visible list.
    ///
    /// Returns the highlight transition it caused, if any.
    pub fn handle(
        &mut self,
        event: EngineEvent,
        visible: &[Comment],
        layout: &ListLayout,
    ) -> Option<Transition> {
        match event {
            EngineEvent::Sample => {
                let time = self.tracker.sample()?;
                Some(self.highlight.on_position(time, visible, layout))
            }
            EngineEvent::HighlightExpired { id, arm } => self
                .highlight
                .on_expired(id, arm)
                .then_some(Transition::Cleared),
        }
    }

    /// Explicit jump: commands the widget and lifts the scroll lock.
    pub fn seek_to(&mut self, seconds: f64) -> Result<()> {
        self.tracker.seek_to(seconds)?;
        self.highlight.scroll_mut().release();
        Ok(())
    }

    pub fn toggle_pause(&self) -> Result<()> {
        self.tracker.toggle_pause()
    }

    /// Stops the sampler and clears any armed expiry.
    pub fn teardown(&mut self) {
        self.tracker.teardown();
        self.highlight.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::HighlightState;
    use crate::playback::fake::FakeWidget;
    use crate::types::comment;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn sample_drives_highlight() {
        let (tx, mut rx) = mpsc::unbounded_channel::<EngineEvent>();
        let mut engine = SyncEngine::new(tx);
        let list = vec![comment(1, 10, "x", "a"), comment(2, 40, "y", "b")];
        let layout = ListLayout::stacked(6, list.iter().map(|c| (c.id, 3)));
        let widget = FakeWidget::at(41.0);
        engine.on_widget_ready(widget.clone());

        sleep(Duration::from_millis(10)).await;
        let event = rx.try_recv().unwrap();
        assert!(matches!(
            engine.handle(event, &list, &layout),
            Some(Transition::Highlighted { id: 2, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn seek_releases_scroll_lock() {
        let (tx, _rx) = mpsc::unbounded_channel::<EngineEvent>();
        let mut engine = SyncEngine::new(tx);
        let widget = FakeWidget::at(0.0);
        engine.on_widget_ready(widget.clone());

        engine.highlight_mut().scroll_mut().scroll_by(4, 10);
        assert!(engine.highlight().scroll().user_scrolled());

        engine.seek_to(95.0).unwrap();
        assert!(!engine.highlight().scroll().user_scrolled());
        assert_eq!(widget.seeks.lock().unwrap().as_slice(), &[95.0]);
        assert_eq!(engine.tracker().current_second(), 95);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_event_reaches_controller() {
        let (tx, _rx) = mpsc::unbounded_channel::<EngineEvent>();
        let mut engine = SyncEngine::new(tx);
        let list = vec![comment(1, 10, "x", "a")];
        let layout = ListLayout::stacked(6, [(1, 3)]);
        engine.on_widget_ready(FakeWidget::at(10.0));

        engine.on_state_change(true);
        engine.handle(EngineEvent::Sample, &list, &layout);
        assert_eq!(engine.highlight().state(), HighlightState::Highlighted(1));
        assert!(!engine.highlight().has_armed_expiry());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_disposes_both_timers() {
        let (tx, mut rx) = mpsc::unbounded_channel::<EngineEvent>();
        let mut engine = SyncEngine::new(tx);
        let list = vec![comment(1, 10, "x", "a")];
        let layout = ListLayout::stacked(6, [(1, 3)]);
        engine.on_widget_ready(FakeWidget::at(10.0));
        engine.handle(EngineEvent::Sample, &list, &layout);
        assert!(engine.highlight().has_armed_expiry());

        engine.teardown();
        assert!(!engine.tracker().is_sampling());
        assert!(!engine.highlight().has_armed_expiry());

        while rx.try_recv().is_ok() {}
        sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }
}
