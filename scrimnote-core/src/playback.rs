//! Playback tracker wrapping the external video widget.
//!
//! The widget is polled once per second after it signals ready; each sample
//! becomes the tracker's `current_time`. Play/pause transitions arrive as
//! events from the widget and are mirrored in `is_paused`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::engine::EngineEvent;
use crate::error::{Error, Result};
use crate::timer::TimerHandle;

/// Tracing target for playback tracking.
pub const TRACING_TARGET: &str = "scrimnote_core::playback";

/// Position sampling period (1 Hz).
pub const SAMPLE_PERIOD: Duration = Duration::from_secs(1);

/// Controllable handle yielded by the video widget once it is ready.
pub trait PlaybackWidget: Send + Sync {
    /// Current position in seconds, or `None` if the widget cannot say yet.
    fn current_time(&self) -> Option<f64>;

    /// Jumps to an absolute position.
    fn seek_to(&self, seconds: f64) -> Result<()>;

    /// Flips play/pause. The widget reports the result as a state change.
    fn toggle_pause(&self) -> Result<()>;
}

/// Republishes widget position and play state for one view.
pub struct PlaybackTracker<E> {
    widget: Option<Arc<dyn PlaybackWidget>>,
    current_time: f64,
    is_paused: bool,
    sampler: Option<TimerHandle>,
    events: UnboundedSender<E>,
}

impl<E> PlaybackTracker<E>
where
    E: From<EngineEvent> + Send + 'static,
{
    pub fn new(events: UnboundedSender<E>) -> Self {
        Self {
            widget: None,
            current_time: 0.0,
            is_paused: false,
            sampler: None,
            events,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.widget.is_some()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// The current position as a whole playback second.
    pub fn current_second(&self) -> u32 {
        self.current_time.max(0.0).floor() as u32
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Takes the widget handle and starts the 1 Hz sampler.
    ///
    /// A second ready signal (e.g. the player reconnected) replaces the
    /// handle and restarts sampling.
    pub fn on_ready(&mut self, widget: Arc<dyn PlaybackWidget>) {
        tracing::info!(target: TRACING_TARGET, "Video widget ready, starting sampler");
        self.widget = Some(widget);
        self.sampler = Some(TimerHandle::interval(
            "position-sampler",
            SAMPLE_PERIOD,
            self.events.clone(),
            || E::from(EngineEvent::Sample),
        ));
    }

    /// Mirrors a widget state change. Returns `true` if the state flipped.
    pub fn on_state_change(&mut self, paused: bool) -> bool {
        let changed = self.is_paused != paused;
        self.is_paused = paused;
        changed
    }

    /// Reads the widget once. Returns `None` and skips the tick if the
    /// widget is absent or has no position yet.
    pub fn sample(&mut self) -> Option<f64> {
        let Some(widget) = &self.widget else {
            tracing::trace!(target: TRACING_TARGET, "Sample skipped, widget not ready");
            return None;
        };
        let time = widget.current_time()?;
        self.current_time = time;
        Some(time)
    }

    /// Commands the widget to `seconds`.
    pub fn seek_to(&mut self, seconds: f64) -> Result<()> {
        let widget = self.widget.as_ref().ok_or(Error::WidgetNotReady)?;
        let seconds = seconds.max(0.0);
        widget.seek_to(seconds)?;
        self.current_time = seconds;
        tracing::debug!(target: TRACING_TARGET, seconds, "Seek issued");
        Ok(())
    }

    pub fn toggle_pause(&self) -> Result<()> {
        self.widget.as_ref().ok_or(Error::WidgetNotReady)?.toggle_pause()
    }

    /// Stops sampling and forgets the widget.
    pub fn teardown(&mut self) {
        self.sampler = None;
        self.widget = None;
    }

    pub fn is_sampling(&self) -> bool {
        self.sampler.is_some()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use super::*;

    /// In-memory widget for tests: a settable clock that records seeks.
    #[derive(Default)]
    pub struct FakeWidget {
        pub time: Mutex<Option<f64>>,
        pub seeks: Mutex<Vec<f64>>,
    }

    impl FakeWidget {
        pub fn at(seconds: f64) -> Arc<Self> {
            Arc::new(Self { time: Mutex::new(Some(seconds)), ..Default::default() })
        }

        pub fn set(&self, seconds: Option<f64>) {
            *self.time.lock().unwrap() = seconds;
        }
    }

    impl PlaybackWidget for FakeWidget {
        fn current_time(&self) -> Option<f64> {
            *self.time.lock().unwrap()
        }

        fn seek_to(&self, seconds: f64) -> Result<()> {
            self.seeks.lock().unwrap().push(seconds);
            self.set(Some(seconds));
            Ok(())
        }

        fn toggle_pause(&self) -> Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeWidget;
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn samples_once_per_second_after_ready() {
        let (tx, mut rx) = mpsc::unbounded_channel::<EngineEvent>();
        let mut tracker = PlaybackTracker::new(tx);
        assert!(tracker.sample().is_none());

        tracker.on_ready(FakeWidget::at(12.4));
        sleep(Duration::from_millis(1500)).await;

        let mut samples = 0;
        while let Ok(EngineEvent::Sample) = rx.try_recv() {
            samples += 1;
        }
        assert_eq!(samples, 2);
        assert_eq!(tracker.sample(), Some(12.4));
        assert_eq!(tracker.current_second(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_position_skips_tick() {
        let (tx, _rx) = mpsc::unbounded_channel::<EngineEvent>();
        let mut tracker = PlaybackTracker::new(tx);
        let widget = FakeWidget::at(5.0);
        tracker.on_ready(widget.clone());
        tracker.sample();

        widget.set(None);
        assert_eq!(tracker.sample(), None);
        assert_eq!(tracker.current_time(), 5.0);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_sampler() {
        let (tx, mut rx) = mpsc::unbounded_channel::<EngineEvent>();
        let mut tracker = PlaybackTracker::new(tx);
        tracker.on_ready(FakeWidget::at(0.0));
        tracker.teardown();
        while rx.try_recv().is_ok() {}

        sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
        assert!(matches!(tracker.seek_to(3.0), Err(Error::WidgetNotReady)));
    }

    #[test]
    fn seek_requires_ready_widget() {
        let (tx, _rx) = mpsc::unbounded_channel::<EngineEvent>();
        let mut tracker = PlaybackTracker::new(tx);
        assert!(matches!(tracker.seek_to(1.0), Err(Error::WidgetNotReady)));
    }
}
