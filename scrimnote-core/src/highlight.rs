//! Match & highlight state machine driven by the sampled playback position.
//!
//! On every sample the controller looks for the newest visible comment whose
//! match window contains the position. When the match changes it highlights
//! that comment, scrolls it toward the middle of the list (never upward and
//! never while the user is reading elsewhere) and arms an expiry timer.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::engine::EngineEvent;
use crate::timer::TimerHandle;
use crate::types::{Comment, CommentId};

/// Tracing target for highlight transitions.
pub const TRACING_TARGET: &str = "scrimnote_core::highlight";

/// Seconds after a comment's timestamp during which it is still "current".
pub const MATCH_WINDOW_SECS: u32 = 5;

/// How long a highlight stays lit while playback runs.
pub const HIGHLIGHT_EXPIRY: Duration = Duration::from_secs(3);

/// Finds the newest comment in `visible` whose window `[t, t + 5]` holds
/// `current_time`.
///
/// `visible` is in insertion order; the scan runs from the end so later
/// comments win over earlier ones with overlapping windows.
pub fn find_match(current_time: f64, visible: &[Comment]) -> Option<CommentId> {
    visible
        .iter()
        .rev()
        .find(|c| {
            let start = f64::from(c.timestamp);
            current_time >= start && current_time <= start + f64::from(MATCH_WINDOW_SECS)
        })
        .map(|c| c.id)
}

/// Row geometry of the rendered comment list, supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct ListLayout {
    rows: HashMap<CommentId, (usize, usize)>, // id -> (top, height)
    content_height: usize,
    viewport_height: usize,
}

impl ListLayout {
    /// Stacks items top to bottom in the given order.
    pub fn stacked<I>(viewport_height: usize, items: I) -> Self
    where
        I: IntoIterator<Item = (CommentId, usize)>,
    {
        let mut rows = HashMap::new();
        let mut top = 0;
        for (id, height) in items {
            rows.insert(id, (top, height));
            top += height;
        }
        Self { rows, content_height: top, viewport_height }
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Largest offset that still fills the viewport.
    pub fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// `(top, height)` of `id`.
    pub fn row(&self, id: CommentId) -> Option<(usize, usize)> {
        self.rows.get(&id).copied()
    }

    /// The item covering content row `y`.
    pub fn id_at(&self, y: usize) -> Option<CommentId> {
        self.rows
            .iter()
            .find(|(_, &(top, height))| (top..top + height).contains(&y))
            .map(|(&id, _)| id)
    }

    /// Offset that puts the middle of `id` in the middle of the viewport.
    pub fn centered_offset(&self, id: CommentId) -> Option<usize> {
        let &(top, height) = self.rows.get(&id)?;
        let centre = top + height / 2;
        Some(centre.saturating_sub(self.viewport_height / 2).min(self.max_offset()))
    }
}

/// Who moved the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOrigin {
    User,
    Programmatic,
}

/// Scroll position of the comment list plus the "user scrolled away" lock.
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    offset: usize,
    user_scrolled: bool,
}

impl ScrollTracker {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn user_scrolled(&self) -> bool {
        self.user_scrolled
    }

    /// Records a scroll. Anything not issued by the controller locks
    /// auto-scroll until [`release`](Self::release).
    pub fn apply(&mut self, offset: usize, origin: ScrollOrigin) {
        self.offset = offset;
        if origin == ScrollOrigin::User {
            self.user_scrolled = true;
        }
    }

    /// User scroll by `delta` rows, clamped to `[0, max]`.
    pub fn scroll_by(&mut self, delta: isize, max: usize) {
        let target = self.offset.saturating_add_signed(delta).min(max);
        self.apply(target, ScrollOrigin::User);
    }

    /// Pulls the offset back inside `[0, max]` after the content shrank.
    /// Leaves the lock as it was.
    pub fn clamp(&mut self, max: usize) {
        self.offset = self.offset.min(max);
    }

    /// Clears the lock, e.g. after an explicit seek.
    pub fn release(&mut self) {
        self.user_scrolled = false;
    }
}

/// Controller state as seen by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightState {
    Idle,
    Highlighted(CommentId),
}

/// Result of feeding one sample to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Highlighted { id: CommentId, scrolled_to: Option<usize> },
    Cleared,
}

/// Owns the highlight, the scroll lock and the expiry timer for one view.
#[derive(Debug)]
pub struct HighlightController<E> {
    highlighted: Option<CommentId>,
    last_matched: Option<CommentId>,
    paused: bool,
    expiry: Option<TimerHandle>,
    arm_seq: u64,
    scroll: ScrollTracker,
    events: UnboundedSender<E>,
}

impl<E> HighlightController<E>
where
    E: From<EngineEvent> + Send + 'static,
{
    pub fn new(events: UnboundedSender<E>) -> Self {
        Self {
            highlighted: None,
            last_matched: None,
            paused: false,
            expiry: None,
            arm_seq: 0,
            scroll: ScrollTracker::default(),
            events,
        }
    }

    pub fn state(&self) -> HighlightState {
        match self.highlighted {
            Some(id) => HighlightState::Highlighted(id),
            None => HighlightState::Idle,
        }
    }

    pub fn highlighted(&self) -> Option<CommentId> {
        self.highlighted
    }

    pub fn scroll(&self) -> &ScrollTracker {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollTracker {
        &mut self.scroll
    }

    pub fn has_armed_expiry(&self) -> bool {
        self.expiry.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Feeds one position sample against the filtered, visible list.
    pub fn on_position(
        &mut self,
        current_time: f64,
        visible: &[Comment],
        layout: &ListLayout,
    ) -> Transition {
        let Some(id) = find_match(current_time, visible) else {
            self.last_matched = None;
            self.expiry = None;
            return match self.highlighted.take() {
                Some(old) => {
                    tracing::debug!(target: TRACING_TARGET, id = old, current_time, "Left match window");
                    Transition::Cleared
                }
                None => Transition::Unchanged,
            };
        };

        if self.last_matched == Some(id) {
            return Transition::Unchanged;
        }

        self.last_matched = Some(id);
        self.highlighted = Some(id);

        let scrolled_to = if self.scroll.user_scrolled() {
            None
        } else {
            layout
                .centered_offset(id)
                .filter(|&target| target > self.scroll.offset())
        };
        if let Some(target) = scrolled_to {
            self.scroll.apply(target, ScrollOrigin::Programmatic);
        }

        self.expiry = None;
        if !self.paused {
            self.arm_expiry(id);
        }

        tracing::debug!(target: TRACING_TARGET, id, current_time, ?scrolled_to, "Highlighted comment");
        Transition::Highlighted { id, scrolled_to }
    }

    /// Pausing freezes the highlight; resuming gives it a fresh expiry.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        if paused {
            self.expiry = None;
        } else if let Some(id) = self.highlighted {
            self.arm_expiry(id);
        }
    }

    /// Handles an expiry. Returns `true` if it cleared the highlight.
    ///
    /// An expiry armed for a highlight that has since been replaced is a
    /// silent no-op.
    pub fn on_expired(&mut self, id: CommentId, arm: u64) -> bool {
        if self.highlighted != Some(id) || arm != self.arm_seq {
            tracing::trace!(target: TRACING_TARGET, id, arm, "Ignoring stale expiry");
            return false;
        }
        self.highlighted = None;
        self.expiry = None;
        true
    }

    /// Drops the expiry timer. The controller is inert afterwards.
    pub fn teardown(&mut self) {
        self.expiry = None;
    }

    fn arm_expiry(&mut self, id: CommentId) {
        self.arm_seq += 1;
        let event = E::from(EngineEvent::HighlightExpired { id, arm: self.arm_seq });
        self.expiry = Some(TimerHandle::once(
            "highlight-expiry",
            HIGHLIGHT_EXPIRY,
            self.events.clone(),
            event,
        ));
    }
}
