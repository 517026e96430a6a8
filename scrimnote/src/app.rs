//! Central application state for scrimnote.
//!
//! This module owns all mutable state of one open scrim view: mode, focus,
//! the sync engine, the comment store, filter choices, the composer and
//! cached render geometry. No ratatui rendering logic lives here. `ui/` reads
//! it, and the keybinding dispatcher and the main loop mutate it.

use std::collections::BTreeSet;
use std::future::Future;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use scrimnote_core::composer::MentionComposer;
use scrimnote_core::engine::{EngineEvent, SyncEngine};
use scrimnote_core::filter::{filter_comments, FacetOptions, FilterSelection, ALL_MENTIONED};
use scrimnote_core::highlight::{ListLayout, ScrollOrigin};
use scrimnote_core::playback::PlaybackWidget;
use scrimnote_core::store::{CommentStore, CommentSync};
use scrimnote_core::types::{format_timestamp, Comment, CommentId, Identity, MentionUser};

use crate::event::{AppEvent, StoreOp};

pub const TRACING_TARGET: &str = "scrimnote::app";

/// How long a status-bar notice stays up.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Seconds moved by a relative seek.
pub const SEEK_STEP: f64 = 5.0;

/// Editor mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Writing a new comment.
    Compose,
    /// Editing the comment in the store's edit slot.
    Edit,
    HelpOverlay,
    /// Quit confirmation, shown when a draft would be lost.
    ConfirmQuit,
    ConfirmDelete(CommentId),
}

/// Which panel currently has keyboard focus.
///
/// Cycle order: `Filters` → `Comments` → `Detail` → `Filters`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Filters,
    #[default]
    Comments,
    Detail,
}

impl PanelFocus {
    pub fn prev(self) -> Self {
        match self {
            PanelFocus::Filters => PanelFocus::Detail,
            PanelFocus::Comments => PanelFocus::Filters,
            PanelFocus::Detail => PanelFocus::Comments,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PanelFocus::Filters => PanelFocus::Comments,
            PanelFocus::Comments => PanelFocus::Detail,
            PanelFocus::Detail => PanelFocus::Filters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    Author,
    Tag,
    Mentioned,
}

/// One toggleable line of the filter panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRow {
    pub kind: FacetKind,
    pub value: String,
}

impl FacetRow {
    pub fn label(&self) -> &str {
        if self.value == ALL_MENTIONED {
            "anyone"
        } else {
            &self.value
        }
    }

    pub fn is_selected(&self, selection: &FilterSelection) -> bool {
        match self.kind {
            FacetKind::Author => selection.author.as_deref() == Some(self.value.as_str()),
            FacetKind::Tag => selection.tags.contains(&self.value),
            FacetKind::Mentioned => selection.mentioned.contains(&self.value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
    expires: Instant,
}

/// Rows a comment occupies in the list: header, content lines, spacer.
pub fn comment_rows(comment: &Comment) -> usize {
    comment.content.split('\n').count() + 2
}

pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,
    pub identity: Identity,

    pub engine: SyncEngine<AppEvent>,
    pub store: CommentStore,
    sync: CommentSync,
    tx: UnboundedSender<AppEvent>,

    pub roster: Vec<MentionUser>,
    /// Draft for a new comment.
    pub composer: MentionComposer,
    /// Text of a create request still in flight, restored if it fails.
    pending_create: Option<String>,

    pub selection: FilterSelection,
    pub facets: FacetOptions,
    pub facet_rows: Vec<FacetRow>,
    pub facet_cursor: usize,

    /// The filtered list, in server order. Fed to the highlight controller.
    pub visible: Vec<Comment>,
    /// Keyboard cursor in the comment list.
    pub selected: Option<CommentId>,
    pub layout: ListLayout,

    /// Inner height of the comment list, cached after each render.
    pub comments_viewport_height: u16,
    pub detail_scroll: u16,
    pub help_scroll: u16,
    /// Outer rects of the filter, comment and detail panels from the last frame.
    pub panel_rects: [Rect; 3],
    /// Inner rect of the comment list from the last frame.
    pub list_area: Rect,

    pub notice: Option<Notice>,
}

impl AppState {
    pub fn new(identity: Identity, sync: CommentSync, tx: UnboundedSender<AppEvent>) -> Self {
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            identity,
            engine: SyncEngine::new(tx.clone()),
            store: CommentStore::new(),
            sync,
            tx,
            roster: Vec::new(),
            composer: MentionComposer::default(),
            pending_create: None,
            selection: FilterSelection::default(),
            facets: FacetOptions::default(),
            facet_rows: Vec::new(),
            facet_cursor: 0,
            visible: Vec::new(),
            selected: None,
            layout: ListLayout::default(),
            comments_viewport_height: 0,
            detail_scroll: 0,
            help_scroll: 0,
            panel_rects: [Rect::default(); 3],
            list_area: Rect::default(),
            notice: None,
        }
    }

    pub fn scrim_label(&self) -> &str {
        self.sync.scrim_id().as_str()
    }

    /// A draft that quitting would throw away.
    pub fn has_unsaved(&self) -> bool {
        !self.composer.is_blank() || self.store.editing().is_some()
    }

    // -----------------------------------------------------------------------
    // Notices
    // -----------------------------------------------------------------------

    pub fn notify(&mut self, text: impl Into<String>, is_error: bool) {
        let text = text.into();
        if is_error {
            tracing::warn!(target: TRACING_TARGET, notice = %text, "Action failed");
        }
        self.notice = Some(Notice { text, is_error, expires: Instant::now() + NOTICE_TTL });
    }

    pub fn expire_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.expires <= now) {
            self.notice = None;
        }
    }

    // -----------------------------------------------------------------------
    // Engine and player
    // -----------------------------------------------------------------------

    pub fn on_engine(&mut self, event: EngineEvent) {
        if let Some(transition) = self.engine.handle(event, &self.visible, &self.layout) {
            tracing::trace!(target: TRACING_TARGET, ?transition, "Highlight transition");
        }
    }

    pub fn on_player_ready(&mut self, widget: std::sync::Arc<dyn PlaybackWidget>) {
        self.engine.on_widget_ready(widget);
        self.notify("Connected to player", false);
    }

    /// The player went away: start over with a fresh, idle view session.
    pub fn on_player_closed(&mut self) {
        self.engine.teardown();
        self.engine = SyncEngine::new(self.tx.clone());
        self.notify("Player closed", false);
    }

    pub fn seek(&mut self, seconds: f64) {
        if let Err(err) = self.engine.seek_to(seconds) {
            self.notify(err.to_string(), true);
        }
    }

    pub fn seek_relative(&mut self, delta: f64) {
        let target = (self.engine.tracker().current_time() + delta).max(0.0);
        self.seek(target);
    }

    pub fn seek_to_selected(&mut self) {
        if let Some(timestamp) = self.selected_comment().map(|c| c.timestamp) {
            self.seek(f64::from(timestamp));
        }
    }

    pub fn toggle_pause(&mut self) {
        if let Err(err) = self.engine.toggle_pause() {
            self.notify(err.to_string(), true);
        }
    }

    // -----------------------------------------------------------------------
    // Store results
    // -----------------------------------------------------------------------

    /// Applies the outcome of a store request. Failures leave the list as is.
    pub fn apply_comments(&mut self, op: StoreOp, result: scrimnote_core::Result<Vec<Comment>>) {
        match result {
            Ok(comments) => {
                tracing::debug!(target: TRACING_TARGET, ?op, count = comments.len(), "Comments replaced");
                self.store.replace(comments);
                match op {
                    StoreOp::Create => self.pending_create = None,
                    StoreOp::Update(id) => {
                        if self.store.editing().is_some_and(|slot| slot.id() == id) {
                            self.store.cancel_edit();
                        }
                    }
                    StoreOp::Load | StoreOp::Remove(_) => {}
                }
                self.refresh_visible();
            }
            Err(err) => {
                match op {
                    StoreOp::Remove(id) => self.store.clear_deleting(id),
                    StoreOp::Create => {
                        if let Some(text) = self.pending_create.take() {
                            if self.composer.is_blank() {
                                self.composer.set_text(&text);
                            }
                        }
                    }
                    StoreOp::Load | StoreOp::Update(_) => {}
                }
                if op == StoreOp::Load && err.is_network() {
                    self.notify(format!("{err} (r retries)"), true);
                } else {
                    self.notify(err.to_string(), true);
                }
            }
        }

        match self.mode {
            Mode::Edit if self.store.editing().is_none() => self.mode = Mode::Normal,
            Mode::ConfirmDelete(id) if self.store.get(id).is_none() => self.mode = Mode::Normal,
            _ => {}
        }
    }

    pub fn apply_roster(&mut self, result: scrimnote_core::Result<Vec<MentionUser>>) {
        match result {
            Ok(users) => {
                tracing::debug!(target: TRACING_TARGET, count = users.len(), "Roster loaded");
                self.composer.set_roster(users.clone());
                if let Some(slot) = self.store.editing_mut() {
                    slot.draft.set_roster(users.clone());
                }
                self.roster = users;
            }
            Err(err) => self.notify(format!("roster unavailable: {err}"), true),
        }
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    fn spawn_request<F>(&self, op: StoreOp, request: F)
    where
        F: Future<Output = scrimnote_core::Result<Vec<Comment>>> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = request.await;
            tx.send(AppEvent::Comments { op, result }).ok();
        });
    }

    pub fn reload(&self) {
        let sync = self.sync.clone();
        self.spawn_request(StoreOp::Load, async move { sync.list().await });
    }

    /// Posts `text` at the current playback second.
    pub fn submit_compose(&mut self, text: String) {
        let timestamp = self.engine.tracker().current_second();
        self.composer.clear();
        self.pending_create = Some(text.clone());
        self.mode = Mode::Normal;

        let sync = self.sync.clone();
        self.spawn_request(StoreOp::Create, async move { sync.create(timestamp, &text).await });
        self.notify(format!("Posting comment at {}", format_timestamp(timestamp)), false);
    }

    pub fn cancel_compose(&mut self) {
        self.composer.clear();
        self.mode = Mode::Normal;
    }

    pub fn start_edit(&mut self) {
        let Some(id) = self.selected else { return };
        match self.store.begin_edit(id, &self.identity, self.roster.clone()) {
            Ok(_) => {
                self.mode = Mode::Edit;
                self.focus = PanelFocus::Detail;
            }
            Err(err) => self.notify(err.to_string(), true),
        }
    }

    /// Sends the edit slot's changes. The slot stays until the update lands.
    pub fn submit_edit(&mut self) {
        let patch = match self.store.editing() {
            Some(slot) => match self.store.get(slot.id()) {
                Some(original) => Some((slot.id(), slot.patch(original))),
                None => None,
            },
            None => return,
        };
        self.mode = Mode::Normal;
        let Some((id, patch)) = patch else {
            self.store.cancel_edit();
            return;
        };
        if patch.is_empty() {
            self.store.cancel_edit();
            self.notify("No changes", false);
            return;
        }
        if patch.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            self.mode = Mode::Edit;
            self.notify("comment content is empty", true);
            return;
        }

        let sync = self.sync.clone();
        self.spawn_request(StoreOp::Update(id), async move { sync.update(id, patch).await });
    }

    pub fn cancel_edit(&mut self) {
        self.store.cancel_edit();
        self.mode = Mode::Normal;
    }

    /// Nudges the edited comment's timestamp, never below zero.
    pub fn shift_edit_timestamp(&mut self, delta: i64) {
        if let Some(slot) = self.store.editing_mut() {
            let shifted = (i64::from(slot.timestamp) + delta).clamp(0, i64::from(u32::MAX));
            slot.timestamp = u32::try_from(shifted).unwrap_or(slot.timestamp);
        }
    }

    /// Re-pins the edited comment to the current playback second.
    pub fn pin_edit_to_playhead(&mut self) {
        let second = self.engine.tracker().current_second();
        if let Some(slot) = self.store.editing_mut() {
            slot.timestamp = second;
        }
    }

    pub fn request_delete(&mut self) {
        let Some(id) = self.selected else { return };
        if self.store.can_delete(&self.identity, id) {
            self.mode = Mode::ConfirmDelete(id);
        } else {
            self.notify("not permitted to delete this comment", true);
        }
    }

    pub fn confirm_delete(&mut self, id: CommentId) {
        self.mode = Mode::Normal;
        if let Err(err) = self.store.mark_deleting(id, &self.identity) {
            self.notify(err.to_string(), true);
            return;
        }
        let sync = self.sync.clone();
        self.spawn_request(StoreOp::Remove(id), async move { sync.remove(id).await });
    }

    // -----------------------------------------------------------------------
    // Filtering and layout
    // -----------------------------------------------------------------------

    /// Recomputes the visible list, facet rows and row geometry.
    pub fn refresh_visible(&mut self) {
        self.visible = filter_comments(self.store.comments(), &self.selection);
        self.facets = FacetOptions::from_comments(self.store.comments());
        self.facet_rows = self.build_facet_rows();
        self.facet_cursor = self.facet_cursor.min(self.facet_rows.len().saturating_sub(1));

        let still_visible = self
            .selected
            .is_some_and(|id| self.visible.iter().any(|c| c.id == id));
        if !still_visible {
            self.selected = self.visible.first().map(|c| c.id);
            self.detail_scroll = 0;
        }
        self.rebuild_layout();
    }

    fn build_facet_rows(&self) -> Vec<FacetRow> {
        // Selected values stay listed even when no comment carries them any more.
        let authors: BTreeSet<&String> =
            self.facets.all_users.iter().chain(self.selection.author.iter()).collect();
        let tags: BTreeSet<&String> =
            self.facets.all_tags.iter().chain(self.selection.tags.iter()).collect();
        let mentioned: BTreeSet<&String> = self
            .facets
            .all_mentioned_users
            .iter()
            .chain(self.selection.mentioned.iter())
            .filter(|name| name.as_str() != ALL_MENTIONED)
            .collect();

        let row = |kind, value: &String| FacetRow { kind, value: value.clone() };
        let mut rows: Vec<FacetRow> = authors.into_iter().map(|v| row(FacetKind::Author, v)).collect();
        rows.extend(tags.into_iter().map(|v| row(FacetKind::Tag, v)));
        rows.push(FacetRow { kind: FacetKind::Mentioned, value: ALL_MENTIONED.to_owned() });
        rows.extend(mentioned.into_iter().map(|v| row(FacetKind::Mentioned, v)));
        rows
    }

    fn rebuild_layout(&mut self) {
        self.layout = ListLayout::stacked(
            usize::from(self.comments_viewport_height),
            self.visible.iter().map(|c| (c.id, comment_rows(c))),
        );
        let max = self.layout.max_offset();
        self.engine.highlight_mut().scroll_mut().clamp(max);
    }

    /// Called by the renderer with the list's inner height.
    pub fn set_comments_viewport(&mut self, height: u16) {
        if height != self.comments_viewport_height {
            self.comments_viewport_height = height;
            self.rebuild_layout();
        }
    }

    pub fn toggle_facet(&mut self) {
        let Some(row) = self.facet_rows.get(self.facet_cursor).cloned() else { return };
        match row.kind {
            FacetKind::Author => self.selection.toggle_author(&row.value),
            FacetKind::Tag => self.selection.toggle_tag(&row.value),
            FacetKind::Mentioned => self.selection.toggle_mentioned(&row.value),
        }
        self.refresh_visible();
    }

    pub fn clear_filters(&mut self) {
        self.selection.clear();
        self.refresh_visible();
    }

    // -----------------------------------------------------------------------
    // Cursor movement and scrolling
    // -----------------------------------------------------------------------

    pub fn selected_comment(&self) -> Option<&Comment> {
        self.selected.and_then(|id| self.store.get(id))
    }

    fn selected_index(&self) -> Option<usize> {
        let id = self.selected?;
        self.visible.iter().position(|c| c.id == id)
    }

    /// Moves the cursor of the focused panel by `delta` rows.
    pub fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            PanelFocus::Filters => {
                let last = self.facet_rows.len().saturating_sub(1);
                self.facet_cursor = self.facet_cursor.saturating_add_signed(delta).min(last);
            }
            PanelFocus::Comments => {
                let Some(last) = self.visible.len().checked_sub(1) else { return };
                let index = self
                    .selected_index()
                    .map_or(0, |i| i.saturating_add_signed(delta).min(last));
                self.select_index(index);
            }
            PanelFocus::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_add_signed(delta as i16);
            }
        }
    }

    pub fn cursor_to_start(&mut self) {
        match self.focus {
            PanelFocus::Filters => self.facet_cursor = 0,
            PanelFocus::Comments => self.select_index(0),
            PanelFocus::Detail => self.detail_scroll = 0,
        }
    }

    pub fn cursor_to_end(&mut self) {
        match self.focus {
            PanelFocus::Filters => self.facet_cursor = self.facet_rows.len().saturating_sub(1),
            PanelFocus::Comments => self.select_index(self.visible.len().saturating_sub(1)),
            PanelFocus::Detail => {}
        }
    }

    fn select_index(&mut self, index: usize) {
        let Some(id) = self.visible.get(index).map(|c| c.id) else { return };
        if self.selected != Some(id) {
            self.detail_scroll = 0;
        }
        self.selected = Some(id);
        self.ensure_selected_visible();
    }

    /// Selects the comment drawn at content row `row` of the list.
    pub fn select_at_row(&mut self, row: usize) {
        let offset = self.engine.highlight().scroll().offset();
        if let Some(id) = self.layout.id_at(offset + row) {
            self.selected = Some(id);
            self.detail_scroll = 0;
        }
    }

    /// Scrolls just enough to bring the cursor into view. Counts as a user
    /// scroll when it moves anything.
    fn ensure_selected_visible(&mut self) {
        let Some((top, height)) = self.selected.and_then(|id| self.layout.row(id)) else {
            return;
        };
        let offset = self.engine.highlight().scroll().offset();
        let viewport = self.layout.viewport_height();
        let target = if top < offset {
            top
        } else if top + height > offset + viewport {
            (top + height).saturating_sub(viewport).min(self.layout.max_offset())
        } else {
            return;
        };
        self.engine.highlight_mut().scroll_mut().apply(target, ScrollOrigin::User);
    }

    /// Manual scroll of the comment list (keys or wheel).
    pub fn scroll_comments(&mut self, delta: isize) {
        let max = self.layout.max_offset();
        self.engine.highlight_mut().scroll_mut().scroll_by(delta, max);
    }

    pub fn half_page(&self) -> isize {
        isize::try_from(self.comments_viewport_height / 2).unwrap_or(1).max(1)
    }
}


#[cfg(test)]
mod tests {
    use scrimnote_core::Error;

    use super::test_support::{comment, loaded, state};
    use super::*;

    #[test]
    fn filters_narrow_visible_list_and_keep_rows() {
        let (mut app, _rx) = loaded(vec![
            comment(1, 10, "mika", "smoke #eco"),
            comment(2, 20, "jo", "<@mika> rotate #eco"),
            comment(3, 30, "jo", "#retake"),
        ]);
        assert_eq!(app.visible.len(), 3);
        assert_eq!(app.selected, Some(1));

        let jo = app.facet_rows.iter().position(|r| r.value == "jo").unwrap();
        app.facet_cursor = jo;
        app.toggle_facet();
        assert_eq!(app.visible.iter().map(|c| c.id).collect::<Vec<_>>(), [2, 3]);
        assert_eq!(app.selected, Some(2));

        let anyone = app.facet_rows.iter().position(|r| r.value == ALL_MENTIONED).unwrap();
        app.facet_cursor = anyone;
        app.toggle_facet();
        assert_eq!(app.visible.iter().map(|c| c.id).collect::<Vec<_>>(), [2]);
        assert_eq!(app.facet_rows[anyone].label(), "anyone");

        app.clear_filters();
        assert_eq!(app.visible.len(), 3);
    }

    #[test]
    fn failed_delete_unblocks_edit() {
        let (mut app, _rx) = loaded(vec![comment(1, 10, "mika", "x")]);
        app.store.mark_deleting(1, &app.identity.clone()).unwrap();
        assert!(!app.store.can_edit(&app.identity, 1));

        app.apply_comments(
            StoreOp::Remove(1),
            Err(Error::Rejected { operation: "delete comment", message: "HTTP 500".into() }),
        );
        assert!(app.store.can_edit(&app.identity, 1));
        assert_eq!(app.notice.as_ref().unwrap().text, "delete comment failed: HTTP 500");
        assert_eq!(app.store.comments().len(), 1);
    }

    #[tokio::test]
    async fn failed_create_restores_draft() {
        let (mut app, mut rx) = loaded(Vec::new());
        app.mode = Mode::Compose;
        app.composer.set_text("late rotate");
        app.submit_compose("late rotate".to_owned());
        assert!(app.composer.is_blank());
        assert_eq!(app.mode, Mode::Normal);

        let Some(AppEvent::Comments { op, result }) = rx.recv().await else {
            panic!("expected comment result");
        };
        assert_eq!(op, StoreOp::Create);
        app.apply_comments(op, result);
        assert_eq!(app.composer.text(), "late rotate");
        assert!(app.notice.as_ref().unwrap().is_error);
    }

    #[test]
    fn vanished_edit_returns_to_normal() {
        let (mut app, _rx) = loaded(vec![comment(1, 10, "mika", "x")]);
        app.start_edit();
        assert_eq!(app.mode, Mode::Edit);

        app.apply_comments(StoreOp::Load, Ok(vec![comment(2, 20, "jo", "y")]));
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.store.editing().is_none());
        assert_eq!(app.selected, Some(2));
    }

    #[test]
    fn edit_of_foreign_comment_is_refused() {
        let (mut app, _rx) = loaded(vec![comment(1, 10, "jo", "x")]);
        app.start_edit();
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.notice.as_ref().unwrap().is_error);

        app.request_delete();
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn cursor_scroll_counts_as_user_scroll() {
        let many = (1..=10).map(|i| comment(i, i as u32 * 10, "jo", "line")).collect();
        let (mut app, _rx) = loaded(many);
        app.focus = PanelFocus::Comments;

        app.move_cursor(1);
        assert!(!app.engine.highlight().scroll().user_scrolled());

        app.cursor_to_end();
        assert_eq!(app.selected, Some(10));
        assert!(app.engine.highlight().scroll().user_scrolled());
        assert_eq!(app.engine.highlight().scroll().offset(), app.layout.max_offset());
    }

    #[test]
    fn shrinking_list_pulls_scroll_back_into_range() {
        let many = (1..=12)
            .map(|i| comment(i, i as u32 * 10, if i > 10 { "mika" } else { "jo" }, "line"))
            .collect();
        let (mut app, _rx) = loaded(many);
        app.cursor_to_end();
        assert_eq!(app.engine.highlight().scroll().offset(), 26);

        let mika = app.facet_rows.iter().position(|r| r.value == "mika").unwrap();
        app.facet_cursor = mika;
        app.toggle_facet();
        assert_eq!(app.layout.max_offset(), 0);
        assert_eq!(app.engine.highlight().scroll().offset(), 0);
        assert!(app.engine.highlight().scroll().user_scrolled());

        // Row 0 on screen is the first visible comment.
        app.select_at_row(0);
        assert_eq!(app.selected, Some(11));

        // Clearing the filter does not jump back to the old offset.
        app.clear_filters();
        assert_eq!(app.engine.highlight().scroll().offset(), 0);
    }

    #[test]
    fn failed_load_suggests_retry() {
        let (mut app, _rx) = loaded(vec![comment(1, 10, "mika", "x")]);
        app.apply_comments(
            StoreOp::Load,
            Err(Error::Rejected { operation: "list comments", message: "HTTP 502".into() }),
        );
        assert_eq!(app.notice.as_ref().unwrap().text, "list comments failed: HTTP 502 (r retries)");
        assert_eq!(app.store.comments().len(), 1);

        app.apply_comments(StoreOp::Load, Err(Error::EmptyContent));
        assert!(!app.notice.as_ref().unwrap().text.ends_with("(r retries)"));
    }

    #[test]
    fn edit_timestamp_never_goes_negative() {
        let (mut app, _rx) = loaded(vec![comment(1, 3, "mika", "x")]);
        app.start_edit();
        app.shift_edit_timestamp(-5);
        assert_eq!(app.store.editing().unwrap().timestamp, 0);
        app.shift_edit_timestamp(2);
        assert_eq!(app.store.editing().unwrap().timestamp, 2);
    }

    #[test]
    fn notices_expire() {
        let (mut app, _rx) = state();
        app.notify("hello", false);
        app.expire_notice(Instant::now());
        assert!(app.notice.is_some());
        app.expire_notice(Instant::now() + NOTICE_TTL);
        assert!(app.notice.is_none());
    }
}
