//! Keybinding dispatcher for scrimnote.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop whether to continue or quit. The dispatcher
//! branches first on `state.mode` so that each mode has an isolated handler.
//! Compose and Edit share one composer driver.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use scrimnote_core::composer::{EnterOutcome, EscapeOutcome, MentionComposer};
use scrimnote_core::types::CommentId;

use crate::app::{AppState, Mode, PanelFocus, SEEK_STEP};

/// Rows moved by one mouse wheel notch.
const WHEEL_STEP: isize = 3;

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Continue the event loop normally.
    Continue,
    /// Exit cleanly.
    Quit,
}

/// Dispatches a key event to the handler matching the current mode.
///
/// # Arguments
///
/// * `key`: the raw crossterm key event (code + modifiers)
/// * `state`: mutable reference to all UI state
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::Normal => handle_normal(key, state),
        Mode::Compose => handle_compose(key, state),
        Mode::Edit => handle_edit(key, state),
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmQuit => handle_confirm_quit(key, state),
        Mode::ConfirmDelete(id) => handle_confirm_delete(key, id, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }

    match key.code {
        // Panel focus
        KeyCode::Char('H') | KeyCode::BackTab => state.focus = state.focus.prev(),
        KeyCode::Char('L') | KeyCode::Tab => state.focus = state.focus.next(),

        // Playback
        KeyCode::Char(' ') => state.toggle_pause(),
        KeyCode::Char('h') | KeyCode::Left => state.seek_relative(-SEEK_STEP),
        KeyCode::Char('l') | KeyCode::Right => state.seek_relative(SEEK_STEP),
        KeyCode::Enter if state.focus == PanelFocus::Filters => state.toggle_facet(),
        KeyCode::Enter => state.seek_to_selected(),

        // Comments
        KeyCode::Char('i') => state.mode = Mode::Compose,
        KeyCode::Char('e') => state.start_edit(),
        KeyCode::Char('d') => state.request_delete(),
        KeyCode::Char('r') => {
            state.reload();
            state.notify("Reloading comments", false);
        }

        // Filters
        KeyCode::Char('c') => state.clear_filters(),

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }

        KeyCode::Char('q') | KeyCode::Esc => {
            if !state.has_unsaved() {
                return KeyAction::Quit;
            }
            state.mode = Mode::ConfirmQuit;
        }

        _ => {}
    }
    KeyAction::Continue
}

/// Handles j / k / g / G and the Ctrl half-page combos.
///
/// Returns `None` when the key should fall through to the rest of the Normal
/// handler.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('d') if ctrl => state.scroll_comments(state.half_page()),
        KeyCode::Char('u') if ctrl => state.scroll_comments(-state.half_page()),
        KeyCode::Char('j') | KeyCode::Down => state.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => state.move_cursor(-1),
        KeyCode::Char('g') | KeyCode::Home => state.cursor_to_start(),
        KeyCode::Char('G') | KeyCode::End => state.cursor_to_end(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// Compose and Edit modes
// ---------------------------------------------------------------------------

/// Result of feeding one key to a composer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ComposerAction {
    Submit(String),
    Cancel,
    Edited,
}

/// Feeds a key to `composer`.
///
/// Enter inserts the highlighted suggestion when the popup is open and
/// submits otherwise. Alt-Enter and Shift-Enter insert a line break.
fn drive_composer(key: KeyEvent, composer: &mut MentionComposer) -> ComposerAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let newline = key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Enter if newline => composer.insert_newline(),
        KeyCode::Enter => match composer.press_enter() {
            EnterOutcome::Submit(text) => return ComposerAction::Submit(text),
            EnterOutcome::Selected | EnterOutcome::Inert => {}
        },
        KeyCode::Esc => {
            if composer.press_escape() == EscapeOutcome::Cancel {
                return ComposerAction::Cancel;
            }
        }
        KeyCode::Tab => {
            composer.accept_suggestion();
        }
        KeyCode::Down => {
            composer.select_next();
        }
        KeyCode::Up => {
            composer.select_prev();
        }
        KeyCode::Left => composer.move_left(),
        KeyCode::Right => composer.move_right(),
        KeyCode::Home => composer.move_home(),
        KeyCode::End => composer.move_end(),
        KeyCode::Backspace => composer.backspace(),
        KeyCode::Delete => composer.delete(),
        KeyCode::Char(c) if !ctrl => composer.insert_char(c),
        _ => {}
    }
    ComposerAction::Edited
}

fn handle_compose(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match drive_composer(key, &mut state.composer) {
        ComposerAction::Submit(text) => state.submit_compose(text),
        ComposerAction::Cancel => state.cancel_compose(),
        ComposerAction::Edited => {}
    }
    KeyAction::Continue
}

fn handle_edit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Left => {
                state.shift_edit_timestamp(-1);
                return KeyAction::Continue;
            }
            KeyCode::Right => {
                state.shift_edit_timestamp(1);
                return KeyAction::Continue;
            }
            KeyCode::Char('t') => {
                state.pin_edit_to_playhead();
                return KeyAction::Continue;
            }
            _ => {}
        }
    }

    let Some(slot) = state.store.editing_mut() else {
        state.mode = Mode::Normal;
        return KeyAction::Continue;
    };
    match drive_composer(key, &mut slot.draft) {
        ComposerAction::Submit(_) => state.submit_edit(),
        ComposerAction::Cancel => state.cancel_edit(),
        ComposerAction::Edited => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Overlays and confirmations
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('G') => state.help_scroll = u16::MAX,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

/// `y` quits; `n` or Esc goes back to Normal mode.
fn handle_confirm_quit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

fn handle_confirm_delete(key: KeyEvent, id: CommentId, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => state.confirm_delete(id),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Handles a mouse event: click-to-focus, click-to-select and scroll-wheel.
///
/// Clicks only act in Normal mode. The wheel scrolls the panel under focus,
/// or the help overlay when it is open. Wheel scrolling in the comment list
/// is a user scroll and pauses auto-follow.
///
/// # Arguments
///
/// * `mouse`: the crossterm mouse event
/// * `state`: mutable reference to all UI state
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if state.mode == Mode::Normal => {
            handle_mouse_click(mouse.column, mouse.row, state);
        }
        MouseEventKind::ScrollUp => handle_wheel(-WHEEL_STEP, state),
        MouseEventKind::ScrollDown => handle_wheel(WHEEL_STEP, state),
        _ => {}
    }
    KeyAction::Continue
}

/// Focuses the clicked panel; a click inside a list also moves its cursor.
///
/// Collapsed panels have zero width and cannot receive focus.
fn handle_mouse_click(col: u16, row: u16, state: &mut AppState) {
    let pos = Position { x: col, y: row };
    let [filters, comments, detail] = state.panel_rects;

    if filters.width > 0 && filters.contains(pos) {
        state.focus = PanelFocus::Filters;
        let first_row = filters.y + 1;
        if row >= first_row {
            let index = usize::from(row - first_row);
            if index < state.facet_rows.len() {
                state.facet_cursor = index;
            }
        }
    } else if comments.contains(pos) {
        state.focus = PanelFocus::Comments;
        if state.list_area.contains(pos) {
            state.select_at_row(usize::from(row - state.list_area.y));
        }
    } else if detail.width > 0 && detail.contains(pos) {
        state.focus = PanelFocus::Detail;
    }
}

fn handle_wheel(delta: isize, state: &mut AppState) {
    if state.mode == Mode::HelpOverlay {
        state.help_scroll = state.help_scroll.saturating_add_signed(delta as i16);
        return;
    }
    match state.focus {
        PanelFocus::Comments => state.scroll_comments(delta),
        PanelFocus::Filters | PanelFocus::Detail => state.move_cursor(delta),
    }
}
