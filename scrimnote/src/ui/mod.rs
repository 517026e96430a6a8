//! UI rendering module for scrimnote.
//!
//! This is the module root for `ui/`. It exposes `render()` as the single entry
//! point called by the event loop's `terminal.draw()` closure.
//!
//! Layout arithmetic lives in `layout.rs`. Each panel has its own renderer;
//! the composer widget is shared by the new-comment box and the edit buffer.

mod comments_view;
mod composer_view;
mod detail;
mod filter_panel;
pub mod help;
pub mod keybindings;
mod layout;

use ratatui::{style::Style, widgets::Block, Frame};

use scrimnote_core::types::format_timestamp;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, render_status_bar, split_for_composer};

/// Renders one complete frame: filters, comment list (plus composer while
/// composing), detail pane, status bar and, on top, the help overlay.
///
/// Called exactly once per `AppEvent::Render`. Panel rects and the list
/// viewport are written back into `state` so the next key or mouse event can
/// hit-test and scroll against what was drawn.
///
/// # Arguments
///
/// * `frame`: current render frame provided by `terminal.draw()`
/// * `state`: mutable reference to app state (geometry is cached here)
/// * `theme`: active color theme
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    frame.render_widget(Block::new().style(Style::default().bg(theme.background)), frame.area());
    let [filters, comments, detail, status_bar] = compute_layout(frame);
    state.panel_rects = [filters, comments, detail];

    if filters.width > 0 {
        filter_panel::render_filters(frame, filters, state, theme);
    }

    match state.mode {
        Mode::Compose => {
            let [list, composer] = split_for_composer(comments, state.composer.line_count());
            comments_view::render_comments(frame, list, state, theme);
            let title = format!(
                " New comment at {} · Enter posts · Alt-Enter newline ",
                format_timestamp(state.engine.tracker().current_second())
            );
            composer_view::render_composer(frame, composer, &state.composer, title, theme);
        }
        // Narrow terminal: the edit buffer borrows the bottom of the list.
        Mode::Edit if detail.width == 0 => {
            let lines = state.store.editing().map_or(1, |slot| slot.draft.line_count());
            let [list, editor] = split_for_composer(comments, lines);
            comments_view::render_comments(frame, list, state, theme);
            detail::render_detail(frame, editor, state, theme);
        }
        _ => comments_view::render_comments(frame, comments, state, theme),
    }

    if detail.width > 0 {
        detail::render_detail(frame, detail, state, theme);
    }

    render_status_bar(frame, status_bar, state, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
