//! Responsive 3-panel layout for scrimnote.
//!
//! Pure layout arithmetic, recomputed inside every `terminal.draw()` so each
//! frame reflects the current terminal size.
//!
//! At `>= 100` columns the filter, comment and detail panels are all visible
//! (22% / fill / 30%). Narrower terminals collapse both side panels and the
//! comment list fills the width.
//!
//! `Spacing::Overlap(1)` combined with `Block::merge_borders(MergeStrategy::Fuzzy)`
//! makes adjacent panel borders share a single column.

use ratatui::{
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
    Frame,
};

use scrimnote_core::types::format_timestamp;

use crate::app::{AppState, Mode};
use crate::theme::Theme;

/// Terminal width below which the side panels collapse.
const SIDE_PANELS_MIN_WIDTH: u16 = 100;

/// Returns `[filters, comments, detail, status_bar]` for the current frame.
pub fn compute_layout(frame: &Frame) -> [Rect; 4] {
    let [main_area, status_bar] =
        frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let constraints = if frame.area().width >= SIDE_PANELS_MIN_WIDTH {
        [Constraint::Percentage(22), Constraint::Fill(1), Constraint::Percentage(30)]
    } else {
        [Constraint::Length(0), Constraint::Fill(1), Constraint::Length(0)]
    };
    let horizontal = Layout::horizontal(constraints).spacing(Spacing::Overlap(1));

    let [filters, comments, detail] = main_area.layout(&horizontal);
    [filters, comments, detail, status_bar]
}

/// Splits the comment panel into list and composer while composing.
///
/// The composer grows with its text up to six lines.
pub fn split_for_composer(area: Rect, line_count: usize) -> [Rect; 2] {
    let height = u16::try_from(line_count.clamp(1, 6)).unwrap_or(6) + 2;
    area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(height)]))
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// `BorderType::Thick` marks the focused panel. `MergeStrategy::Fuzzy` is
/// needed because `Exact` produces wrong junctions between thick and plain
/// borders.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar.
///
/// Left to right: mode, playhead, filter summary, then either the current
/// notice or a short key hint.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Compose => (" COMPOSE ", theme.status_mode_insert),
        Mode::Edit => (" EDIT ", theme.status_mode_insert),
        Mode::ConfirmDelete(_) => (" DELETE? ", theme.notice_error),
        Mode::Normal | Mode::ConfirmQuit | Mode::HelpOverlay => {
            (" NORMAL ", theme.status_mode_normal)
        }
    };

    let tracker = state.engine.tracker();
    let playhead = if !tracker.is_ready() {
        " no player ".to_owned()
    } else {
        let icon = if tracker.is_paused() { "⏸" } else { "▶" };
        format!(" {icon} {} ", format_timestamp(tracker.current_second()))
    };

    let shown = if state.selection.is_empty() {
        format!(" {} comments ", state.store.comments().len())
    } else {
        format!(" {}/{} shown ", state.visible.len(), state.store.comments().len())
    };

    let mut spans = vec![
        Span::styled(mode_text, Style::default().fg(mode_fg).add_modifier(Modifier::BOLD)),
        Span::raw(playhead),
        Span::raw("│"),
        Span::raw(shown),
        Span::raw("│ "),
    ];

    match (&state.notice, state.mode) {
        (_, Mode::ConfirmDelete(_)) => {
            spans.push(Span::styled("Delete this comment? y / n", Style::default().fg(theme.notice_error)));
        }
        (_, Mode::ConfirmQuit) => {
            spans.push(Span::raw("Discard your draft and quit? y / n"));
        }
        (Some(notice), _) => {
            let style = if notice.is_error {
                Style::default().fg(theme.notice_error).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(notice.text.clone(), style));
        }
        (None, _) => spans.push(Span::styled("? help", Style::default().fg(theme.muted))),
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
