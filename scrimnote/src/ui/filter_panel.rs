//! Filter panel: one toggleable row per facet value.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
    Frame,
};

use crate::app::{AppState, FacetKind, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_filters(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let focused = state.focus == PanelFocus::Filters;
    let title = if state.selection.is_empty() { " Filters " } else { " Filters · c clears " };
    frame.render_widget(panel_block(title, focused, theme), area);

    let mut items = Vec::with_capacity(state.facet_rows.len());
    let mut previous_kind = None;
    for row in &state.facet_rows {
        let heading = match row.kind {
            FacetKind::Author => "author",
            FacetKind::Tag => "tag",
            FacetKind::Mentioned => "mentions",
        };
        let checked = row.is_selected(&state.selection);
        let marker = if checked { "[x] " } else { "[ ] " };
        let value_style = match row.kind {
            FacetKind::Author => Style::default().fg(theme.author),
            FacetKind::Tag => Style::default().fg(theme.tag_color(&row.value)),
            FacetKind::Mentioned => Style::default().fg(theme.mention),
        };
        let prefix = match row.kind {
            FacetKind::Tag => "#",
            FacetKind::Mentioned if row.label() != "anyone" => "@",
            _ => "",
        };

        // The first row of each facet carries the facet name.
        let label = if previous_kind == Some(row.kind) { "" } else { heading };
        previous_kind = Some(row.kind);

        let mut spans = vec![
            Span::styled(format!("{label:<9}"), Style::default().fg(theme.muted)),
            Span::raw(marker),
            Span::styled(format!("{prefix}{}", row.label()), value_style),
        ];
        if checked {
            spans.iter_mut().for_each(|s| s.style = s.style.add_modifier(Modifier::BOLD));
        }
        items.push(ListItem::new(Line::from(spans)));
    }

    let mut list_state = ListState::default();
    if focused && !state.facet_rows.is_empty() {
        list_state.select(Some(state.facet_cursor));
    }
    let list = List::new(items).highlight_style(Style::default().bg(theme.selection_bg));
    frame.render_stateful_widget(list, inner_rect(area), &mut list_state);
}
