//! Detail pane: the selected comment in full, or the edit buffer.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
    Frame,
};

use scrimnote_core::annotation::{extract_mentions, extract_tags};
use scrimnote_core::types::format_timestamp;

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::Theme;
use crate::ui::comments_view::annotated_spans;
use crate::ui::composer_view::render_composer;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_detail(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let focused = state.focus == PanelFocus::Detail;

    if state.mode == Mode::Edit {
        if let Some(slot) = state.store.editing() {
            let title = format!(
                " Editing at {} · ^←/^→ ±1s · ^t playhead · Enter saves ",
                format_timestamp(slot.timestamp)
            );
            render_composer(frame, area, &slot.draft, title, theme);
            return;
        }
    }

    frame.render_widget(panel_block(" Detail ", focused, theme), area);
    let inner = inner_rect(area);

    let Some(comment) = state.selected_comment() else {
        frame.render_widget(
            Paragraph::new("Nothing selected").style(Style::default().fg(theme.muted)),
            inner,
        );
        return;
    };

    let label = Style::default().fg(theme.muted);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format_timestamp(comment.timestamp),
                Style::default().fg(theme.timestamp).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(comment.user_name.clone(), Style::default().fg(theme.author)),
        ]),
        Line::from(vec![
            Span::styled("posted  ", label),
            Span::raw(comment.created_at.strftime("%Y-%m-%d %H:%M").to_string()),
        ]),
    ];
    if comment.updated_at != comment.created_at {
        lines.push(Line::from(vec![
            Span::styled("edited  ", label),
            Span::raw(comment.updated_at.strftime("%Y-%m-%d %H:%M").to_string()),
        ]));
    }
    lines.push(Line::default());
    lines.extend(comment.content.split('\n').map(|l| Line::from(annotated_spans(l, theme))));
    lines.push(Line::default());

    let tags = extract_tags(&comment.content);
    if !tags.is_empty() {
        let mut spans = vec![Span::styled("tags    ", label)];
        for tag in &tags {
            spans.push(Span::styled(format!("#{tag} "), Style::default().fg(theme.tag_color(tag))));
        }
        lines.push(Line::from(spans));
    }
    let mentions = extract_mentions(&comment.content);
    if !mentions.is_empty() {
        let names: Vec<String> = mentions.iter().map(|m| format!("@{m}")).collect();
        lines.push(Line::from(vec![
            Span::styled("mentions ", label),
            Span::styled(names.join(" "), Style::default().fg(theme.mention)),
        ]));
    }

    let mut actions = vec!["Enter seek"];
    if state.store.can_edit(&state.identity, comment.id) {
        actions.push("e edit");
    }
    if state.store.can_delete(&state.identity, comment.id) {
        actions.push("d delete");
    }
    if state.store.is_deleting(comment.id) {
        actions = vec!["delete in progress"];
    }
    lines.push(Line::default());
    lines.push(Line::styled(actions.join(" · "), label));

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .scroll((state.detail_scroll, 0)),
        inner,
    );
}
