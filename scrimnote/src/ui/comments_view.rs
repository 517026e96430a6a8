//! Comment list renderer.
//!
//! Each comment occupies exactly [`comment_rows`] lines (header, one line per
//! content line, blank spacer) with no wrapping, so the geometry handed to the
//! highlight controller matches what is drawn. The vertical offset comes from
//! the controller's scroll tracker, never from the widget.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

use scrimnote_core::annotation::{render_segments, Segment};
use scrimnote_core::types::{format_timestamp, Comment};

use crate::app::{comment_rows, AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_comments(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let inner = inner_rect(area);
    state.set_comments_viewport(inner.height);
    state.list_area = inner;

    let scroll = state.engine.highlight().scroll();
    let mut title = format!(" Comments · scrim {} ", state.scrim_label());
    if scroll.user_scrolled() {
        title.push_str("· follow paused ");
    }
    let focused = state.focus == PanelFocus::Comments;
    frame.render_widget(panel_block(title, focused, theme), area);

    if !state.store.is_loaded() {
        frame.render_widget(Paragraph::new("Loading comments…").style(Style::default().fg(theme.muted)), inner);
        return;
    }
    if state.visible.is_empty() {
        let hint = if state.selection.is_empty() {
            "No comments yet. Press i to add one at the playhead."
        } else {
            "No comments match the current filters. Press c to clear them."
        };
        frame.render_widget(Paragraph::new(hint).style(Style::default().fg(theme.muted)), inner);
        return;
    }

    let highlighted = state.engine.highlight().highlighted();
    let mut lines: Vec<Line<'static>> = Vec::new();
    for comment in &state.visible {
        let row_style = if highlighted == Some(comment.id) {
            Style::default().bg(theme.highlight_bg)
        } else if state.selected == Some(comment.id) && focused {
            Style::default().bg(theme.selection_bg)
        } else {
            Style::default()
        };
        let deleting = state.store.is_deleting(comment.id);
        lines.extend(comment_lines(comment, theme, row_style, deleting));
    }

    let offset = scroll.offset().min(state.layout.max_offset());
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(Text::from(lines)).scroll((offset, 0)), inner);
}

/// Lines for one comment, exactly [`comment_rows`] of them.
pub fn comment_lines(
    comment: &Comment,
    theme: &Theme,
    row_style: Style,
    deleting: bool,
) -> Vec<Line<'static>> {
    let mut header = vec![
        Span::styled(
            format!("{:>7}", format_timestamp(comment.timestamp)),
            Style::default().fg(theme.timestamp).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(comment.user_name.clone(), Style::default().fg(theme.author)),
    ];
    if comment.updated_at != comment.created_at {
        header.push(Span::styled(" (edited)", Style::default().fg(theme.muted)));
    }
    if deleting {
        header.push(Span::styled(" deleting…", Style::default().fg(theme.notice_error)));
    }

    let mut lines = Vec::with_capacity(comment_rows(comment));
    lines.push(Line::from(header).style(row_style));
    for text_line in comment.content.split('\n') {
        let mut spans = vec![Span::raw("         ")];
        spans.extend(annotated_spans(text_line, theme));
        lines.push(Line::from(spans).style(row_style));
    }
    lines.push(Line::default());
    lines
}

/// Styled spans for one line of comment text.
pub fn annotated_spans(text: &str, theme: &Theme) -> Vec<Span<'static>> {
    render_segments(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(plain) => Span::raw(plain),
            Segment::Mention(name) => Span::styled(
                format!("@{name}"),
                Style::default().fg(theme.mention).add_modifier(Modifier::BOLD),
            ),
            Segment::Tag(word) => {
                let color = theme.tag_color(&word);
                Span::styled(format!("#{word}"), Style::default().fg(color))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrimnote_core::types::ScrimId;

    fn comment(content: &str) -> Comment {
        Comment {
            id: 1,
            scrim_id: ScrimId::new("s"),
            timestamp: 83,
            user_name: "jo".into(),
            content: content.into(),
            created_at: jiff::Timestamp::UNIX_EPOCH,
            updated_at: jiff::Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn line_count_matches_layout_rows() {
        let theme = Theme::dark();
        for content in ["one", "two\nlines", "a\n\nb #eco"] {
            let c = comment(content);
            assert_eq!(comment_lines(&c, &theme, Style::default(), false).len(), comment_rows(&c));
        }
    }

    #[test]
    fn tokens_render_as_display_text() {
        let theme = Theme::dark();
        let spans = annotated_spans("<@Ana Lee> hold #site-b", &theme);
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "@Ana Lee hold #site-b");
        assert_eq!(spans[0].style.fg, Some(theme.mention));
        assert_eq!(spans[2].style.fg, Some(theme.tag_color("site")));
    }
}
