//! Composer box and its `@` suggestion popup.
//!
//! Shared by the new-comment composer under the list and the edit buffer in
//! the detail pane. Text is shown raw, tokens included, so the caret column
//! matches the buffer.

use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use scrimnote_core::composer::MentionComposer;

use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_composer(
    frame: &mut Frame,
    area: Rect,
    composer: &MentionComposer,
    title: String,
    theme: &Theme,
) {
    frame.render_widget(panel_block(title, true, theme), area);
    let inner = inner_rect(area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let (line, column) = composer.caret_position();
    let scroll = line.saturating_sub(usize::from(inner.height) - 1);
    let text = Text::from(composer.text().split('\n').map(|l| Line::raw(l.to_owned())).collect::<Vec<_>>());
    frame.render_widget(
        Paragraph::new(text).scroll((u16::try_from(scroll).unwrap_or(0), 0)),
        inner,
    );

    let x = inner.x.saturating_add(u16::try_from(column).unwrap_or(u16::MAX));
    let y = inner.y + u16::try_from(line - scroll).unwrap_or(0);
    frame.set_cursor_position(Position { x: x.min(inner.right().saturating_sub(1)), y });

    if composer.popup().is_some() {
        render_popup(frame, area, composer, theme);
    }
}

/// Draws the suggestion list just above `anchor`, or below it when there is
/// no room above.
fn render_popup(frame: &mut Frame, anchor: Rect, composer: &MentionComposer, theme: &Theme) {
    let Some(popup) = composer.popup() else { return };
    let screen = frame.area();

    let names = popup.names();
    let height = if names.is_empty() { 3 } else { names.len() as u16 + 2 };
    let widest = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
    let width = (widest as u16 + 4).max(22).min(screen.width);
    let y = if anchor.y >= height { anchor.y - height } else { anchor.bottom().min(screen.bottom().saturating_sub(height)) };
    let x = anchor.x.min(screen.right().saturating_sub(width));
    let area = Rect { x, y, width, height }.intersection(screen);

    frame.render_widget(Clear, area);
    let block = Block::bordered()
        .title(format!(" @{} ", popup.query()))
        .border_style(Style::default().fg(theme.border_active))
        .style(Style::default().bg(theme.popup_bg));

    if names.is_empty() {
        frame.render_widget(
            Paragraph::new("no matching teammate").style(Style::default().fg(theme.muted)).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = names.iter().map(|n| ListItem::new(n.clone())).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(theme.selection_bg).add_modifier(Modifier::BOLD));
    let mut state = ListState::default().with_selected(Some(popup.selected()));
    frame.render_stateful_widget(list, area, &mut state);
}
