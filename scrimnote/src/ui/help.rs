//! Help overlay renderer.
//!
//! Draws a centred modal over the panels, using `Clear` to erase what is
//! behind it, inside the same `terminal.draw()` closure as everything else.

use ratatui::{
    layout::Constraint,
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

/// Renders the help overlay as a centred modal on top of the panels.
///
/// Skipped on terminals narrower than 60 columns to avoid a zero-height rect.
///
/// # Arguments
///
/// * `frame`: current render frame provided by `terminal.draw()`
/// * `theme`: active color theme (supplies `border_active` for the modal border)
/// * `help_scroll`: vertical scroll offset; j/k in HelpOverlay mode mutate this field
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help · j/k scroll, ? or Esc to dismiss ")
        .border_style(Style::default().fg(theme.border_active))
        .style(Style::default().bg(theme.popup_bg));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Playback"),
        Line::from("  Space         Play / pause"),
        Line::from("  h / l         Seek back / forward 5 seconds"),
        Line::from("  Enter         Seek to the selected comment (resumes auto-scroll)"),
        Line::from(""),
        Line::from("Comments"),
        Line::from("  j / k         Select next / previous"),
        Line::from("  g / G         First / last"),
        Line::from("  Ctrl-d / u    Scroll half page down / up (pauses auto-scroll)"),
        Line::from("  i             New comment at the playhead"),
        Line::from("  e             Edit the selected comment"),
        Line::from("  d             Delete the selected comment"),
        Line::from("  r             Reload from the server"),
        Line::from(""),
        Line::from("Filters"),
        Line::from("  Enter         Toggle the facet under the cursor"),
        Line::from("  c             Clear all filters"),
        Line::from(""),
        Line::from("Composer"),
        Line::from("  @name         Suggest a teammate; Tab or Enter inserts"),
        Line::from("  Up / Down     Move through suggestions"),
        Line::from("  Enter         Post (or save an edit)"),
        Line::from("  Alt-Enter     New line"),
        Line::from("  Esc           Close suggestions, then cancel"),
        Line::from("  Ctrl-← / →    While editing: move the timestamp 1 second"),
        Line::from("  Ctrl-t        While editing: pin to the playhead"),
        Line::from(""),
        Line::from("General"),
        Line::from("  H / L / Tab   Move panel focus"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit (confirms if a draft would be lost)"),
    ])
}
