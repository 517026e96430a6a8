//! Multi-line comment input with `@` mention suggestions.
//!
//! The composer is a text buffer plus a caret. After every edit it looks at
//! the text before the caret: an `@partial` run there opens a suggestion list
//! of roster names; picking one rewrites the run into a `<@Name> ` token.

use crate::types::MentionUser;

/// Maximum number of names offered at once.
pub const MAX_SUGGESTIONS: usize = 8;

/// Finds the `@partial` run the caret is currently completing.
///
/// `before` is the text left of the caret. Returns the byte offset of the
/// `@` and the partial name after it. Returns `None` while the caret sits
/// inside an unterminated `<@` token, after a completed token, or once
/// whitespace separates the `@` from the caret.
pub fn mention_query(before: &str) -> Option<(usize, &str)> {
    if let Some(open) = before.rfind("<@") {
        if !before[open..].contains('>') {
            return None;
        }
    }
    let at = before.rfind('@')?;
    if before[..at].ends_with('<') {
        return None;
    }
    let run = &before[at + 1..];
    if run.chars().any(char::is_whitespace) {
        return None;
    }
    Some((at, run))
}

/// Roster names containing `query`, case-insensitively, capped.
pub fn suggest<'a>(roster: &'a [MentionUser], query: &str) -> Vec<&'a MentionUser> {
    let needle = query.to_lowercase();
    roster
        .iter()
        .filter(|u| u.name.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Open suggestion popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    anchor: usize,
    query: String,
    names: Vec<String>,
    selected: usize,
}

impl Suggestions {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn selected(&self) -> usize {
        self.selected
    }
}

/// What Enter did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterOutcome {
    /// The popup consumed the key and inserted a mention.
    Selected,
    /// Non-blank text is ready to send.
    Submit(String),
    /// Blank text; nothing happens.
    Inert,
}

/// What Escape did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeOutcome {
    ClosedPopup,
    /// No popup was open; the host should leave compose/edit mode.
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub struct MentionComposer {
    text: String,
    caret: usize, // byte offset, always on a char boundary
    roster: Vec<MentionUser>,
    popup: Option<Suggestions>,
}

impl MentionComposer {
    pub fn new(roster: Vec<MentionUser>) -> Self {
        Self { roster, ..Self::default() }
    }

    /// Seeds the buffer (e.g. with a comment being edited), caret at the end.
    pub fn with_text(roster: Vec<MentionUser>, text: &str) -> Self {
        let mut composer = Self::new(roster);
        composer.set_text(text);
        composer
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn popup(&self) -> Option<&Suggestions> {
        self.popup.as_ref()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn set_roster(&mut self, roster: Vec<MentionUser>) {
        self.roster = roster;
        self.refresh_popup();
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
        self.caret = self.text.len();
        self.refresh_popup();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.caret = 0;
        self.popup = None;
    }

    /// Number of lines the input needs (it grows with content).
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Caret as (line, column in chars).
    pub fn caret_position(&self) -> (usize, usize) {
        let before = &self.text[..self.caret];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        (line, before[line_start..].chars().count())
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.caret, c);
        self.caret += c.len_utf8();
        self.refresh_popup();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        let Some(prev) = self.prev_boundary() else { return };
        self.text.replace_range(prev..self.caret, "");
        self.caret = prev;
        self.refresh_popup();
    }

    pub fn delete(&mut self) {
        let Some(next) = self.next_boundary() else { return };
        self.text.replace_range(self.caret..next, "");
        self.refresh_popup();
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.caret = prev;
        }
        self.popup = None;
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.caret = next;
        }
        self.popup = None;
    }

    pub fn move_home(&mut self) {
        self.caret = self.text[..self.caret].rfind('\n').map_or(0, |i| i + 1);
        self.popup = None;
    }

    pub fn move_end(&mut self) {
        self.caret = self.text[self.caret..]
            .find('\n')
            .map_or(self.text.len(), |i| self.caret + i);
        self.popup = None;
    }

    /// Moves the popup highlight. Returns `false` when no popup is open.
    pub fn select_next(&mut self) -> bool {
        let Some(popup) = &mut self.popup else { return false };
        popup.selected = (popup.selected + 1) % popup.names.len();
        true
    }

    pub fn select_prev(&mut self) -> bool {
        let Some(popup) = &mut self.popup else { return false };
        popup.selected = popup.selected.checked_sub(1).unwrap_or(popup.names.len() - 1);
        true
    }

    /// Replaces the `@partial` run with `<@Name> ` and closes the popup.
    pub fn accept_suggestion(&mut self) -> bool {
        let Some(popup) = self.popup.take() else { return false };
        let Some(name) = popup.names.get(popup.selected) else { return false };
        let token = format!("<@{name}> ");
        self.text.replace_range(popup.anchor..self.caret, &token);
        self.caret = popup.anchor + token.len();
        true
    }

    pub fn press_enter(&mut self) -> EnterOutcome {
        if self.accept_suggestion() {
            EnterOutcome::Selected
        } else if self.is_blank() {
            EnterOutcome::Inert
        } else {
            EnterOutcome::Submit(self.text.clone())
        }
    }

    pub fn press_escape(&mut self) -> EscapeOutcome {
        if self.popup.take().is_some() {
            EscapeOutcome::ClosedPopup
        } else {
            EscapeOutcome::Cancel
        }
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.caret].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.caret..]
            .chars()
            .next()
            .map(|c| self.caret + c.len_utf8())
    }

    fn refresh_popup(&mut self) {
        let Some((anchor, query)) = mention_query(&self.text[..self.caret]) else {
            self.popup = None;
            return;
        };
        let names: Vec<String> = suggest(&self.roster, query)
            .into_iter()
            .map(|u| u.name.clone())
            .collect();
        if names.is_empty() {
            self.popup = None;
            return;
        }
        let selected = match &self.popup {
            Some(old) if old.anchor == anchor => old.selected.min(names.len() - 1),
            _ => 0,
        };
        self.popup = Some(Suggestions { anchor, query: query.to_owned(), names, selected });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<MentionUser> {
        ["Ana Lee", "Bram", "anakin", "Jo", "Joanna"]
            .into_iter()
            .map(|n| MentionUser { name: n.to_owned(), avatar_url: None })
            .collect()
    }

    fn type_str(c: &mut MentionComposer, s: &str) {
        for ch in s.chars() {
            c.insert_char(ch);
        }
    }

    #[test]
    fn query_detection_rules() {
        assert_eq!(mention_query("hey @an"), Some((4, "an")));
        assert_eq!(mention_query("@"), Some((0, "")));
        assert_eq!(mention_query("hey @an "), None);
        assert_eq!(mention_query("hey <@Ana Le"), None);
        assert_eq!(mention_query("hey <@Ana Lee>"), None);
        assert_eq!(mention_query("<@Ana Lee> @b"), Some((11, "b")));
        assert_eq!(mention_query("no mention"), None);
    }

    #[test]
    fn suggestions_are_case_insensitive_and_capped() {
        let roster = roster();
        let names: Vec<_> = suggest(&roster, "AN").iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Ana Lee", "anakin", "Joanna"]);

        let many: Vec<MentionUser> = (0..20)
            .map(|i| MentionUser { name: format!("player{i}"), avatar_url: None })
            .collect();
        assert_eq!(suggest(&many, "player").len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn typing_at_opens_popup_and_accept_inserts_token() {
        let mut c = MentionComposer::new(roster());
        type_str(&mut c, "nice @ana");
        let popup = c.popup().expect("popup open");
        assert_eq!(popup.query(), "ana");
        assert_eq!(popup.names(), &["Ana Lee", "anakin"]);

        assert!(c.select_next());
        assert_eq!(c.press_enter(), EnterOutcome::Selected);
        assert_eq!(c.text(), "nice <@anakin> ");
        assert_eq!(c.caret(), c.text().len());
        assert!(c.popup().is_none());
    }

    #[test]
    fn accept_replaces_only_the_partial_span() {
        let mut c = MentionComposer::with_text(roster(), "a @br tail");
        // caret after "a @br"
        for _ in 0..5 {
            c.move_left();
        }
        c.backspace();
        c.insert_char('r');
        assert_eq!(c.popup().unwrap().names(), &["Bram"]);
        c.accept_suggestion();
        assert_eq!(c.text(), "a <@Bram>  tail");
        assert_eq!(&c.text()[..c.caret()], "a <@Bram> ");
    }

    #[test]
    fn no_popup_inside_unterminated_token() {
        let mut c = MentionComposer::new(roster());
        type_str(&mut c, "<@An");
        assert!(c.popup().is_none());
    }

    #[test]
    fn enter_submits_non_blank_text_only() {
        let mut c = MentionComposer::new(roster());
        assert_eq!(c.press_enter(), EnterOutcome::Inert);
        type_str(&mut c, "   ");
        assert_eq!(c.press_enter(), EnterOutcome::Inert);
        type_str(&mut c, "rotate");
        assert_eq!(c.press_enter(), EnterOutcome::Submit("   rotate".into()));
    }

    #[test]
    fn escape_closes_popup_before_cancelling() {
        let mut c = MentionComposer::new(roster());
        type_str(&mut c, "@jo");
        assert_eq!(c.press_escape(), EscapeOutcome::ClosedPopup);
        assert_eq!(c.press_escape(), EscapeOutcome::Cancel);
    }

    #[test]
    fn popup_selection_wraps() {
        let mut c = MentionComposer::new(roster());
        type_str(&mut c, "@jo");
        assert_eq!(c.popup().unwrap().names().len(), 2);
        assert!(c.select_prev());
        assert_eq!(c.popup().unwrap().selected(), 1);
        assert!(c.select_next());
        assert_eq!(c.popup().unwrap().selected(), 0);
    }

    #[test]
    fn multiline_caret_navigation() {
        let mut c = MentionComposer::new(Vec::new());
        type_str(&mut c, "first");
        c.insert_newline();
        type_str(&mut c, "sé");
        assert_eq!(c.line_count(), 2);
        assert_eq!(c.caret_position(), (1, 2));
        c.move_home();
        assert_eq!(c.caret_position(), (1, 0));
        c.move_left();
        assert_eq!(c.caret_position(), (0, 5));
        c.move_end();
        assert_eq!(c.caret_position(), (0, 5));
        c.move_right();
        c.move_right();
        c.delete();
        assert_eq!(c.text(), "first\ns");
    }
}
