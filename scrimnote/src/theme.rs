//! Color theme system for scrimnote.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI surface
//! scrimnote renders. Two built-in themes are provided:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal, including
//!   256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette in RGB and needs truecolor.

use ratatui::style::Color;

use scrimnote_core::annotation::{tag_color_index, TAG_PALETTE_LEN};

/// All color values used across scrimnote's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the currently focused panel.
    pub border_active: Color,
    /// Border color for unfocused panels.
    pub border_inactive: Color,

    // Comment list
    /// Background of the comment under the playhead.
    pub highlight_bg: Color,
    /// Background of the keyboard-selected row.
    pub selection_bg: Color,
    pub timestamp: Color,
    pub author: Color,
    /// Secondary text: edit markers, empty-list hints, facet counts.
    pub muted: Color,

    // Annotations
    pub mention: Color,
    /// Tag colors, indexed by [`tag_color_index`].
    pub tag_palette: [Color; TAG_PALETTE_LEN],

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator color in NORMAL mode.
    pub status_mode_normal: Color,
    /// Mode indicator color while composing or editing.
    pub status_mode_insert: Color,
    /// Failure notices.
    pub notice_error: Color,

    // General
    /// Suggestion popup and modal backgrounds.
    pub popup_bg: Color,
    pub background: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            highlight_bg: Color::Blue,
            selection_bg: Color::DarkGray,
            timestamp: Color::Yellow,
            author: Color::Cyan,
            muted: Color::DarkGray,

            mention: Color::LightBlue,
            tag_palette: [
                Color::Green,
                Color::Magenta,
                Color::Yellow,
                Color::Cyan,
                Color::LightRed,
                Color::LightGreen,
            ],

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,
            notice_error: Color::Red,

            popup_bg: Color::Black,
            background: Color::Reset,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let peach = Color::Rgb(250, 179, 135); // #fab387
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface0 = Color::Rgb(49, 50, 68); // #313244
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let mantle = Color::Rgb(24, 24, 37); // #181825
        let base = Color::Rgb(30, 30, 46); // #1e1e2e
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            highlight_bg: surface1,
            selection_bg: surface0,
            timestamp: peach,
            author: lavender,
            muted: overlay1,

            mention: blue,
            tag_palette: [green, mauve, yellow, teal, red, peach],

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,
            notice_error: red,

            popup_bg: mantle,
            background: base,
        }
    }

    /// Stable color for `tag`.
    pub fn tag_color(&self, tag: &str) -> Color {
        self.tag_palette[tag_color_index(tag)]
    }

    /// Resolves a theme name from config to a built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup. The fallback is logged.
    ///
    /// # Arguments
    ///
    /// * `name`: theme name from config, e.g. `"dark"` or `"catppuccin-mocha"`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "Unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_colors_are_stable_per_name() {
        let theme = Theme::dark();
        assert_eq!(theme.tag_color("retake"), theme.tag_color("retake"));
        assert_eq!(theme.tag_color("a"), Color::Magenta);
    }

    #[test]
    fn unknown_theme_falls_back_to_dark() {
        assert_eq!(Theme::from_name("solarized").border_active, Theme::dark().border_active);
        assert_eq!(Theme::from_name("catppuccin_mocha").popup_bg, Color::Rgb(24, 24, 37));
    }
}
