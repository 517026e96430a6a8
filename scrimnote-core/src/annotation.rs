//! Mention and tag tokens embedded in comment text.
//!
//! Comments store raw text only. Mentions (`<@Name>`) and tags (`#word`) are
//! re-derived from that text every time they are needed, so everything here
//! is a pure function of its input string.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Number of slots in the tag color palette.
pub const TAG_PALETTE_LEN: usize = 6;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("tag pattern is valid"));

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@([^<>\n]+)>").expect("mention pattern is valid"));

/// Mention and tag alternatives in one pass so tokens never overlap.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<@(?P<mention>[^<>\n]+)>|#(?P<tag>\w+)").expect("token pattern is valid")
});

/// One run of a rendered comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text between tokens, preserved verbatim including whitespace.
    Plain(String),
    /// A `<@Name>` token; holds `Name`.
    Mention(String),
    /// A `#word` token; holds `word`.
    Tag(String),
}

impl Segment {
    /// The raw text this segment was parsed from.
    pub fn source_text(&self) -> String {
        match self {
            Segment::Plain(text) => text.clone(),
            Segment::Mention(name) => format!("<@{name}>"),
            Segment::Tag(word) => format!("#{word}"),
        }
    }
}

/// All distinct `#word` tags in `content`.
///
/// `word` is `\w+`, so punctuation ends a tag: `#site-b` yields `site`.
pub fn extract_tags(content: &str) -> BTreeSet<String> {
    TAG_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_owned())
        .collect()
}

/// All distinct mentioned names in `content`, without the `<@` `>` wrapper.
pub fn extract_mentions(content: &str) -> BTreeSet<String> {
    MENTION_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_owned())
        .collect()
}

/// Returns `true` if `content` contains at least one mention token.
pub fn has_mentions(content: &str) -> bool {
    MENTION_RE.is_match(content)
}

/// Splits `content` into plain, mention and tag segments in source order.
///
/// Concatenating [`Segment::source_text`] over the result reproduces
/// `content` exactly, and splitting that again yields the same segments.
pub fn render_segments(content: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in TOKEN_RE.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > cursor {
            segments.push(Segment::Plain(content[cursor..whole.start()].to_owned()));
        }
        if let Some(name) = caps.name("mention") {
            segments.push(Segment::Mention(name.as_str().to_owned()));
        } else if let Some(word) = caps.name("tag") {
            segments.push(Segment::Tag(word.as_str().to_owned()));
        }
        cursor = whole.end();
    }

    if cursor < content.len() {
        segments.push(Segment::Plain(content[cursor..].to_owned()));
    }
    segments
}

/// Palette slot for `tag`, stable across renders, runs and builds.
pub fn tag_color_index(tag: &str) -> usize {
    let hash = tag
        .chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32));
    hash as usize % TAG_PALETTE_LEN
}
