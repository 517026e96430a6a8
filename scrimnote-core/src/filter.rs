//! Author x tag x mentioned-user filtering of the comment list.
//!
//! Facets combine with AND; values inside one facet combine with OR. An empty
//! facet places no constraint. Facet options are always derived from the
//! unfiltered collection so choices never vanish while a filter is applied.

use std::collections::BTreeSet;

use crate::annotation::{extract_mentions, extract_tags, has_mentions};
use crate::types::Comment;

/// Sentinel in [`FilterSelection::mentioned`] meaning "mentions anyone".
pub const ALL_MENTIONED: &str = "__all__";

/// The user's current filter choices. Ephemeral, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub author: Option<String>,
    pub tags: BTreeSet<String>,
    pub mentioned: BTreeSet<String>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.author.is_none() && self.tags.is_empty() && self.mentioned.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Author is single-select: choosing the current author clears it.
    pub fn toggle_author(&mut self, name: &str) {
        if self.author.as_deref() == Some(name) {
            self.author = None;
        } else {
            self.author = Some(name.to_owned());
        }
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.tags.remove(tag) {
            self.tags.insert(tag.to_owned());
        }
    }

    pub fn toggle_mentioned(&mut self, name: &str) {
        if !self.mentioned.remove(name) {
            self.mentioned.insert(name.to_owned());
        }
    }

    /// Returns `true` if `comment` passes every facet.
    pub fn matches(&self, comment: &Comment) -> bool {
        if let Some(author) = &self.author {
            if &comment.user_name != author {
                return false;
            }
        }

        if !self.mentioned.is_empty() {
            let keep = if self.mentioned.contains(ALL_MENTIONED) {
                has_mentions(&comment.content)
            } else {
                extract_mentions(&comment.content)
                    .iter()
                    .any(|name| self.mentioned.contains(name))
            };
            if !keep {
                return false;
            }
        }

        if !self.tags.is_empty() {
            let tags = extract_tags(&comment.content);
            if tags.is_disjoint(&self.tags) {
                return false;
            }
        }

        true
    }
}

/// Applies `selection` to `comments`, keeping their original order.
pub fn filter_comments(comments: &[Comment], selection: &FilterSelection) -> Vec<Comment> {
    if selection.is_empty() {
        return comments.to_vec();
    }
    comments
        .iter()
        .filter(|c| selection.matches(c))
        .cloned()
        .collect()
}

/// Every value each facet can take, derived from the unfiltered list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetOptions {
    pub all_users: Vec<String>,
    pub all_tags: Vec<String>,
    pub all_mentioned_users: Vec<String>,
}

impl FacetOptions {
    pub fn from_comments(comments: &[Comment]) -> Self {
        let mut users = BTreeSet::new();
        let mut tags = BTreeSet::new();
        let mut mentioned = BTreeSet::new();
        for c in comments {
            users.insert(c.user_name.clone());
            tags.extend(extract_tags(&c.content));
            mentioned.extend(extract_mentions(&c.content));
        }
        Self {
            all_users: users.into_iter().collect(),
            all_tags: tags.into_iter().collect(),
            all_mentioned_users: mentioned.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::comment;

    fn ids(comments: &[Comment]) -> Vec<u64> {
        comments.iter().map(|c| c.id).collect()
    }

    fn sample() -> Vec<Comment> {
        vec![
            comment(1, 10, "x", "force buy #eco"),
            comment(2, 20, "y", "#eco again <@x>"),
            comment(3, 30, "x", "#exec b <@Ana Lee>"),
            comment(4, 40, "z", "no tokens"),
        ]
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let all = sample();
        assert_eq!(ids(&filter_comments(&all, &FilterSelection::default())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn facets_combine_with_and() {
        let mut sel = FilterSelection::default();
        sel.toggle_author("x");
        sel.toggle_tag("eco");
        assert_eq!(ids(&filter_comments(&sample(), &sel)), vec![1]);
    }

    #[test]
    fn values_within_a_facet_combine_with_or() {
        let mut sel = FilterSelection::default();
        sel.toggle_tag("eco");
        sel.toggle_tag("exec");
        assert_eq!(ids(&filter_comments(&sample(), &sel)), vec![1, 2, 3]);
    }

    #[test]
    fn all_sentinel_keeps_any_mention() {
        let mut sel = FilterSelection::default();
        sel.toggle_mentioned(ALL_MENTIONED);
        assert_eq!(ids(&filter_comments(&sample(), &sel)), vec![2, 3]);

        sel.clear();
        sel.toggle_mentioned("Ana Lee");
        assert_eq!(ids(&filter_comments(&sample(), &sel)), vec![3]);
    }

    #[test]
    fn author_toggle_is_single_select() {
        let mut sel = FilterSelection::default();
        sel.toggle_author("x");
        sel.toggle_author("y");
        assert_eq!(sel.author.as_deref(), Some("y"));
        sel.toggle_author("y");
        assert!(sel.is_empty());
    }

    #[test]
    fn options_come_from_unfiltered_list() {
        let opts = FacetOptions::from_comments(&sample());
        assert_eq!(opts.all_users, vec!["x", "y", "z"]);
        assert_eq!(opts.all_tags, vec!["eco", "exec"]);
        assert_eq!(opts.all_mentioned_users, vec!["Ana Lee", "x"]);
    }
}
