use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned comment identifier.
pub type CommentId = u64;

/// Opaque reference to the scrim (recorded match) a comment belongs to.
///
/// The API is not consistent about the JSON type of this field, so both
/// strings and integers are accepted on the way in. It is always sent back
/// as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ScrimId(String);

impl ScrimId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScrimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ScrimId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => ScrimId(s),
            Raw::Number(n) => ScrimId(n.to_string()),
        })
    }
}

/// A remark pinned to one playback second of a scrim recording.
///
/// `content` is the single source of truth for both display and tokens:
/// mentions and tags are re-derived from it on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub scrim_id: ScrimId,
    pub timestamp: u32,       // playback seconds
    pub user_name: String,
    pub content: String,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

/// Body of `POST /` when creating a comment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub scrim_id: ScrimId,
    pub timestamp: u32,
    pub content: String,
}

/// Body of `PUT /{id}`. Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u32>,
}

impl CommentPatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.timestamp.is_none()
    }
}

/// A roster member offered by the mention composer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MentionUser {
    #[serde(rename = "displayName")]
    pub name: String,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
}

/// Operator role as supplied by the identity collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Coach,
    Admin,
}

impl Role {
    /// Coaches and admins may edit and delete anyone's comments.
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::Coach | Role::Admin)
    }
}

/// The operator currently using the view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

impl Identity {
    pub fn can_edit(&self, comment: &Comment) -> bool {
        self.role.is_elevated() || comment.user_name == self.username
    }

    pub fn can_delete(&self, comment: &Comment) -> bool {
        self.role.is_elevated() || comment.user_name == self.username
    }
}

/// Formats playback seconds as `m:ss`, or `h:mm:ss` past the hour.
pub fn format_timestamp(seconds: u32) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

#[cfg(test)]
pub(crate) fn comment(id: CommentId, timestamp: u32, user_name: &str, content: &str) -> Comment {
    Comment {
        id,
        scrim_id: ScrimId::new("scrim-1"),
        timestamp,
        user_name: user_name.to_owned(),
        content: content.to_owned(),
        created_at: jiff::Timestamp::UNIX_EPOCH,
        updated_at: jiff::Timestamp::UNIX_EPOCH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_decodes_camel_case_and_numeric_scrim_id() {
        let json = r#"{
            "id": 7,
            "scrimId": 42,
            "timestamp": 95,
            "userName": "mika",
            "content": "nice #retake",
            "createdAt": "2024-05-01T12:00:00Z",
            "updatedAt": "2024-05-01T12:05:00Z"
        }"#;
        let c: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(c.id, 7);
        assert_eq!(c.scrim_id.as_str(), "42");
        assert_eq!(c.user_name, "mika");
        assert_eq!(c.timestamp, 95);
    }

    #[test]
    fn patch_omits_absent_fields() {
        let patch = CommentPatch { content: None, timestamp: Some(12) };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"timestamp":12}"#);
        assert!(CommentPatch::default().is_empty());
    }

    #[test]
    fn elevated_roles_may_edit_others() {
        let c = comment(1, 0, "mika", "hi");
        let member = Identity { username: "jo".into(), role: Role::Member };
        let author = Identity { username: "mika".into(), role: Role::Member };
        let coach = Identity { username: "jo".into(), role: Role::Coach };
        assert!(!member.can_edit(&c));
        assert!(!member.can_delete(&c));
        assert!(author.can_edit(&c));
        assert!(coach.can_delete(&c));
    }

    #[test]
    fn timestamps_format_as_clock() {
        assert_eq!(format_timestamp(0), "0:00");
        assert_eq!(format_timestamp(95), "1:35");
        assert_eq!(format_timestamp(3725), "1:02:05");
    }
}
