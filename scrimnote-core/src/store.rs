//! Comment store: the single writer of the local comment collection.
//!
//! Writes never patch the local list. Each mutation goes to the server and
//! is followed by a full re-fetch, and the caller swaps the fresh list in with
//! [`CommentStore::replace`]. The store also owns the exclusive editing slot
//! and remembers which comments have a delete in flight.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::api::CommentApi;
use crate::composer::MentionComposer;
use crate::error::{Error, Result};
use crate::types::{Comment, CommentId, CommentPatch, Identity, MentionUser, NewComment, ScrimId};

/// Tracing target for store operations.
pub const TRACING_TARGET: &str = "scrimnote_core::store";

/// Request/replace operations for one scrim.
///
/// Cheap to clone; each clone shares the same API client, so the host can
/// move one into every spawned request.
#[derive(Clone)]
pub struct CommentSync {
    api: Arc<dyn CommentApi>,
    scrim_id: ScrimId,
}

impl CommentSync {
    pub fn new(api: Arc<dyn CommentApi>, scrim_id: ScrimId) -> Self {
        Self { api, scrim_id }
    }

    pub fn scrim_id(&self) -> &ScrimId {
        &self.scrim_id
    }

    pub async fn list(&self) -> Result<Vec<Comment>> {
        self.api.list(&self.scrim_id).await
    }

    /// Creates a comment at `timestamp`, then returns the re-fetched list.
    pub async fn create(&self, timestamp: u32, content: &str) -> Result<Vec<Comment>> {
        if content.trim().is_empty() {
            return Err(Error::EmptyContent);
        }
        let new = NewComment {
            scrim_id: self.scrim_id.clone(),
            timestamp,
            content: content.to_owned(),
        };
        let created = self.api.create(&new).await?;
        tracing::info!(target: TRACING_TARGET, id = created.id, timestamp, "Comment created");
        self.list().await
    }

    /// Applies `patch` to `id`, then returns the re-fetched list.
    pub async fn update(&self, id: CommentId, patch: CommentPatch) -> Result<Vec<Comment>> {
        if patch.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(Error::EmptyContent);
        }
        if !patch.is_empty() {
            self.api.update(id, &patch).await?;
            tracing::info!(target: TRACING_TARGET, id, "Comment updated");
        }
        self.list().await
    }

    /// Deletes `id`, then returns the re-fetched list.
    pub async fn remove(&self, id: CommentId) -> Result<Vec<Comment>> {
        self.api.remove(id).await?;
        tracing::info!(target: TRACING_TARGET, id, "Comment deleted");
        self.list().await
    }
}

/// The single comment currently being edited.
#[derive(Debug, Clone)]
pub struct EditSlot {
    id: CommentId,
    pub draft: MentionComposer,
    pub timestamp: u32,
}

impl EditSlot {
    pub fn id(&self) -> CommentId {
        self.id
    }

    /// Only the fields that differ from `original`.
    pub fn patch(&self, original: &Comment) -> CommentPatch {
        CommentPatch {
            content: (self.draft.text() != original.content).then(|| self.draft.text().to_owned()),
            timestamp: (self.timestamp != original.timestamp).then_some(self.timestamp),
        }
    }
}

#[derive(Debug, Default)]
pub struct CommentStore {
    comments: Vec<Comment>,
    detail: HashMap<CommentId, Comment>,
    editing: Option<EditSlot>,
    deleting: HashSet<CommentId>,
    loaded: bool,
}

impl CommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All comments in server order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// `true` once the first list has arrived.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Cached detail for `id` from the latest fetch.
    pub fn get(&self, id: CommentId) -> Option<&Comment> {
        self.detail.get(&id)
    }

    /// Swaps in a freshly fetched list.
    ///
    /// Ids that vanished are pruned from the detail cache and the deleting
    /// set, and an edit of a vanished comment is dropped.
    pub fn replace(&mut self, comments: Vec<Comment>) {
        self.detail = comments.iter().map(|c| (c.id, c.clone())).collect();
        self.deleting.retain(|id| self.detail.contains_key(id));
        if let Some(slot) = &self.editing {
            if !self.detail.contains_key(&slot.id) {
                tracing::debug!(target: TRACING_TARGET, id = slot.id, "Edited comment vanished, dropping edit");
                self.editing = None;
            }
        }
        self.comments = comments;
        self.loaded = true;
    }

    pub fn can_edit(&self, identity: &Identity, id: CommentId) -> bool {
        !self.deleting.contains(&id) && self.get(id).is_some_and(|c| identity.can_edit(c))
    }

    pub fn can_delete(&self, identity: &Identity, id: CommentId) -> bool {
        !self.deleting.contains(&id) && self.get(id).is_some_and(|c| identity.can_delete(c))
    }

    /// Enters edit mode for `id`.
    ///
    /// Any other comment's unsaved edit is discarded without notice. Asking
    /// again for the comment already being edited keeps its draft.
    pub fn begin_edit(
        &mut self,
        id: CommentId,
        identity: &Identity,
        roster: Vec<MentionUser>,
    ) -> Result<&mut EditSlot> {
        let comment = self.get(id).ok_or(Error::NotFound(id))?;
        if !self.can_edit(identity, id) {
            return Err(Error::Forbidden("edit"));
        }

        let keep = self.editing.as_ref().is_some_and(|slot| slot.id == id);
        if !keep {
            if let Some(previous) = &self.editing {
                tracing::debug!(target: TRACING_TARGET, discarded = previous.id, id, "Switching edit target");
            }
            let slot = EditSlot {
                id,
                draft: MentionComposer::with_text(roster, &comment.content),
                timestamp: comment.timestamp,
            };
            self.editing = Some(slot);
        }
        self.editing.as_mut().ok_or(Error::NotFound(id))
    }

    pub fn editing(&self) -> Option<&EditSlot> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut EditSlot> {
        self.editing.as_mut()
    }

    pub fn cancel_edit(&mut self) -> Option<EditSlot> {
        self.editing.take()
    }

    /// Records that a delete of `id` is in flight. Edits of it stop here.
    pub fn mark_deleting(&mut self, id: CommentId, identity: &Identity) -> Result<()> {
        self.get(id).ok_or(Error::NotFound(id))?;
        if !self.can_delete(identity, id) {
            return Err(Error::Forbidden("delete"));
        }
        self.deleting.insert(id);
        if self.editing.as_ref().is_some_and(|slot| slot.id == id) {
            self.editing = None;
        }
        Ok(())
    }

    /// Forgets an in-flight delete, e.g. after it failed.
    pub fn clear_deleting(&mut self, id: CommentId) {
        self.deleting.remove(&id);
    }

    pub fn is_deleting(&self, id: CommentId) -> bool {
        self.deleting.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::{comment, Role};

    /// Server stand-in that assigns ids and can be told to fail.
    #[derive(Default)]
    struct MemoryApi {
        rows: Mutex<Vec<Comment>>,
        fail: Mutex<bool>,
    }

    impl MemoryApi {
        fn check(&self, operation: &'static str) -> Result<()> {
            if *self.fail.lock().unwrap() {
                return Err(Error::Rejected { operation, message: "HTTP 500".into() });
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl CommentApi for MemoryApi {
        async fn list(&self, scrim_id: &ScrimId) -> Result<Vec<Comment>> {
            self.check("load comments")?;
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|c| &c.scrim_id == scrim_id)
                .cloned()
                .collect())
        }

        async fn create(&self, new: &NewComment) -> Result<Comment> {
            self.check("create comment")?;
            let mut rows = self.rows.lock().unwrap();
            let mut c = comment(rows.len() as u64 + 1, new.timestamp, "mika", &new.content);
            c.scrim_id = new.scrim_id.clone();
            rows.push(c.clone());
            Ok(c)
        }

        async fn update(&self, id: CommentId, patch: &CommentPatch) -> Result<Comment> {
            self.check("update comment")?;
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|c| c.id == id).ok_or(Error::NotFound(id))?;
            if let Some(content) = &patch.content {
                row.content = content.clone();
            }
            if let Some(ts) = patch.timestamp {
                row.timestamp = ts;
            }
            Ok(row.clone())
        }

        async fn remove(&self, id: CommentId) -> Result<()> {
            self.check("delete comment")?;
            self.rows.lock().unwrap().retain(|c| c.id != id);
            Ok(())
        }
    }

    fn mika() -> Identity {
        Identity { username: "mika".into(), role: Role::Member }
    }

    fn sync(api: &Arc<MemoryApi>) -> CommentSync {
        CommentSync::new(api.clone(), ScrimId::new("scrim-1"))
    }

    #[tokio::test]
    async fn every_write_returns_fresh_list() {
        let api = Arc::new(MemoryApi::default());
        let sync = sync(&api);
        let mut store = CommentStore::new();

        store.replace(sync.create(12, "first #eco").await.unwrap());
        store.replace(sync.create(40, "second").await.unwrap());
        assert_eq!(store.comments().len(), 2);

        let patch = CommentPatch { content: Some("edited".into()), timestamp: None };
        store.replace(sync.update(1, patch).await.unwrap());
        assert_eq!(store.get(1).unwrap().content, "edited");

        store.replace(sync.remove(2).await.unwrap());
        assert_eq!(store.comments().len(), 1);
        assert!(store.get(2).is_none());
    }

    #[tokio::test]
    async fn blank_content_is_never_sent() {
        let api = Arc::new(MemoryApi::default());
        let sync = sync(&api);
        assert!(matches!(sync.create(0, "  \n ").await, Err(Error::EmptyContent)));
        assert!(api.rows.lock().unwrap().is_empty());

        let patch = CommentPatch { content: Some(" ".into()), timestamp: None };
        assert!(matches!(sync.update(1, patch).await, Err(Error::EmptyContent)));
    }

    #[tokio::test]
    async fn failed_write_leaves_store_untouched() {
        let api = Arc::new(MemoryApi::default());
        let sync = sync(&api);
        let mut store = CommentStore::new();
        store.replace(sync.create(5, "keep me").await.unwrap());

        *api.fail.lock().unwrap() = true;
        let result = sync.create(6, "lost").await;
        assert!(result.as_ref().is_err_and(Error::is_network));
        if let Ok(list) = result {
            store.replace(list);
        }
        assert_eq!(store.comments().len(), 1);
    }

    #[test]
    fn editing_slot_is_exclusive() {
        let mut store = CommentStore::new();
        store.replace(vec![comment(1, 0, "mika", "x"), comment(2, 5, "mika", "y")]);

        store.begin_edit(2, &mika(), Vec::new()).unwrap().draft.insert_char('!');
        assert_eq!(store.editing().unwrap().draft.text(), "y!");

        store.begin_edit(1, &mika(), Vec::new()).unwrap();
        let slot = store.editing().unwrap();
        assert_eq!(slot.id(), 1);
        assert_eq!(slot.draft.text(), "x");

        // Re-entering edit of Y starts from server content: the draft is gone.
        store.begin_edit(2, &mika(), Vec::new()).unwrap();
        assert_eq!(store.editing().unwrap().draft.text(), "y");
    }

    #[test]
    fn edit_requires_permission() {
        let mut store = CommentStore::new();
        store.replace(vec![comment(1, 0, "jo", "x")]);
        assert!(matches!(store.begin_edit(1, &mika(), Vec::new()), Err(Error::Forbidden("edit"))));
        assert!(matches!(store.begin_edit(9, &mika(), Vec::new()), Err(Error::NotFound(9))));

        let admin = Identity { username: "boss".into(), role: Role::Admin };
        assert!(store.begin_edit(1, &admin, Vec::new()).is_ok());
    }

    #[test]
    fn pending_delete_blocks_edit() {
        let mut store = CommentStore::new();
        store.replace(vec![comment(1, 0, "mika", "x")]);
        store.begin_edit(1, &mika(), Vec::new()).unwrap();

        store.mark_deleting(1, &mika()).unwrap();
        assert!(store.editing().is_none());
        assert!(!store.can_edit(&mika(), 1));
        assert!(store.begin_edit(1, &mika(), Vec::new()).is_err());

        store.clear_deleting(1);
        assert!(store.can_edit(&mika(), 1));
    }

    #[test]
    fn replace_prunes_vanished_ids() {
        let mut store = CommentStore::new();
        store.replace(vec![comment(1, 0, "mika", "x"), comment(2, 0, "mika", "y")]);
        store.begin_edit(2, &mika(), Vec::new()).unwrap();
        store.mark_deleting(1, &mika()).unwrap();

        store.replace(vec![comment(3, 0, "mika", "z")]);
        assert!(store.editing().is_none());
        assert!(!store.is_deleting(1));
        assert!(store.get(1).is_none());
    }

    #[test]
    fn patch_carries_only_changes() {
        let original = comment(1, 30, "mika", "same");
        let mut slot = EditSlot {
            id: 1,
            draft: MentionComposer::with_text(Vec::new(), "same"),
            timestamp: 30,
        };
        assert!(slot.patch(&original).is_empty());

        slot.timestamp = 42;
        slot.draft.insert_char('!');
        assert_eq!(
            slot.patch(&original),
            CommentPatch { content: Some("same!".into()), timestamp: Some(42) }
        );
    }
}
