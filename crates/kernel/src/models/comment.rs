//! Comment model: threaded, votable replies on posts.
//!
//! Comments form one thread tree per top-level comment. Threaded order is
//! tree position: root threads in creation order, replies in pre-order with
//! siblings ordered by creation time (ties keep insertion order).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::Datastore;

/// Comment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Post this comment belongs to; mandatory, and shared with every
    /// ancestor comment.
    pub post_id: Uuid,

    /// Parent comment (None for top-level comments).
    pub parent_id: Option<Uuid>,

    /// Author user ID (opaque; supplied by the identity provider).
    pub author_id: Uuid,

    /// Comment body.
    pub content: String,

    /// Unix timestamp when created; immutable, drives sibling order.
    pub created: i64,

    /// Vote tally; always equals the number of distinct voters.
    pub score: i64,

    /// Users who have voted; each user votes at most once.
    pub voters: BTreeSet<Uuid>,
}

/// Input for creating a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_id: Uuid,
    pub content: String,
}

impl Comment {
    /// Create a new comment on a post, optionally as a reply.
    ///
    /// Fails with [`Error::NotFound`] if the post or the parent comment
    /// does not exist, and with [`Error::InvalidParent`] if the parent
    /// belongs to a different post.
    pub fn create(store: &Datastore, input: CreateComment) -> Result<Self> {
        let id = Uuid::now_v7();
        let mut inner = store.write();

        if !inner.posts.contains_key(&input.post_id) {
            return Err(Error::NotFound("post"));
        }
        if let Some(parent_id) = input.parent_id {
            let Some(parent) = inner.comments.get(&parent_id) else {
                return Err(Error::NotFound("comment"));
            };
            if parent.post_id != input.post_id {
                return Err(Error::InvalidParent(
                    "parent comment belongs to a different post",
                ));
            }
        }

        let created = store.now();
        inner.comment_tree.insert(id, input.parent_id, created)?;
        let comment = Comment {
            id,
            post_id: input.post_id,
            parent_id: input.parent_id,
            author_id: input.author_id,
            content: input.content,
            created,
            score: 0,
            voters: BTreeSet::new(),
        };
        inner.comments.insert(id, comment.clone());

        debug!(comment = %id, post = %comment.post_id, "created comment");
        Ok(comment)
    }

    /// Find a comment by ID.
    pub fn find_by_id(store: &Datastore, id: Uuid) -> Option<Self> {
        store.read().comments.get(&id).cloned()
    }

    /// All comments on a post in threaded order.
    pub fn list_for_post(store: &Datastore, post_id: Uuid) -> Vec<Self> {
        let inner = store.read();
        let mut comments: Vec<Comment> = inner
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_unstable_by_key(|c| {
            inner
                .comment_tree
                .position(c.id)
                .unwrap_or((u64::MAX, i64::MAX))
        });
        comments
    }

    /// Number of comments on a post.
    pub fn count_for_post(store: &Datastore, post_id: Uuid) -> usize {
        store
            .read()
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .count()
    }

    /// Direct replies to this comment, oldest first.
    pub fn replies(&self, store: &Datastore) -> Vec<Self> {
        let inner = store.read();
        let mut replies: Vec<Comment> = inner
            .comments
            .values()
            .filter(|c| c.parent_id == Some(self.id))
            .cloned()
            .collect();
        replies.sort_unstable_by_key(|c| {
            inner
                .comment_tree
                .position(c.id)
                .unwrap_or((u64::MAX, i64::MAX))
        });
        replies
    }

    /// Nesting depth for display (0 for top-level comments).
    pub fn depth(&self, store: &Datastore) -> usize {
        store.read().comment_tree.ancestors(self.id, false).len()
    }

    /// Apply one up-vote from `voter`.
    ///
    /// Idempotent per user: returns `false` without touching the score when
    /// the voter has already voted. Runs entirely under the store's write
    /// lock, so two racing voters cannot lose updates and `score` always
    /// equals the number of distinct voters.
    pub fn vote(store: &Datastore, id: Uuid, voter: Uuid) -> Result<bool> {
        let mut inner = store.write();
        let Some(comment) = inner.comments.get_mut(&id) else {
            return Err(Error::NotFound("comment"));
        };

        if !comment.voters.insert(voter) {
            return Ok(false);
        }
        comment.score += 1;

        debug!(comment = %id, score = comment.score, "applied vote");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn comment_serialization() {
        let comment = Comment {
            id: Uuid::nil(),
            post_id: Uuid::nil(),
            parent_id: None,
            author_id: Uuid::nil(),
            content: "nice post".to_string(),
            created: 1_000,
            score: 0,
            voters: BTreeSet::new(),
        };

        let json = serde_json::to_string(&comment).unwrap();
        let parsed: Comment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.content, "nice post");
        assert_eq!(parsed.score, 0);
    }

    #[test]
    fn vote_on_missing_comment_is_not_found() {
        let store = Datastore::new();
        let err = Comment::vote(&store, Uuid::now_v7(), Uuid::now_v7()).unwrap_err();
        assert_eq!(err, Error::NotFound("comment"));
    }
}
