//! Post model: publication state, temporal neighbors, and related posts.
//!
//! A post's publication state is derived, never stored: `published` unset is
//! a draft, in the past is live, in the future is scheduled. Every check
//! reads "now" from the store's injected clock.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::Datastore;

/// Post record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Post title.
    pub title: String,

    /// URL slug, unique across all posts.
    pub slug: String,

    /// Categories this post belongs to (many-to-many).
    pub categories: BTreeSet<Uuid>,

    /// Optional lead image path.
    pub image: Option<String>,

    /// Optional excerpt, used by listing and feed layers.
    pub excerpt: Option<String>,

    /// Post body.
    pub content: String,

    /// Author user ID (opaque; supplied by the identity provider).
    pub author_id: Uuid,

    /// Unix timestamp when created; immutable.
    pub created: i64,

    /// Publication timestamp: None = draft, past = live, future =
    /// scheduled.
    pub published: Option<i64>,

    /// Whether new comments are accepted (enforced by the form layer).
    pub allow_comments: bool,
}

/// Input for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub slug: String,
    pub categories: Vec<Uuid>,
    pub image: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub author_id: Uuid,
    pub published: Option<i64>,
    pub allow_comments: Option<bool>,
}

/// Input for updating a post. `slug`, `created`, and `author_id` are
/// immutable; the publication timestamp changes through
/// [`Post::set_published`].
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub categories: Option<Vec<Uuid>>,
    pub image: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub allow_comments: Option<bool>,
}

impl Post {
    /// Create a new post. `created` comes from the injected clock and never
    /// changes afterwards.
    pub fn create(store: &Datastore, input: CreatePost) -> Result<Self> {
        let id = Uuid::now_v7();
        let mut inner = store.write();

        if inner.posts.values().any(|p| p.slug == input.slug) {
            return Err(Error::DuplicateSlug(input.slug));
        }
        let categories: BTreeSet<Uuid> = input.categories.into_iter().collect();
        for cid in &categories {
            if !inner.categories.contains_key(cid) {
                return Err(Error::NotFound("category"));
            }
        }

        let post = Post {
            id,
            title: input.title,
            slug: input.slug,
            categories,
            image: input.image,
            excerpt: input.excerpt,
            content: input.content,
            author_id: input.author_id,
            created: store.now(),
            published: input.published,
            allow_comments: input.allow_comments.unwrap_or(true),
        };
        inner.posts.insert(id, post.clone());

        info!(post = %id, slug = %post.slug, "created post");
        Ok(post)
    }

    /// Find a post by ID.
    pub fn find_by_id(store: &Datastore, id: Uuid) -> Option<Self> {
        store.read().posts.get(&id).cloned()
    }

    /// Find a post by slug.
    pub fn find_by_slug(store: &Datastore, slug: &str) -> Option<Self> {
        store
            .read()
            .posts
            .values()
            .find(|p| p.slug == slug)
            .cloned()
    }

    /// Update a post's mutable fields.
    pub fn update(store: &Datastore, id: Uuid, input: UpdatePost) -> Result<Option<Self>> {
        let mut inner = store.write();
        let Some(current) = inner.posts.get(&id).cloned() else {
            return Ok(None);
        };

        let categories = match input.categories {
            Some(list) => {
                let set: BTreeSet<Uuid> = list.into_iter().collect();
                for cid in &set {
                    if !inner.categories.contains_key(cid) {
                        return Err(Error::NotFound("category"));
                    }
                }
                set
            }
            None => current.categories,
        };

        let post = Post {
            id: current.id,
            title: input.title.unwrap_or(current.title),
            slug: current.slug,
            categories,
            image: input.image.or(current.image),
            excerpt: input.excerpt.or(current.excerpt),
            content: input.content.unwrap_or(current.content),
            author_id: current.author_id,
            created: current.created,
            published: current.published,
            allow_comments: input.allow_comments.unwrap_or(current.allow_comments),
        };
        inner.posts.insert(id, post.clone());

        Ok(Some(post))
    }

    /// Set, clear, or reschedule the publication timestamp.
    pub fn set_published(store: &Datastore, id: Uuid, published: Option<i64>) -> Result<Self> {
        let mut inner = store.write();
        let post = match inner.posts.get_mut(&id) {
            Some(p) => {
                p.published = published;
                p.clone()
            }
            None => return Err(Error::NotFound("post")),
        };

        debug!(post = %id, published = ?published, "updated publication timestamp");
        Ok(post)
    }

    /// Delete a post, cascading to all of its comments. Categories are
    /// untouched. Returns `false` if the post does not exist.
    pub fn delete(store: &Datastore, id: Uuid) -> Result<bool> {
        let mut inner = store.write();
        if inner.posts.remove(&id).is_none() {
            return Ok(false);
        }

        // Every comment of the post lives in a thread rooted at one of its
        // top-level comments, so removing those roots removes them all.
        let roots: Vec<Uuid> = inner
            .comments
            .values()
            .filter(|c| c.post_id == id && c.parent_id.is_none())
            .map(|c| c.id)
            .collect();
        let mut removed = 0usize;
        for root in roots {
            for cid in inner.comment_tree.remove(root) {
                inner.comments.remove(&cid);
                removed += 1;
            }
        }

        info!(post = %id, comments = removed, "deleted post");
        Ok(true)
    }

    /// Whether the post is published as of `now`.
    ///
    /// The boundary is inclusive (`published <= now`), while
    /// `PostQueryService::published_posts` filters with strict `<`: a post
    /// published at exactly `now` is "published" here yet absent from the
    /// listing. The asymmetry is part of the product definition and
    /// preserved as-is.
    pub fn is_published(&self, now: i64) -> bool {
        self.published.is_some_and(|t| t <= now)
    }

    /// Published posts strictly after this one, soonest first. Empty if
    /// this post is not itself published.
    pub fn published_after(&self, store: &Datastore) -> Vec<Post> {
        let now = store.now();
        let Some(mine) = self.published.filter(|_| self.is_published(now)) else {
            return Vec::new();
        };
        let inner = store.read();
        let mut posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|p| p.id != self.id)
            .filter(|p| p.published.is_some_and(|t| t > mine && t < now))
            .cloned()
            .collect();
        posts.sort_unstable_by_key(|p| (p.published, p.created));
        posts
    }

    /// Published posts strictly before this one, most recent first. Empty
    /// if this post is not itself published.
    pub fn published_before(&self, store: &Datastore) -> Vec<Post> {
        let now = store.now();
        let Some(mine) = self.published.filter(|_| self.is_published(now)) else {
            return Vec::new();
        };
        let inner = store.read();
        let mut posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|p| p.id != self.id)
            .filter(|p| p.published.is_some_and(|t| t < mine && t < now))
            .cloned()
            .collect();
        posts.sort_unstable_by(|a, b| {
            (b.published, b.created).cmp(&(a.published, a.created))
        });
        posts
    }

    /// Whether a later published post exists.
    pub fn has_next(&self, store: &Datastore) -> bool {
        !self.published_after(store).is_empty()
    }

    /// Whether an earlier published post exists.
    pub fn has_previous(&self, store: &Datastore) -> bool {
        !self.published_before(store).is_empty()
    }

    /// The closest later published post.
    ///
    /// Fails with [`Error::SequenceEmpty`] when there is none; callers are
    /// expected to check [`Post::has_next`] first.
    pub fn next_post(&self, store: &Datastore) -> Result<Post> {
        self.published_after(store)
            .into_iter()
            .next()
            .ok_or(Error::SequenceEmpty)
    }

    /// The closest earlier published post.
    ///
    /// Fails with [`Error::SequenceEmpty`] when there is none; callers are
    /// expected to check [`Post::has_previous`] first.
    pub fn previous_post(&self, store: &Datastore) -> Result<Post> {
        self.published_before(store)
            .into_iter()
            .next()
            .ok_or(Error::SequenceEmpty)
    }

    /// Up to `limit` other published posts related by category, in
    /// randomized order (variety over determinism), deduplicated.
    ///
    /// With `include_ancestors` the candidate category set is the strict
    /// ancestors of this post's categories (not the categories themselves);
    /// otherwise it is the direct categories.
    pub fn related_posts(
        &self,
        store: &Datastore,
        limit: usize,
        include_ancestors: bool,
    ) -> Vec<Post> {
        let now = store.now();
        let mut posts: Vec<Post> = {
            let inner = store.read();
            let wanted: BTreeSet<Uuid> = if include_ancestors {
                self.categories
                    .iter()
                    .flat_map(|c| inner.category_tree.ancestors(*c, false))
                    .collect()
            } else {
                self.categories.clone()
            };
            inner
                .posts
                .values()
                .filter(|p| p.id != self.id)
                .filter(|p| p.published.is_some_and(|t| t < now))
                .filter(|p| p.categories.iter().any(|c| wanted.contains(c)))
                .cloned()
                .collect()
        };

        let mut rng = rand::thread_rng();
        posts.shuffle(&mut rng);
        posts.truncate(limit);
        posts
    }
}
