//! Category model: a node in the hierarchical category tree.
//!
//! Categories form a forest; sibling order is by title, insertion-sorted.
//! Descendant and ancestor queries delegate to the nested-set tree index in
//! the datastore, so membership checks never recurse.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Post;
use crate::store::Datastore;

/// Category record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Human-readable title; drives sibling order at insertion time.
    pub title: String,

    /// URL slug, unique across all categories.
    pub slug: String,

    /// Optional description.
    pub description: Option<String>,

    /// Parent category (None for roots).
    pub parent_id: Option<Uuid>,
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// Input for updating a category. Re-parenting goes through
/// [`Category::set_parent`] instead, because it revalidates the tree.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCategory {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Category {
    /// Create a new category under `parent_id` (or as a new tree root).
    pub fn create(store: &Datastore, input: CreateCategory) -> Result<Self> {
        let id = Uuid::now_v7();
        let mut inner = store.write();

        if let Some(parent_id) = input.parent_id {
            if !inner.categories.contains_key(&parent_id) {
                return Err(Error::NotFound("category"));
            }
        }
        if inner.categories.values().any(|c| c.slug == input.slug) {
            return Err(Error::DuplicateSlug(input.slug));
        }

        inner
            .category_tree
            .insert(id, input.parent_id, input.title.clone())?;
        let category = Category {
            id,
            title: input.title,
            slug: input.slug,
            description: input.description,
            parent_id: input.parent_id,
        };
        inner.categories.insert(id, category.clone());

        debug!(category = %id, slug = %category.slug, "created category");
        Ok(category)
    }

    /// Find a category by ID.
    pub fn find_by_id(store: &Datastore, id: Uuid) -> Option<Self> {
        store.read().categories.get(&id).cloned()
    }

    /// Find a category by slug.
    pub fn find_by_slug(store: &Datastore, slug: &str) -> Option<Self> {
        store
            .read()
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned()
    }

    /// All categories in forest order: each tree in pre-order, roots by
    /// title.
    pub fn list(store: &Datastore) -> Vec<Self> {
        let inner = store.read();
        let mut categories = Vec::with_capacity(inner.categories.len());
        for root in inner.category_tree.roots() {
            for id in inner.category_tree.descendants(*root, true) {
                if let Some(c) = inner.categories.get(&id) {
                    categories.push(c.clone());
                }
            }
        }
        categories
    }

    /// Update title and/or description.
    ///
    /// A title change does not re-sort the category among its siblings
    /// (sibling order is insertion-sorted); only later insertions see the
    /// new title.
    pub fn update(store: &Datastore, id: Uuid, input: UpdateCategory) -> Result<Option<Self>> {
        let mut inner = store.write();
        let Some(mut category) = inner.categories.get(&id).cloned() else {
            return Ok(None);
        };

        if let Some(title) = input.title {
            inner.category_tree.set_key(id, title.clone());
            category.title = title;
        }
        if input.description.is_some() {
            category.description = input.description;
        }
        inner.categories.insert(id, category.clone());

        Ok(Some(category))
    }

    /// Move a category (with its whole subtree) under a new parent, or out
    /// to the top level.
    ///
    /// Fails with [`Error::InvalidParent`] if the new parent is the
    /// category itself or one of its descendants; the tree is left
    /// untouched on failure.
    pub fn set_parent(store: &Datastore, id: Uuid, new_parent: Option<Uuid>) -> Result<Self> {
        let mut inner = store.write();
        if !inner.categories.contains_key(&id) {
            return Err(Error::NotFound("category"));
        }
        if let Some(np) = new_parent {
            if !inner.categories.contains_key(&np) {
                return Err(Error::NotFound("category"));
            }
        }

        inner.category_tree.reparent(id, new_parent)?;
        let category = match inner.categories.get_mut(&id) {
            Some(c) => {
                c.parent_id = new_parent;
                c.clone()
            }
            None => return Err(Error::NotFound("category")),
        };

        debug!(category = %id, parent = ?new_parent, "re-parented category");
        Ok(category)
    }

    /// Delete a category and its whole subtree.
    ///
    /// Posts are detached from the removed categories, never deleted.
    /// Returns `false` if the category does not exist.
    pub fn delete(store: &Datastore, id: Uuid) -> Result<bool> {
        let mut inner = store.write();
        if !inner.categories.contains_key(&id) {
            return Ok(false);
        }

        let removed = inner.category_tree.remove(id);
        for rid in &removed {
            inner.categories.remove(rid);
        }
        for post in inner.posts.values_mut() {
            for rid in &removed {
                post.categories.remove(rid);
            }
        }

        info!(category = %id, removed = removed.len(), "deleted category subtree");
        Ok(true)
    }

    /// This category and/or its descendants, in pre-order.
    pub fn descendant_categories(&self, store: &Datastore, include_self: bool) -> Vec<Self> {
        let inner = store.read();
        inner
            .category_tree
            .descendants(self.id, include_self)
            .into_iter()
            .filter_map(|id| inner.categories.get(&id).cloned())
            .collect()
    }

    /// The root-to-category ancestor path.
    pub fn ancestor_categories(&self, store: &Datastore, include_self: bool) -> Vec<Self> {
        let inner = store.read();
        inner
            .category_tree
            .ancestors(self.id, include_self)
            .into_iter()
            .filter_map(|id| inner.categories.get(&id).cloned())
            .collect()
    }

    /// Posts attached to this category or any of its descendants,
    /// deduplicated. No defined ordering; callers sort as needed.
    ///
    /// With `published_only`, requires `published <= now` (note `<=`,
    /// matching [`Post::is_published`] rather than the strict `<` used by
    /// the post query service).
    pub fn posts(&self, store: &Datastore, published_only: bool) -> Vec<Post> {
        let now = store.now();
        let inner = store.read();
        let wanted: HashSet<Uuid> = inner
            .category_tree
            .descendants(self.id, true)
            .into_iter()
            .collect();
        inner
            .posts
            .values()
            .filter(|p| p.categories.iter().any(|c| wanted.contains(c)))
            .filter(|p| !published_only || p.published.is_some_and(|t| t <= now))
            .cloned()
            .collect()
    }
}
