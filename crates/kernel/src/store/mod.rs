//! Transactional in-memory datastore.
//!
//! Models read and mutate shared state through [`Datastore`]. One `RwLock`
//! covers every collection: a structural mutation (tree insert, reparent,
//! cascade delete, vote) validates before any write and is all-or-nothing,
//! and a read guard observes a consistent snapshot of the nested-set
//! bounds. The store also owns the injected [`Clock`], which is the only
//! source of "now" for publication-state checks.

mod tree;

pub(crate) use tree::TreeIndex;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::models::{Category, Comment, Post};

#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) categories: HashMap<Uuid, Category>,
    /// Category hierarchy; sibling order key is the category title.
    pub(crate) category_tree: TreeIndex<String>,
    pub(crate) posts: HashMap<Uuid, Post>,
    pub(crate) comments: HashMap<Uuid, Comment>,
    /// Comment threads; sibling order key is the creation timestamp.
    pub(crate) comment_tree: TreeIndex<i64>,
}

/// The shared blog datastore.
pub struct Datastore {
    clock: Arc<dyn Clock>,
    inner: RwLock<Inner>,
}

impl Datastore {
    /// Create an empty store backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store with an injected clock. Tests pass a
    /// [`crate::clock::FixedClock`] to pin time.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: RwLock::new(Inner {
                categories: HashMap::new(),
                category_tree: TreeIndex::new(),
                posts: HashMap::new(),
                comments: HashMap::new(),
                comment_tree: TreeIndex::new(),
            }),
        }
    }

    /// Current time from the injected clock, Unix seconds.
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write()
    }
}

impl Default for Datastore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Datastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.read();
        f.debug_struct("Datastore")
            .field("categories", &inner.categories.len())
            .field("posts", &inner.posts.len())
            .field("comments", &inner.comments.len())
            .finish()
    }
}
