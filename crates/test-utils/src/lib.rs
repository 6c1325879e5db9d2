//! Diario test utilities.
//!
//! Fixture builders and helpers for integration tests: a clock-pinned
//! datastore, category/comment helpers, and a chained builder for posts.
//! Builders return `Result` so tests decide how to fail.

use std::sync::Arc;

use uuid::Uuid;

use diario_kernel::models::{
    Category, Comment, CreateCategory, CreateComment, CreatePost, Post,
};
use diario_kernel::{Datastore, FixedClock, Result};

/// Initialize tracing for tests (respects `RUST_LOG`). Safe to call from
/// every test; only the first call installs the subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A datastore pinned to a fixed instant (Unix seconds).
pub fn fixed_store(now: i64) -> Datastore {
    Datastore::with_clock(Arc::new(FixedClock::at(now)))
}

/// Create a category with default fields.
pub fn test_category(
    store: &Datastore,
    title: &str,
    slug: &str,
    parent_id: Option<Uuid>,
) -> Result<Category> {
    Category::create(
        store,
        CreateCategory {
            title: title.to_string(),
            slug: slug.to_string(),
            description: None,
            parent_id,
        },
    )
}

/// Create a comment on a post, optionally as a reply.
pub fn test_comment(
    store: &Datastore,
    post: &Post,
    parent: Option<&Comment>,
    author_id: Uuid,
    content: &str,
) -> Result<Comment> {
    Comment::create(
        store,
        CreateComment {
            post_id: post.id,
            parent_id: parent.map(|c| c.id),
            author_id,
            content: content.to_string(),
        },
    )
}

/// Start a post fixture with default values (draft, no categories).
pub fn test_post(title: &str, slug: &str) -> TestPost {
    TestPost {
        title: title.to_string(),
        slug: slug.to_string(),
        categories: Vec::new(),
        excerpt: None,
        content: "body".to_string(),
        author_id: Uuid::nil(),
        published: None,
        allow_comments: true,
    }
}

/// A post builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestPost {
    title: String,
    slug: String,
    categories: Vec<Uuid>,
    excerpt: Option<String>,
    content: String,
    author_id: Uuid,
    published: Option<i64>,
    allow_comments: bool,
}

impl TestPost {
    /// Set the author.
    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = author_id;
        self
    }

    /// Attach a category (may be called repeatedly).
    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.categories.push(category_id);
        self
    }

    /// Set the publication timestamp.
    pub fn published_at(mut self, published: i64) -> Self {
        self.published = Some(published);
        self
    }

    /// Clear the publication timestamp (the default).
    pub fn draft(mut self) -> Self {
        self.published = None;
        self
    }

    /// Set an excerpt.
    pub fn with_excerpt(mut self, excerpt: &str) -> Self {
        self.excerpt = Some(excerpt.to_string());
        self
    }

    /// Disallow comments.
    pub fn no_comments(mut self) -> Self {
        self.allow_comments = false;
        self
    }

    /// Insert the fixture into the store.
    pub fn create(self, store: &Datastore) -> Result<Post> {
        Post::create(
            store,
            CreatePost {
                title: self.title,
                slug: self.slug,
                categories: self.categories,
                image: None,
                excerpt: self.excerpt,
                content: self.content,
                author_id: self.author_id,
                published: self.published,
                allow_comments: Some(self.allow_comments),
            },
        )
    }
}
