//! Post collection queries.

use chrono::{DateTime, Datelike};
use uuid::Uuid;

use crate::config::Config;
use crate::models::Post;
use crate::store::Datastore;

/// Stateless queries over the post collection.
///
/// "Published" here is strict: `published < now`. A post published at
/// exactly `now` is excluded even though [`Post::is_published`] (which uses
/// `<=`) already reports it as published; the asymmetry is part of the
/// product definition and deliberately preserved.
#[derive(Debug)]
pub struct PostQueryService<'a> {
    store: &'a Datastore,
    config: Config,
}

impl<'a> PostQueryService<'a> {
    /// Create a query service with default listing sizes.
    pub fn new(store: &'a Datastore) -> Self {
        Self::with_config(store, Config::default())
    }

    /// Create a query service with explicit configuration.
    pub fn with_config(store: &'a Datastore, config: Config) -> Self {
        Self { store, config }
    }

    /// All published posts, most recent first.
    pub fn published_posts(&self) -> Vec<Post> {
        let now = self.store.now();
        let mut posts: Vec<Post> = self
            .store
            .read()
            .posts
            .values()
            .filter(|p| p.published.is_some_and(|t| t < now))
            .cloned()
            .collect();
        posts.sort_unstable_by(|a, b| {
            (b.published, b.created).cmp(&(a.published, a.created))
        });
        posts
    }

    /// The most recent published posts, feed-sized. `None` uses the
    /// configured default (5).
    pub fn new_posts(&self, limit: Option<usize>) -> Vec<Post> {
        let limit = limit.unwrap_or(self.config.new_posts_limit);
        let mut posts = self.published_posts();
        posts.truncate(limit);
        posts
    }

    /// Posts published within the last `horizon_days` days, most recent
    /// first. `None` uses the configured default (30). The window is
    /// inclusive at the start and exclusive at `now`.
    pub fn recent_posts(&self, horizon_days: Option<i64>) -> Vec<Post> {
        let horizon_days = horizon_days.unwrap_or(self.config.recent_horizon_days);
        let start = self.store.now() - horizon_days * 86_400;
        self.published_posts()
            .into_iter()
            .filter(|p| p.published.is_some_and(|t| t >= start))
            .collect()
    }

    /// Posts related to `post` through its category ancestry, randomized.
    /// `None` uses the configured default (5).
    pub fn related_posts(&self, post: &Post, limit: Option<usize>) -> Vec<Post> {
        let limit = limit.unwrap_or(self.config.related_posts_limit);
        post.related_posts(self.store, limit, true)
    }

    /// Published posts by a single author, most recent first.
    pub fn posts_by_author(&self, author_id: Uuid) -> Vec<Post> {
        self.published_posts()
            .into_iter()
            .filter(|p| p.author_id == author_id)
            .collect()
    }

    /// Published posts from a UTC year, optionally narrowed to a month
    /// (1-12), most recent first.
    pub fn archive(&self, year: i32, month: Option<u32>) -> Vec<Post> {
        self.published_posts()
            .into_iter()
            .filter(|p| {
                p.published
                    .and_then(|t| DateTime::from_timestamp(t, 0))
                    .is_some_and(|dt| {
                        dt.year() == year && month.is_none_or(|m| dt.month() == m)
                    })
            })
            .collect()
    }
}
