//! Kernel services.
//!
//! Stateless query operations the view layer composes into listings,
//! archives, and feeds.

pub mod post_query;

pub use post_query::PostQueryService;
