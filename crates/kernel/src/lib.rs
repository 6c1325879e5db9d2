//! Diario blog engine kernel.
//!
//! The publication-state and hierarchical-content query engine behind the
//! blog: category trees with recursive descendant queries, posts with
//! scheduled publication, and threaded, votable comments. The HTTP, admin,
//! and template layers live elsewhere and call into these models and
//! services.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use store::Datastore;
