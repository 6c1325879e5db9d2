//! Blog models.

pub mod category;
pub mod comment;
pub mod post;

pub use category::{Category, CreateCategory, UpdateCategory};
pub use comment::{Comment, CreateComment};
pub use post::{CreatePost, Post, UpdatePost};
