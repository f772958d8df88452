//! # Application Layer
//!
//! The feed handler service and its advisory cache.

pub mod cache;
pub mod service;
pub mod validator;

pub use cache::CachedUpdate;
pub use service::FeedHandler;
pub use validator::UpdateValidator;
