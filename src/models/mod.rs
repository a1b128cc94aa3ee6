// src/models/mod.rs

//! Domain models.
//!
//! Every entity wraps one remote [`Page`]: the document is fetched on first
//! use and parsed fields are memoized in a [`FieldCache`] until refresh.

mod answer;
mod collection;
mod config;
mod fields;
mod page;
mod question;
mod topic;
mod user;

// Re-export all public types
pub use answer::Answer;
pub use collection::Collection;
pub use config::{Config, HttpConfig, PagingConfig};
pub use fields::{Field, FieldCache, FieldValue};
pub use page::Page;
pub use question::Question;
pub use topic::Topic;
pub use user::{Gender, NamedUser, User};
