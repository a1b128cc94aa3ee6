// src/lib.rs

//! zhihu scraping client library
//!
//! Entities (`User`, `Question`, `Answer`, `Topic`, `Collection`) wrap one
//! remote page each, fetch it lazily through a shared [`Session`] and memoize
//! every parsed field until the next refresh.

pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AppError, Result};
pub use models::{Answer, Collection, Config, Gender, Question, Topic, User};
pub use services::Limit;
pub use session::{Fetcher, Session};
