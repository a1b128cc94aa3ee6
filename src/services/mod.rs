//! Service layer.
//!
//! This module contains the logic shared by the entities:
//! - Paginated aggregation (`collect_pages`, `collect_by_offset`)
//! - Item extraction from listing pages and AJAX batches
//! - Standalone HTML export of answer bodies

pub mod export;
pub mod listings;
pub mod pagination;

pub use pagination::Limit;
