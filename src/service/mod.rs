//! Bookmark services: request validation and per-entity rules.

mod bookmarks;
mod validation;
pub use bookmarks::{page_params, CategoryService, SiteService, MAX_PAGE_SIZE};
pub use validation::{FieldRule, Format, RequestValidator};
