//! HTTP handlers for the bookmark resources.

pub mod entity;
pub use entity::*;
