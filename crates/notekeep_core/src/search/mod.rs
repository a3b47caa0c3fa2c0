//! Note browsing filters.
//!
//! # Responsibility
//! - Narrow resolved notes by title substring and required tags.
//! - Narrow the tag collection by label for tag management views.

pub mod filter;
