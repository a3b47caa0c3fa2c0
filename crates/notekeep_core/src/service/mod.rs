//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into note/tag use-case APIs.
//! - Keep view layers decoupled from storage details.

pub mod note_store;
