//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage and codec calls into store-level operations.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod note_store;
