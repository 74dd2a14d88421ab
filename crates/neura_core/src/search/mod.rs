//! In-memory note search.
//!
//! # Responsibility
//! - Provide case-insensitive substring filtering over the loaded collection.
//! - Make participation of non-text notes an explicit configuration choice.

pub mod filter;
