//! Flutter-facing bindings for the Neura notes core.

pub mod api;
