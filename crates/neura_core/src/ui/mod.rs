//! Presentation-state helpers shared with the UI layer.

pub mod mode;
