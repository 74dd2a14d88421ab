//! Audio capture and playback coordination for voice memo notes.

pub mod session;
