//! Fixed background palette for notes.
//!
//! # Responsibility
//! - Define the closed set of colors a note may be tagged with.
//! - Convert between palette entries and their persisted hex form.
//!
//! # Invariants
//! - Only palette members are ever persisted.
//! - Hex values are stored upper-case with a leading `#`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One entry of the fixed note palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PaletteColor {
    /// Neutral default for new notes.
    #[default]
    White,
    Yellow,
    Green,
    Blue,
    Pink,
    Orange,
    Purple,
}

impl PaletteColor {
    /// All palette entries in display order.
    pub const ALL: [PaletteColor; 7] = [
        PaletteColor::White,
        PaletteColor::Yellow,
        PaletteColor::Green,
        PaletteColor::Blue,
        PaletteColor::Pink,
        PaletteColor::Orange,
        PaletteColor::Purple,
    ];

    /// Persisted `#RRGGBB` form.
    pub fn hex(self) -> &'static str {
        match self {
            Self::White => "#FFFFFF",
            Self::Yellow => "#FFF9C4",
            Self::Green => "#C8E6C9",
            Self::Blue => "#BBDEFB",
            Self::Pink => "#F8BBD0",
            Self::Orange => "#FFE0B2",
            Self::Purple => "#E1BEE7",
        }
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Pink => "pink",
            Self::Orange => "orange",
            Self::Purple => "purple",
        }
    }

    /// Resolves a hex string to a palette entry.
    ///
    /// Matching is case-insensitive and the leading `#` is optional.
    /// Returns `None` for anything outside the palette.
    pub fn from_hex(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|color| color.hex()[1..].eq_ignore_ascii_case(digits))
    }
}

impl Display for PaletteColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.hex())
    }
}

/// Raised when a color string is not a palette member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColorError(pub String);

impl Display for UnknownColorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "color `{}` is not part of the note palette", self.0)
    }
}

impl Error for UnknownColorError {}

impl FromStr for PaletteColor {
    type Err = UnknownColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| UnknownColorError(s.to_string()))
    }
}

impl Serialize for PaletteColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hex())
    }
}

impl<'de> Deserialize<'de> for PaletteColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::PaletteColor;

    #[test]
    fn from_hex_is_case_insensitive_and_prefix_optional() {
        assert_eq!(PaletteColor::from_hex("#fff9c4"), Some(PaletteColor::Yellow));
        assert_eq!(PaletteColor::from_hex("BBDEFB"), Some(PaletteColor::Blue));
        assert_eq!(PaletteColor::from_hex(" #FFFFFF "), Some(PaletteColor::White));
    }

    #[test]
    fn from_hex_rejects_non_members() {
        assert_eq!(PaletteColor::from_hex("#000000"), None);
        assert_eq!(PaletteColor::from_hex("#FFF"), None);
        assert_eq!(PaletteColor::from_hex(""), None);
    }

    #[test]
    fn default_is_white() {
        assert_eq!(PaletteColor::default(), PaletteColor::White);
        assert_eq!(PaletteColor::default().hex(), "#FFFFFF");
    }
}
