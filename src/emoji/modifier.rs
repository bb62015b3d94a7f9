/// Skin-tone modifiers, parsed from the `skin_tone` workflow variable.
///
/// Recognised labels are case-sensitive:
/// - `""` or `none` → no modifier (default glyphs)
/// - `light`, `medium-light`, `medium`, `medium-dark`, `dark`
/// - the Fitzpatrick code points `1F3FB`..`1F3FF`, same order as above
use std::fmt;
use std::str::FromStr;

use super::errors::EmojiError;

/// Which glyph rendering to return for emojis that have skin-tone variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SkinTone {
    /// Default (yellow) rendering.
    #[default]
    None,
    Light,
    MediumLight,
    Medium,
    MediumDark,
    Dark,
}

impl SkinTone {
    /// Every modifier: `None` first, then lightest to darkest.
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Light,
        Self::MediumLight,
        Self::Medium,
        Self::MediumDark,
        Self::Dark,
    ];

    /// Canonical label, as accepted by [`FromStr`].
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Light => "light",
            Self::MediumLight => "medium-light",
            Self::Medium => "medium",
            Self::MediumDark => "medium-dark",
            Self::Dark => "dark",
        }
    }

    /// The matching variant in the `emojis` table.
    pub(crate) fn variant(self) -> Option<emojis::SkinTone> {
        match self {
            Self::None => None,
            Self::Light => Some(emojis::SkinTone::Light),
            Self::MediumLight => Some(emojis::SkinTone::MediumLight),
            Self::Medium => Some(emojis::SkinTone::Medium),
            Self::MediumDark => Some(emojis::SkinTone::MediumDark),
            Self::Dark => Some(emojis::SkinTone::Dark),
        }
    }
}

impl FromStr for SkinTone {
    type Err = EmojiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(Self::None),
            "light" | "1F3FB" => Ok(Self::Light),
            "medium-light" | "1F3FC" => Ok(Self::MediumLight),
            "medium" | "1F3FD" => Ok(Self::Medium),
            "medium-dark" | "1F3FE" => Ok(Self::MediumDark),
            "dark" | "1F3FF" => Ok(Self::Dark),
            other => Err(EmojiError::InvalidModifier {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for SkinTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
