//! Style catalog
//!
//! The fixed set of visual styles a user can pick for a transformation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleId {
    #[default]
    Editorial,
    Streetwear,
    Vintage,
    Minimalist,
    Cyberpunk,
    Watercolor,
}

impl StyleId {
    /// Every style, in catalog order.
    pub const ALL: [StyleId; 6] = [
        StyleId::Editorial,
        StyleId::Streetwear,
        StyleId::Vintage,
        StyleId::Minimalist,
        StyleId::Cyberpunk,
        StyleId::Watercolor,
    ];

    /// Stable lowercase id used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleId::Editorial => "editorial",
            StyleId::Streetwear => "streetwear",
            StyleId::Vintage => "vintage",
            StyleId::Minimalist => "minimalist",
            StyleId::Cyberpunk => "cyberpunk",
            StyleId::Watercolor => "watercolor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StyleId::Editorial => "Editorial",
            StyleId::Streetwear => "Streetwear",
            StyleId::Vintage => "Vintage",
            StyleId::Minimalist => "Minimalist",
            StyleId::Cyberpunk => "Cyberpunk",
            StyleId::Watercolor => "Watercolor",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            StyleId::Editorial => "📰",
            StyleId::Streetwear => "🎨",
            StyleId::Vintage => "📸",
            StyleId::Minimalist => "✨",
            StyleId::Cyberpunk => "🌃",
            StyleId::Watercolor => "🖌️",
        }
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StyleId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        StyleId::ALL
            .into_iter()
            .find(|style| style.as_str() == normalized)
            .ok_or_else(|| DomainError::parse(format!("Unknown style: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_is_editorial() {
        assert_eq!(StyleId::default(), StyleId::Editorial);
    }

    #[test]
    fn parses_every_catalog_id() {
        for style in StyleId::ALL {
            assert_eq!(style.as_str().parse::<StyleId>(), Ok(style));
        }
        assert_eq!(" CyberPunk ".parse::<StyleId>(), Ok(StyleId::Cyberpunk));
    }

    #[test]
    fn rejects_unknown_styles() {
        assert!(matches!(
            "baroque".parse::<StyleId>(),
            Err(DomainError::Parse(_))
        ));
    }

    #[test]
    fn serializes_as_lowercase_id() {
        let json = serde_json::to_string(&StyleId::Watercolor).expect("serialize");
        assert_eq!(json, "\"watercolor\"");
    }
}
