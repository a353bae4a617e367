//! URL-safe slugs derived deterministically from display names.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::domain::types::TypeConstraintError;

/// Normalized, lowercase, hyphenated identifier derived from a name.
///
/// A slug is never accepted from clients; it is recomputed with
/// [`Slug::derive`] whenever the owning entity's name changes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derives a slug from a display name: lowercase, accents folded to
    /// ASCII, non-alphanumeric runs collapsed into single hyphens, no
    /// leading or trailing hyphens.
    pub fn derive(name: &str) -> Self {
        let mut normalized = String::with_capacity(name.len());
        for c in name.chars() {
            match fold_accent(c) {
                Some(folded) => normalized.push_str(folded),
                None => normalized.push(c),
            }
        }

        let slug = normalized
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");

        Self(slug)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Slug {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Accepts a stored slug, rejecting empty values.
impl TryFrom<String> for Slug {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            Err(TypeConstraintError::EmptyString("slug"))
        } else {
            Ok(Self(value))
        }
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

/// Maps common Latin accented characters to their ASCII equivalents.
/// Returns `None` for characters that pass through unchanged.
fn fold_accent(c: char) -> Option<&'static str> {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => Some("a"),
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => Some("e"),
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => Some("i"),
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' | 'Ø' => Some("o"),
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => Some("u"),
        'ñ' | 'Ñ' => Some("n"),
        'ç' | 'Ç' => Some("c"),
        'ý' | 'ÿ' | 'Ý' => Some("y"),
        'æ' | 'Æ' => Some("ae"),
        'œ' | 'Œ' => Some("oe"),
        'ß' => Some("ss"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(Slug::derive("Drinks").as_str(), "drinks");
        assert_eq!(Slug::derive("Fizzy Drinks").as_str(), "fizzy-drinks");
    }

    #[test]
    fn strips_accents() {
        assert_eq!(Slug::derive("Café con Leche").as_str(), "cafe-con-leche");
        assert_eq!(Slug::derive("Niños").as_str(), "ninos");
    }

    #[test]
    fn collapses_punctuation_and_whitespace() {
        assert_eq!(Slug::derive("  Tea --  & Coffee!! ").as_str(), "tea-coffee");
        assert_eq!(Slug::derive("a---b").as_str(), "a-b");
    }

    #[test]
    fn trims_leading_and_trailing_hyphens() {
        assert_eq!(Slug::derive("--edge--").as_str(), "edge");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(Slug::derive("Área 51").as_str(), "area-51");
    }
}
