//! Font and color types.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A font as registered in the document's font registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Font {
    /// Registry identifier, e.g. "font-3"
    pub id: String,

    /// Lowercased name with any subset prefix removed, e.g. "times-bold"
    pub normalized_name: String,

    /// Family name with style suffixes removed, e.g. "times"
    pub family_name: Option<String>,

    /// The base name as it appears in the PDF, e.g. "ABCDEF+Times-Bold"
    pub base_name: String,

    /// Whether the font is bold
    pub is_bold: bool,

    /// Whether the font is italic
    pub is_italic: bool,

    /// Whether the font is a Type3 font
    pub is_type3: bool,
}

impl Font {
    /// Create a font from its PDF base name, deriving the normalized
    /// name, family name and style flags.
    pub fn from_base_name(id: impl Into<String>, base_name: impl Into<String>) -> Self {
        let base_name = base_name.into();
        let normalized_name = normalize_name(&base_name);
        let is_bold = normalized_name.contains("bold")
            || normalized_name.contains("black")
            || normalized_name.contains("heavy");
        let is_italic = normalized_name.contains("italic") || normalized_name.contains("oblique");
        let family_name = family_name(&normalized_name);

        Self {
            id: id.into(),
            normalized_name,
            family_name,
            base_name,
            is_bold,
            is_italic,
            is_type3: false,
        }
    }

    /// Mark the font as a Type3 font.
    pub fn type3(mut self) -> Self {
        self.is_type3 = true;
        self
    }
}

/// Lowercase the base name and strip the 6-letter subset prefix
/// ("ABCDEF+Times-Bold" -> "times-bold").
fn normalize_name(base_name: &str) -> String {
    let name = match base_name.split_once('+') {
        Some((prefix, rest)) if prefix.len() == 6 && prefix.chars().all(|c| c.is_ascii_uppercase()) => {
            rest
        }
        _ => base_name,
    };
    name.to_lowercase()
}

/// Derive the family name by stripping style suffixes from the
/// normalized name ("times-bolditalic" -> "times").
fn family_name(normalized: &str) -> Option<String> {
    let mut family = normalized;
    for sep in ['-', ','] {
        if let Some((head, _)) = family.split_once(sep) {
            family = head;
        }
    }
    let family = family
        .trim_end_matches("bolditalic")
        .trim_end_matches("bold")
        .trim_end_matches("italic")
        .trim_end_matches("oblique")
        .trim_end_matches("regular");
    if family.is_empty() {
        None
    } else {
        Some(family.to_string())
    }
}

/// A font paired with a size in points.
///
/// Equality and hashing use the value identity required for frequency
/// maps: family name, size rounded to 0.1pt, bold and italic flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontFace {
    /// The font
    pub font: Arc<Font>,

    /// Font size in points
    pub size: f32,
}

impl FontFace {
    /// Create a new font face.
    pub fn new(font: Arc<Font>, size: f32) -> Self {
        Self { font, size }
    }

    /// The font size rounded to tenths of a point.
    pub fn size_tenths(&self) -> i32 {
        (self.size * 10.0).round() as i32
    }
}

impl PartialEq for FontFace {
    fn eq(&self, other: &Self) -> bool {
        self.font.family_name == other.font.family_name
            && self.size_tenths() == other.size_tenths()
            && self.font.is_bold == other.font.is_bold
            && self.font.is_italic == other.font.is_italic
    }
}

impl Eq for FontFace {}

impl Hash for FontFace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.font.family_name.hash(state);
        self.size_tenths().hash(state);
        self.font.is_bold.hash(state);
        self.font.is_italic.hash(state);
    }
}

/// An RGB color as registered in the document's color registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Registry identifier, e.g. "color-0"
    pub id: String,

    /// RGB components in the range 0..=255
    pub rgb: [u8; 3],
}

impl Color {
    /// Create a new color.
    pub fn new(id: impl Into<String>, rgb: [u8; 3]) -> Self {
        Self { id: id.into(), rgb }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_from_base_name() {
        let font = Font::from_base_name("font-0", "ABCDEF+Times-Bold");
        assert_eq!(font.normalized_name, "times-bold");
        assert_eq!(font.family_name.as_deref(), Some("times"));
        assert!(font.is_bold);
        assert!(!font.is_italic);
    }

    #[test]
    fn test_font_oblique_detection() {
        let font = Font::from_base_name("font-1", "Helvetica-Oblique");
        assert!(!font.is_bold);
        assert!(font.is_italic);
        assert_eq!(font.family_name.as_deref(), Some("helvetica"));
    }

    #[test]
    fn test_font_without_subset_prefix() {
        let font = Font::from_base_name("font-2", "CMR10");
        assert_eq!(font.normalized_name, "cmr10");
    }

    #[test]
    fn test_font_face_equality_by_rounded_size() {
        let font = Arc::new(Font::from_base_name("font-0", "Times-Roman"));
        let a = FontFace::new(font.clone(), 11.98);
        let b = FontFace::new(font.clone(), 12.02);
        let c = FontFace::new(font, 12.6);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_font_face_distinguishes_bold() {
        let roman = Arc::new(Font::from_base_name("font-0", "Times-Roman"));
        let bold = Arc::new(Font::from_base_name("font-1", "Times-Bold"));
        let a = FontFace::new(roman, 12.0);
        let b = FontFace::new(bold, 12.0);
        assert_ne!(a, b);
    }
}
