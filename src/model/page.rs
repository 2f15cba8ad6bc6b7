//! Page-level types.

use serde::{Deserialize, Serialize};

use super::{Character, Figure, Shape, TextBlock, TextLine};
use crate::stats::{CharacterStatistic, TextLineStatistic};

/// A single page of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// The characters of the page, in reading order
    pub characters: Vec<Character>,

    /// The figures of the page
    pub figures: Vec<Figure>,

    /// The shapes of the page
    pub shapes: Vec<Shape>,

    /// The text lines, derived by the line tokenizer
    pub text_lines: Vec<TextLine>,

    /// The text blocks, derived by the block tokenizer
    pub text_blocks: Vec<TextBlock>,

    /// Statistics over the characters of the page
    #[serde(skip)]
    pub character_statistic: CharacterStatistic,

    /// Line-pitch statistics over the lines of the page
    #[serde(skip)]
    pub text_line_statistic: TextLineStatistic,
}

impl Page {
    /// Create a new empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            characters: Vec::new(),
            figures: Vec::new(),
            shapes: Vec::new(),
            text_lines: Vec::new(),
            text_blocks: Vec::new(),
            character_statistic: CharacterStatistic::default(),
            text_line_statistic: TextLineStatistic::default(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4(number: u32) -> Self {
        Self::new(number, 595.0, 842.0)
    }

    /// Check if the page has no characters.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::letter(1)
    }
}
