//! Document-level types and the font/color registries.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Color, Font, Page, Paragraph};
use crate::stats::{CharacterStatistic, TextLineStatistic};

/// A document: the sole long-lived aggregate of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Pages in the document
    pub pages: Vec<Page>,

    /// The interned fonts, in registration order
    pub fonts: Vec<Arc<Font>>,

    /// The interned colors, in registration order
    pub colors: Vec<Color>,

    /// The assembled paragraphs, in reading order
    pub paragraphs: Vec<Paragraph>,

    /// Statistics over all characters of the document
    #[serde(skip)]
    pub character_statistic: CharacterStatistic,

    /// Line-pitch statistics over all pages of the document
    #[serde(skip)]
    pub text_line_statistic: TextLineStatistic,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            fonts: Vec::new(),
            colors: Vec::new(),
            paragraphs: Vec::new(),
            character_statistic: CharacterStatistic::default(),
            text_line_statistic: TextLineStatistic::default(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Intern a font, returning the registered instance. A font with an
    /// already-registered id is not added twice.
    pub fn register_font(&mut self, font: Font) -> Arc<Font> {
        if let Some(existing) = self.fonts.iter().find(|f| f.id == font.id) {
            return existing.clone();
        }
        let font = Arc::new(font);
        self.fonts.push(font.clone());
        font
    }

    /// Intern a color by its RGB value, assigning a registry id on first
    /// sight.
    pub fn register_color(&mut self, rgb: [u8; 3]) -> Color {
        if let Some(existing) = self.colors.iter().find(|c| c.rgb == rgb) {
            return existing.clone();
        }
        let color = Color::new(format!("color-{}", self.colors.len()), rgb);
        self.colors.push(color.clone());
        color
    }

    /// Look up a registered font by id.
    pub fn font_by_id(&self, id: &str) -> Option<&Arc<Font>> {
        self.fonts.iter().find(|f| f.id == id)
    }

    /// Look up a registered color by id.
    pub fn color_by_id(&self, id: &str) -> Option<&Color> {
        self.colors.iter().find(|c| c.id == id)
    }

    /// Check if the document has no characters on any page.
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.is_empty())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert!(doc.get_page(1).is_none());
        assert!(doc.get_page(0).is_none());
    }

    #[test]
    fn test_register_font_dedupes_by_id() {
        let mut doc = Document::new();
        let a = doc.register_font(Font::from_base_name("font-0", "Times-Roman"));
        let b = doc.register_font(Font::from_base_name("font-0", "Times-Roman"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(doc.fonts.len(), 1);
    }

    #[test]
    fn test_register_color_assigns_sequential_ids() {
        let mut doc = Document::new();
        let black = doc.register_color([0, 0, 0]);
        let red = doc.register_color([255, 0, 0]);
        let black_again = doc.register_color([0, 0, 0]);
        assert_eq!(black.id, "color-0");
        assert_eq!(red.id, "color-1");
        assert_eq!(black_again.id, "color-0");
        assert_eq!(doc.colors.len(), 2);
    }
}
