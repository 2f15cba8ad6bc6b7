//! Title detection.

use crate::error::Result;
use crate::model::{Document, SemanticRole};

use super::{RoleJournal, SemanticModule};

/// How much the title font must exceed the body font, in points.
const TITLE_SIZE_DELTA: f32 = 0.5;

/// Assigns the title role to the block with the largest font on the
/// first non-empty page, provided that font is noticeably larger than
/// the document body font. A document set in one uniform size has no
/// title.
pub struct TitleModule;

impl TitleModule {
    /// Create a new title module.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TitleModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticModule for TitleModule {
    fn name(&self) -> &'static str {
        "title"
    }

    fn semanticize(&mut self, doc: &mut Document, journal: &mut RoleJournal) -> Result<()> {
        let Some(page) = doc.pages.iter().position(|p| !p.text_blocks.is_empty()) else {
            return Ok(());
        };
        let body_size = doc.character_statistic.most_common_font_size();

        let mut best: Option<(usize, f32)> = None;
        for (index, block) in doc.pages[page].text_blocks.iter().enumerate() {
            let size = block.character_statistic.most_common_font_size();
            if best.map_or(true, |(_, s)| size > s) {
                best = Some((index, size));
            }
        }

        if let Some((index, size)) = best {
            if size > body_size + TITLE_SIZE_DELTA {
                log::debug!(
                    "title: block {} on page {} ({}pt)",
                    index,
                    doc.pages[page].number,
                    size
                );
                journal.set_role(doc, page, index, SemanticRole::Title);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Character, Color, Font, FontFace, Line, Page, Position, Rectangle, TextBlock, TextLine,
        Word,
    };
    use crate::stats::CharacterStatistic;
    use std::sync::Arc;

    fn sized_block(size: f32) -> TextBlock {
        let font = Arc::new(Font::from_base_name("font-0", "Times-Roman"));
        let ch = Character {
            glyph: "a".to_string(),
            position: Position::new(1, Rectangle::new(0.0, 0.0, 5.0, size)),
            font_face: FontFace::new(font, size),
            color: Color::new("color-0", [0, 0, 0]),
            baseline: Line::horizontal(0.0, 5.0, 0.0),
            rotation: 0,
        };
        let stat = CharacterStatistic::from_characters([&ch]);
        let line = TextLine {
            words: vec![Word::from_characters(vec![ch])],
            position: Position::new(1, Rectangle::new(0.0, 0.0, 5.0, size)),
            baseline: Some(Line::horizontal(0.0, 5.0, 0.0)),
            character_statistic: stat,
        };
        TextBlock::from_lines(vec![line])
    }

    #[test]
    fn test_largest_block_becomes_title() {
        let mut doc = Document::new();
        let mut page = Page::letter(1);
        page.text_blocks = vec![sized_block(10.0), sized_block(22.0), sized_block(12.0)];
        doc.add_page(page);

        let mut module = TitleModule::new();
        module.semanticize(&mut doc, &mut RoleJournal::new()).unwrap();

        assert_eq!(doc.pages[0].text_blocks[1].role, Some(SemanticRole::Title));
        assert_eq!(doc.pages[0].text_blocks[0].role, None);
    }

    #[test]
    fn test_rerun_picks_same_block() {
        let mut doc = Document::new();
        let mut page = Page::letter(1);
        page.text_blocks = vec![sized_block(22.0), sized_block(22.0)];
        doc.add_page(page);

        let mut module = TitleModule::new();
        module.semanticize(&mut doc, &mut RoleJournal::new()).unwrap();
        module.semanticize(&mut doc, &mut RoleJournal::new()).unwrap();

        // Ties go to the first block, on both runs.
        assert_eq!(doc.pages[0].text_blocks[0].role, Some(SemanticRole::Title));
        assert_eq!(doc.pages[0].text_blocks[1].role, None);
    }

    #[test]
    fn test_empty_document_is_untouched() {
        let mut doc = Document::new();
        let mut module = TitleModule::new();
        module.semanticize(&mut doc, &mut RoleJournal::new()).unwrap();
        assert!(doc.pages.is_empty());
    }
}
