//! Heading detection.

use regex::Regex;

use crate::error::Result;
use crate::model::{Document, SemanticRole};

use super::{RoleJournal, SemanticModule};

/// Known section heading texts and the section role they open.
const SECTION_KEYWORDS: [(&str, SemanticRole); 12] = [
    ("abstract", SemanticRole::Abstract),
    ("keywords", SemanticRole::Keywords),
    ("index terms", SemanticRole::Keywords),
    ("author keywords", SemanticRole::Keywords),
    ("categories and subject descriptors", SemanticRole::Categories),
    ("general terms", SemanticRole::GeneralTerms),
    ("acknowledgments", SemanticRole::Acknowledgments),
    ("acknowledgements", SemanticRole::Acknowledgments),
    ("acknowledgment", SemanticRole::Acknowledgments),
    ("acknowledgement", SemanticRole::Acknowledgments),
    ("references", SemanticRole::Reference),
    ("bibliography", SemanticRole::Reference),
];

/// How much a heading font must exceed the body font, in points.
const HEADING_SIZE_DELTA: f32 = 1.5;

/// Maximum number of words for a keyword-matched heading.
const MAX_KEYWORD_HEADING_WORDS: usize = 5;

/// Assigns the heading role to blocks set in a font noticeably larger
/// than the document body font, or whose text is a known section
/// heading. Keyword matches also record the opened section as the
/// block's secondary role, which the section modules key on.
pub struct HeadingModule {
    enumeration: Regex,
}

impl HeadingModule {
    /// Create a new heading module.
    pub fn new() -> Self {
        Self {
            // Leading section numbers like "2." or "3.1.4".
            enumeration: Regex::new(r"^\d+(\.\d+)*\.?\s*").unwrap(),
        }
    }

    /// Normalize a block text for keyword lookup: strip a leading
    /// section number, trailing punctuation and case.
    fn clean(&self, text: &str) -> String {
        let text = self.enumeration.replace(text.trim(), "");
        text.trim_end_matches([':', '.']).trim().to_lowercase()
    }
}

impl Default for HeadingModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticModule for HeadingModule {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn semanticize(&mut self, doc: &mut Document, journal: &mut RoleJournal) -> Result<()> {
        let body_size = doc.character_statistic.most_common_font_size();

        for page in 0..doc.pages.len() {
            for block in 0..doc.pages[page].text_blocks.len() {
                let (role, size, keyword) = {
                    let b = &doc.pages[page].text_blocks[block];
                    let keyword = if b.lines.len() <= 1
                        && b.words().count() <= MAX_KEYWORD_HEADING_WORDS
                    {
                        let cleaned = self.clean(&b.text);
                        SECTION_KEYWORDS
                            .iter()
                            .find(|(k, _)| *k == cleaned)
                            .map(|(_, role)| *role)
                    } else {
                        None
                    };
                    (b.role, b.character_statistic.most_common_font_size(), keyword)
                };

                // The title is detected first and outranks headings.
                if role == Some(SemanticRole::Title) {
                    continue;
                }

                let oversized = body_size > 0.0 && size >= body_size + HEADING_SIZE_DELTA;
                if oversized || keyword.is_some() {
                    journal.set_role(doc, page, block, SemanticRole::Heading);
                }
                if let Some(section) = keyword {
                    journal.set_secondary_role(doc, page, block, section);
                }
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

    fn text_block(text: &str, size: f32) -> TextBlock {
        let font = Arc::new(Font::from_base_name("font-0", "Times-Roman"));
        let mut x = 0.0;
        let mut words = Vec::new();
        for token in text.split_whitespace() {
            let mut chars = Vec::new();
            for g in token.chars() {
                chars.push(Character {
                    glyph: g.to_string(),
                    position: Position::new(1, Rectangle::new(x, 0.0, x + 5.0, size)),
                    font_face: FontFace::new(font.clone(), size),
                    color: Color::new("color-0", [0, 0, 0]),
                    baseline: Line::horizontal(x, x + 5.0, 0.0),
                    rotation: 0,
                });
                x += 5.0;
            }
            words.push(Word::from_characters(chars));
            x += 5.0;
        }
        let rect = Rectangle::new(0.0, 0.0, x, size);
        let stat = CharacterStatistic::from_characters(
            words.iter().flat_map(|w| w.characters.iter()),
        );
        TextBlock::from_lines(vec![TextLine {
            words,
            position: Position::new(1, rect),
            baseline: Some(Line::horizontal(0.0, x, 0.0)),
            character_statistic: stat,
        }])
    }

    fn doc_with(blocks: Vec<TextBlock>) -> Document {
        let mut doc = Document::new();
        let mut page = Page::letter(1);
        page.text_blocks = blocks;
        doc.add_page(page);
        doc.character_statistic = CharacterStatistic::aggregate(
            doc.pages[0]
                .text_blocks
                .iter()
                .map(|b| &b.character_statistic),
        );
        doc
    }

    #[test]
    fn test_oversized_block_becomes_heading() {
        let mut doc = doc_with(vec![
            text_block("Introduction", 14.0),
            text_block("plain body text with more words than the heading has", 10.0),
        ]);
        HeadingModule::new()
            .semanticize(&mut doc, &mut RoleJournal::new())
            .unwrap();
        assert_eq!(doc.pages[0].text_blocks[0].role, Some(SemanticRole::Heading));
        assert_eq!(doc.pages[0].text_blocks[1].role, None);
    }

    #[test]
    fn test_keyword_heading_gets_secondary_role() {
        let mut doc = doc_with(vec![
            text_block("ABSTRACT", 10.0),
            text_block("the body of the paper keeps going on and on here", 10.0),
        ]);
        HeadingModule::new()
            .semanticize(&mut doc, &mut RoleJournal::new())
            .unwrap();
        let block = &doc.pages[0].text_blocks[0];
        assert_eq!(block.role, Some(SemanticRole::Heading));
        assert_eq!(block.secondary_role, Some(SemanticRole::Abstract));
    }

    #[test]
    fn test_numbered_references_heading() {
        let mut doc = doc_with(vec![
            text_block("7. References", 10.0),
            text_block("the body of the paper keeps going on and on here", 10.0),
        ]);
        HeadingModule::new()
            .semanticize(&mut doc, &mut RoleJournal::new())
            .unwrap();
        let block = &doc.pages[0].text_blocks[0];
        assert_eq!(block.role, Some(SemanticRole::Heading));
        assert_eq!(block.secondary_role, Some(SemanticRole::Reference));
    }

    #[test]
    fn test_long_block_mentioning_keyword_is_not_heading() {
        let mut doc = doc_with(vec![text_block(
            "the references in this work are listed at the end",
            10.0,
        )]);
        HeadingModule::new()
            .semanticize(&mut doc, &mut RoleJournal::new())
            .unwrap();
        assert_eq!(doc.pages[0].text_blocks[0].role, None);
    }

    #[test]
    fn test_clean_strips_numbering_and_punctuation() {
        let module = HeadingModule::new();
        assert_eq!(module.clean("3.1 General Terms:"), "general terms");
        assert_eq!(module.clean("REFERENCES."), "references");
        assert_eq!(module.clean("Abstract"), "abstract");
    }
}
