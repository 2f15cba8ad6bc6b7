//! Assembling text blocks into paragraphs.
//!
//! Runs after the semanticizer: consecutive blocks merge into one
//! paragraph when they share a semantic role, or when a hyphenated
//! word continues across the block boundary. Works across page
//! boundaries.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

use crate::model::{Document, Paragraph, SemanticRole, TextBlock, Word};

/// Merges text blocks into paragraphs, dehyphenating words broken
/// across block boundaries.
pub struct ParagraphAssembler {
    /// Known words, NFC-normalized and lowercased, used to decide
    /// whether a hyphen is spelling or line-breaking.
    dictionary: HashSet<String>,
}

impl ParagraphAssembler {
    /// Create an assembler without a dictionary. Hyphens are then
    /// removed unless preceded by a digit.
    pub fn new() -> Self {
        Self {
            dictionary: HashSet::new(),
        }
    }

    /// Create an assembler with a dictionary of known words.
    pub fn with_dictionary(words: impl IntoIterator<Item = String>) -> Self {
        Self {
            dictionary: words.into_iter().map(|w| normalize(&w)).collect(),
        }
    }

    /// Assemble the blocks of the document into paragraphs, in reading
    /// order.
    pub fn assemble(&self, doc: &Document) -> Vec<Paragraph> {
        let mut paragraphs: Vec<Paragraph> = Vec::new();
        let mut current: Option<ParagraphBuilder> = None;

        for page in &doc.pages {
            for block in &page.text_blocks {
                match current.take() {
                    Some(mut builder) if continues(&builder, block) => {
                        self.append_block(&mut builder, block);
                        current = Some(builder);
                    }
                    Some(builder) => {
                        paragraphs.push(builder.finish());
                        current = Some(ParagraphBuilder::start(block));
                    }
                    None => {
                        current = Some(ParagraphBuilder::start(block));
                    }
                }
            }
        }
        if let Some(builder) = current {
            paragraphs.push(builder.finish());
        }

        log::debug!("assembled {} paragraphs", paragraphs.len());

        paragraphs
    }

    /// Append a block's words to the builder, merging a hyphenated
    /// word across the boundary.
    fn append_block(&self, builder: &mut ParagraphBuilder, block: &TextBlock) {
        builder.positions.push(block.position);
        let mut words = block.words();
        if let (Some(last), Some(first)) = (builder.words.last(), words.next()) {
            if is_hyphen_continuation(last, first) {
                let last = builder.words.pop().unwrap();
                builder.words.push(self.merge_hyphenated(last, first));
            } else {
                builder.words.push(first.clone());
            }
        }
        builder.words.extend(words.cloned());
    }

    /// Merge a word ending in a hyphen with its continuation. The
    /// hyphen is removed when the joined word is in the dictionary or
    /// the hyphen is not preceded by a digit; otherwise it is kept.
    fn merge_hyphenated(&self, a: Word, b: &Word) -> Word {
        let stem = a.text.strip_suffix('-').unwrap_or(&a.text);
        let joined = format!("{}{}", stem, b.text);
        let digit_before_hyphen = stem.chars().last().is_some_and(|c| c.is_ascii_digit());
        let remove = self.dictionary.contains(&normalize(&joined)) || !digit_before_hyphen;

        let mut characters = a.characters;
        if remove {
            characters.pop();
        }
        characters.extend(b.characters.iter().cloned());

        let text = if remove {
            joined
        } else {
            format!("{}{}", a.text, b.text)
        };

        let mut positions = a.positions;
        positions.extend(b.positions.iter().copied());

        Word {
            text,
            characters,
            positions,
        }
    }
}

impl Default for ParagraphAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether `block` continues the paragraph being built: the
/// roles match and are not structural, or a hyphenated word runs
/// across the boundary.
fn continues(builder: &ParagraphBuilder, block: &TextBlock) -> bool {
    let block_role = block.role.unwrap_or(SemanticRole::Body);
    if builder.role.is_structural() || block_role.is_structural() {
        return false;
    }
    if builder.role == block_role {
        return true;
    }
    match (builder.words.last(), block.words().next()) {
        (Some(last), Some(first)) => is_hyphen_continuation(last, first),
        _ => false,
    }
}

/// Check whether `last` ends in a hyphen-minus and `first` starts
/// lowercase.
fn is_hyphen_continuation(last: &Word, first: &Word) -> bool {
    last.text.ends_with('-')
        && first
            .text
            .chars()
            .next()
            .is_some_and(|c| c.is_lowercase())
}

fn normalize(word: &str) -> String {
    word.nfc().collect::<String>().to_lowercase()
}

/// Accumulates the words and positions of one paragraph.
struct ParagraphBuilder {
    words: Vec<Word>,
    positions: Vec<crate::model::Position>,
    role: SemanticRole,
}

impl ParagraphBuilder {
    fn start(block: &TextBlock) -> Self {
        Self {
            words: block.words().cloned().collect(),
            positions: vec![block.position],
            role: block.role.unwrap_or(SemanticRole::Body),
        }
    }

    fn finish(self) -> Paragraph {
        let text = self
            .words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Paragraph {
            words: self.words,
            positions: self.positions,
            role: self.role,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Character, Color, Font, FontFace, Line, Page, Position, Rectangle, TextLine,
    };
    use crate::stats::CharacterStatistic;
    use std::sync::Arc;

    fn block_on_page(text: &str, page_number: u32, role: SemanticRole) -> TextBlock {
        let font = Arc::new(Font::from_base_name("font-0", "Times-Roman"));
        let mut x = 100.0;
        let mut words = Vec::new();
        for token in text.split_whitespace() {
            let mut chars = Vec::new();
            for g in token.chars() {
                chars.push(Character {
                    glyph: g.to_string(),
                    position: Position::new(page_number, Rectangle::new(x, 700.0, x + 5.0, 710.0)),
                    font_face: FontFace::new(font.clone(), 10.0),
                    color: Color::new("color-0", [0, 0, 0]),
                    baseline: Line::horizontal(x, x + 5.0, 700.0),
                    rotation: 0,
                });
                x += 5.0;
            }
            words.push(Word::from_characters(chars));
            x += 5.0;
        }
        let rect = Rectangle::new(100.0, 700.0, x, 710.0);
        let stat = CharacterStatistic::from_characters(
            words.iter().flat_map(|w| w.characters.iter()),
        );
        let line = TextLine {
            words,
            position: Position::new(page_number, rect),
            baseline: Some(Line::horizontal(100.0, x, 700.0)),
            character_statistic: stat,
        };
        let mut block = TextBlock::from_lines(vec![line]);
        block.role = Some(role);
        block
    }

    fn doc_with_blocks(blocks: Vec<TextBlock>) -> Document {
        let mut doc = Document::new();
        let mut page = Page::letter(1);
        page.text_blocks = blocks;
        doc.add_page(page);
        doc
    }

    #[test]
    fn test_same_role_blocks_merge() {
        let doc = doc_with_blocks(vec![
            block_on_page("first part", 1, SemanticRole::Body),
            block_on_page("second part", 1, SemanticRole::Body),
        ]);
        let paragraphs = ParagraphAssembler::new().assemble(&doc);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text, "first part second part");
        assert_eq!(paragraphs[0].positions.len(), 2);
    }

    #[test]
    fn test_differing_roles_stay_separate() {
        let doc = doc_with_blocks(vec![
            block_on_page("Summary", 1, SemanticRole::Abstract),
            block_on_page("Intro", 1, SemanticRole::Body),
        ]);
        let paragraphs = ParagraphAssembler::new().assemble(&doc);
        assert_eq!(paragraphs.len(), 2);
    }

    #[test]
    fn test_headings_never_merge() {
        let doc = doc_with_blocks(vec![
            block_on_page("Introduction", 1, SemanticRole::Heading),
            block_on_page("Motivation", 1, SemanticRole::Heading),
        ]);
        let paragraphs = ParagraphAssembler::new().assemble(&doc);
        assert_eq!(paragraphs.len(), 2);
    }

    #[test]
    fn test_dehyphenation_removes_line_break_hyphen() {
        let mut doc = Document::new();
        let mut page1 = Page::letter(1);
        page1.text_blocks = vec![block_on_page("ends with exam-", 1, SemanticRole::Body)];
        let mut page2 = Page::letter(2);
        page2.text_blocks = vec![block_on_page("ple continues", 2, SemanticRole::Body)];
        doc.add_page(page1);
        doc.add_page(page2);

        let paragraphs = ParagraphAssembler::new().assemble(&doc);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text, "ends with example continues");
        // Both fragments of the merged word keep their positions.
        let merged = paragraphs[0].words.iter().find(|w| w.text == "example").unwrap();
        assert_eq!(merged.positions.len(), 2);
    }

    #[test]
    fn test_hyphen_after_digit_is_kept() {
        // "mp3-" continues with a lowercase word, but the hyphen sits
        // after a digit and the joined word is unknown: the tokens
        // merge with the hyphen preserved.
        let doc = doc_with_blocks(vec![
            block_on_page("see mp3-", 1, SemanticRole::Body),
            block_on_page("player here", 1, SemanticRole::Body),
        ]);
        let paragraphs = ParagraphAssembler::new().assemble(&doc);
        assert_eq!(paragraphs[0].text, "see mp3-player here");
    }

    #[test]
    fn test_dictionary_overrides_digit_rule() {
        let doc = doc_with_blocks(vec![
            block_on_page("see mp3-", 1, SemanticRole::Body),
            block_on_page("player here", 1, SemanticRole::Body),
        ]);
        let assembler = ParagraphAssembler::with_dictionary(["mp3player".to_string()]);
        let paragraphs = assembler.assemble(&doc);
        assert_eq!(paragraphs[0].text, "see mp3player here");
    }

    #[test]
    fn test_uppercase_continuation_does_not_dehyphenate() {
        let doc = doc_with_blocks(vec![
            block_on_page("the X-", 1, SemanticRole::Body),
            block_on_page("Ray machine", 1, SemanticRole::Body),
        ]);
        let paragraphs = ParagraphAssembler::new().assemble(&doc);
        // Blocks still merge (same role), but the words stay apart.
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text, "the X- Ray machine");
    }
}
