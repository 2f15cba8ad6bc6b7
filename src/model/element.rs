//! Text and graphic elements of a page.

use serde::{Deserialize, Serialize};

use super::{Color, FontFace, Line, Position, Rectangle, SemanticRole};
use crate::stats::{CharacterStatistic, TextLineStatistic};

/// A single positioned character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// The glyph text; may hold more than one char for ligatures
    pub glyph: String,

    /// The position on the page
    pub position: Position,

    /// The font face the character is set in
    pub font_face: FontFace,

    /// The fill color
    pub color: Color,

    /// The baseline the character rests on
    pub baseline: Line,

    /// Rotation quadrant in degrees (0, 90, 180 or 270)
    pub rotation: u16,
}

impl Character {
    /// Check whether the glyph consists only of whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.glyph.chars().all(char::is_whitespace)
    }
}

/// A word: a maximal run of characters without intervening whitespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    /// The word text
    pub text: String,

    /// The characters of the word, left to right
    pub characters: Vec<Character>,

    /// Covered areas; more than one when a dehyphenated word spans two
    /// text blocks
    pub positions: Vec<Position>,
}

impl Word {
    /// Build a word from its characters; the characters must be in
    /// left-to-right order and non-empty.
    pub fn from_characters(characters: Vec<Character>) -> Self {
        let text = characters.iter().map(|c| c.glyph.as_str()).collect();
        let rect = Rectangle::union_all(characters.iter().map(|c| &c.position.rectangle))
            .unwrap_or(Rectangle::new(0.0, 0.0, 0.0, 0.0));
        let page_number = characters.first().map_or(0, |c| c.position.page_number);
        Self {
            text,
            characters,
            positions: vec![Position::new(page_number, rect)],
        }
    }
}

/// A text line: words sharing a baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    /// The words of the line, left to right
    pub words: Vec<Word>,

    /// The position on the page
    pub position: Position,

    /// The baseline; `None` when it could not be derived
    pub baseline: Option<Line>,

    /// Statistics over the characters of the line
    #[serde(skip)]
    pub character_statistic: CharacterStatistic,
}

impl TextLine {
    /// The text of the line: words joined by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The x coordinate of the left edge.
    pub fn min_x(&self) -> f32 {
        self.position.rectangle.min_x
    }
}

/// A text block: consecutive lines forming one visual unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    /// The lines of the block, top to bottom
    pub lines: Vec<TextLine>,

    /// The position on the page
    pub position: Position,

    /// The block text: line texts joined by single spaces
    pub text: String,

    /// Statistics over the characters of the block
    #[serde(skip)]
    pub character_statistic: CharacterStatistic,

    /// Line-pitch statistics over the lines of the block
    #[serde(skip)]
    pub line_statistic: TextLineStatistic,

    /// The primary semantic role; assigned by the semanticizer
    pub role: Option<SemanticRole>,

    /// The secondary semantic role, e.g. the section a heading opens
    pub secondary_role: Option<SemanticRole>,
}

impl TextBlock {
    /// Build a block from its lines, computing position, text and
    /// statistics. The lines must be in reading order and non-empty.
    pub fn from_lines(lines: Vec<TextLine>) -> Self {
        let rect = Rectangle::union_all(lines.iter().map(|l| &l.position.rectangle))
            .unwrap_or(Rectangle::new(0.0, 0.0, 0.0, 0.0));
        let page_number = lines.first().map_or(0, |l| l.position.page_number);
        let text = lines.iter().map(|l| l.text()).collect::<Vec<_>>().join(" ");
        let character_statistic =
            CharacterStatistic::aggregate(lines.iter().map(|l| &l.character_statistic));
        let line_statistic = TextLineStatistic::from_lines(&lines);
        Self {
            lines,
            position: Position::new(page_number, rect),
            text,
            character_statistic,
            line_statistic,
            role: None,
            secondary_role: None,
        }
    }

    /// All words of the block, in reading order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.lines.iter().flat_map(|l| l.words.iter())
    }
}

/// A paragraph: a logical reading unit, possibly spanning pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    /// The words of the paragraph, in reading order
    pub words: Vec<Word>,

    /// One position per covered text block, in order
    pub positions: Vec<Position>,

    /// The semantic role
    pub role: SemanticRole,

    /// The paragraph text: words joined by single spaces
    pub text: String,
}

/// A figure (raster image) on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    /// The position on the page
    pub position: Position,
}

/// A vector shape on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    /// The position on the page
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Font;
    use std::sync::Arc;

    fn make_char(glyph: &str, x: f32, y: f32, size: f32) -> Character {
        let font = Arc::new(Font::from_base_name("font-0", "Times-Roman"));
        Character {
            glyph: glyph.to_string(),
            position: Position::new(1, Rectangle::new(x, y, x + size * 0.5, y + size)),
            font_face: FontFace::new(font, size),
            color: Color::new("color-0", [0, 0, 0]),
            baseline: Line::horizontal(x, x + size * 0.5, y),
            rotation: 0,
        }
    }

    #[test]
    fn test_word_from_characters() {
        let word = Word::from_characters(vec![
            make_char("f", 0.0, 0.0, 10.0),
            make_char("o", 5.0, 0.0, 10.0),
            make_char("o", 10.0, 0.0, 10.0),
        ]);
        assert_eq!(word.text, "foo");
        assert_eq!(word.positions.len(), 1);
        assert_eq!(word.positions[0].rectangle.min_x, 0.0);
        assert_eq!(word.positions[0].rectangle.max_x, 15.0);
    }

    #[test]
    fn test_block_bounding_rectangle_is_union() {
        let chars_a = vec![make_char("a", 0.0, 100.0, 10.0)];
        let chars_b = vec![make_char("b", 2.0, 88.0, 10.0)];
        let line = |chars: Vec<Character>| {
            let rect = Rectangle::union_all(chars.iter().map(|c| &c.position.rectangle)).unwrap();
            let stat = CharacterStatistic::from_characters(&chars);
            TextLine {
                words: vec![Word::from_characters(chars)],
                position: Position::new(1, rect),
                baseline: Some(Line::horizontal(rect.min_x, rect.max_x, rect.min_y)),
                character_statistic: stat,
            }
        };
        let block = TextBlock::from_lines(vec![line(chars_a), line(chars_b)]);
        assert_eq!(block.position.rectangle.min_y, 88.0);
        assert_eq!(block.position.rectangle.max_y, 110.0);
        assert_eq!(block.text, "a b");
    }
}
