//! XML serialization.
//!
//! Output is indented by two spaces per level and escaped with XML 1.1
//! escaping. Sections appear in a fixed order under `<document>`:
//! paragraphs, words, characters, figures, shapes, fonts, colors,
//! pages. A section is only emitted when it has content; the fonts and
//! colors sections list exactly the fonts and colors referenced by
//! emitted elements, in first-use order.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::Result;
use crate::model::{
    Character, Color, Document, ExtractionUnit, Font, Paragraph, Position, SemanticRole,
};

use super::Serializer;

const INDENT: &str = "  ";

/// Serializes a document as XML.
pub struct XmlSerializer {
    units: HashSet<ExtractionUnit>,
    roles: HashSet<SemanticRole>,
    used_fonts: Vec<Arc<Font>>,
    used_colors: Vec<Color>,
}

impl XmlSerializer {
    /// Create an XML serializer for the given unit and role sets.
    pub fn new(units: HashSet<ExtractionUnit>, roles: HashSet<SemanticRole>) -> Self {
        Self {
            units,
            roles,
            used_fonts: Vec::new(),
            used_colors: Vec::new(),
        }
    }

    fn serialize_paragraphs(&self, doc: &Document, lines: &mut Vec<String>) {
        let mut section = Vec::new();
        for paragraph in self.included_paragraphs(doc) {
            section.push(start("paragraph", 2));
            self.serialize_positions(&paragraph.positions, 3, &mut section);
            section.push(leaf("role", 3, paragraph.role.name()));
            section.push(leaf("text", 3, &paragraph.text));
            section.push(end("paragraph", 2));
        }
        wrap_section("paragraphs", section, lines);
    }

    fn serialize_words(&self, doc: &Document, lines: &mut Vec<String>) {
        let mut section = Vec::new();
        for paragraph in self.included_paragraphs(doc) {
            for word in &paragraph.words {
                section.push(start("word", 2));
                self.serialize_positions(&word.positions, 3, &mut section);
                section.push(leaf("text", 3, &word.text));
                section.push(end("word", 2));
            }
        }
        wrap_section("words", section, lines);
    }

    fn serialize_characters(&mut self, doc: &Document, lines: &mut Vec<String>) {
        let mut section = Vec::new();
        let included: Vec<usize> = (0..doc.paragraphs.len())
            .filter(|&i| self.roles.contains(&doc.paragraphs[i].role))
            .collect();
        for index in included {
            for word in &doc.paragraphs[index].words {
                for character in &word.characters {
                    self.serialize_character(character, &mut section);
                }
            }
        }
        wrap_section("characters", section, lines);
    }

    fn serialize_character(&mut self, character: &Character, section: &mut Vec<String>) {
        section.push(start("character", 2));
        self.serialize_positions(std::slice::from_ref(&character.position), 3, section);

        section.push(start("font", 3));
        section.push(leaf("id", 4, &character.font_face.font.id));
        section.push(leaf("fontsize", 4, format_float(character.font_face.size)));
        section.push(end("font", 3));
        self.mark_font_used(&character.font_face.font);

        section.push(start("color", 3));
        section.push(leaf("id", 4, &character.color.id));
        section.push(end("color", 3));
        self.mark_color_used(&character.color);

        section.push(leaf("text", 3, &character.glyph));
        section.push(end("character", 2));
    }

    fn serialize_graphics(&self, doc: &Document, lines: &mut Vec<String>) {
        for (unit, wrapper, element) in [
            (ExtractionUnit::Figure, "figures", "figure"),
            (ExtractionUnit::Shape, "shapes", "shape"),
        ] {
            if !self.units.contains(&unit) {
                continue;
            }
            let mut section = Vec::new();
            for page in &doc.pages {
                let positions: Vec<&Position> = match unit {
                    ExtractionUnit::Figure => page.figures.iter().map(|f| &f.position).collect(),
                    _ => page.shapes.iter().map(|s| &s.position).collect(),
                };
                for position in positions {
                    section.push(start(element, 2));
                    self.serialize_positions(std::slice::from_ref(position), 3, &mut section);
                    section.push(end(element, 2));
                }
            }
            wrap_section(wrapper, section, lines);
        }
    }

    fn serialize_fonts(&self, lines: &mut Vec<String>) {
        let mut section = Vec::new();
        for font in &self.used_fonts {
            section.push(start("font", 2));
            section.push(leaf("id", 3, &font.id));
            section.push(leaf("name", 3, &font.normalized_name));
            section.push(leaf("isBold", 3, bool_text(font.is_bold)));
            section.push(leaf("isItalic", 3, bool_text(font.is_italic)));
            section.push(leaf("isType3", 3, bool_text(font.is_type3)));
            section.push(end("font", 2));
        }
        wrap_section("fonts", section, lines);
    }

    fn serialize_colors(&self, lines: &mut Vec<String>) {
        let mut section = Vec::new();
        for color in &self.used_colors {
            section.push(start("color", 2));
            section.push(leaf("id", 3, &color.id));
            section.push(leaf("r", 3, color.rgb[0].to_string()));
            section.push(leaf("g", 3, color.rgb[1].to_string()));
            section.push(leaf("b", 3, color.rgb[2].to_string()));
            section.push(end("color", 2));
        }
        wrap_section("colors", section, lines);
    }

    fn serialize_pages(&self, doc: &Document, lines: &mut Vec<String>) {
        let mut section = Vec::new();
        for page in &doc.pages {
            section.push(start("page", 2));
            section.push(leaf("id", 3, page.number.to_string()));
            section.push(leaf("width", 3, format_float(page.width)));
            section.push(leaf("height", 3, format_float(page.height)));
            section.push(end("page", 2));
        }
        wrap_section("pages", section, lines);
    }

    fn serialize_positions(&self, positions: &[Position], level: usize, lines: &mut Vec<String>) {
        if positions.is_empty() {
            return;
        }
        lines.push(start("positions", level));
        for position in positions {
            let rect = position.rectangle;
            lines.push(start("position", level + 1));
            lines.push(leaf("page", level + 2, position.page_number.to_string()));
            lines.push(leaf("minX", level + 2, format_float(rect.min_x)));
            lines.push(leaf("minY", level + 2, format_float(rect.min_y)));
            lines.push(leaf("maxX", level + 2, format_float(rect.max_x)));
            lines.push(leaf("maxY", level + 2, format_float(rect.max_y)));
            lines.push(end("position", level + 1));
        }
        lines.push(end("positions", level));
    }

    fn included_paragraphs<'a>(&'a self, doc: &'a Document) -> impl Iterator<Item = &'a Paragraph> {
        doc.paragraphs
            .iter()
            .filter(move |p| self.roles.contains(&p.role))
    }

    fn mark_font_used(&mut self, font: &Arc<Font>) {
        if !self.used_fonts.iter().any(|f| f.id == font.id) {
            self.used_fonts.push(font.clone());
        }
    }

    fn mark_color_used(&mut self, color: &Color) {
        if !self.used_colors.iter().any(|c| c.id == color.id) {
            self.used_colors.push(color.clone());
        }
    }
}

impl Serializer for XmlSerializer {
    fn serialize(&mut self, doc: &Document) -> Result<Vec<u8>> {
        self.used_fonts.clear();
        self.used_colors.clear();

        let mut lines = vec![start("document", 0)];

        if self.units.contains(&ExtractionUnit::Paragraph) {
            self.serialize_paragraphs(doc, &mut lines);
        }
        if self.units.contains(&ExtractionUnit::Word) {
            self.serialize_words(doc, &mut lines);
        }
        if self.units.contains(&ExtractionUnit::Character) {
            self.serialize_characters(doc, &mut lines);
        }
        self.serialize_graphics(doc, &mut lines);
        self.serialize_fonts(&mut lines);
        self.serialize_colors(&mut lines);
        if self.units.contains(&ExtractionUnit::Page) {
            self.serialize_pages(doc, &mut lines);
        }

        lines.push(end("document", 0));

        let mut output = lines.join("\n");
        output.push('\n');
        Ok(output.into_bytes())
    }
}

/// Emit a section wrapper at level 1 around the given entry lines;
/// empty sections are omitted entirely.
fn wrap_section(tag: &str, section: Vec<String>, lines: &mut Vec<String>) {
    if section.is_empty() {
        return;
    }
    lines.push(start(tag, 1));
    lines.extend(section);
    lines.push(end(tag, 1));
}

fn start(tag: &str, level: usize) -> String {
    format!("{}<{}>", INDENT.repeat(level), tag)
}

fn end(tag: &str, level: usize) -> String {
    format!("{}</{}>", INDENT.repeat(level), tag)
}

fn leaf(tag: &str, level: usize, value: impl AsRef<str>) -> String {
    format!(
        "{indent}<{tag}>{value}</{tag}>",
        indent = INDENT.repeat(level),
        tag = tag,
        value = escape_xml11(value.as_ref())
    )
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Format a float in Rust's shortest round-trip form.
fn format_float(value: f32) -> String {
    format!("{}", value)
}

/// Escape character data per XML 1.1: the five predefined entities,
/// numeric references for control characters (other than tab, LF and
/// CR), and removal of NUL, which no XML version can carry.
fn escape_xml11(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\0' => {}
            '\t' | '\n' | '\r' => escaped.push(c),
            c if (c as u32) < 0x20 || (0x7F..=0x9F).contains(&(c as u32)) => {
                let _ = write!(escaped, "&#{};", c as u32);
            }
            c => escaped.push(c),
        }
    }
    escaped
}
