//! JSON serialization.
//!
//! Mirrors the XML backend: the same unit and role filtering, the same
//! section order, and deterministic output. Sections without content
//! are omitted.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{
    Color, Document, ExtractionUnit, Paragraph, Position, SemanticRole, Word,
};

use super::Serializer;

/// Serializes a document as pretty-printed JSON.
pub struct JsonSerializer {
    units: HashSet<ExtractionUnit>,
    roles: HashSet<SemanticRole>,
}

impl JsonSerializer {
    /// Create a JSON serializer for the given unit and role sets.
    pub fn new(units: HashSet<ExtractionUnit>, roles: HashSet<SemanticRole>) -> Self {
        Self { units, roles }
    }

    fn included_paragraphs<'a>(&'a self, doc: &'a Document) -> impl Iterator<Item = &'a Paragraph> {
        doc.paragraphs
            .iter()
            .filter(move |p| self.roles.contains(&p.role))
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&mut self, doc: &Document) -> Result<Vec<u8>> {
        let mut view = DocumentView::default();
        let mut fonts = UsedRegistry::default();

        if self.units.contains(&ExtractionUnit::Paragraph) {
            let paragraphs: Vec<ParagraphView> = self
                .included_paragraphs(doc)
                .map(ParagraphView::from)
                .collect();
            if !paragraphs.is_empty() {
                view.paragraphs = Some(paragraphs);
            }
        }

        if self.units.contains(&ExtractionUnit::Word) {
            let words: Vec<WordView> = self
                .included_paragraphs(doc)
                .flat_map(|p| p.words.iter())
                .map(WordView::from)
                .collect();
            if !words.is_empty() {
                view.words = Some(words);
            }
        }

        if self.units.contains(&ExtractionUnit::Character) {
            let mut characters = Vec::new();
            for paragraph in self.included_paragraphs(doc) {
                for word in &paragraph.words {
                    for ch in &word.characters {
                        fonts.mark(&ch.font_face.font.id, &ch.color);
                        characters.push(CharacterView {
                            positions: vec![PositionView::from(&ch.position)],
                            font: FontRef {
                                id: ch.font_face.font.id.clone(),
                                fontsize: ch.font_face.size,
                            },
                            color: ColorRef {
                                id: ch.color.id.clone(),
                            },
                            text: ch.glyph.clone(),
                        });
                    }
                }
            }
            if !characters.is_empty() {
                view.characters = Some(characters);
            }
        }

        if self.units.contains(&ExtractionUnit::Figure) {
            let figures: Vec<GraphicView> = doc
                .pages
                .iter()
                .flat_map(|p| p.figures.iter())
                .map(|f| GraphicView {
                    positions: vec![PositionView::from(&f.position)],
                })
                .collect();
            if !figures.is_empty() {
                view.figures = Some(figures);
            }
        }

        if self.units.contains(&ExtractionUnit::Shape) {
            let shapes: Vec<GraphicView> = doc
                .pages
                .iter()
                .flat_map(|p| p.shapes.iter())
                .map(|s| GraphicView {
                    positions: vec![PositionView::from(&s.position)],
                })
                .collect();
            if !shapes.is_empty() {
                view.shapes = Some(shapes);
            }
        }

        if !fonts.font_ids.is_empty() {
            let font_views: Vec<FontView> = fonts
                .font_ids
                .iter()
                .filter_map(|id| doc.font_by_id(id))
                .map(|font| FontView {
                    id: font.id.clone(),
                    name: font.normalized_name.clone(),
                    is_bold: font.is_bold,
                    is_italic: font.is_italic,
                    is_type3: font.is_type3,
                })
                .collect();
            view.fonts = Some(font_views);
        }

        if !fonts.colors.is_empty() {
            let color_views: Vec<ColorView> = fonts
                .colors
                .iter()
                .map(|color| ColorView {
                    id: color.id.clone(),
                    r: color.rgb[0],
                    g: color.rgb[1],
                    b: color.rgb[2],
                })
                .collect();
            view.colors = Some(color_views);
        }

        if self.units.contains(&ExtractionUnit::Page) && !doc.pages.is_empty() {
            view.pages = Some(
                doc.pages
                    .iter()
                    .map(|p| PageView {
                        id: p.number,
                        width: p.width,
                        height: p.height,
                    })
                    .collect(),
            );
        }

        let mut bytes = serde_json::to_vec_pretty(&view)
            .map_err(|e| Error::Serialize(format!("JSON serialization error: {}", e)))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Tracks fonts and colors actually referenced by emitted characters,
/// in first-use order.
#[derive(Default)]
struct UsedRegistry {
    font_ids: Vec<String>,
    colors: Vec<Color>,
}

impl UsedRegistry {
    fn mark(&mut self, font_id: &str, color: &Color) {
        if !self.font_ids.iter().any(|id| id == font_id) {
            self.font_ids.push(font_id.to_string());
        }
        if !self.colors.iter().any(|c| c.id == color.id) {
            self.colors.push(color.clone());
        }
    }
}

#[derive(Serialize, Default)]
struct DocumentView {
    #[serde(skip_serializing_if = "Option::is_none")]
    paragraphs: Option<Vec<ParagraphView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    words: Option<Vec<WordView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    characters: Option<Vec<CharacterView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    figures: Option<Vec<GraphicView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shapes: Option<Vec<GraphicView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fonts: Option<Vec<FontView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    colors: Option<Vec<ColorView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pages: Option<Vec<PageView>>,
}

#[derive(Serialize)]
struct ParagraphView {
    positions: Vec<PositionView>,
    role: &'static str,
    text: String,
}

impl From<&Paragraph> for ParagraphView {
    fn from(p: &Paragraph) -> Self {
        Self {
            positions: p.positions.iter().map(PositionView::from).collect(),
            role: p.role.name(),
            text: p.text.clone(),
        }
    }
}

#[derive(Serialize)]
struct WordView {
    positions: Vec<PositionView>,
    text: String,
}

impl From<&Word> for WordView {
    fn from(w: &Word) -> Self {
        Self {
            positions: w.positions.iter().map(PositionView::from).collect(),
            text: w.text.clone(),
        }
    }
}

#[derive(Serialize)]
struct CharacterView {
    positions: Vec<PositionView>,
    font: FontRef,
    color: ColorRef,
    text: String,
}

#[derive(Serialize)]
struct FontRef {
    id: String,
    fontsize: f32,
}

#[derive(Serialize)]
struct ColorRef {
    id: String,
}

#[derive(Serialize)]
struct GraphicView {
    positions: Vec<PositionView>,
}

#[derive(Serialize)]
struct PositionView {
    page: u32,
    #[serde(rename = "minX")]
    min_x: f32,
    #[serde(rename = "minY")]
    min_y: f32,
    #[serde(rename = "maxX")]
    max_x: f32,
    #[serde(rename = "maxY")]
    max_y: f32,
}

impl From<&Position> for PositionView {
    fn from(p: &Position) -> Self {
        Self {
            page: p.page_number,
            min_x: p.rectangle.min_x,
            min_y: p.rectangle.min_y,
            max_x: p.rectangle.max_x,
            max_y: p.rectangle.max_y,
        }
    }
}

#[derive(Serialize)]
struct FontView {
    id: String,
    name: String,
    #[serde(rename = "isBold")]
    is_bold: bool,
    #[serde(rename = "isItalic")]
    is_italic: bool,
    #[serde(rename = "isType3")]
    is_type3: bool,
}

#[derive(Serialize)]
struct ColorView {
    id: String,
    r: u8,
    g: u8,
    b: u8,
}

#[derive(Serialize)]
struct PageView {
    id: u32,
    width: f32,
    height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rectangle;
    use crate::serialize::{default_roles, default_units};

    fn paragraph(text: &str, role: SemanticRole) -> Paragraph {
        Paragraph {
            words: Vec::new(),
            positions: vec![Position::new(1, Rectangle::new(0.0, 0.0, 10.0, 10.0))],
            role,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_empty_document_gives_empty_object() {
        let doc = Document::new();
        let mut serializer = JsonSerializer::new(default_units(), default_roles());
        let output = String::from_utf8(serializer.serialize(&doc).unwrap()).unwrap();
        assert_eq!(output, "{}\n");
    }

    #[test]
    fn test_paragraph_roles_and_text() {
        let mut doc = Document::new();
        doc.paragraphs.push(paragraph("Hello", SemanticRole::Body));

        let mut serializer = JsonSerializer::new(default_units(), default_roles());
        let output = String::from_utf8(serializer.serialize(&doc).unwrap()).unwrap();

        assert!(output.contains("\"role\": \"body\""));
        assert!(output.contains("\"text\": \"Hello\""));
        assert!(output.contains("\"minX\": 0.0"));
    }

    #[test]
    fn test_role_filter() {
        let mut doc = Document::new();
        doc.paragraphs.push(paragraph("kept", SemanticRole::Body));
        doc.paragraphs.push(paragraph("dropped", SemanticRole::PageFooter));

        let roles = [SemanticRole::Body].into_iter().collect();
        let mut serializer = JsonSerializer::new(default_units(), roles);
        let output = String::from_utf8(serializer.serialize(&doc).unwrap()).unwrap();

        assert!(output.contains("kept"));
        assert!(!output.contains("dropped"));
    }

    #[test]
    fn test_deterministic_output() {
        let mut doc = Document::new();
        doc.paragraphs.push(paragraph("One", SemanticRole::Body));

        let mut serializer = JsonSerializer::new(default_units(), default_roles());
        assert_eq!(
            serializer.serialize(&doc).unwrap(),
            serializer.serialize(&doc).unwrap()
        );
    }
}
