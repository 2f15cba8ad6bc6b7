//! Plain text serialization.
//!
//! Emits the text of the included paragraphs separated by blank
//! lines. When the word or character unit is selected instead, each
//! word or glyph goes on its own line. Figures, shapes and page
//! metadata have no textual representation and are skipped.

use std::collections::HashSet;

use crate::error::Result;
use crate::model::{Document, ExtractionUnit, Paragraph, SemanticRole};

use super::Serializer;

/// Serializes a document as plain text.
pub struct TxtSerializer {
    units: HashSet<ExtractionUnit>,
    roles: HashSet<SemanticRole>,
}

impl TxtSerializer {
    /// Create a text serializer for the given unit and role sets.
    pub fn new(units: HashSet<ExtractionUnit>, roles: HashSet<SemanticRole>) -> Self {
        Self { units, roles }
    }

    fn included_paragraphs<'a>(&'a self, doc: &'a Document) -> impl Iterator<Item = &'a Paragraph> {
        doc.paragraphs
            .iter()
            .filter(move |p| self.roles.contains(&p.role))
    }
}

impl Serializer for TxtSerializer {
    fn serialize(&mut self, doc: &Document) -> Result<Vec<u8>> {
        let mut chunks: Vec<String> = Vec::new();

        if self.units.contains(&ExtractionUnit::Paragraph) {
            chunks.extend(self.included_paragraphs(doc).map(|p| p.text.clone()));
        }
        if self.units.contains(&ExtractionUnit::Word) {
            chunks.extend(
                self.included_paragraphs(doc)
                    .flat_map(|p| p.words.iter())
                    .map(|w| w.text.clone()),
            );
        }
        if self.units.contains(&ExtractionUnit::Character) {
            chunks.extend(
                self.included_paragraphs(doc)
                    .flat_map(|p| p.words.iter())
                    .flat_map(|w| w.characters.iter())
                    .map(|c| c.glyph.clone()),
            );
        }

        let mut output = chunks.join("\n\n");
        if !output.is_empty() {
            output.push('\n');
        }
        Ok(output.into_bytes())
    }
}
