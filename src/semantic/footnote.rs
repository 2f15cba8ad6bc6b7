//! Footnote detection.

use regex::Regex;

use crate::error::Result;
use crate::model::{Document, SemanticRole};

use super::{RoleJournal, SemanticModule};

/// The share of the page height that counts as the footnote region.
const FOOTNOTE_ZONE: f32 = 0.25;

/// Assigns the footnote role to blocks in the lower page region that
/// are set smaller than the body font and start with a footnote
/// marker.
pub struct FootnoteModule {
    marker: Regex,
}

impl FootnoteModule {
    /// Create a new footnote module.
    pub fn new() -> Self {
        Self {
            marker: Regex::new(r"^(\d{1,3}|[*†‡§¶])").unwrap(),
        }
    }
}

impl Default for FootnoteModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticModule for FootnoteModule {
    fn name(&self) -> &'static str {
        "footnote"
    }

    fn semanticize(&mut self, doc: &mut Document, journal: &mut RoleJournal) -> Result<()> {
        let body_size = doc.character_statistic.most_common_font_size();
        if body_size <= 0.0 {
            return Ok(());
        }

        for page in 0..doc.pages.len() {
            let zone_top = doc.pages[page].height * FOOTNOTE_ZONE;
            for block in 0..doc.pages[page].text_blocks.len() {
                let is_footnote = {
                    let b = &doc.pages[page].text_blocks[block];
                    b.role.is_none()
                        && b.position.rectangle.max_y <= zone_top
                        && b.character_statistic.most_common_font_size() < body_size - 0.5
                        && self.marker.is_match(&b.text)
                };
                if is_footnote {
                    journal.set_role(doc, page, block, SemanticRole::Footnote);
                }
            }
        }

        Ok(())
    }
}
