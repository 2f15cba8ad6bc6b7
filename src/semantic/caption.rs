//! Caption detection.

use regex::Regex;

use crate::error::Result;
use crate::model::{Document, Rectangle, SemanticRole};

use super::{RoleJournal, SemanticModule};

/// Assigns the caption role to blocks that start with a caption prefix
/// ("Figure 3", "Fig. 2", "Table 1") and sit next to a figure or
/// shape on the same page.
pub struct CaptionModule {
    prefix: Regex,
}

impl CaptionModule {
    /// Create a new caption module.
    pub fn new() -> Self {
        Self {
            prefix: Regex::new(r"(?i)^(fig(ure)?|tab(le)?)\.?\s*\d+").unwrap(),
        }
    }
}

impl Default for CaptionModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticModule for CaptionModule {
    fn name(&self) -> &'static str {
        "caption"
    }

    fn semanticize(&mut self, doc: &mut Document, journal: &mut RoleJournal) -> Result<()> {
        for page in 0..doc.pages.len() {
            for block in 0..doc.pages[page].text_blocks.len() {
                let adjacent = {
                    let p = &doc.pages[page];
                    let b = &p.text_blocks[block];
                    if b.role.is_some() || !self.prefix.is_match(&b.text) {
                        continue;
                    }
                    // Captions sit within two text heights of their
                    // figure.
                    let reach = 2.0 * b.character_statistic.most_common_font_size();
                    let rect = b.position.rectangle;
                    p.figures
                        .iter()
                        .map(|f| &f.position.rectangle)
                        .chain(p.shapes.iter().map(|s| &s.position.rectangle))
                        .any(|r| rect.overlaps_horizontally(r) && vertical_gap(&rect, r) <= reach)
                };

                if adjacent {
                    journal.set_role(doc, page, block, SemanticRole::Caption);
                }
            }
        }

        Ok(())
    }
}

/// The vertical distance between two rectangles; zero when they
/// overlap vertically.
fn vertical_gap(a: &Rectangle, b: &Rectangle) -> f32 {
    if a.min_y > b.max_y {
        a.min_y - b.max_y
    } else if b.min_y > a.max_y {
        b.min_y - a.max_y
    } else {
        0.0
    }
}
