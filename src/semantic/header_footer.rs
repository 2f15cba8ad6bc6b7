//! Page header and footer detection.

use crate::error::Result;
use crate::model::{Document, SemanticRole};

use super::{RoleJournal, SemanticModule};

/// The share of the page height that counts as header or footer zone.
const ZONE: f32 = 0.1;

/// Assigns the header role to blocks lying entirely in the top tenth
/// of the page and the footer role to blocks in the bottom tenth.
/// Title and heading blocks are left alone.
pub struct PageHeaderFooterModule;

impl PageHeaderFooterModule {
    /// Create a new header/footer module.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PageHeaderFooterModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticModule for PageHeaderFooterModule {
    fn name(&self) -> &'static str {
        "header-footer"
    }

    fn semanticize(&mut self, doc: &mut Document, journal: &mut RoleJournal) -> Result<()> {
        for page in 0..doc.pages.len() {
            let height = doc.pages[page].height;
            for block in 0..doc.pages[page].text_blocks.len() {
                let zone_role = {
                    let b = &doc.pages[page].text_blocks[block];
                    if matches!(b.role, Some(SemanticRole::Title) | Some(SemanticRole::Heading)) {
                        None
                    } else if b.position.rectangle.min_y >= (1.0 - ZONE) * height {
                        Some(SemanticRole::PageHeader)
                    } else if b.position.rectangle.max_y <= ZONE * height {
                        Some(SemanticRole::PageFooter)
                    } else {
                        None
                    }
                };
                if let Some(role) = zone_role {
                    journal.set_role(doc, page, block, role);
                }
            }
        }

        Ok(())
    }
}
