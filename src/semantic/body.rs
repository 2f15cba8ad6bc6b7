//! Body text fallback.

use crate::error::Result;
use crate::model::{Document, SemanticRole};

use super::{RoleJournal, SemanticModule};

/// Assigns the body role to every block no earlier module claimed.
/// Runs last in the registry.
pub struct BodyModule;

impl BodyModule {
    /// Create a new body module.
    pub fn new() -> Self {
        Self
    }
}

impl Default for BodyModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticModule for BodyModule {
    fn name(&self) -> &'static str {
        "body"
    }

    fn semanticize(&mut self, doc: &mut Document, journal: &mut RoleJournal) -> Result<()> {
        for page in 0..doc.pages.len() {
            for block in 0..doc.pages[page].text_blocks.len() {
                if doc.pages[page].text_blocks[block].role.is_none() {
                    journal.set_role(doc, page, block, SemanticRole::Body);
                }
            }
        }
        Ok(())
    }
}
