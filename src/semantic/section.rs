//! Generic section-range detection.

use crate::error::Result;
use crate::model::{Document, SemanticRole};

use super::{RoleJournal, SemanticModule};

/// Detects the blocks of one section (abstract, keywords, references,
/// ...) with a two-state machine over the block sequence.
///
/// The machine starts OUT. A heading whose secondary role names this
/// section switches it IN; the next heading switches it OUT again. The
/// end check runs before the start check, so the heading that opens a
/// section first terminates the previous one and keeps its heading
/// role.
pub struct SectionModule {
    role: SemanticRole,
    inside: bool,
}

impl SectionModule {
    /// Create a detector for the given section role.
    pub fn new(role: SemanticRole) -> Self {
        Self {
            role,
            inside: false,
        }
    }
}

impl SemanticModule for SectionModule {
    fn name(&self) -> &'static str {
        self.role.name()
    }

    fn semanticize(&mut self, doc: &mut Document, journal: &mut RoleJournal) -> Result<()> {
        self.inside = false;

        for page in 0..doc.pages.len() {
            for block in 0..doc.pages[page].text_blocks.len() {
                let (role, secondary) = {
                    let b = &doc.pages[page].text_blocks[block];
                    (b.role, b.secondary_role)
                };

                // A heading ends the running section before it can
                // start a new one.
                if self.inside && role == Some(SemanticRole::Heading) {
                    self.inside = false;
                }

                if self.inside {
                    log::debug!(
                        "block {}/{}: assigned role '{}' (inside section range)",
                        page,
                        block,
                        self.role
                    );
                    journal.set_role(doc, page, block, self.role);
                }

                if role == Some(SemanticRole::Heading) && secondary == Some(self.role) {
                    self.inside = true;
                }
            }
        }

        Ok(())
    }
}
