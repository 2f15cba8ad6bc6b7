//! Itemized list detection.

use regex::Regex;

use crate::error::Result;
use crate::model::{Document, SemanticRole};

use super::{RoleJournal, SemanticModule};

/// Assigns the itemize-item role to body-sized blocks that start with
/// a list marker: a bullet glyph, "(1)" or "1." style enumerations, or
/// a dash.
pub struct ItemizeItemModule {
    marker: Regex,
}

impl ItemizeItemModule {
    /// Create a new itemize module.
    pub fn new() -> Self {
        Self {
            marker: Regex::new(r"^([•◦▪‣·]\s*|\(\d{1,3}\)\s+|\d{1,3}[.)]\s+[a-z]|[-–]\s+)").unwrap(),
        }
    }
}

impl Default for ItemizeItemModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticModule for ItemizeItemModule {
    fn name(&self) -> &'static str {
        "itemize-item"
    }

    fn semanticize(&mut self, doc: &mut Document, journal: &mut RoleJournal) -> Result<()> {
        let body_size = doc.character_statistic.most_common_font_size();

        for page in 0..doc.pages.len() {
            for block in 0..doc.pages[page].text_blocks.len() {
                let is_item = {
                    let b = &doc.pages[page].text_blocks[block];
                    b.role.is_none()
                        && (b.character_statistic.most_common_font_size() - body_size).abs() <= 0.5
                        && self.marker.is_match(&b.text)
                };
                if is_item {
                    journal.set_role(doc, page, block, SemanticRole::ItemizeItem);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_patterns() {
        let module = ItemizeItemModule::new();
        assert!(module.marker.is_match("• first item"));
        assert!(module.marker.is_match("(1) first item"));
        assert!(module.marker.is_match("1. first item"));
        assert!(module.marker.is_match("- dashed item"));
        assert!(!module.marker.is_match("plain paragraph text"));
        // "1. Introduction" reads as a numbered heading, not a list.
        assert!(!module.marker.is_match("1. Introduction"));
    }
}
