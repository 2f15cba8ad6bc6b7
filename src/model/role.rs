//! Semantic roles and extraction units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The logical function of a text block within the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SemanticRole {
    /// The abstract section
    Abstract,
    /// The acknowledgments section
    Acknowledgments,
    /// Ordinary body text
    Body,
    /// A figure or table caption
    Caption,
    /// The "Categories and Subject Descriptors" section
    Categories,
    /// A footnote
    Footnote,
    /// A formula
    Formula,
    /// The "General Terms" section
    GeneralTerms,
    /// A section heading
    Heading,
    /// An item of an itemized list
    ItemizeItem,
    /// The keywords section
    Keywords,
    /// Anything that fits no other role
    Other,
    /// A page footer
    PageFooter,
    /// A page header
    PageHeader,
    /// An entry of the references section
    Reference,
    /// A table
    Table,
    /// The document title
    Title,
}

impl SemanticRole {
    /// All roles, in serialization order.
    pub const ALL: [SemanticRole; 17] = [
        SemanticRole::Abstract,
        SemanticRole::Acknowledgments,
        SemanticRole::Body,
        SemanticRole::Caption,
        SemanticRole::Categories,
        SemanticRole::Footnote,
        SemanticRole::Formula,
        SemanticRole::GeneralTerms,
        SemanticRole::Heading,
        SemanticRole::ItemizeItem,
        SemanticRole::Keywords,
        SemanticRole::Other,
        SemanticRole::PageFooter,
        SemanticRole::PageHeader,
        SemanticRole::Reference,
        SemanticRole::Table,
        SemanticRole::Title,
    ];

    /// The name used in serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            SemanticRole::Abstract => "abstract",
            SemanticRole::Acknowledgments => "acknowledgments",
            SemanticRole::Body => "body",
            SemanticRole::Caption => "caption",
            SemanticRole::Categories => "categories",
            SemanticRole::Footnote => "footnote",
            SemanticRole::Formula => "formula",
            SemanticRole::GeneralTerms => "general-terms",
            SemanticRole::Heading => "heading",
            SemanticRole::ItemizeItem => "itemize-item",
            SemanticRole::Keywords => "keywords",
            SemanticRole::Other => "other",
            SemanticRole::PageFooter => "footer",
            SemanticRole::PageHeader => "header",
            SemanticRole::Reference => "reference",
            SemanticRole::Table => "table",
            SemanticRole::Title => "title",
        }
    }

    /// Whether blocks of this role are structural: such blocks never
    /// merge with neighbors during paragraph assembly.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            SemanticRole::Title
                | SemanticRole::Heading
                | SemanticRole::PageHeader
                | SemanticRole::PageFooter
                | SemanticRole::Caption
                | SemanticRole::Footnote
                | SemanticRole::Table
                | SemanticRole::Formula
        )
    }
}

impl fmt::Display for SemanticRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SemanticRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemanticRole::ALL
            .iter()
            .find(|r| r.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown semantic role: {}", s))
    }
}

/// The granularity at which serialized output is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionUnit {
    /// Individual characters
    Character,
    /// Words
    Word,
    /// Paragraphs
    Paragraph,
    /// Figures
    Figure,
    /// Vector shapes
    Shape,
    /// Page metadata
    Page,
}

impl ExtractionUnit {
    /// All units, in the fixed order their sections appear in
    /// serialized output.
    pub const ALL: [ExtractionUnit; 6] = [
        ExtractionUnit::Paragraph,
        ExtractionUnit::Word,
        ExtractionUnit::Character,
        ExtractionUnit::Figure,
        ExtractionUnit::Shape,
        ExtractionUnit::Page,
    ];

    /// The name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            ExtractionUnit::Character => "character",
            ExtractionUnit::Word => "word",
            ExtractionUnit::Paragraph => "paragraph",
            ExtractionUnit::Figure => "figure",
            ExtractionUnit::Shape => "shape",
            ExtractionUnit::Page => "page",
        }
    }
}

impl fmt::Display for ExtractionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExtractionUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExtractionUnit::ALL
            .iter()
            .find(|u| u.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown extraction unit: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_round_trip() {
        for role in SemanticRole::ALL {
            assert_eq!(role.name().parse::<SemanticRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_header_footer_names() {
        assert_eq!(SemanticRole::PageHeader.name(), "header");
        assert_eq!(SemanticRole::PageFooter.name(), "footer");
    }

    #[test]
    fn test_structural_roles() {
        assert!(SemanticRole::Heading.is_structural());
        assert!(!SemanticRole::Body.is_structural());
        assert!(!SemanticRole::Reference.is_structural());
    }

    #[test]
    fn test_unit_round_trip() {
        for unit in ExtractionUnit::ALL {
            assert_eq!(unit.name().parse::<ExtractionUnit>().unwrap(), unit);
        }
    }
}
