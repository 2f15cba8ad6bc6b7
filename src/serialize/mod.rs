//! Serialization of documents to XML, JSON and plain text.
//!
//! All backends share the same contract: output is deterministic
//! (identical document and parameters give identical bytes), UTF-8
//! encoded, and filtered by a set of extraction units and a set of
//! semantic roles. Words and characters are emitted through their
//! owning paragraph, so the role filter applies uniformly; figures,
//! shapes and pages are emitted unconditionally when their unit is
//! selected.

mod json;
mod txt;
mod xml;

pub use json::JsonSerializer;
pub use txt::TxtSerializer;
pub use xml::XmlSerializer;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::model::{Document, ExtractionUnit, SemanticRole};

/// The serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Indented XML
    #[default]
    Xml,
    /// Pretty-printed JSON
    Json,
    /// Plain text
    Txt,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Xml => "xml",
            OutputFormat::Json => "json",
            OutputFormat::Txt => "txt",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "xml" => Ok(OutputFormat::Xml),
            "json" => Ok(OutputFormat::Json),
            "txt" => Ok(OutputFormat::Txt),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Common contract of all serialization backends.
pub trait Serializer {
    /// Serialize the document to bytes.
    fn serialize(&mut self, doc: &Document) -> Result<Vec<u8>>;
}

/// Contract for renderers that draw the extracted structure back onto
/// the source PDF as an annotated overlay. No implementation lives in
/// this crate; visualization front-ends implement it against the same
/// unit and role selection as the serializers.
pub trait Visualizer {
    /// Render the document as an annotated PDF.
    fn visualize(&mut self, doc: &Document, pdf: &[u8]) -> Result<Vec<u8>>;
}

/// Create a serializer for the given format, unit set and role set.
pub fn create(
    format: OutputFormat,
    units: HashSet<ExtractionUnit>,
    roles: HashSet<SemanticRole>,
) -> Box<dyn Serializer> {
    match format {
        OutputFormat::Xml => Box::new(XmlSerializer::new(units, roles)),
        OutputFormat::Json => Box::new(JsonSerializer::new(units, roles)),
        OutputFormat::Txt => Box::new(TxtSerializer::new(units, roles)),
    }
}

/// The default unit selection: paragraphs.
pub fn default_units() -> HashSet<ExtractionUnit> {
    [ExtractionUnit::Paragraph].into_iter().collect()
}

/// The default role selection: every role.
pub fn default_roles() -> HashSet<SemanticRole> {
    SemanticRole::ALL.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("xml".parse::<OutputFormat>().unwrap(), OutputFormat::Xml);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Txt);
        assert!("markdown".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_default_selections() {
        assert_eq!(default_units().len(), 1);
        assert_eq!(default_roles().len(), SemanticRole::ALL.len());
    }
}
