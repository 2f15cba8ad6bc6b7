//! # sempdf
//!
//! Logical reading structure recovery for scientific and technical
//! PDFs.
//!
//! sempdf turns the positioned characters of a PDF into paragraphs
//! with semantic roles (title, abstract, headings, body text,
//! references, captions, ...) together with their geometry, fonts and
//! colors, and serializes the result as XML, JSON or plain text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sempdf::{extract_file, serialize};
//!
//! fn main() -> sempdf::Result<()> {
//!     // Parse and analyze a PDF file
//!     let doc = extract_file("paper.pdf")?;
//!
//!     // Serialize the paragraphs as XML
//!     let mut serializer = serialize::create(
//!         serialize::OutputFormat::Xml,
//!         serialize::default_units(),
//!         serialize::default_roles(),
//!     );
//!     let xml = serializer.serialize(&doc)?;
//!     std::io::Write::write_all(&mut std::io::stdout(), &xml)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! Extraction runs as a fixed sequence of stages over one in-memory
//! [`Document`]: the character producer reads the PDF, the line
//! tokenizer groups characters into words and lines, the block
//! tokenizer groups lines into blocks, the semanticizer assigns a
//! role to every block through an ordered registry of rule modules,
//! and the paragraph assembler merges blocks into logical reading
//! units. Pages are processed in parallel with Rayon where their
//! inputs are independent.

pub mod error;
pub mod model;
pub mod observe;
pub mod pipeline;
pub mod producer;
pub mod semantic;
pub mod serialize;
pub mod stats;
pub mod tokenize;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{
    Character, Color, Document, ExtractionUnit, Figure, Font, FontFace, Line, Page, Paragraph,
    Position, Rectangle, SemanticRole, Shape, TextBlock, TextLine, Word,
};
pub use observe::{Diagnostic, LogObserver, NullObserver, PipelineObserver, Stage};
pub use pipeline::{CancelToken, Pipeline, PipelineOptions};
pub use producer::CharacterProducer;
pub use serialize::{OutputFormat, Serializer, Visualizer};
pub use tokenize::TokenizerConfig;

use std::path::Path;

/// Parse a PDF file and run the full extraction pipeline.
///
/// # Example
///
/// ```no_run
/// let doc = sempdf::extract_file("paper.pdf").unwrap();
/// println!("{} pages", doc.page_count());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let data = std::fs::read(path)?;
    extract_bytes(&data)
}

/// Parse a PDF from bytes and run the full extraction pipeline.
pub fn extract_bytes(data: &[u8]) -> Result<Document> {
    extract_bytes_with_options(data, PipelineOptions::default())
}

/// Parse a PDF from bytes and run the pipeline with custom options.
pub fn extract_bytes_with_options(data: &[u8], options: PipelineOptions) -> Result<Document> {
    let observer = LogObserver;
    let mut doc = producer::produce(data, &observer)?;
    Pipeline::new(options).process(&mut doc)?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bytes_rejects_garbage() {
        assert!(extract_bytes(b"definitely not a pdf").is_err());
    }

    #[test]
    fn test_extract_empty_input() {
        let result = extract_bytes(&[]);
        assert!(result.is_err());
    }
}
