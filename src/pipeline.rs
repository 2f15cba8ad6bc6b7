//! Pipeline orchestration.
//!
//! Runs the stages in dependency order: line tokenization, statistics
//! aggregation, block tokenization, semantic role detection, paragraph
//! assembly. Per-page stages fan out with rayon when parallel
//! processing is enabled; cross-page statistics are aggregated in a
//! dedicated step in between, so the semantic modules always see final
//! document-level statistics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::Document;
use crate::observe::{Diagnostic, LogObserver, PipelineObserver, Stage};
use crate::semantic::Semanticizer;
use crate::stats::{CharacterStatistic, TextLineStatistic};
use crate::tokenize::{BlockTokenizer, LineTokenizer, ParagraphAssembler, TokenizerConfig};

/// A shared cancellation flag.
///
/// The pipeline polls the token at page boundaries and between
/// semantic modules; on cancellation the document is discarded and
/// [`Error::Cancelled`] is surfaced. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Options for running the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Whether to process pages in parallel
    pub parallel: bool,

    /// Tokenizer constants
    pub tokenizer: TokenizerConfig,

    /// Dictionary of known words for dehyphenation
    pub dictionary: Vec<String>,
}

impl PipelineOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the tokenizer configuration.
    pub fn with_tokenizer(mut self, config: TokenizerConfig) -> Self {
        self.tokenizer = config;
        self
    }

    /// Set the dehyphenation dictionary.
    pub fn with_dictionary(mut self, words: Vec<String>) -> Self {
        self.dictionary = words;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            tokenizer: TokenizerConfig::default(),
            dictionary: Vec::new(),
        }
    }
}

/// The extraction pipeline.
pub struct Pipeline {
    options: PipelineOptions,
    observer: Arc<dyn PipelineObserver>,
    cancel: CancelToken,
}

impl Pipeline {
    /// Create a pipeline with the given options and the default
    /// logging observer.
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            observer: Arc::new(LogObserver),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the diagnostics observer.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// A token that cancels this pipeline when triggered.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run all stages on the given document.
    ///
    /// The document arrives with characters, figures and shapes per
    /// page and leaves with text lines, text blocks, roles, paragraphs
    /// and document-level statistics.
    pub fn process(&self, doc: &mut Document) -> Result<()> {
        if doc.is_empty() {
            self.observer.diagnostic(&Diagnostic::new(
                Stage::LineTokenizer,
                None,
                "document contains no characters",
            ));
        }

        self.tokenize_lines(doc)?;

        // Cross-page statistics must be final before block
        // tokenization and semantic role detection.
        doc.character_statistic =
            CharacterStatistic::aggregate(doc.pages.iter().map(|p| &p.character_statistic));
        let line_stats =
            TextLineStatistic::aggregate(doc.pages.iter().map(|p| &p.text_line_statistic));

        self.tokenize_blocks(doc, &line_stats)?;
        doc.text_line_statistic = line_stats;

        Semanticizer::new().run(doc, &self.cancel, self.observer.as_ref())?;

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let assembler =
            ParagraphAssembler::with_dictionary(self.options.dictionary.iter().cloned());
        doc.paragraphs = assembler.assemble(doc);

        Ok(())
    }

    /// Tokenize every page into text lines and compute the per-page
    /// statistics.
    fn tokenize_lines(&self, doc: &mut Document) -> Result<()> {
        let tokenizer = LineTokenizer::new(self.options.tokenizer.clone());
        let observer = self.observer.as_ref();

        let tokenize = |page: &mut crate::model::Page| {
            page.text_lines = tokenizer.tokenize(page, observer);
            page.character_statistic = CharacterStatistic::from_characters(&page.characters);
            page.text_line_statistic = TextLineStatistic::from_lines(&page.text_lines);
        };

        if self.options.parallel {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            doc.pages.par_iter_mut().for_each(tokenize);
        } else {
            for page in &mut doc.pages {
                if self.cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                tokenize(page);
            }
        }
        Ok(())
    }

    /// Tokenize every page's lines into text blocks.
    fn tokenize_blocks(&self, doc: &mut Document, line_stats: &TextLineStatistic) -> Result<()> {
        let tokenizer = BlockTokenizer::new(self.options.tokenizer.clone());

        let tokenize = |page: &mut crate::model::Page| {
            page.text_blocks = tokenizer.tokenize(&page.text_lines, line_stats);
        };

        if self.options.parallel {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            doc.pages.par_iter_mut().for_each(tokenize);
        } else {
            for page in &mut doc.pages {
                if self.cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                tokenize(page);
            }
        }
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Character, Color, Font, FontFace, Line, Page, Position, Rectangle, SemanticRole,
    };
    use std::sync::Arc;

    fn page_with_text(number: u32, lines: &[(&str, f32)]) -> Page {
        let font = Arc::new(Font::from_base_name("font-0", "Times-Roman"));
        let mut page = Page::letter(number);
        for (text, y) in lines {
            let mut x = 100.0;
            for g in text.chars() {
                page.characters.push(Character {
                    glyph: g.to_string(),
                    position: Position::new(number, Rectangle::new(x, *y, x + 5.0, *y + 10.0)),
                    font_face: FontFace::new(font.clone(), 10.0),
                    color: Color::new("color-0", [0, 0, 0]),
                    baseline: Line::horizontal(x, x + 5.0, *y),
                    rotation: 0,
                });
                x += 5.0;
            }
        }
        page
    }

    #[test]
    fn test_process_populates_derived_structures() {
        let mut doc = Document::new();
        doc.add_page(page_with_text(1, &[("hello world", 700.0), ("more text", 688.0)]));

        let pipeline = Pipeline::new(PipelineOptions::new().sequential());
        pipeline.process(&mut doc).unwrap();

        assert_eq!(doc.pages[0].text_lines.len(), 2);
        assert!(!doc.pages[0].text_blocks.is_empty());
        assert!(!doc.paragraphs.is_empty());
        for block in &doc.pages[0].text_blocks {
            assert!(block.role.is_some());
        }
    }

    #[test]
    fn test_empty_document_processes_cleanly() {
        let mut doc = Document::new();
        let pipeline = Pipeline::default();
        pipeline.process(&mut doc).unwrap();
        assert!(doc.paragraphs.is_empty());
    }

    #[test]
    fn test_cancellation_surfaces() {
        let mut doc = Document::new();
        doc.add_page(page_with_text(1, &[("hello", 700.0)]));

        let pipeline = Pipeline::new(PipelineOptions::new().sequential());
        pipeline.cancel_token().cancel();
        assert!(matches!(pipeline.process(&mut doc), Err(Error::Cancelled)));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let build = || {
            let mut doc = Document::new();
            doc.add_page(page_with_text(1, &[("alpha beta", 700.0), ("gamma", 650.0)]));
            doc.add_page(page_with_text(2, &[("delta", 700.0)]));
            doc
        };

        let mut sequential = build();
        Pipeline::new(PipelineOptions::new().sequential())
            .process(&mut sequential)
            .unwrap();

        let mut parallel = build();
        Pipeline::new(PipelineOptions::new())
            .process(&mut parallel)
            .unwrap();

        let texts = |doc: &Document| {
            doc.paragraphs
                .iter()
                .map(|p| (p.text.clone(), p.role))
                .collect::<Vec<_>>()
        };
        assert_eq!(texts(&sequential), texts(&parallel));
    }

    #[test]
    fn test_uniform_font_document_has_no_title() {
        let mut doc = Document::new();
        doc.add_page(page_with_text(1, &[("standalone", 700.0)]));
        Pipeline::new(PipelineOptions::new().sequential())
            .process(&mut doc)
            .unwrap();
        assert_eq!(doc.pages[0].text_blocks[0].role, Some(SemanticRole::Body));
    }
}
