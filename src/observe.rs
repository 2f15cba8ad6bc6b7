//! Observer interface for structured diagnostics.
//!
//! Recoverable failures (dropped geometry, failed semantic modules)
//! never abort a run; they are reported to an injected observer
//! instead. The default observer forwards to the `log` facade.

use std::fmt;

/// The pipeline stage a diagnostic originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The character producer
    Producer,
    /// The line tokenizer
    LineTokenizer,
    /// The block tokenizer
    BlockTokenizer,
    /// The paragraph assembler
    ParagraphAssembler,
    /// The semanticizer
    Semanticizer,
    /// A serializer
    Serializer,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Producer => "producer",
            Stage::LineTokenizer => "line-tokenizer",
            Stage::BlockTokenizer => "block-tokenizer",
            Stage::ParagraphAssembler => "paragraph-assembler",
            Stage::Semanticizer => "semanticizer",
            Stage::Serializer => "serializer",
        };
        f.write_str(name)
    }
}

/// A structured diagnostic describing a recovered failure.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The originating stage
    pub stage: Stage,

    /// The affected page number, if page-scoped
    pub page: Option<u32>,

    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(stage: Stage, page: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            stage,
            page,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(page) => write!(f, "[{}] page {}: {}", self.stage, page, self.message),
            None => write!(f, "[{}] {}", self.stage, self.message),
        }
    }
}

/// Receiver for pipeline diagnostics.
///
/// Implementations must be thread-safe: per-page stages may report
/// from worker threads.
pub trait PipelineObserver: Send + Sync {
    /// Called for every recovered failure.
    fn diagnostic(&self, diagnostic: &Diagnostic) {
        let _ = diagnostic;
    }
}

/// The default observer: forwards diagnostics to `log::warn!`.
#[derive(Debug, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn diagnostic(&self, diagnostic: &Diagnostic) {
        log::warn!("{}", diagnostic);
    }
}

/// An observer that drops all diagnostics.
#[derive(Debug, Default)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {}
