//! Semantic role detection.
//!
//! The semanticizer is an ordered registry of small rule modules, each
//! assigning semantic roles to text blocks by reading the document and
//! mutating block roles through a journal. Registration order is the
//! policy; a new section type is added by registering one more module.

mod body;
mod caption;
mod footnote;
mod header_footer;
mod heading;
mod itemize;
mod section;
mod title;

pub use body::BodyModule;
pub use caption::CaptionModule;
pub use footnote::FootnoteModule;
pub use header_footer::PageHeaderFooterModule;
pub use heading::HeadingModule;
pub use itemize::ItemizeItemModule;
pub use section::SectionModule;
pub use title::TitleModule;

use crate::error::{Error, Result};
use crate::model::{Document, SemanticRole};
use crate::observe::{Diagnostic, PipelineObserver, Stage};
use crate::pipeline::CancelToken;

/// A rule module that assigns semantic roles to text blocks.
///
/// Modules communicate only through the document; they are invoked in
/// registry order and must be idempotent: running a module twice on
/// the same document yields the same roles as running it once.
pub trait SemanticModule {
    /// The module name, used in diagnostics and journal entries.
    fn name(&self) -> &'static str;

    /// Assign roles on the given document. All role mutation must go
    /// through the journal so a failing module can be rolled back.
    fn semanticize(&mut self, doc: &mut Document, journal: &mut RoleJournal) -> Result<()>;
}

/// Which of the two role fields of a block a journal entry changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleField {
    Primary,
    Secondary,
}

/// One recorded role change.
#[derive(Debug, Clone)]
struct RoleChange {
    page: usize,
    block: usize,
    field: RoleField,
    old: Option<SemanticRole>,
    module: &'static str,
}

/// Records every role assignment so the effects of a failed module can
/// be undone.
#[derive(Debug, Default)]
pub struct RoleJournal {
    entries: Vec<RoleChange>,
    module: &'static str,
}

impl RoleJournal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of recorded changes; used as a rollback checkpoint.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no change has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set the primary role of the given block, recording the change.
    pub fn set_role(
        &mut self,
        doc: &mut Document,
        page: usize,
        block: usize,
        role: SemanticRole,
    ) {
        let slot = &mut doc.pages[page].text_blocks[block];
        if slot.role == Some(role) {
            return;
        }
        self.entries.push(RoleChange {
            page,
            block,
            field: RoleField::Primary,
            old: slot.role,
            module: self.module,
        });
        slot.role = Some(role);
    }

    /// Set the secondary role of the given block, recording the change.
    pub fn set_secondary_role(
        &mut self,
        doc: &mut Document,
        page: usize,
        block: usize,
        role: SemanticRole,
    ) {
        let slot = &mut doc.pages[page].text_blocks[block];
        if slot.secondary_role == Some(role) {
            return;
        }
        self.entries.push(RoleChange {
            page,
            block,
            field: RoleField::Secondary,
            old: slot.secondary_role,
            module: self.module,
        });
        slot.secondary_role = Some(role);
    }

    /// Undo all changes recorded after the given checkpoint, newest
    /// first.
    fn rollback_to(&mut self, doc: &mut Document, checkpoint: usize) {
        while self.entries.len() > checkpoint {
            let change = self.entries.pop().unwrap();
            let slot = &mut doc.pages[change.page].text_blocks[change.block];
            match change.field {
                RoleField::Primary => slot.role = change.old,
                RoleField::Secondary => slot.secondary_role = change.old,
            }
        }
    }
}

/// The ordered module registry.
pub struct Semanticizer {
    modules: Vec<Box<dyn SemanticModule>>,
}

impl Semanticizer {
    /// Create a semanticizer with the default module registry:
    /// title, heading, the section detectors, itemize items, captions,
    /// footnotes, page headers/footers and the body fallback.
    pub fn new() -> Self {
        Self {
            modules: vec![
                Box::new(TitleModule::new()),
                Box::new(HeadingModule::new()),
                Box::new(SectionModule::new(SemanticRole::Abstract)),
                Box::new(SectionModule::new(SemanticRole::Keywords)),
                Box::new(SectionModule::new(SemanticRole::Categories)),
                Box::new(SectionModule::new(SemanticRole::GeneralTerms)),
                Box::new(SectionModule::new(SemanticRole::Acknowledgments)),
                Box::new(SectionModule::new(SemanticRole::Reference)),
                Box::new(ItemizeItemModule::new()),
                Box::new(CaptionModule::new()),
                Box::new(FootnoteModule::new()),
                Box::new(PageHeaderFooterModule::new()),
                Box::new(BodyModule::new()),
            ],
        }
    }

    /// Create a semanticizer with a custom module list.
    pub fn with_modules(modules: Vec<Box<dyn SemanticModule>>) -> Self {
        Self { modules }
    }

    /// Append a module to the registry.
    pub fn register(&mut self, module: Box<dyn SemanticModule>) {
        self.modules.push(module);
    }

    /// Run all modules in registry order.
    ///
    /// A failing module has its role assignments rolled back and is
    /// reported to the observer; the run continues with the next
    /// module. Cancellation is checked between modules.
    pub fn run(
        &mut self,
        doc: &mut Document,
        cancel: &CancelToken,
        observer: &dyn PipelineObserver,
    ) -> Result<()> {
        let mut journal = RoleJournal::new();

        for module in &mut self.modules {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let checkpoint = journal.len();
            journal.module = module.name();

            log::debug!("running semantic module '{}'", module.name());
            if let Err(err) = module.semanticize(doc, &mut journal) {
                journal.rollback_to(doc, checkpoint);
                observer.diagnostic(&Diagnostic::new(
                    Stage::Semanticizer,
                    None,
                    format!("module '{}' failed and was rolled back: {}", module.name(), err),
                ));
            }
        }

        Ok(())
    }
}

impl Default for Semanticizer {
    fn default() -> Self {
        Self::new()
    }
}
