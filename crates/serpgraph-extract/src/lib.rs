//! Declarative SERP extraction.
//!
//! A [`Source`] bundles the selector catalogue for one search engine; the
//! engine walks it against a parsed document and [`parse_serp`] assembles the
//! persisted page shape. Adding support for a new engine means writing a
//! catalogue module, not touching the engine.

pub mod assemble;
pub mod dom;
pub mod engine;
pub mod schema;
pub mod selector;
pub mod sources;

pub use engine::{ExtractedRecord, Extraction, KnowledgeGraphSignals, PageSignals};
pub use schema::{PageSelectors, ResultSchema, VariantSchema};
pub use selector::FieldSelector;
pub use sources::{Source, SourceKind};

use serpgraph_core::{RawPage, Result, SerpPage};

/// Parse one raw page into its persisted shape.
///
/// Configuration problems (an unknown layout variant, a catalogue that fails
/// to compile) and unusable documents surface as errors; callers running
/// multi-page jobs typically degrade the latter to [`SerpPage::empty`].
pub fn parse_serp(
    source: &Source,
    variant: &str,
    raw: &RawPage,
    query: &str,
) -> Result<SerpPage> {
    let doc = dom::parse_document(&raw.html)?;
    let mut extraction = engine::extract(&doc, source.page_selectors(), source.schema(), variant)?;
    source.after_parsing(&mut extraction, &raw.html, query);
    tracing::debug!(
        source = source.name(),
        query,
        num_results = extraction.signals.num_results,
        no_results = extraction.signals.no_results,
        "parsed serp page"
    );
    Ok(assemble::assemble(source.name(), query, &extraction, &raw.autocomplete))
}
