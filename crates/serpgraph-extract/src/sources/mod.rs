//! Source catalogues: per-engine selector tables plus the post-parse
//! normalization each engine needs.

mod bing;
mod duckduckgo;
mod google;
mod yahoo;
mod yandex;

use serpgraph_core::{Error, Result};

use crate::engine::Extraction;
use crate::schema::{PageSelectors, ResultSchema};

/// The closed set of supported sources. Dispatch happens over this enum, so an
/// unsupported source name fails before any page is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Google,
    Bing,
    Yandex,
    Yahoo,
    Duckduckgo,
}

/// One search engine the extractor knows how to read: its page-level selector
/// lists, its result-category schema table and its post-parse hook.
pub struct Source {
    kind: SourceKind,
    name: &'static str,
    default_variant: &'static str,
    page: PageSelectors,
    schema: ResultSchema,
}

impl Source {
    fn new(
        kind: SourceKind,
        name: &'static str,
        default_variant: &'static str,
        page: PageSelectors,
        schema: ResultSchema,
    ) -> Self {
        Self {
            kind,
            name,
            default_variant,
            page,
            schema,
        }
    }

    /// Look up a source by its canonical lowercase name.
    pub fn for_name(name: &str) -> Result<Self> {
        match name {
            "google" => google::source(),
            "bing" => bing::source(),
            "yandex" => yandex::source(),
            "yahoo" => yahoo::source(),
            "duckduckgo" => duckduckgo::source(),
            other => Err(Error::UnknownSource(other.to_string())),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The layout variant to extract with when the caller has no regional
    /// preference.
    pub fn default_variant(&self) -> &'static str {
        self.default_variant
    }

    pub(crate) fn page_selectors(&self) -> &PageSelectors {
        &self.page
    }

    pub(crate) fn schema(&self) -> &ResultSchema {
        &self.schema
    }

    pub(crate) fn after_parsing(&self, extraction: &mut Extraction, html: &str, query: &str) {
        match self.kind {
            SourceKind::Google => google::after_parsing(extraction, html, query),
            SourceKind::Bing => bing::after_parsing(extraction, query),
            SourceKind::Yandex => yandex::after_parsing(extraction),
            SourceKind::Yahoo => yahoo::after_parsing(extraction),
            SourceKind::Duckduckgo => duckduckgo::after_parsing(extraction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalogue_compiles() {
        for name in ["google", "bing", "yandex", "yahoo", "duckduckgo"] {
            let source = Source::for_name(name).unwrap();
            assert_eq!(source.name(), name);
            assert!(source.schema().knows_variant(source.default_variant()));
        }
    }

    #[test]
    fn unknown_source_name_is_rejected() {
        assert!(matches!(
            Source::for_name("altavista"),
            Err(Error::UnknownSource(_))
        ));
    }
}
