//! DuckDuckGo catalogue (html endpoint; the JS-driven pages paginate over
//! ajax and never reach this parser).

use serpgraph_core::Result;

use crate::engine::Extraction;
use crate::schema::{PageSelectors, ResultSchema, VariantSchema};
use crate::selector::compile_all;
use crate::sources::{Source, SourceKind};

pub(super) fn source() -> Result<Source> {
    let mut table = ResultSchema::new();
    table.insert(
        "results",
        "de_ip",
        VariantSchema::new(
            "#links",
            Some(".result"),
            &[
                ("link", ".result__title > a::attr(href)"),
                ("snippet", ".result__snippet::text"),
                ("title", ".result__title > a::text"),
                ("visible_link", ".result__url__domain::text"),
            ],
        )?,
    );

    let page = PageSelectors {
        no_results_text: compile_all(&[".no-results::text"])?,
        ..PageSelectors::default()
    };

    Ok(Source::new(
        SourceKind::Duckduckgo,
        "duckduckgo",
        "de_ip",
        page,
        table,
    ))
}

pub(super) fn after_parsing(extraction: &mut Extraction) {
    extraction.signals.no_results =
        extraction.signals.no_results_text.is_some() || extraction.signals.num_results == 0;
}
