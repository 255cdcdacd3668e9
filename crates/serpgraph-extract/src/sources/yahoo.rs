//! Yahoo catalogue. Yahoo pads thin result pages with syndicated rows that
//! carry no visible link; those are dropped after parsing, and a `#cquery`
//! block (the "did you mean" panel) marks the page as no-results.

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
            "#main",
            Some(".res"),
            &[
                ("link", "div > h3 > a::attr(href)"),
                ("snippet", "div.abstr::text"),
                ("title", "div > h3 > a::text"),
                ("visible_link", "span.url::text"),
            ],
        )?,
    );

    let page = PageSelectors {
        num_results_for_query: compile_all(&["#pg > span:last-child"])?,
        page_number: compile_all(&["#pg > strong::text"])?,
        no_results_text: compile_all(&["#cquery"])?,
        ..PageSelectors::default()
    };

    Ok(Source::new(SourceKind::Yahoo, "yahoo", "de_ip", page, table))
}

pub(super) fn after_parsing(extraction: &mut Extraction) {
    extraction.signals.no_results =
        extraction.signals.num_results == 0 || extraction.signals.no_results_text.is_some();

    for records in extraction.categories.values_mut() {
        records.retain(|record| record.field("visible_link").is_some());
    }
}
