//! Yandex catalogue. The misspell banner text is in Russian; the page is
//! no-results when the banner says nothing was found or when no rows survived.

use serpgraph_core::Result;

use crate::engine::Extraction;
use crate::schema::{PageSelectors, ResultSchema, VariantSchema};
use crate::selector::compile_all;
use crate::sources::{Source, SourceKind};

const NOTHING_FOUND: &str = "По вашему запросу ничего не нашлось";

pub(super) fn source() -> Result<Source> {
    let mut table = ResultSchema::new();
    table.insert(
        "results",
        "de_ip",
        VariantSchema::new(
            "div.serp-list",
            Some("div.serp-item__wrap"),
            &[
                ("link", "a.serp-item__title-link::attr(href)"),
                ("snippet", "div.serp-item__text::text"),
                ("title", "a.serp-item__title-link::text"),
                ("visible_link", "a.serp-url__link::attr(href)"),
            ],
        )?,
    );

    let page = PageSelectors {
        no_results_text: compile_all(&[".message .misspell__message::text"])?,
        effective_query: compile_all(&[".misspell__message .misspell__link"])?,
        num_results_for_query: compile_all(&[".serp-adv .serp-item__wrap > strong"])?,
        page_number: compile_all(&[".pager__group .button_checked_yes span::text"])?,
        ..PageSelectors::default()
    };

    Ok(Source::new(SourceKind::Yandex, "yandex", "de_ip", page, table))
}

pub(super) fn after_parsing(extraction: &mut Extraction) {
    let signals = &mut extraction.signals;
    signals.no_results = signals
        .no_results_text
        .as_deref()
        .is_some_and(|text| text.contains(NOTHING_FOUND));
    if signals.num_results == 0 {
        signals.no_results = true;
    }
}
