//! Bing catalogue. Bing answers misspelled or thin queries with an inline
//! notice; the page is treated as no-results when that notice quotes the query
//! back or offers the "results only for" prompt.

use serpgraph_core::Result;

use crate::engine::Extraction;
use crate::schema::{PageSelectors, ResultSchema, VariantSchema};
use crate::selector::compile_all;
use crate::sources::{Source, SourceKind};

const ORGANIC_FIELDS: &[(&str, &str)] = &[
    ("link", "h2 > a::attr(href)"),
    ("snippet", ".b_caption > p::text"),
    ("title", "h2::text"),
    ("visible_link", "cite::text"),
];

pub(super) fn source() -> Result<Source> {
    let mut table = ResultSchema::new();
    table.insert_all(
        "results",
        &["us_ip", "de_ip"],
        VariantSchema::new("#b_results", Some(".b_algo"), ORGANIC_FIELDS)?,
    );
    // News-feed layout: flat list items, no container/row split.
    table.insert(
        "results",
        "de_ip_news_items",
        VariantSchema::new(
            "ul.b_vList li",
            None,
            &[
                ("link", "h5 a::attr(href)"),
                ("snippet", "p::text"),
                ("title", "h5 a::text"),
                ("visible_link", "cite::text"),
            ],
        )?,
    );
    table.insert(
        "ads_main",
        "us_ip",
        VariantSchema::new(
            "#b_results .b_ad",
            Some(".sb_add"),
            &[
                ("link", "h2 > a::attr(href)"),
                ("snippet", ".sb_addesc::text"),
                ("title", "h2 > a::text"),
                ("visible_link", "cite::text"),
            ],
        )?,
    );
    table.insert(
        "ads_main",
        "de_ip",
        VariantSchema::new(
            "#b_results .b_ad",
            Some(".sb_add"),
            &[
                ("link", "h2 > a::attr(href)"),
                ("snippet", ".b_caption > p::text"),
                ("title", "h2 > a::text"),
                ("visible_link", "cite::text"),
            ],
        )?,
    );

    let page = PageSelectors {
        no_results_text: compile_all(&["#b_results > .b_ans::text"])?,
        num_results_for_query: compile_all(&[".sb_count"])?,
        effective_query: compile_all(&["#sp_requery a > strong"])?,
        page_number: compile_all(&[".sb_pagS::text"])?,
        ..PageSelectors::default()
    };

    Ok(Source::new(SourceKind::Bing, "bing", "us_ip", page, table))
}

pub(super) fn after_parsing(extraction: &mut Extraction, query: &str) {
    let signals = &mut extraction.signals;
    signals.no_results = signals.no_results_text.as_deref().is_some_and(|text| {
        (!query.is_empty() && text.contains(query)) || text.contains("Do you want results only for")
    });
}
