//! The generic extraction pass: rows, keep gate, dedup, page signals.
//!
//! Nothing in this module knows about any particular search engine. It walks a
//! `ResultSchema` + `PageSelectors` pair against a parsed document and hands
//! back a neutral `Extraction` for the source's post-processing hooks.

use std::collections::BTreeMap;

use scraper::Html;

use serpgraph_core::{Error, Result};

use crate::schema::{PageSelectors, ResultSchema};
use crate::selector::first_match;

/// One kept row: its pre-dedup rank inside the category and every field that
/// resolved. Fields that matched nothing are simply absent from the map, so
/// `Some("")` (matched but empty) stays distinguishable.
#[derive(Debug, Clone)]
pub struct ExtractedRecord {
    pub rank: u32,
    pub fields: BTreeMap<String, String>,
}

impl ExtractedRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Like `field`, but treats a matched-empty value as absent. The keep gate
    /// and dedup identity use this view.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.field(name).filter(|v| !v.is_empty())
    }
}

/// Page-level signals resolved once per document, before any source-specific
/// post-processing runs. Post-processors receive the whole `Extraction`
/// mutably; the engine itself never revisits these after resolution.
#[derive(Debug, Clone, Default)]
pub struct PageSignals {
    pub num_results_for_query: Option<String>,
    /// Kept rows that counted towards the result total (trivia rows do not).
    pub num_results: u32,
    pub page_number: Option<u32>,
    pub effective_query: Option<String>,
    pub no_results: bool,
    /// Raw text of the no-results banner, for post-processors that match on
    /// its wording.
    pub no_results_text: Option<String>,
    pub autocorrect: Option<String>,
    pub autocorrect_forced_check: Option<String>,
    pub map_result: bool,
    pub image_results: bool,
    pub image_mega_block: bool,
    pub answer_box: bool,
    pub knowledge_graph: KnowledgeGraphSignals,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraphSignals {
    pub box_present: bool,
    pub title: Option<String>,
    pub star_rating: Option<String>,
    pub star_rating_reviews: Option<String>,
    pub star_rating_big: Option<String>,
    pub star_rating_reviews_big: Option<String>,
    pub subtitle: Option<String>,
    pub location_subtitle: Option<String>,
    pub snippet: Option<String>,
    pub location_snippet: Option<String>,
    pub recent_post: Option<String>,
    pub map: bool,
    pub thumbnail: bool,
    pub images_scrapbook: bool,
}

/// Everything one extraction pass produced, before assembly into the persisted
/// page shape.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub categories: BTreeMap<String, Vec<ExtractedRecord>>,
    pub signals: PageSignals,
}

impl Extraction {
    /// Records that passed the link gate with an actual link, across all
    /// categories, in category order.
    pub fn linked_records(&self) -> impl Iterator<Item = (&str, &ExtractedRecord)> {
        self.categories.iter().flat_map(|(category, records)| {
            records
                .iter()
                .filter(|r| r.non_empty("link").is_some())
                .map(move |r| (category.as_str(), r))
        })
    }

    /// Rewrite every record link in place. `f` returning `None` leaves the
    /// link untouched.
    pub fn rewrite_links(&mut self, f: impl Fn(&str) -> Option<String>) {
        for records in self.categories.values_mut() {
            for record in records {
                if let Some(link) = record.fields.get("link") {
                    if let Some(rewritten) = f(link) {
                        record.fields.insert("link".to_string(), rewritten);
                    }
                }
            }
        }
    }
}

/// The identity a row must present to be kept, and under which duplicates are
/// dropped. Most categories key on the link; local-pack rows key on the
/// address and knowledge-trivia rows on their first title-like field.
fn identity<'a>(category: &str, record: &'a ExtractedRecord) -> Option<&'a str> {
    match category {
        "local_pack_results" => record.non_empty("address"),
        "knowledge_graph_trivia" => record
            .non_empty("title")
            .or_else(|| record.non_empty("link_title"))
            .or_else(|| record.non_empty("hours_title")),
        _ => record.non_empty("link"),
    }
}

/// Trivia rows are panel furniture, not results; they never count towards the
/// page's result total.
fn counts_towards_total(category: &str) -> bool {
    category != "knowledge_graph_trivia"
}

/// Run the generic extraction pass for one layout variant.
///
/// Categories without a table for `variant` are skipped; a variant no category
/// knows is a configuration error.
pub fn extract(
    doc: &Html,
    page: &PageSelectors,
    schema: &ResultSchema,
    variant: &str,
) -> Result<Extraction> {
    if !schema.knows_variant(variant) {
        return Err(Error::Configuration(format!(
            "no category provides layout variant {variant:?}"
        )));
    }

    let mut out = Extraction::default();
    for (category, variants) in schema.iter() {
        let Some(table) = variants.get(variant) else {
            continue;
        };
        let mut kept: Vec<ExtractedRecord> = Vec::new();
        for (index, row) in table.rows(doc).enumerate() {
            let mut fields = BTreeMap::new();
            for (name, selector) in table.fields() {
                if let Some(value) = selector.resolve_in(row) {
                    fields.insert(name.clone(), value);
                }
            }
            let record = ExtractedRecord {
                rank: index as u32 + 1,
                fields,
            };
            let Some(id) = identity(category, &record) else {
                continue;
            };
            if kept.iter().any(|k| identity(category, k) == Some(id)) {
                continue;
            }
            if counts_towards_total(category) {
                out.signals.num_results += 1;
            }
            kept.push(record);
        }
        if !kept.is_empty() {
            out.categories.insert(category.to_string(), kept);
        }
    }

    resolve_page_signals(doc, page, &mut out.signals);
    Ok(out)
}

fn resolve_page_signals(doc: &Html, page: &PageSelectors, signals: &mut PageSignals) {
    signals.num_results_for_query = first_match(&page.num_results_for_query, doc);
    if signals.num_results_for_query.is_none() {
        tracing::debug!("result-count banner not found; selectors may be stale");
    }
    signals.page_number = first_match(&page.page_number, doc)
        .and_then(|s| s.trim().parse::<u32>().ok());
    signals.effective_query =
        first_match(&page.effective_query, doc).filter(|s| !s.is_empty());
    signals.no_results_text = first_match(&page.no_results_text, doc);
    signals.autocorrect = first_match(&page.autocorrect, doc).filter(|s| !s.is_empty());
    signals.autocorrect_forced_check =
        first_match(&page.autocorrect_forced_check, doc).filter(|s| !s.is_empty());
    signals.map_result = first_match(&page.map_result, doc).is_some();
    // A mega block subsumes the plain image-results strip.
    if first_match(&page.image_mega_block, doc).is_some() {
        signals.image_mega_block = true;
    } else if first_match(&page.image_results, doc).is_some() {
        signals.image_results = true;
    }
    signals.answer_box = first_match(&page.answer_box, doc).is_some();

    let kg = &mut signals.knowledge_graph;
    kg.box_present = first_match(&page.knowledge_graph_box, doc).is_some();
    kg.title = first_match(&page.knowledge_graph_title, doc);
    kg.star_rating = first_match(&page.knowledge_graph_star_rating, doc);
    kg.star_rating_reviews = first_match(&page.knowledge_graph_star_rating_reviews, doc);
    kg.star_rating_big = first_match(&page.knowledge_graph_star_rating_big, doc);
    kg.star_rating_reviews_big =
        first_match(&page.knowledge_graph_star_rating_reviews_big, doc);
    kg.subtitle = first_match(&page.knowledge_graph_subtitle, doc);
    kg.location_subtitle = first_match(&page.knowledge_graph_location_subtitle, doc);
    kg.snippet = first_match(&page.knowledge_graph_snippet, doc);
    kg.location_snippet = first_match(&page.knowledge_graph_location_snippet, doc);
    kg.recent_post = first_match(&page.knowledge_graph_recent_post, doc);
    kg.map = first_match(&page.knowledge_graph_map, doc).is_some();
    kg.thumbnail = first_match(&page.knowledge_graph_thumbnail, doc).is_some();
    kg.images_scrapbook = first_match(&page.knowledge_graph_images_scrapbook, doc).is_some();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::VariantSchema;
    use crate::selector::compile_all;

    fn organic_schema() -> ResultSchema {
        let mut schema = ResultSchema::new();
        schema.insert(
            "organic_results",
            "us_ip",
            VariantSchema::new(
                "#results",
                Some("li.g"),
                &[
                    ("link", "a.l::attr(href)"),
                    ("title", "a.l::text"),
                    ("snippet", "span.st::text"),
                ],
            )
            .unwrap(),
        );
        schema
    }

    fn row(link: Option<&str>, title: &str) -> String {
        match link {
            Some(href) => format!(
                "<li class=\"g\"><a class=\"l\" href=\"{href}\">{title}</a></li>"
            ),
            None => format!("<li class=\"g\"><span>{title}</span></li>"),
        }
    }

    fn page(rows: &[String]) -> Html {
        Html::parse_document(&format!(
            "<div id=\"results\">{}</div>",
            rows.concat()
        ))
    }

    #[test]
    fn duplicate_links_are_dropped_and_ranks_keep_gaps() {
        let doc = page(&[
            row(Some("https://a.example/"), "a"),
            row(Some("https://b.example/"), "b"),
            row(Some("https://a.example/"), "a again"),
        ]);
        let ex = extract(&doc, &PageSelectors::default(), &organic_schema(), "us_ip").unwrap();
        let kept = &ex.categories["organic_results"];
        assert_eq!(kept.len(), 2);
        let ranks: Vec<u32> = kept.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
        assert_eq!(ex.signals.num_results, 2);
    }

    #[test]
    fn rows_without_identity_are_not_kept_but_still_consume_rank() {
        let doc = page(&[
            row(None, "linkless"),
            row(Some("https://a.example/"), "a"),
        ]);
        let ex = extract(&doc, &PageSelectors::default(), &organic_schema(), "us_ip").unwrap();
        let kept = &ex.categories["organic_results"];
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].rank, 2);
        assert_eq!(ex.signals.num_results, 1);
    }

    #[test]
    fn extraction_is_deterministic() {
        let doc = page(&[
            row(Some("https://a.example/"), "a"),
            row(Some("https://b.example/"), "b"),
        ]);
        let page_sel = PageSelectors::default();
        let schema = organic_schema();
        let first = extract(&doc, &page_sel, &schema, "us_ip").unwrap();
        let second = extract(&doc, &page_sel, &schema, "us_ip").unwrap();
        assert_eq!(
            format!("{:?}", first.categories),
            format!("{:?}", second.categories)
        );
    }

    #[test]
    fn unknown_variant_is_a_configuration_error() {
        let doc = page(&[]);
        let err = extract(&doc, &PageSelectors::default(), &organic_schema(), "mars_ip");
        assert!(matches!(err, Err(Error::Configuration(_))));
    }

    #[test]
    fn mega_block_wins_over_image_results() {
        let mut page_sel = PageSelectors::default();
        page_sel.image_mega_block = compile_all(&["div.mega"]).unwrap();
        page_sel.image_results = compile_all(&["div.images"]).unwrap();
        let doc = Html::parse_document("<div class=\"mega\"></div><div class=\"images\"></div>");
        let ex = extract(&doc, &page_sel, &organic_schema(), "us_ip").unwrap();
        assert!(ex.signals.image_mega_block);
        assert!(!ex.signals.image_results);
    }

    #[test]
    fn trivia_rows_do_not_count_towards_the_result_total() {
        let mut schema = organic_schema();
        schema.insert(
            "knowledge_graph_trivia",
            "us_ip",
            VariantSchema::new("div.kg", Some("div.t"), &[("title", "b::text")]).unwrap(),
        );
        let doc = Html::parse_document(
            "<div id=\"results\"><li class=\"g\">\
             <a class=\"l\" href=\"https://a.example/\">a</a></li></div>\
             <div class=\"kg\"><div class=\"t\"><b>Hours</b></div></div>",
        );
        let ex = extract(&doc, &PageSelectors::default(), &schema, "us_ip").unwrap();
        assert_eq!(ex.signals.num_results, 1);
        assert_eq!(ex.categories["knowledge_graph_trivia"].len(), 1);
    }

    #[test]
    fn rewrite_links_only_touches_records_with_links() {
        let doc = page(&[row(Some("/u?q=x"), "a")]);
        let mut ex =
            extract(&doc, &PageSelectors::default(), &organic_schema(), "us_ip").unwrap();
        ex.rewrite_links(|link| link.strip_prefix("/u?q=").map(str::to_string));
        assert_eq!(
            ex.categories["organic_results"][0].field("link"),
            Some("x")
        );
    }
}
