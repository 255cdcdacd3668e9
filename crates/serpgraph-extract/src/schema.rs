//! Typed selector tables: category -> layout variant -> row/field selectors.
//!
//! A source declares, per result category, one `VariantSchema` per regional
//! layout it knows how to read. Everything is compiled up front so a typo in a
//! catalogue fails at construction, not mid-extraction.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};
use serpgraph_core::{Error, Result};

use crate::selector::FieldSelector;

/// Selector table for one layout variant of one result category.
#[derive(Debug, Clone)]
pub struct VariantSchema {
    row_raw: String,
    row: Selector,
    fields: BTreeMap<String, FieldSelector>,
}

impl VariantSchema {
    /// `container` scopes the category on the page; `result_container`, when
    /// present, addresses one row inside it (the two are joined as a
    /// descendant selector). Without a `result_container` the container itself
    /// is the row.
    pub fn new(
        container: &str,
        result_container: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Result<Self> {
        let row_raw = match result_container {
            Some(inner) => format!("{container} {inner}"),
            None => container.to_string(),
        };
        let row = Selector::parse(&row_raw)
            .map_err(|e| Error::Configuration(format!("invalid row selector {row_raw:?}: {e}")))?;
        let mut compiled = BTreeMap::new();
        for (name, raw) in fields {
            compiled.insert((*name).to_string(), FieldSelector::parse(raw)?);
        }
        Ok(Self {
            row_raw,
            row,
            fields: compiled,
        })
    }

    pub fn row_selector(&self) -> &str {
        &self.row_raw
    }

    /// Result rows in document order.
    pub fn rows<'a>(&'a self, doc: &'a Html) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        doc.select(&self.row)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldSelector> {
        &self.fields
    }
}

/// All result-category schemas one source knows, keyed by category then by
/// layout variant.
#[derive(Debug, Default)]
pub struct ResultSchema {
    categories: BTreeMap<String, BTreeMap<String, VariantSchema>>,
}

impl ResultSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: &str, variant: &str, schema: VariantSchema) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(variant.to_string(), schema);
    }

    /// Register one schema under several variant names. Regional layouts are
    /// frequently identical; sharing the compiled table keeps that explicit.
    pub fn insert_all(&mut self, category: &str, variants: &[&str], schema: VariantSchema) {
        for variant in variants {
            self.insert(category, variant, schema.clone());
        }
    }

    pub fn variant_of(&self, category: &str, variant: &str) -> Option<&VariantSchema> {
        self.categories.get(category)?.get(variant)
    }

    /// Categories in stable (sorted) order, with their variant tables.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, VariantSchema>)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether any category carries the given variant.
    pub fn knows_variant(&self, variant: &str) -> bool {
        self.categories.values().any(|v| v.contains_key(variant))
    }
}

/// Page-level selector lists, each tried in order until one resolves.
#[derive(Debug, Default)]
pub struct PageSelectors {
    pub num_results_for_query: Vec<FieldSelector>,
    pub page_number: Vec<FieldSelector>,
    pub effective_query: Vec<FieldSelector>,
    pub no_results_text: Vec<FieldSelector>,
    pub autocorrect: Vec<FieldSelector>,
    pub autocorrect_forced_check: Vec<FieldSelector>,
    pub map_result: Vec<FieldSelector>,
    pub image_results: Vec<FieldSelector>,
    pub image_mega_block: Vec<FieldSelector>,
    pub answer_box: Vec<FieldSelector>,
    pub knowledge_graph_box: Vec<FieldSelector>,
    pub knowledge_graph_title: Vec<FieldSelector>,
    pub knowledge_graph_star_rating: Vec<FieldSelector>,
    pub knowledge_graph_star_rating_reviews: Vec<FieldSelector>,
    pub knowledge_graph_star_rating_big: Vec<FieldSelector>,
    pub knowledge_graph_star_rating_reviews_big: Vec<FieldSelector>,
    pub knowledge_graph_subtitle: Vec<FieldSelector>,
    pub knowledge_graph_location_subtitle: Vec<FieldSelector>,
    pub knowledge_graph_snippet: Vec<FieldSelector>,
    pub knowledge_graph_location_snippet: Vec<FieldSelector>,
    pub knowledge_graph_recent_post: Vec<FieldSelector>,
    pub knowledge_graph_map: Vec<FieldSelector>,
    pub knowledge_graph_thumbnail: Vec<FieldSelector>,
    pub knowledge_graph_images_scrapbook: Vec<FieldSelector>,
}
