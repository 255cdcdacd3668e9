//! Breadth-first keyword expansion over stored pages.
//!
//! Each round scrapes the current frontier concurrently, then walks it
//! sequentially: suggestions become child nodes, children attach to every
//! not-yet-expanded node carrying the keyword, and page signals annotate those
//! same nodes. Attachment targets are snapshotted for the whole round before
//! any expansion, so nodes created mid-round wait for the next one. After the
//! final round the leaf frontier is annotated from the metrics provider
//! instead of being scraped again.

use std::collections::BTreeMap;

use futures_util::stream::{self, StreamExt};
use serpgraph_core::{
    Error, KeywordMetricsProvider, PageSource, Result, SerpPage, SerpStore, LIST_SEPARATOR,
};
use serpgraph_extract::Source;

use crate::normalize::normalize;
use crate::tree::{KeywordKind, KeywordTree, NodeId};

#[derive(Debug, Clone)]
pub struct ExpansionConfig {
    pub origin: String,
    /// Number of expansion rounds. The frontier after the last round is the
    /// leaf set, annotated from metrics only.
    pub depth: usize,
    pub source: String,
    /// Layout variant to extract with; the source's default when `None`.
    pub variant: Option<String>,
    /// Concurrent fetches within one round.
    pub concurrency: usize,
}

impl ExpansionConfig {
    pub fn new(origin: impl Into<String>, depth: usize) -> Self {
        Self {
            origin: origin.into(),
            depth,
            source: "google".to_string(),
            variant: None,
            concurrency: 4,
        }
    }
}

pub struct ExpansionOutcome {
    pub tree: KeywordTree,
    /// Occurrence count per normalized keyword; the first sighting counts 1.
    pub duplicates: BTreeMap<String, u64>,
}

pub struct GraphBuilder<'a> {
    source: &'a dyn PageSource,
    store: &'a dyn SerpStore,
    metrics: &'a dyn KeywordMetricsProvider,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        source: &'a dyn PageSource,
        store: &'a dyn SerpStore,
        metrics: &'a dyn KeywordMetricsProvider,
    ) -> Self {
        Self {
            source,
            store,
            metrics,
        }
    }

    pub async fn run(&self, config: &ExpansionConfig) -> Result<ExpansionOutcome> {
        let catalogue = Source::for_name(&config.source)?;
        let variant = config
            .variant
            .as_deref()
            .unwrap_or_else(|| catalogue.default_variant());

        let origin = normalize(&config.origin);
        let mut tree = KeywordTree::new(&origin);
        let mut duplicates = BTreeMap::new();
        duplicates.insert(origin.clone(), 1u64);
        let mut frontier = vec![origin];

        for round in 0..config.depth {
            if frontier.is_empty() {
                break;
            }
            tracing::info!(round, keywords = frontier.len(), "expanding frontier");
            self.scrape_frontier(&catalogue, variant, &frontier, config.concurrency)
                .await?;

            let parents: Vec<(String, Vec<NodeId>)> = frontier
                .iter()
                .map(|keyword| (keyword.clone(), tree.unexpanded_named(keyword)))
                .collect();

            let mut next: Vec<String> = Vec::new();
            for (keyword, parent_ids) in parents {
                let Some(page) = self.store.find_latest(&keyword).await? else {
                    tracing::warn!(%keyword, "no stored page for frontier keyword");
                    continue;
                };

                let mut children = Vec::new();
                for (term, kind) in suggestion_terms(&page) {
                    let name = normalize(&term);
                    if name.is_empty() {
                        continue;
                    }
                    let duplicate = duplicates.contains_key(&name);
                    *duplicates.entry(name.clone()).or_insert(0) += 1;
                    children.push(tree.add_node(&name, kind, duplicate));
                    if !next.contains(&name) {
                        next.push(name);
                    }
                }

                let volume = page.average_monthly_search_volume.unwrap_or(0);
                let competition = page.competition.unwrap_or(0.0);
                for &parent in &parent_ids {
                    tree.annotate(parent, |a| {
                        a.average_monthly_search_volume = volume;
                        a.competition = competition;
                        a.map_result = u32::from(page.map_result);
                        a.image_results = u32::from(page.image_results);
                        a.image_mega_block = u32::from(page.image_mega_block);
                        a.answer_box = u32::from(page.answer_box);
                        a.knowledge_graph = u32::from(page.knowledge_graph_box);
                    });
                    tree.attach_children(parent, &children);
                }
            }
            frontier = next;
        }

        if config.depth > 0 && !frontier.is_empty() {
            self.annotate_leaves(&mut tree, &frontier).await;
        }

        Ok(ExpansionOutcome { tree, duplicates })
    }

    /// Fetch, parse and store every frontier keyword, bounded-concurrently.
    /// Tree and counters are never touched here; all mutation stays in the
    /// sequential walk that follows.
    async fn scrape_frontier(
        &self,
        catalogue: &Source,
        variant: &str,
        frontier: &[String],
        concurrency: usize,
    ) -> Result<()> {
        let mut acquisitions = stream::iter(
            frontier
                .iter()
                .map(|keyword| self.acquire(catalogue, variant, keyword)),
        )
        .buffer_unordered(concurrency.max(1));
        while let Some(result) = acquisitions.next().await {
            result?;
        }
        self.store.commit().await
    }

    async fn acquire(&self, catalogue: &Source, variant: &str, keyword: &str) -> Result<()> {
        let page = match self.fetch_and_parse(catalogue, variant, keyword).await {
            Ok(page) => page,
            // Keep the run going on per-page trouble; configuration and
            // storage errors would repeat for every page and stay fatal.
            Err(Error::Fetch(reason)) | Err(Error::DocumentParse(reason)) => {
                tracing::warn!(keyword, %reason, "storing degraded no-results page");
                SerpPage::empty(catalogue.name(), keyword)
            }
            Err(other) => return Err(other),
        };
        self.store.insert(page).await
    }

    async fn fetch_and_parse(
        &self,
        catalogue: &Source,
        variant: &str,
        keyword: &str,
    ) -> Result<SerpPage> {
        let raw = self.source.fetch(keyword).await?;
        serpgraph_extract::parse_serp(catalogue, variant, &raw, keyword)
    }

    async fn annotate_leaves(&self, tree: &mut KeywordTree, leaves: &[String]) {
        let metrics = match self.metrics.get_metrics(leaves).await {
            Ok(metrics) => metrics,
            Err(error) => {
                tracing::warn!(%error, "metrics provider unavailable; leaves default to zero");
                BTreeMap::new()
            }
        };
        for keyword in leaves {
            let entry = metrics.get(keyword);
            let volume = entry
                .and_then(|m| m.average_monthly_search_volume)
                .unwrap_or(0);
            let competition = entry.and_then(|m| m.competition).unwrap_or(0.0);
            for id in tree.unexpanded_named(keyword) {
                tree.annotate(id, |a| {
                    a.average_monthly_search_volume = volume;
                    a.competition = competition;
                });
            }
        }
    }
}

/// The suggestion terms one stored page contributes, in a stable order:
/// related searches, disambiguation labels, autocomplete terms, the
/// autocorrect (forced wins over suggested), then panel co-searches.
fn suggestion_terms(page: &SerpPage) -> Vec<(String, KeywordKind)> {
    let mut terms = Vec::new();
    push_joined(&mut terms, &page.related_searches, KeywordKind::RelatedSearch);
    if let Some(joined) = &page.disambiguation_results {
        for entry in joined.split(LIST_SEPARATOR) {
            // Entries read "label - snippet"; only the label is a keyword.
            let label = entry.split_once(" - ").map_or(entry, |(label, _)| label);
            if !label.is_empty() {
                terms.push((label.to_string(), KeywordKind::DisambiguationResult));
            }
        }
    }
    push_joined(
        &mut terms,
        &page.autocomplete_results,
        KeywordKind::AutocompleteResult,
    );
    if let Some(forced) = &page.autocorrect_forced {
        terms.push((forced.clone(), KeywordKind::AutocorrectForced));
    } else if let Some(suggested) = &page.autocorrect_suggested {
        terms.push((suggested.clone(), KeywordKind::AutocorrectSuggested));
    }
    if let Some(panel) = &page.knowledge_panel {
        push_joined(
            &mut terms,
            &panel.people_also_search_for,
            KeywordKind::PeopleAlsoSearchFor,
        );
    }
    terms
}

fn push_joined(out: &mut Vec<(String, KeywordKind)>, joined: &Option<String>, kind: KeywordKind) {
    if let Some(joined) = joined {
        for term in joined.split(LIST_SEPARATOR) {
            if !term.is_empty() {
                out.push((term.to_string(), kind));
            }
        }
    }
}
