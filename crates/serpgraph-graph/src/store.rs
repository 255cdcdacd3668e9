//! In-memory collaborators.
//!
//! [`MemoryStore`] is the default page store for single-process runs and for
//! tests. [`StaticSource`] and [`StaticMetrics`] serve canned responses, which
//! makes expansion runs fully deterministic.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serpgraph_core::{
    Error, KeywordMetrics, KeywordMetricsProvider, PageSource, RawPage, Result, SerpPage,
    SerpStore,
};

/// Append-only page store backed by a `Vec`. `find_latest` scans from the
/// back, so re-scraped keywords resolve to their newest page.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: Mutex<Vec<SerpPage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything inserted so far, in insertion order.
    pub fn pages(&self) -> Vec<SerpPage> {
        match self.pages.lock() {
            Ok(pages) => pages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait::async_trait]
impl SerpStore for MemoryStore {
    async fn find_latest(&self, query: &str) -> Result<Option<SerpPage>> {
        let pages = self
            .pages
            .lock()
            .map_err(|_| Error::Storage("page store poisoned".to_string()))?;
        Ok(pages.iter().rev().find(|p| p.query == query).cloned())
    }

    async fn insert(&self, page: SerpPage) -> Result<()> {
        let mut pages = self
            .pages
            .lock()
            .map_err(|_| Error::Storage("page store poisoned".to_string()))?;
        pages.push(page);
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        Ok(())
    }
}

/// Canned page source: a query either maps to a raw page or the fetch fails.
#[derive(Debug, Default)]
pub struct StaticSource {
    pages: BTreeMap<String, RawPage>,
}

impl StaticSource {
    pub fn insert(&mut self, query: &str, html: impl Into<String>) {
        self.pages.insert(query.to_string(), RawPage::from_html(html));
    }

    pub fn insert_raw(&mut self, query: &str, raw: RawPage) {
        self.pages.insert(query.to_string(), raw);
    }
}

#[async_trait::async_trait]
impl PageSource for StaticSource {
    async fn fetch(&self, query: &str) -> Result<RawPage> {
        self.pages
            .get(query)
            .cloned()
            .ok_or_else(|| Error::Fetch(format!("no canned page for {query:?}")))
    }
}

/// Canned metrics table. Keywords missing from the table are simply absent
/// from the response, which consumers treat as "no data".
#[derive(Debug, Default)]
pub struct StaticMetrics {
    table: BTreeMap<String, KeywordMetrics>,
}

impl StaticMetrics {
    pub fn insert(&mut self, keyword: &str, metrics: KeywordMetrics) {
        self.table.insert(keyword.to_string(), metrics);
    }
}

#[async_trait::async_trait]
impl KeywordMetricsProvider for StaticMetrics {
    async fn get_metrics(
        &self,
        keywords: &[String],
    ) -> Result<BTreeMap<String, KeywordMetrics>> {
        Ok(keywords
            .iter()
            .filter_map(|kw| self.table.get(kw).map(|m| (kw.clone(), m.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_latest_prefers_the_newest_page() {
        let store = MemoryStore::new();
        let mut first = SerpPage::empty("google", "cheese");
        first.num_results = 1;
        let mut second = SerpPage::empty("google", "cheese");
        second.num_results = 2;
        store.insert(first).await.unwrap();
        store.insert(second).await.unwrap();
        store.commit().await.unwrap();

        let found = store.find_latest("cheese").await.unwrap().unwrap();
        assert_eq!(found.num_results, 2);
        assert!(store.find_latest("bread").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn static_source_fails_for_unknown_queries() {
        let mut source = StaticSource::default();
        source.insert("cheese", "<html></html>");
        assert!(source.fetch("cheese").await.is_ok());
        assert!(matches!(source.fetch("bread").await, Err(Error::Fetch(_))));
    }

    #[tokio::test]
    async fn static_metrics_only_answer_known_keywords() {
        let mut metrics = StaticMetrics::default();
        metrics.insert(
            "cheese",
            KeywordMetrics {
                average_monthly_search_volume: Some(500),
                ..KeywordMetrics::default()
            },
        );
        let table = metrics
            .get_metrics(&["cheese".to_string(), "bread".to_string()])
            .await
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["cheese"].average_monthly_search_volume, Some(500));
    }
}
