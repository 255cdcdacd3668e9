use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown source: {0}")]
    UnknownSource(String),
    #[error("schema configuration: {0}")]
    Configuration(String),
    #[error("document parse: {0}")]
    DocumentParse(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("metrics lookup failed: {0}")]
    Metrics(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Separator used whenever list-like extracted values are flattened into a
/// single persisted column (sitelinks, related searches, trivia, ...).
pub const LIST_SEPARATOR: &str = "; ";

/// One kept result row, in its persisted shape.
///
/// `category` is the schema category the row came from ("organic_results",
/// "paid_results", ...). `rank` is the 1-based position the row had inside its
/// category before deduplication, so gaps are expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpRecord {
    pub category: String,
    pub rank: u32,
    pub link: String,
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub visible_link: Option<String>,
    pub domain: Option<String>,
    pub star_rating: Option<String>,
    pub address: Option<String>,
    /// Some(true/false) only for categories where the search bar can appear.
    pub search_bar: Option<bool>,
    pub schema_enhanced_listing: Option<String>,
    /// Tri-state: None when the category never carries a thumbnail.
    pub image_thumbnail: Option<bool>,
    pub video_thumbnail: Option<bool>,
    pub small_sitelinks: Option<String>,
    pub big_sitelinks: Option<String>,
    pub price: Option<String>,
    pub social_site: bool,
    pub https: bool,
    pub m_dot: bool,
}

/// The knowledge-panel aggregate. Built at most once per page, and only when
/// the page-level knowledge-graph signal fired.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgePanel {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub snippet: Option<String>,
    pub star_rating: Option<String>,
    pub star_rating_reviews: Option<String>,
    pub reviews: Option<String>,
    pub trivia: Option<String>,
    pub social_profiles: Option<String>,
    pub recent_post: Option<String>,
    pub features: Option<String>,
    pub people_also_search_for: Option<String>,
    pub map: bool,
    pub thumbnail: bool,
    pub slideshows: Option<String>,
    pub images_scrapbook: bool,
}

/// One fully assembled result page, ready for persistence.
///
/// `no_results` and `effective_query` are deliberately independent: a page can
/// have an effective (auto-corrected) query and still carry results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpPage {
    pub source: String,
    pub query: String,
    pub page_number: Option<u32>,
    /// The result-count string as shown by the engine ("About 1,200,000 ...").
    pub num_results_for_query: Option<String>,
    /// Count of kept records that passed the link gate.
    pub num_results: u32,
    pub effective_query: Option<String>,
    pub no_results: bool,
    pub autocorrect_forced: Option<String>,
    pub autocorrect_suggested: Option<String>,
    pub map_result: bool,
    pub image_results: bool,
    pub image_mega_block: bool,
    pub answer_box: bool,
    pub knowledge_graph_box: bool,
    pub related_searches: Option<String>,
    pub disambiguation_results: Option<String>,
    pub autocomplete_results: Option<String>,
    pub average_monthly_search_volume: Option<u64>,
    pub average_cpc: Option<f64>,
    pub competition: Option<f64>,
    pub monthly_search_volumes: Option<String>,
    pub records: Vec<SerpRecord>,
    pub knowledge_panel: Option<KnowledgePanel>,
}

impl SerpPage {
    /// A degraded page for documents that could not be processed: marked
    /// no-results, every signal null. Stored instead of dropping the page so a
    /// multi-page run keeps an auditable row for the failure.
    pub fn empty(source: &str, query: &str) -> Self {
        Self {
            source: source.to_string(),
            query: query.to_string(),
            page_number: None,
            num_results_for_query: None,
            num_results: 0,
            effective_query: None,
            no_results: true,
            autocorrect_forced: None,
            autocorrect_suggested: None,
            map_result: false,
            image_results: false,
            image_mega_block: false,
            answer_box: false,
            knowledge_graph_box: false,
            related_searches: None,
            disambiguation_results: None,
            autocomplete_results: None,
            average_monthly_search_volume: None,
            average_cpc: None,
            competition: None,
            monthly_search_volumes: None,
            records: Vec::new(),
            knowledge_panel: None,
        }
    }
}

/// Per-keyword traffic metrics from the external metrics collaborator.
///
/// Providers map an upstream `0` to `None` ("no data"); consumers that need a
/// number default `None` to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordMetrics {
    pub average_monthly_search_volume: Option<u64>,
    pub average_cpc: Option<f64>,
    pub competition: Option<f64>,
    pub monthly_search_volumes: Vec<String>,
}

/// Raw material for one extraction: the markup plus the autocomplete terms the
/// acquisition layer observed while issuing the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPage {
    pub html: String,
    pub autocomplete: Vec<String>,
}

impl RawPage {
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            autocomplete: Vec::new(),
        }
    }
}

/// Acquisition collaborator: turns a query into raw markup. Browser automation,
/// HTTP plumbing, throttling and retries all live behind this trait.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<RawPage>;
}

/// Persistence collaborator for assembled pages.
#[async_trait::async_trait]
pub trait SerpStore: Send + Sync {
    /// Most recently inserted page for `query`, if any.
    async fn find_latest(&self, query: &str) -> Result<Option<SerpPage>>;
    async fn insert(&self, page: SerpPage) -> Result<()>;
    async fn commit(&self) -> Result<()>;
}

/// External keyword-metrics collaborator (search volume / CPC / competition).
/// Pagination against the upstream service is the provider's concern.
#[async_trait::async_trait]
pub trait KeywordMetricsProvider: Send + Sync {
    async fn get_metrics(&self, keywords: &[String])
        -> Result<BTreeMap<String, KeywordMetrics>>;
}
