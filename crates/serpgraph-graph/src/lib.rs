//! Keyword-expansion graphs over stored result pages.
//!
//! [`GraphBuilder`] drives breadth-first expansion: it scrapes a frontier of
//! keywords through a [`serpgraph_core::PageSource`], stores the parsed pages,
//! and grows a [`KeywordTree`] from each page's suggestion columns. The leaf
//! frontier is annotated from a [`serpgraph_core::KeywordMetricsProvider`],
//! and [`output::write_artifacts`] renders the run as JSON and CSV.

pub mod builder;
pub mod normalize;
pub mod output;
pub mod store;
pub mod tree;

pub use builder::{ExpansionConfig, ExpansionOutcome, GraphBuilder};
pub use normalize::normalize;
pub use store::{MemoryStore, StaticMetrics, StaticSource};
pub use tree::{KeywordKind, KeywordNode, KeywordTree, NodeAnnotations, NodeId};
