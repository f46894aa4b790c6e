pub mod types;
pub mod patterns;
pub mod taxonomy;
pub mod config;
pub mod matcher;
pub mod aggregate;
pub mod sources;
pub mod extractor;
pub mod cli;

// Re-export commonly used types
pub use types::{CorpusUnit, MatchRecord, MatchSource, PatternError};
pub use patterns::{Pattern, PatternToken, QualityAttribute, Taxonomy};
pub use taxonomy::{builtin_taxonomy, load_taxonomy, TaxonomyError};
pub use config::ExtractionConfig;
pub use matcher::KeywordMatcher;
pub use aggregate::MatchAggregator;
pub use sources::{BotFilter, StoredComment, StoredIssue, StoredPullRequest, StoredRelease};
pub use extractor::KeywordExtractor;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
