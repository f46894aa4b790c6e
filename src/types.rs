use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The minimal matchable record: one blob of text plus the permalink it came from.
///
/// `text` may be empty (the unit simply yields no matches); `source_url` is
/// always present and is carried into every match produced from this unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusUnit {
    pub text: String,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i64>,
}

impl CorpusUnit {
    pub fn new(text: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_url: source_url.into(),
            source_id: None,
        }
    }

    pub fn with_source_id(mut self, source_id: i64) -> Self {
        self.source_id = Some(source_id);
        self
    }
}

/// The output atom of the matching pipeline.
///
/// `quality_attribute` and `keyword` always come from the normalized taxonomy;
/// `matched_text_context` is populated only when full-text retention is
/// requested, otherwise records stay a minimal identity tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRecord {
    pub quality_attribute: String,
    pub keyword: String,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_text_context: Option<String>,
}

impl MatchRecord {
    pub fn new(
        quality_attribute: impl Into<String>,
        keyword: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            quality_attribute: quality_attribute.into(),
            keyword: keyword.into(),
            source_url: source_url.into(),
            matched_text_context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.matched_text_context = Some(context.into());
        self
    }

    /// Identity tuple used for deduplication across units of one corpus.
    pub fn dedup_key(&self) -> (&str, &str, &str) {
        (&self.quality_attribute, &self.keyword, &self.source_url)
    }
}

/// Provenance type of a corpus: the originating document kind.
///
/// The string form is stable and used in output filenames, one file per
/// provenance type per repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Release,
    Wiki,
    Docs,
    Issue,
    IssueComment,
    Pr,
    PrCorpus,
    PrComment,
    PrRelatedIssue,
    PrRelatedIssueComment,
    CodeComment,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::Release => "release",
            MatchSource::Wiki => "wiki",
            MatchSource::Docs => "docs",
            MatchSource::Issue => "issue",
            MatchSource::IssueComment => "issue_comment",
            MatchSource::Pr => "pr",
            MatchSource::PrCorpus => "pr_corpus",
            MatchSource::PrComment => "pr_comment",
            MatchSource::PrRelatedIssue => "pr_related_issue",
            MatchSource::PrRelatedIssueComment => "pr_related_issue_comment",
            MatchSource::CodeComment => "code_comment",
        }
    }

    pub fn all() -> &'static [MatchSource] {
        &[
            MatchSource::Release,
            MatchSource::Wiki,
            MatchSource::Docs,
            MatchSource::Issue,
            MatchSource::IssueComment,
            MatchSource::Pr,
            MatchSource::PrCorpus,
            MatchSource::PrComment,
            MatchSource::PrRelatedIssue,
            MatchSource::PrRelatedIssueComment,
            MatchSource::CodeComment,
        ]
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A taxonomy entry that cannot be compiled into a matchable form.
///
/// Fatal for the run: downstream matching would silently be incomplete, so
/// this is raised at normalization time, never deferred to first use.
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("empty keyword pattern under attribute '{attribute}'")]
    EmptyPattern { attribute: String },

    #[error("invalid keyword pattern '{pattern}' under attribute '{attribute}'")]
    InvalidPattern { attribute: String, pattern: String },

    #[error("failed to compile keyword pattern '{pattern}' under attribute '{attribute}'")]
    Compile {
        attribute: String,
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },
}
