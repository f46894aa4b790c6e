use std::path::Path;
use tracing::info;

use crate::config::ExtractionConfig;
use crate::matcher::KeywordMatcher;
use crate::patterns::Taxonomy;
use crate::sources::{self, files, BotFilter, StoredIssue, StoredPullRequest, StoredRelease};
use crate::types::{CorpusUnit, MatchRecord, MatchSource};

/// Runs keyword extraction per provenance type: adapter, matcher, then the
/// deduplicating aggregate.
///
/// The aggregate count per source is always logged, even when zero — "ran and
/// found nothing" is a valid, reportable outcome distinct from "failed to
/// run".
pub struct KeywordExtractor {
    matcher: KeywordMatcher,
    bot_filter: BotFilter,
}

impl KeywordExtractor {
    pub fn new(taxonomy: Taxonomy, config: ExtractionConfig) -> Self {
        Self {
            matcher: KeywordMatcher::new(taxonomy, config),
            bot_filter: BotFilter::new(),
        }
    }

    pub fn with_bot_filter(mut self, bot_filter: BotFilter) -> Self {
        self.bot_filter = bot_filter;
        self
    }

    pub fn matcher(&self) -> &KeywordMatcher {
        &self.matcher
    }

    fn run(&self, source: MatchSource, units: Vec<CorpusUnit>) -> Vec<MatchRecord> {
        let unit_count = units.len();
        let aggregator = self.matcher.match_units_parallel(units);
        info!(
            source = %source,
            units = unit_count,
            matches = aggregator.len(),
            "keyword extraction finished"
        );
        aggregator.into_records()
    }

    pub fn extract_issues(&self, issues: &[StoredIssue]) -> Vec<MatchRecord> {
        self.run(
            MatchSource::Issue,
            sources::issue_units(issues, &self.bot_filter),
        )
    }

    pub fn extract_issue_comments(&self, issues: &[StoredIssue]) -> Vec<MatchRecord> {
        self.run(
            MatchSource::IssueComment,
            sources::issue_comment_units(issues, &self.bot_filter),
        )
    }

    pub fn extract_releases(&self, releases: &[StoredRelease]) -> Vec<MatchRecord> {
        self.run(MatchSource::Release, sources::release_units(releases))
    }

    pub fn extract_prs(&self, prs: &[StoredPullRequest]) -> Vec<MatchRecord> {
        self.run(MatchSource::Pr, sources::pr_units(prs, &self.bot_filter))
    }

    pub fn extract_pr_comments(&self, prs: &[StoredPullRequest]) -> Vec<MatchRecord> {
        self.run(
            MatchSource::PrComment,
            sources::pr_comment_units(prs, &self.bot_filter),
        )
    }

    pub fn extract_pr_related_issues(&self, prs: &[StoredPullRequest]) -> Vec<MatchRecord> {
        self.run(
            MatchSource::PrRelatedIssue,
            sources::pr_related_issue_units(prs, &self.bot_filter),
        )
    }

    pub fn extract_pr_related_issue_comments(
        &self,
        prs: &[StoredPullRequest],
    ) -> Vec<MatchRecord> {
        self.run(
            MatchSource::PrRelatedIssueComment,
            sources::pr_related_issue_comment_units(prs, &self.bot_filter),
        )
    }

    pub fn extract_pr_corpus(&self, prs: &[StoredPullRequest]) -> Vec<MatchRecord> {
        self.run(
            MatchSource::PrCorpus,
            sources::pr_corpus_units(prs, &self.bot_filter),
        )
    }

    pub fn extract_wiki(&self, wiki_dir: &Path) -> Vec<MatchRecord> {
        self.run(MatchSource::Wiki, files::wiki_units(wiki_dir))
    }

    pub fn extract_docs(&self, source_root: &Path) -> Vec<MatchRecord> {
        self.run(MatchSource::Docs, files::doc_units(source_root))
    }

    pub fn extract_code_comments(&self, source_root: &Path) -> Vec<MatchRecord> {
        self.run(MatchSource::CodeComment, files::code_comment_units(source_root))
    }
}
