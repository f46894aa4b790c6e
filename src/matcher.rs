use rayon::prelude::*;
use std::collections::HashSet;
use tracing::debug;

use crate::aggregate::MatchAggregator;
use crate::config::ExtractionConfig;
use crate::patterns::Taxonomy;
use crate::types::{CorpusUnit, MatchRecord};

/// Evaluates every keyword pattern of every quality attribute against corpus
/// units and emits match records with provenance.
///
/// Matching is a pure function of (taxonomy, config, unit): it never mutates
/// either input and the same inputs always yield the same records.
#[derive(Debug)]
pub struct KeywordMatcher {
    taxonomy: Taxonomy,
    config: ExtractionConfig,
}

impl KeywordMatcher {
    pub fn new(taxonomy: Taxonomy, config: ExtractionConfig) -> Self {
        Self { taxonomy, config }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Match one unit against the full taxonomy.
    ///
    /// Attributes are visited in taxonomy insertion order, patterns in ranked
    /// order. Each pattern contributes at most one record per unit, no matter
    /// how many times it occurs in the text.
    pub fn match_unit(&self, unit: &CorpusUnit) -> Vec<MatchRecord> {
        if unit.text.is_empty() {
            return Vec::new();
        }

        let mut records = Vec::new();
        for attribute in self.taxonomy.attributes() {
            // Two authored patterns can strip to the same recorded keyword;
            // one (attribute, keyword) pairing per unit either way.
            let mut seen_keywords = HashSet::new();
            for pattern in attribute.patterns() {
                if let Some((start, end)) = pattern.find(&unit.text) {
                    let keyword = pattern.keyword(self.config.keep_regex_notation);
                    if !seen_keywords.insert(keyword) {
                        continue;
                    }
                    let mut record =
                        MatchRecord::new(attribute.name(), keyword, &unit.source_url);
                    if self.config.append_full_text {
                        record = record.with_context(context_window(
                            &unit.text,
                            start,
                            end,
                            self.config.context_window,
                        ));
                    }
                    records.push(record);
                }
            }
        }

        debug!(
            source_url = %unit.source_url,
            matches = records.len(),
            "matched corpus unit"
        );
        records
    }

    /// Feed a finite sequence of units through the matcher into a
    /// deduplicating aggregate.
    pub fn match_units<I>(&self, units: I) -> MatchAggregator
    where
        I: IntoIterator<Item = CorpusUnit>,
    {
        let mut aggregator = MatchAggregator::new();
        for unit in units {
            aggregator.extend(self.match_unit(&unit));
        }
        aggregator
    }

    /// Shard units across worker threads.
    ///
    /// Pure performance optimization: the matcher is stateless per unit and
    /// the aggregate's dedup key is commutative under merge, so the final set
    /// equals the sequential one.
    pub fn match_units_parallel(&self, units: Vec<CorpusUnit>) -> MatchAggregator {
        units
            .into_par_iter()
            .fold(MatchAggregator::new, |mut aggregator, unit| {
                aggregator.extend(self.match_unit(&unit));
                aggregator
            })
            .reduce(MatchAggregator::new, |mut left, right| {
                left.merge(right);
                left
            })
    }
}

/// A bounded excerpt around the matched span; the whole text when it fits
/// inside the window. The window is measured in characters, half on each
/// side of the match.
fn context_window(text: &str, start: usize, end: usize, window: usize) -> String {
    if text.chars().count() <= window {
        return text.to_string();
    }

    let half = window / 2;
    let from = text[..start]
        .char_indices()
        .rev()
        .take(half)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(half)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    text[from..to].to_string()
}
