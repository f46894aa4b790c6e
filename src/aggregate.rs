use std::collections::HashSet;

use crate::types::MatchRecord;

/// Collects match records across the units of one corpus and deduplicates
/// them per (quality_attribute, keyword, source_url).
///
/// A keyword matching several times within one source document is one record;
/// the same keyword matching in two different documents is two records.
/// Output order is insertion order, so identical input order reproduces
/// identical output. Merging partial aggregates by the same key is
/// commutative and associative, which is what makes sharding units across
/// threads a pure optimization.
#[derive(Debug, Default)]
pub struct MatchAggregator {
    seen: HashSet<(String, String, String)>,
    records: Vec<MatchRecord>,
}

impl MatchAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one record; returns false if an equivalent record was already
    /// collected.
    pub fn insert(&mut self, record: MatchRecord) -> bool {
        let key = (
            record.quality_attribute.clone(),
            record.keyword.clone(),
            record.source_url.clone(),
        );
        if self.seen.insert(key) {
            self.records.push(record);
            true
        } else {
            false
        }
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = MatchRecord>) {
        for record in records {
            self.insert(record);
        }
    }

    /// Fold another aggregate into this one under the same dedup rule.
    pub fn merge(&mut self, other: MatchAggregator) {
        self.extend(other.records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<MatchRecord> {
        self.records
    }
}

impl FromIterator<MatchRecord> for MatchAggregator {
    fn from_iter<I: IntoIterator<Item = MatchRecord>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        aggregator.extend(iter);
        aggregator
    }
}
