//! Result store: the current working set of leads and export links.
//!
//! The store is owned by the orchestrator for writes; observers get the
//! read surface only. Each stage's response replaces the working set
//! wholesale — later stages are authoritative over earlier ones.

use std::collections::HashSet;

use tracing::warn;

use leadscout_shared::{ExportLinkSet, LeadRecord};

/// Ordered collection of lead records plus the authoritative export links.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    records: Vec<LeadRecord>,
    export_links: ExportLinkSet,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the working set after extraction. The agent's insertion
    /// order is preserved.
    pub fn replace_all(&mut self, records: Vec<LeadRecord>, export_links: ExportLinkSet) {
        self.records = records;
        self.export_links = export_links;
    }

    /// Replace the working set after enrichment or bulk synthesis.
    ///
    /// Applies the ordering contract: stable sort by fit score descending,
    /// an absent score ordering as 0 (the stored value stays absent), ties
    /// keeping the response's relative order. Identity drift against the
    /// previous generation is tolerated but logged.
    pub fn replace_enriched(&mut self, mut records: Vec<LeadRecord>, export_links: ExportLinkSet) {
        self.warn_on_drift(&records);

        // Vec::sort_by_key is stable, which the tie contract requires.
        records.sort_by_key(|r| std::cmp::Reverse(r.ordering_score()));

        self.records = records;
        self.export_links = export_links;
    }

    pub fn records(&self) -> &[LeadRecord] {
        &self.records
    }

    pub fn export_links(&self) -> &ExportLinkSet {
        &self.export_links
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Log companies dropped or introduced relative to the current set.
    /// The incoming response stays authoritative either way.
    fn warn_on_drift(&self, incoming: &[LeadRecord]) {
        if self.records.is_empty() {
            return;
        }

        let before: HashSet<&str> = self.records.iter().map(|r| r.company.as_str()).collect();
        let after: HashSet<&str> = incoming.iter().map(|r| r.company.as_str()).collect();

        let dropped: Vec<&str> = before.difference(&after).copied().collect();
        let introduced: Vec<&str> = after.difference(&before).copied().collect();

        if !dropped.is_empty() || !introduced.is_empty() {
            warn!(
                ?dropped,
                ?introduced,
                "enrichment response drifted from the extracted company set"
            );
        }
    }
}
