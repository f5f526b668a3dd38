//! Completeness auditing.
//!
//! The auditor is told what a run is expected to touch (per-kind counts and
//! the concrete entity ids), then marks entities processed as the run emits or
//! wires them. Its report carries:
//!
//! - expected-vs-observed deltas per entity kind,
//! - entities registered but never processed,
//! - entities of a non-shared kind (edges, citations, supports) processed more
//!   than once,
//! - free-form integrity warnings raised during the run.
//!
//! Nothing in the report is fatal; callers decide how loudly to surface it.

use crate::ids::{ElementId, EntityKind};
use crate::model::{EntityCounts, Network};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindDelta {
    pub kind: EntityKind,
    pub expected: usize,
    pub observed: usize,
}

impl KindDelta {
    pub fn delta(&self) -> i64 {
        self.observed as i64 - self.expected as i64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub deltas: Vec<KindDelta>,
    pub unprocessed: Vec<(EntityKind, ElementId)>,
    pub repeated: Vec<(EntityKind, ElementId)>,
    pub warnings: Vec<String>,
}

impl AuditReport {
    /// Every expected entity was observed exactly as often as allowed.
    pub fn is_complete(&self) -> bool {
        self.unprocessed.is_empty()
            && self.repeated.is_empty()
            && self.deltas.iter().all(|d| d.delta() == 0)
    }

    pub fn delta_for(&self, kind: EntityKind) -> Option<&KindDelta> {
        self.deltas.iter().find(|d| d.kind == kind)
    }
}

#[derive(Debug, Default)]
pub struct CompletenessAuditor {
    expected: BTreeMap<EntityKind, usize>,
    counts_primed: bool,
    registered: BTreeMap<ElementId, EntityKind>,
    processed: BTreeSet<ElementId>,
    observed: BTreeMap<EntityKind, usize>,
    repeated: Vec<(EntityKind, ElementId)>,
    warnings: Vec<String>,
}

impl CompletenessAuditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Auditor primed with a whole network's audited entities, using the
    /// summary counts as the expectation.
    pub fn for_network(network: &Network) -> Self {
        let mut auditor = Self::new();
        auditor.expect_counts(&network.summary.counts);
        for (kind, id) in network.audited_entities() {
            auditor.register(kind, id);
        }
        auditor
    }

    pub fn expect_counts(&mut self, counts: &EntityCounts) {
        for kind in EntityKind::AUDITED {
            self.expected.insert(kind, counts.get(kind));
        }
        self.counts_primed = true;
    }

    /// Register one entity as expected. Bumps the expected count unless counts
    /// were primed from a summary.
    pub fn register(&mut self, kind: EntityKind, id: ElementId) {
        if self.registered.insert(id, kind).is_none() && !self.counts_primed {
            *self.expected.entry(kind).or_insert(0) += 1;
        }
    }

    /// Mark an entity processed. Returns `true` the first time.
    pub fn mark_processed(&mut self, kind: EntityKind, id: ElementId) -> bool {
        if self.processed.insert(id) {
            *self.observed.entry(kind).or_insert(0) += 1;
            if !self.registered.contains_key(&id) {
                tracing::debug!(%kind, %id, "processed entity was never registered");
                self.warnings
                    .push(format!("processed {kind} {id} was never registered"));
            }
            true
        } else {
            if !kind.is_shared() {
                tracing::trace!(%kind, %id, "entity processed again");
                self.repeated.push((kind, id));
            }
            false
        }
    }

    pub fn is_processed(&self, id: ElementId) -> bool {
        self.processed.contains(&id)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn report(&self) -> AuditReport {
        let mut kinds: BTreeSet<EntityKind> = self.expected.keys().copied().collect();
        kinds.extend(self.observed.keys().copied());
        let deltas = kinds
            .into_iter()
            .map(|kind| KindDelta {
                kind,
                expected: self.expected.get(&kind).copied().unwrap_or(0),
                observed: self.observed.get(&kind).copied().unwrap_or(0),
            })
            .collect();
        let unprocessed = self
            .registered
            .iter()
            .filter(|(id, _)| !self.processed.contains(id))
            .map(|(id, kind)| (*kind, *id))
            .collect();
        AuditReport {
            deltas,
            unprocessed,
            repeated: self.repeated.clone(),
            warnings: self.warnings.clone(),
        }
    }
}
