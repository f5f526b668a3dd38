use crate::validate::validate_references;
use crate::{EdgeEnds, ElementStore};
use bionet_core::{
    BaseTerm, Citation, Edge, ElementId, EngineError, EngineResult, EntityKind, FunctionTerm,
    Namespace, NamespaceKind, Network, NetworkId, NetworkSummary, Node, ReifiedEdgeTerm, Support,
    Term,
};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Registry
// ============================================================================

/// In-memory registry of committed networks.
///
/// Cloning is cheap and shares the registry, so one store can back many
/// concurrent sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    networks: Arc<RwLock<BTreeMap<NetworkId, Arc<Network>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session transaction. `label` names the session in logs.
    pub fn begin(&self, label: impl Into<String>) -> StoreTransaction {
        StoreTransaction {
            registry: Arc::clone(&self.networks),
            network: Network::new(),
            label: label.into(),
            finished: false,
        }
    }

    pub fn get(&self, id: NetworkId) -> Option<Arc<Network>> {
        self.networks.read().get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<NetworkId> {
        self.networks.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.networks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.read().is_empty()
    }

    pub fn delete(&self, id: NetworkId) -> bool {
        self.networks.write().remove(&id).is_some()
    }

    /// Register an already-built network (e.g. one loaded from a snapshot).
    pub fn insert(&self, network: Network) -> EngineResult<NetworkId> {
        validate_references(&network)?;
        let id = Uuid::new_v4();
        self.networks.write().insert(id, Arc::new(network));
        Ok(id)
    }

    pub fn save_snapshot(&self, id: NetworkId, path: &Path) -> EngineResult<()> {
        let network = self
            .get(id)
            .ok_or_else(|| EngineError::Snapshot(format!("unknown network {id}")))?;
        std::fs::write(path, network.to_bytes()?)?;
        tracing::debug!(network = %id, path = %path.display(), "wrote network snapshot");
        Ok(())
    }

    pub fn load_snapshot(&self, path: &Path) -> EngineResult<NetworkId> {
        let bytes = std::fs::read(path)?;
        self.insert(Network::from_bytes(&bytes)?)
    }
}

// ============================================================================
// Session transaction
// ============================================================================

/// One session's private staging area.
///
/// Dropping an unfinished transaction aborts it.
#[derive(Debug)]
pub struct StoreTransaction {
    registry: Arc<RwLock<BTreeMap<NetworkId, Arc<Network>>>>,
    network: Network,
    label: String,
    finished: bool,
}

impl StoreTransaction {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Fail unless `id` is free or already bound to `expected`.
    /// Returns whether it is already bound.
    fn claim(&self, id: ElementId, expected: EntityKind) -> EngineResult<bool> {
        match self.network.kind_of(id) {
            None => Ok(false),
            Some(found) if found == expected => Ok(true),
            Some(found) => Err(EngineError::EntityKindMismatch {
                id,
                expected,
                found,
            }),
        }
    }

    fn require(&self, from: ElementId, to: ElementId, expected: EntityKind) -> EngineResult<()> {
        if self.network.kind_of(to) == Some(expected) {
            Ok(())
        } else {
            Err(EngineError::DanglingReference { from, to, expected })
        }
    }

    fn term_mut(&mut self, id: ElementId, expected: EntityKind) -> EngineResult<&mut Term> {
        let found = self.network.kind_of(id);
        match self.network.terms.get_mut(&id) {
            Some(term) => Ok(term),
            None => Err(EngineError::EntityKindMismatch {
                id,
                expected,
                found: found.unwrap_or(expected),
            }),
        }
    }
}

fn structural_conflict(id: ElementId, existing: impl ToString, attempted: impl ToString) -> EngineError {
    EngineError::ConflictingIdentity {
        subject: format!("entity {id}"),
        existing: existing.to_string(),
        attempted: attempted.to_string(),
    }
}

impl ElementStore for StoreTransaction {
    fn network(&self) -> &Network {
        &self.network
    }

    fn find_or_create_namespace(
        &mut self,
        id: ElementId,
        prefix: &str,
    ) -> EngineResult<&mut Namespace> {
        if !self.claim(id, EntityKind::Namespace)? {
            if let Some(other) = self.network.namespace_by_prefix(prefix) {
                return Err(EngineError::ConflictingIdentity {
                    subject: format!("namespace prefix `{prefix}`"),
                    existing: other.id.to_string(),
                    attempted: id.to_string(),
                });
            }
        }
        let ns = self.network.namespaces.entry(id).or_insert_with(|| Namespace {
            id,
            prefix: prefix.to_string(),
            uri: None,
            kind: NamespaceKind::Term,
            description: None,
        });
        if ns.prefix != prefix {
            return Err(structural_conflict(id, &ns.prefix, prefix));
        }
        Ok(ns)
    }

    fn find_or_create_base_term(&mut self, id: ElementId) -> EngineResult<&mut BaseTerm> {
        if !self.claim(id, EntityKind::BaseTerm)? {
            self.network.terms.insert(
                id,
                Term::Base(BaseTerm {
                    id,
                    name: String::new(),
                    namespace: None,
                }),
            );
        }
        match self.term_mut(id, EntityKind::BaseTerm)? {
            Term::Base(term) => Ok(term),
            other => Err(EngineError::EntityKindMismatch {
                id,
                expected: EntityKind::BaseTerm,
                found: other.kind(),
            }),
        }
    }

    fn find_or_create_function_term(
        &mut self,
        id: ElementId,
        function: ElementId,
    ) -> EngineResult<&mut FunctionTerm> {
        if !self.claim(id, EntityKind::FunctionTerm)? {
            self.require(id, function, EntityKind::BaseTerm)?;
            self.network.terms.insert(
                id,
                Term::Function(FunctionTerm {
                    id,
                    function,
                    parameters: BTreeMap::new(),
                }),
            );
        }
        match self.network.terms.get(&id) {
            Some(Term::Function(term)) if term.function != function => {
                return Err(structural_conflict(id, term.function, function));
            }
            Some(Term::Function(_)) | None => {}
            Some(other) => {
                return Err(EngineError::EntityKindMismatch {
                    id,
                    expected: EntityKind::FunctionTerm,
                    found: other.kind(),
                });
            }
        }
        match self.term_mut(id, EntityKind::FunctionTerm)? {
            Term::Function(term) => Ok(term),
            other => Err(EngineError::EntityKindMismatch {
                id,
                expected: EntityKind::FunctionTerm,
                found: other.kind(),
            }),
        }
    }

    fn find_or_create_reified_edge_term(
        &mut self,
        id: ElementId,
        edge: ElementId,
    ) -> EngineResult<&mut ReifiedEdgeTerm> {
        if !self.claim(id, EntityKind::ReifiedEdgeTerm)? {
            self.network
                .terms
                .insert(id, Term::ReifiedEdge(ReifiedEdgeTerm { id, edge }));
        }
        match self.network.terms.get(&id) {
            Some(Term::ReifiedEdge(term)) if term.edge != edge => {
                return Err(structural_conflict(id, term.edge, edge));
            }
            Some(Term::ReifiedEdge(_)) | None => {}
            Some(other) => {
                return Err(EngineError::EntityKindMismatch {
                    id,
                    expected: EntityKind::ReifiedEdgeTerm,
                    found: other.kind(),
                });
            }
        }
        match self.term_mut(id, EntityKind::ReifiedEdgeTerm)? {
            Term::ReifiedEdge(term) => Ok(term),
            other => Err(EngineError::EntityKindMismatch {
                id,
                expected: EntityKind::ReifiedEdgeTerm,
                found: other.kind(),
            }),
        }
    }

    fn find_or_create_node(&mut self, id: ElementId) -> EngineResult<&mut Node> {
        self.claim(id, EntityKind::Node)?;
        Ok(self.network.nodes.entry(id).or_insert_with(|| Node {
            id,
            ..Node::default()
        }))
    }

    fn find_or_create_citation(&mut self, id: ElementId) -> EngineResult<&mut Citation> {
        self.claim(id, EntityKind::Citation)?;
        Ok(self.network.citations.entry(id).or_insert_with(|| Citation {
            id,
            ..Citation::default()
        }))
    }

    fn find_or_create_support(
        &mut self,
        id: ElementId,
        citation: ElementId,
    ) -> EngineResult<&mut Support> {
        if !self.claim(id, EntityKind::Support)? {
            self.require(id, citation, EntityKind::Citation)?;
        }
        let support = self.network.supports.entry(id).or_insert_with(|| Support {
            id,
            text: String::new(),
            citation,
            metadata: BTreeMap::new(),
        });
        if support.citation != citation {
            return Err(structural_conflict(id, support.citation, citation));
        }
        Ok(support)
    }

    fn find_or_create_edge(&mut self, id: ElementId, ends: EdgeEnds) -> EngineResult<&mut Edge> {
        if !self.claim(id, EntityKind::Edge)? {
            self.require(id, ends.subject, EntityKind::Node)?;
            self.require(id, ends.object, EntityKind::Node)?;
            self.require(id, ends.predicate, EntityKind::BaseTerm)?;
        }
        let edge = self.network.edges.entry(id).or_insert_with(|| Edge {
            id,
            subject: ends.subject,
            predicate: ends.predicate,
            object: ends.object,
            supports: BTreeSet::new(),
            citations: BTreeSet::new(),
            properties: Vec::new(),
        });
        let existing = EdgeEnds {
            subject: edge.subject,
            predicate: edge.predicate,
            object: edge.object,
        };
        if existing != ends {
            return Err(structural_conflict(
                id,
                format!("{existing:?}"),
                format!("{ends:?}"),
            ));
        }
        Ok(edge)
    }

    fn summary_mut(&mut self) -> &mut NetworkSummary {
        &mut self.network.summary
    }

    fn commit(mut self) -> EngineResult<NetworkId> {
        self.finished = true;
        let mut network = std::mem::take(&mut self.network);
        if let Err(err) = validate_references(&network) {
            tracing::warn!(session = %self.label, error = %err, "commit rejected; discarding staged network");
            return Err(err);
        }
        network.refresh_summary();
        let counts = network.summary.counts;
        let id = Uuid::new_v4();
        self.registry.write().insert(id, Arc::new(network));
        tracing::info!(
            session = %self.label,
            network = %id,
            nodes = counts.nodes,
            edges = counts.edges,
            terms = counts.terms(),
            "committed network"
        );
        Ok(id)
    }

    fn abort(mut self) {
        self.finished = true;
        let counts = self.network.counts();
        self.network = Network::new();
        tracing::info!(
            session = %self.label,
            nodes = counts.nodes,
            edges = counts.edges,
            "aborted session; staged entities discarded"
        );
    }
}

impl Drop for StoreTransaction {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(session = %self.label, "transaction dropped without commit; discarding");
        }
    }
}
