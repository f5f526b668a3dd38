//! Canonical network model.
//!
//! A network is a graph, not a tree: edges can be wrapped by reified edge terms
//! and used as the object of other edges, so cycles are representable. All
//! tables are keyed by [`ElementId`]; iteration order is therefore creation
//! order, which is what export uses as "store order".

use crate::error::{EngineError, EngineResult};
use crate::ids::{ElementId, EntityKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Properties
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Text(_) => "string",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Real(_) => "real",
            PropertyValue::Boolean(_) => "boolean",
            PropertyValue::List(_) => "list",
        }
    }

    /// Flat textual rendering (lists are comma separated).
    pub fn to_text(&self) -> String {
        match self {
            PropertyValue::Text(s) => s.clone(),
            PropertyValue::Integer(i) => i.to_string(),
            PropertyValue::Real(r) => r.to_string(),
            PropertyValue::Boolean(b) => b.to_string(),
            PropertyValue::List(items) => items
                .iter()
                .map(PropertyValue::to_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// A literal (non-entity) property attached to a node, edge, citation or network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

impl Property {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PropertyValue::Text(value.into()),
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NamespaceKind {
    /// Qualifies base term names (`HGNC`, `CHEBI`, ...).
    #[default]
    Term,
    /// Annotation vocabulary defined by an external resource URL.
    ExternalAnnotation,
    /// Annotation vocabulary defined inline as a list of values.
    InternalAnnotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: ElementId,
    pub prefix: String,
    pub uri: Option<String>,
    pub kind: NamespaceKind,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseTerm {
    pub id: ElementId,
    pub name: String,
    pub namespace: Option<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTerm {
    pub id: ElementId,
    /// The base term naming the function (e.g. `proteinAbundance`).
    pub function: ElementId,
    /// Parameter slot -> child term. Slot keys order lexicographically, and
    /// that order is argument position.
    pub parameters: BTreeMap<String, ElementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReifiedEdgeTerm {
    pub id: ElementId,
    pub edge: ElementId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Term {
    Base(BaseTerm),
    Function(FunctionTerm),
    ReifiedEdge(ReifiedEdgeTerm),
}

impl Term {
    pub fn id(&self) -> ElementId {
        match self {
            Term::Base(t) => t.id,
            Term::Function(t) => t.id,
            Term::ReifiedEdge(t) => t.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Term::Base(_) => EntityKind::BaseTerm,
            Term::Function(_) => EntityKind::FunctionTerm,
            Term::ReifiedEdge(_) => EntityKind::ReifiedEdgeTerm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    pub id: ElementId,
    pub name: Option<String>,
    /// The term labelling this node.
    pub represents: Option<ElementId>,
    pub aliases: BTreeSet<ElementId>,
    pub related_terms: BTreeSet<ElementId>,
    pub citations: BTreeSet<ElementId>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: ElementId,
    pub subject: ElementId,
    pub predicate: ElementId,
    pub object: ElementId,
    pub supports: BTreeSet<ElementId>,
    pub citations: BTreeSet<ElementId>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Citation {
    pub id: ElementId,
    pub title: Option<String>,
    pub citation_type: Option<String>,
    pub identifier: Option<String>,
    pub id_type: Option<String>,
    pub contributors: Vec<String>,
    pub comment: Option<String>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub id: ElementId,
    pub text: String,
    /// Owning citation; always a citation of the same network.
    pub citation: ElementId,
    pub metadata: BTreeMap<String, String>,
}

// ============================================================================
// Summary + provenance
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityCounts {
    pub namespaces: usize,
    pub base_terms: usize,
    pub function_terms: usize,
    pub reified_edge_terms: usize,
    pub nodes: usize,
    pub edges: usize,
    pub citations: usize,
    pub supports: usize,
}

impl EntityCounts {
    pub fn get(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Namespace => self.namespaces,
            EntityKind::BaseTerm => self.base_terms,
            EntityKind::FunctionTerm => self.function_terms,
            EntityKind::ReifiedEdgeTerm => self.reified_edge_terms,
            EntityKind::Node => self.nodes,
            EntityKind::Edge => self.edges,
            EntityKind::Citation => self.citations,
            EntityKind::Support => self.supports,
        }
    }

    pub fn terms(&self) -> usize {
        self.base_terms + self.function_terms + self.reified_edge_terms
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEvent {
    pub event_type: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub name: Option<String>,
    pub description: Option<String>,
    pub counts: EntityCounts,
    pub created_at: DateTime<Utc>,
    pub properties: Vec<Property>,
    pub provenance: Vec<ProvenanceEvent>,
}

impl Default for NetworkSummary {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            counts: EntityCounts::default(),
            created_at: Utc::now(),
            properties: Vec::new(),
            provenance: Vec::new(),
        }
    }
}

// ============================================================================
// Network aggregate
// ============================================================================

const SNAPSHOT_MAGIC: &[u8; 4] = b"BNET";
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub summary: NetworkSummary,
    pub namespaces: BTreeMap<ElementId, Namespace>,
    pub terms: BTreeMap<ElementId, Term>,
    pub nodes: BTreeMap<ElementId, Node>,
    pub edges: BTreeMap<ElementId, Edge>,
    pub citations: BTreeMap<ElementId, Citation>,
    pub supports: BTreeMap<ElementId, Support>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kind of the entity bound to `id`, if any.
    pub fn kind_of(&self, id: ElementId) -> Option<EntityKind> {
        if let Some(term) = self.terms.get(&id) {
            return Some(term.kind());
        }
        if self.nodes.contains_key(&id) {
            Some(EntityKind::Node)
        } else if self.edges.contains_key(&id) {
            Some(EntityKind::Edge)
        } else if self.citations.contains_key(&id) {
            Some(EntityKind::Citation)
        } else if self.supports.contains_key(&id) {
            Some(EntityKind::Support)
        } else if self.namespaces.contains_key(&id) {
            Some(EntityKind::Namespace)
        } else {
            None
        }
    }

    pub fn base_term(&self, id: ElementId) -> Option<&BaseTerm> {
        match self.terms.get(&id) {
            Some(Term::Base(t)) => Some(t),
            _ => None,
        }
    }

    pub fn namespace_by_prefix(&self, prefix: &str) -> Option<&Namespace> {
        self.namespaces.values().find(|ns| ns.prefix == prefix)
    }

    /// Prefix of a base term's namespace, if it has one.
    pub fn term_prefix(&self, term: &BaseTerm) -> Option<&str> {
        term.namespace
            .and_then(|ns| self.namespaces.get(&ns))
            .map(|ns| ns.prefix.as_str())
    }

    pub fn counts(&self) -> EntityCounts {
        let mut counts = EntityCounts {
            namespaces: self.namespaces.len(),
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            citations: self.citations.len(),
            supports: self.supports.len(),
            ..EntityCounts::default()
        };
        for term in self.terms.values() {
            match term {
                Term::Base(_) => counts.base_terms += 1,
                Term::Function(_) => counts.function_terms += 1,
                Term::ReifiedEdge(_) => counts.reified_edge_terms += 1,
            }
        }
        counts
    }

    pub fn refresh_summary(&mut self) {
        self.summary.counts = self.counts();
    }

    /// Ids of every entity of an audited kind, in store order.
    pub fn audited_entities(&self) -> Vec<(EntityKind, ElementId)> {
        let mut out: Vec<(EntityKind, ElementId)> = Vec::new();
        out.extend(self.terms.values().map(|t| (t.kind(), t.id())));
        out.extend(self.nodes.keys().map(|id| (EntityKind::Node, *id)));
        out.extend(self.edges.keys().map(|id| (EntityKind::Edge, *id)));
        out.extend(self.citations.keys().map(|id| (EntityKind::Citation, *id)));
        out.extend(self.supports.keys().map(|id| (EntityKind::Support, *id)));
        out.sort_by_key(|(_, id)| *id);
        out
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Serialize to the binary snapshot format (`BNET` + version + bincode).
    pub fn to_bytes(&self) -> EngineResult<Vec<u8>> {
        let body = bincode::serialize(self).map_err(|e| EngineError::Snapshot(e.to_string()))?;
        let mut result = Vec::with_capacity(body.len() + 8);
        result.extend_from_slice(SNAPSHOT_MAGIC);
        result.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        result.extend_from_slice(&body);
        Ok(result)
    }

    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        if bytes.len() < 8 || &bytes[0..4] != SNAPSHOT_MAGIC {
            return Err(EngineError::Snapshot("not a network snapshot".to_string()));
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[4..8]);
        let version = u32::from_le_bytes(version);
        if version != SNAPSHOT_VERSION {
            return Err(EngineError::Snapshot(format!(
                "unsupported snapshot version: {version}"
            )));
        }
        bincode::deserialize(&bytes[8..]).map_err(|e| EngineError::Snapshot(e.to_string()))
    }

    pub fn to_json(&self) -> EngineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Snapshot(e.to_string()))
    }

    pub fn from_json(text: &str) -> EngineResult<Self> {
        serde_json::from_str(text).map_err(|e| EngineError::Snapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_network() -> Network {
        let mut net = Network::new();
        net.namespaces.insert(
            ElementId(1),
            Namespace {
                id: ElementId(1),
                prefix: "HGNC".to_string(),
                uri: None,
                kind: NamespaceKind::Term,
                description: None,
            },
        );
        net.terms.insert(
            ElementId(2),
            Term::Base(BaseTerm {
                id: ElementId(2),
                name: "AKT1".to_string(),
                namespace: Some(ElementId(1)),
            }),
        );
        net.nodes.insert(
            ElementId(3),
            Node {
                id: ElementId(3),
                represents: Some(ElementId(2)),
                properties: vec![Property {
                    name: "score".to_string(),
                    value: PropertyValue::Real(0.5),
                }],
                ..Node::default()
            },
        );
        net.refresh_summary();
        net
    }

    #[test]
    fn counts_split_terms_by_kind() {
        let net = tiny_network();
        assert_eq!(net.summary.counts.base_terms, 1);
        assert_eq!(net.summary.counts.nodes, 1);
        assert_eq!(net.summary.counts.terms(), 1);
        assert_eq!(net.kind_of(ElementId(2)), Some(EntityKind::BaseTerm));
        assert_eq!(net.kind_of(ElementId(9)), None);
    }

    #[test]
    fn binary_snapshot_restores_network() {
        let net = tiny_network();
        let bytes = net.to_bytes().unwrap();
        assert_eq!(&bytes[0..4], b"BNET");
        assert_eq!(Network::from_bytes(&bytes).unwrap(), net);
    }

    #[test]
    fn rejects_foreign_bytes() {
        let err = Network::from_bytes(b"GRPH\x01\x00\x00\x00").unwrap_err();
        assert!(matches!(err, EngineError::Snapshot(_)));
    }

    #[test]
    fn term_prefix_follows_namespace() {
        let net = tiny_network();
        let term = net.base_term(ElementId(2)).unwrap();
        assert_eq!(net.term_prefix(term), Some("HGNC"));
    }
}
