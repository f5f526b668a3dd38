//! Bionet core: the canonical network model shared by every importer and exporter.
//!
//! - `ids`: internal identifiers, entity kinds and natural keys
//! - `model`: namespaces, terms, nodes, edges, citations, supports, the `Network` aggregate
//! - `vocab`: XBEL relationship and function vocabularies
//! - `audit`: expected-vs-observed completeness tracking for import/export runs
//! - `error`: the engine error taxonomy and per-session reporting
//! - `config`: engine configuration (default namespace, depth bound, header defaults)

pub mod audit;
pub mod config;
pub mod digest;
pub mod error;
pub mod ids;
pub mod model;
pub mod vocab;

pub use audit::{AuditReport, CompletenessAuditor, KindDelta};
pub use config::{EngineConfig, HeaderDefaults};
pub use error::{
    EngineError, EngineResult, SessionError, SessionOperation, SessionReport, SessionStatus,
    SourceLocation,
};
pub use ids::{ElementId, EntityKind, KeyTag, NaturalKey, NetworkId};
pub use model::{
    BaseTerm, Citation, Edge, EntityCounts, FunctionTerm, Namespace, NamespaceKind, Network,
    NetworkSummary, Node, Property, PropertyValue, ProvenanceEvent, ReifiedEdgeTerm, Support,
    Term,
};
pub use vocab::{BelFunction, Relationship};
