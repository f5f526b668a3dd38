//! Engine error taxonomy and per-session result reporting.
//!
//! Every variant of [`EngineError`] is fatal for the session that raised it:
//! imports roll back, exports write nothing. Diagnostic findings (unprocessed
//! entities, stray edges) travel in the [`AuditReport`] instead.

use crate::audit::AuditReport;
use crate::ids::{ElementId, EntityKind, NetworkId};
use crate::model::EntityCounts;
use serde::Serialize;
use std::fmt;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Where in a source document an element came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SourceLocation {
    /// 1-based line number (line-oriented formats).
    Line(usize),
    /// 0-based ordinal of the element in reader order.
    Element(usize),
    /// Structural path, e.g. `statementGroup[2]/statement[0]`.
    Path(String),
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Line(line) => write!(f, "line {line}"),
            SourceLocation::Element(index) => write!(f, "element {index}"),
            SourceLocation::Path(path) => f.write_str(path),
        }
    }
}

fn at(location: &Option<SourceLocation>) -> String {
    match location {
        Some(location) => format!(" (at {location})"),
        None => String::new(),
    }
}

fn path_display(path: &[ElementId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A natural key, id or local token was bound twice to different targets.
    #[error("conflicting identity for {subject}: bound to {existing}, attempted {attempted}")]
    ConflictingIdentity {
        subject: String,
        existing: String,
        attempted: String,
    },

    #[error("unresolved reference `{token}` from {referenced_from}{}", at(.location))]
    UnresolvedReference {
        token: String,
        referenced_from: String,
        location: Option<SourceLocation>,
    },

    #[error("cyclic term graph at {id}: {}", path_display(.path))]
    CyclicTerm { id: ElementId, path: Vec<ElementId> },

    #[error("edge {edge}: predicate `{predicate}` has no relationship mapping")]
    UnknownRelationship { predicate: String, edge: ElementId },

    #[error("malformed {element}: {reason}{}", at(.location))]
    MalformedSourceElement {
        element: String,
        reason: String,
        location: Option<SourceLocation>,
    },

    #[error("term {term}: function `{function}` is not a known function")]
    UnknownFunction { function: String, term: ElementId },

    #[error("{id} is a {found}, not a {expected}")]
    EntityKindMismatch {
        id: ElementId,
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("{from} references {to}, which is not a {expected} in this network")]
    DanglingReference {
        from: ElementId,
        to: ElementId,
        expected: EntityKind,
    },

    #[error("node {node} has neither a term nor a name")]
    UnlabeledNode { node: ElementId },

    #[error("term nesting at {id} exceeds the depth limit of {limit}")]
    TermDepthExceeded { id: ElementId, limit: usize },

    #[error("XML error: {message}{}", at(.location))]
    Xml {
        message: String,
        location: Option<SourceLocation>,
    },

    #[error("RDF error: {0}")]
    Rdf(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn malformed(
        element: impl Into<String>,
        reason: impl Into<String>,
        location: Option<SourceLocation>,
    ) -> Self {
        EngineError::MalformedSourceElement {
            element: element.into(),
            reason: reason.into(),
            location,
        }
    }

    pub fn unresolved(
        token: impl Into<String>,
        referenced_from: impl Into<String>,
        location: Option<SourceLocation>,
    ) -> Self {
        EngineError::UnresolvedReference {
            token: token.into(),
            referenced_from: referenced_from.into(),
            location,
        }
    }

    pub fn xml(message: impl fmt::Display, location: Option<SourceLocation>) -> Self {
        EngineError::Xml {
            message: message.to_string(),
            location,
        }
    }
}

// ============================================================================
// Session reporting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionOperation {
    Import,
    Export,
}

impl fmt::Display for SessionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOperation::Import => f.write_str("import"),
            SessionOperation::Export => f.write_str("export"),
        }
    }
}

/// The single aggregated error a failed session surfaces.
#[derive(Debug, thiserror::Error)]
#[error("failed to {operation} {source_name}: {cause}")]
pub struct SessionError {
    pub operation: SessionOperation,
    pub source_name: String,
    #[source]
    pub cause: EngineError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Success,
    Failed,
}

/// Structured result of one import or export session.
#[derive(Debug)]
pub struct SessionReport {
    pub status: SessionStatus,
    pub error: Option<SessionError>,
    /// Set by successful imports: the committed network.
    pub network_id: Option<NetworkId>,
    pub counts: EntityCounts,
    pub audit: AuditReport,
}

impl SessionReport {
    pub fn success(network_id: Option<NetworkId>, counts: EntityCounts, audit: AuditReport) -> Self {
        Self {
            status: SessionStatus::Success,
            error: None,
            network_id,
            counts,
            audit,
        }
    }

    pub fn failed(error: SessionError, counts: EntityCounts, audit: AuditReport) -> Self {
        Self {
            status: SessionStatus::Failed,
            error: Some(error),
            network_id: None,
            counts,
            audit,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SessionStatus::Success
    }

    pub fn reason(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// The underlying engine error of a failed session.
    pub fn cause(&self) -> Option<&EngineError> {
        self.error.as_ref().map(|e| &e.cause)
    }
}
