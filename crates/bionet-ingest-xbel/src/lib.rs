//! XBEL ingestion.
//!
//! XBEL documents nest statement groups; each group's annotation group may
//! carry a citation, evidence text and free annotations that inner groups
//! inherit. The reader flattens that nesting into a closed element set
//! ([`XbelElement`]) with the inherited context attached to each statement,
//! and [`XbelImporter`] builds the canonical graph from it in two passes:
//!
//! - pass 1: namespaces, header, citations, supports, terms and their nodes;
//!   every edge id is resolved from its statement path
//! - pass 2: edges, wired through the pass-1 token map

mod document;
mod importer;

pub use document::{
    read_document, AnnotationDefinition, CitationRef, GroupContext, ObjectNode, StatementNode,
    TermNode, XbelElement, XbelHeader, XbelStatement,
};
pub use importer::XbelImporter;

use bionet_core::{EngineConfig, SessionReport};
use bionet_ingest::SourceDocument;
use bionet_store::ElementStore;

/// Import one XBEL document into `store`.
pub fn import_xbel<S: ElementStore>(
    source: &SourceDocument,
    store: S,
    config: &EngineConfig,
) -> SessionReport {
    bionet_ingest::run_import(&mut XbelImporter::default(), source, store, config)
}
