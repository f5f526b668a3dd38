//! BioPAX level 3 ingestion (RDF/XML).
//!
//! Triples are grouped by subject into [`BiopaxElement`]s:
//!
//! - unification / relationship xrefs become base terms (`db` is the namespace)
//! - publication xrefs become citations
//! - every other typed resource becomes a node keyed by its RDF id
//!
//! Pass 2 turns an entity's literal properties into node properties, xref
//! references into aliases, related terms and citations, and references to
//! other entities into edges whose predicate is the `bp:` property name.

mod document;
mod importer;
mod rdf;

pub use document::{read_document, BiopaxElement, PropertyRef, PublicationFields, XrefFields};
pub use importer::{BiopaxImporter, PREDICATE_PREFIX, TYPE_PROPERTY};

use bionet_core::{EngineConfig, SessionReport};
use bionet_ingest::SourceDocument;
use bionet_store::ElementStore;

pub fn import_biopax<S: ElementStore>(
    source: &SourceDocument,
    store: S,
    config: &EngineConfig,
) -> SessionReport {
    bionet_ingest::run_import(&mut BiopaxImporter::default(), source, store, config)
}
