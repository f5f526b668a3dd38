//! SIF ingestion.
//!
//! Two dialects share one importer:
//!
//! - simple SIF: `source predicate target [target ...]`, tab or space
//!   separated; a lone name is a node with no edges
//! - extended SIF (Pathway Commons): a `PARTICIPANT_A INTERACTION_TYPE
//!   PARTICIPANT_B ...` edge section, then a `PARTICIPANT ...` node section
//!   carrying node properties and `;`-separated xref lists
//!
//! Participants are nodes keyed by name; predicates are unqualified base terms.
//! Edge rows may name participants whose node rows come later.

mod document;
mod importer;

pub use document::{read_document, SifElement, EDGE_HEADER, NODE_HEADER};
pub use importer::{SifImporter, PUBMED_ID_TYPE};

use bionet_core::{EngineConfig, SessionReport};
use bionet_ingest::SourceDocument;
use bionet_store::ElementStore;

pub fn import_sif<S: ElementStore>(
    source: &SourceDocument,
    store: S,
    config: &EngineConfig,
) -> SessionReport {
    bionet_ingest::run_import(&mut SifImporter::default(), source, store, config)
}
