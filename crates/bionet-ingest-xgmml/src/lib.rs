//! XGMML ingestion.
//!
//! The graph's `label` and `att`s become the network name and properties.
//! Nodes are keyed by their XGMML id and named by `label` (else `name`);
//! edges may reference nodes declared after them. An edge's predicate comes
//! from its `interaction` att, else the `(type)` in its label, else
//! `interacts with`. `graphics` are skipped.

mod document;
mod importer;

pub use document::{read_document, XgmmlElement, INTERACTION_ATT};
pub use importer::XgmmlImporter;

use bionet_core::{EngineConfig, SessionReport};
use bionet_ingest::SourceDocument;
use bionet_store::ElementStore;

pub fn import_xgmml<S: ElementStore>(
    source: &SourceDocument,
    store: S,
    config: &EngineConfig,
) -> SessionReport {
    bionet_ingest::run_import(&mut XgmmlImporter::default(), source, store, config)
}
