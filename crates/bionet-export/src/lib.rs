//! Bionet export: networks back out as nested XBEL documents.
//!
//! - `partition`: citation-scoped segments, store order
//! - `term_tree`: recursive term and statement reconstruction with cycle and depth checks
//! - `writer`: the `DocumentWriter` contract and the quick-xml XBEL writer
//! - `session`: `ExportSession`, `export_network`, `export_to_path`

pub mod partition;
pub mod session;
pub mod term_tree;
pub mod writer;

pub use partition::{NetworkPartitioner, Partition, Segment};
pub use session::{export_network, export_to_path, ExportDocument, ExportSession};
pub use term_tree::{StatementObject, StatementTree, TermTree, TermTreeBuilder};
pub use writer::{
    AnnotationDefinitionEntry, CitationEntry, DocumentHeader, DocumentWriter, EvidenceGroup,
    NamespaceEntry, SegmentTree, XbelWriter, XBEL_NAMESPACE,
};
