//! Import machinery shared by every bionet format importer.
//!
//! - [`IdentityResolver`]: natural key -> internal id, one instance per session
//! - [`LocalRefMap`]: source-local reference token -> internal id (pass 1 output)
//! - [`FormatImporter`]: one implementation per external format
//! - [`run_import`]: the two-pass driver with commit/rollback and auditing
//! - [`xml`]: element tree shared by the XML-based readers
//!
//! Pass 1 ("materialize") creates a placeholder for every entity-denoting
//! element and records its local token; cross-reference leaves are completed
//! there. Pass 2 ("wire") resolves properties and edges through the pass-1
//! map, so source documents may reference elements in any order.

pub mod refs;
pub mod resolver;
pub mod session;
pub mod xml;

pub use refs::LocalRefMap;
pub use resolver::{IdSource, IdentityResolver, SequentialIds};
pub use session::{import_path, run_import, FormatImporter, ImportContext, SourceDocument};
