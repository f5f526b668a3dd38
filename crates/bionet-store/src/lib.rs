//! Bionet element store.
//!
//! Importers talk to persistence only through [`ElementStore`]: find-or-create
//! by internal id plus a session-scoped commit/abort boundary.
//!
//! ```text
//!   ImportSession ──find_or_create_*──► StoreTransaction ──commit──► MemoryStore
//!                                         (staged Network)   abort ──► dropped
//! ```
//!
//! - **Transactional**: a session stages its whole network privately; commit
//!   publishes it atomically, abort (or drop) discards every create.
//! - **Integrity-checked**: commit refuses networks with dangling references.
//! - **Concurrent**: sessions never share staged state; the registry is behind
//!   a `parking_lot::RwLock`.

mod memory;
mod validate;

#[cfg(test)]
mod tests;

pub use memory::{MemoryStore, StoreTransaction};
pub use validate::validate_references;

use bionet_core::{
    BaseTerm, Citation, Edge, ElementId, EngineResult, FunctionTerm, Namespace, Network,
    NetworkId, NetworkSummary, Node, ReifiedEdgeTerm, Support,
};

/// The three structural references every edge must carry at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEnds {
    pub subject: ElementId,
    pub predicate: ElementId,
    pub object: ElementId,
}

/// Find-or-create persistence keyed by internal identifier.
///
/// Every `find_or_create_*` call is idempotent: an id already bound to an
/// entity of the requested kind returns that entity; an id bound to another
/// kind is an `EntityKindMismatch`. Structural arguments (a function term's
/// function, an edge's ends, a support's citation) are fixed at creation;
/// repeating the call with different ones is a `ConflictingIdentity`.
pub trait ElementStore {
    /// The network staged so far.
    fn network(&self) -> &Network;

    fn find_or_create_namespace(&mut self, id: ElementId, prefix: &str)
        -> EngineResult<&mut Namespace>;

    fn find_or_create_base_term(&mut self, id: ElementId) -> EngineResult<&mut BaseTerm>;

    fn find_or_create_function_term(
        &mut self,
        id: ElementId,
        function: ElementId,
    ) -> EngineResult<&mut FunctionTerm>;

    /// The wrapped edge may not exist yet (statements nest forward); it is
    /// checked at commit.
    fn find_or_create_reified_edge_term(
        &mut self,
        id: ElementId,
        edge: ElementId,
    ) -> EngineResult<&mut ReifiedEdgeTerm>;

    fn find_or_create_node(&mut self, id: ElementId) -> EngineResult<&mut Node>;

    fn find_or_create_citation(&mut self, id: ElementId) -> EngineResult<&mut Citation>;

    fn find_or_create_support(
        &mut self,
        id: ElementId,
        citation: ElementId,
    ) -> EngineResult<&mut Support>;

    fn find_or_create_edge(&mut self, id: ElementId, ends: EdgeEnds) -> EngineResult<&mut Edge>;

    fn summary_mut(&mut self) -> &mut NetworkSummary;

    /// Validate and publish the staged network.
    fn commit(self) -> EngineResult<NetworkId>
    where
        Self: Sized;

    /// Discard every create since the session began.
    fn abort(self)
    where
        Self: Sized;
}
