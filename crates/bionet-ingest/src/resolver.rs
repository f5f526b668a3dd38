//! Natural-key identity resolution.

use bionet_core::{ElementId, EngineError, EngineResult, NaturalKey};
use std::collections::HashMap;

/// Supplier of fresh internal ids.
pub trait IdSource {
    fn next_id(&mut self) -> ElementId;
}

/// Monotonic session-scoped ids starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> ElementId {
        let id = ElementId(self.next);
        self.next += 1;
        id
    }
}

/// Session-scoped natural key <-> internal id bindings.
///
/// Both directions are checked on every bind, so a key can never end up with
/// two ids and an id can never name two keys. The mapping dies with the
/// session; only the graph it helped build is durable.
#[derive(Debug, Default)]
pub struct IdentityResolver<S: IdSource = SequentialIds> {
    ids: S,
    by_key: HashMap<NaturalKey, ElementId>,
    by_id: HashMap<ElementId, NaturalKey>,
}

impl IdentityResolver<SequentialIds> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: IdSource> IdentityResolver<S> {
    pub fn with_source(ids: S) -> Self {
        Self {
            ids,
            by_key: HashMap::new(),
            by_id: HashMap::new(),
        }
    }

    /// Id bound to `key`, allocating and binding a fresh one on first use.
    pub fn resolve(&mut self, key: NaturalKey) -> EngineResult<ElementId> {
        if let Some(id) = self.by_key.get(&key) {
            return Ok(*id);
        }
        let id = self.ids.next_id();
        self.bind(key, id)?;
        Ok(id)
    }

    /// Bind `key` to an id computed elsewhere.
    pub fn bind(&mut self, key: NaturalKey, id: ElementId) -> EngineResult<()> {
        if let Some(existing) = self.by_key.get(&key) {
            if *existing == id {
                return Ok(());
            }
            return Err(EngineError::ConflictingIdentity {
                subject: format!("key {key}"),
                existing: existing.to_string(),
                attempted: id.to_string(),
            });
        }
        if let Some(other) = self.by_id.get(&id) {
            return Err(EngineError::ConflictingIdentity {
                subject: format!("id {id}"),
                existing: format!("key {other}"),
                attempted: format!("key {key}"),
            });
        }
        tracing::trace!(key = %key, id = %id, "bound natural key");
        self.by_id.insert(id, key.clone());
        self.by_key.insert(key, id);
        Ok(())
    }

    pub fn lookup(&self, key: &NaturalKey) -> Option<ElementId> {
        self.by_key.get(key).copied()
    }

    pub fn key_of(&self, id: ElementId) -> Option<&NaturalKey> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
