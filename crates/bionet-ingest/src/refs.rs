use bionet_core::{ElementId, EngineError, EngineResult, SourceLocation};
use std::collections::HashMap;
use std::fmt;

/// Source-local reference token (RDF id, XGMML node id, SIF name, ...) ->
/// binding recorded during pass 1.
///
/// `B` defaults to a bare id; importers that need to remember what a token
/// denotes (an alias term vs. a related term, say) bind a richer `Copy` type.
#[derive(Debug, Clone)]
pub struct LocalRefMap<B = ElementId> {
    map: HashMap<String, B>,
}

impl<B> Default for LocalRefMap<B> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<B: Copy + PartialEq + fmt::Debug> LocalRefMap<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `token -> binding`. Re-binding to the same value is a no-op; to a
    /// different one is a `ConflictingIdentity`.
    pub fn bind(&mut self, token: &str, binding: B) -> EngineResult<()> {
        match self.map.get(token) {
            Some(existing) if *existing == binding => Ok(()),
            Some(existing) => Err(EngineError::ConflictingIdentity {
                subject: format!("local reference `{token}`"),
                existing: format!("{existing:?}"),
                attempted: format!("{binding:?}"),
            }),
            None => {
                self.map.insert(token.to_string(), binding);
                Ok(())
            }
        }
    }

    pub fn get(&self, token: &str) -> Option<B> {
        self.map.get(token).copied()
    }

    /// Pass-2 lookup: a miss is an `UnresolvedReference`.
    pub fn resolve(
        &self,
        token: &str,
        referenced_from: impl fmt::Display,
        location: Option<SourceLocation>,
    ) -> EngineResult<B> {
        self.get(token)
            .ok_or_else(|| EngineError::unresolved(token, referenced_from.to_string(), location))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebinding_same_target_is_allowed() {
        let mut refs = LocalRefMap::new();
        refs.bind("P1", ElementId(3)).unwrap();
        refs.bind("P1", ElementId(3)).unwrap();
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn rebinding_other_target_conflicts() {
        let mut refs = LocalRefMap::new();
        refs.bind("P1", ElementId(3)).unwrap();
        assert!(matches!(
            refs.bind("P1", ElementId(4)),
            Err(EngineError::ConflictingIdentity { .. })
        ));
    }

    #[test]
    fn miss_names_token_and_referrer() {
        let refs: LocalRefMap = LocalRefMap::new();
        let err = refs
            .resolve("X", "edge e1", Some(SourceLocation::Element(2)))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unresolved reference `X` from edge e1 (at element 2)"
        );
    }
}
