//! Internal identifiers, entity kinds and natural keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a committed network in a store.
pub type NetworkId = Uuid;

/// Internal identifier of a graph element.
///
/// Assigned exactly once per session by the identity resolver and never
/// reassigned. Ids are monotonically increasing, so ordering by id is creation
/// order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ElementId(pub u64);

impl ElementId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Every kind of entity a network can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Namespace,
    BaseTerm,
    FunctionTerm,
    ReifiedEdgeTerm,
    Node,
    Edge,
    Citation,
    Support,
}

impl EntityKind {
    /// Kinds tracked by the completeness auditor (namespaces are header data).
    pub const AUDITED: [EntityKind; 7] = [
        EntityKind::Node,
        EntityKind::Edge,
        EntityKind::BaseTerm,
        EntityKind::FunctionTerm,
        EntityKind::ReifiedEdgeTerm,
        EntityKind::Citation,
        EntityKind::Support,
    ];

    /// Whether one entity of this kind may legitimately be emitted many times
    /// in a single traversal (terms and nodes are shared between statements).
    pub fn is_shared(self) -> bool {
        matches!(
            self,
            EntityKind::BaseTerm
                | EntityKind::FunctionTerm
                | EntityKind::ReifiedEdgeTerm
                | EntityKind::Node
                | EntityKind::Namespace
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Namespace => "namespace",
            EntityKind::BaseTerm => "base term",
            EntityKind::FunctionTerm => "function term",
            EntityKind::ReifiedEdgeTerm => "reified edge term",
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
            EntityKind::Citation => "citation",
            EntityKind::Support => "support",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Natural keys
// ============================================================================

/// Kind tag leading every natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyTag {
    Namespace,
    Base,
    Function,
    Reified,
    Node,
    Edge,
    Citation,
    Support,
    Predicate,
}

impl KeyTag {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyTag::Namespace => "NAMESPACE",
            KeyTag::Base => "BASE",
            KeyTag::Function => "FUNCTION",
            KeyTag::Reified => "REIFIED",
            KeyTag::Node => "NODE",
            KeyTag::Edge => "EDGE",
            KeyTag::Citation => "CITATION",
            KeyTag::Support => "SUPPORT",
            KeyTag::Predicate => "PREDICATE",
        }
    }
}

/// Composite key used to deduplicate entities before an internal id exists.
///
/// Parts are kept structurally, and [`NaturalKey::encoded`] length-prefixes
/// each one, so `("a:b", "c")` and `("a", "b:c")` never collide. An absent part
/// is encoded as `-`, distinct from an empty string (`0:`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NaturalKey {
    tag: KeyTag,
    parts: Vec<Option<String>>,
}

impl NaturalKey {
    pub fn new(tag: KeyTag) -> Self {
        Self {
            tag,
            parts: Vec::new(),
        }
    }

    pub fn part(mut self, part: impl Into<String>) -> Self {
        self.parts.push(Some(part.into()));
        self
    }

    pub fn opt_part(mut self, part: Option<impl Into<String>>) -> Self {
        self.parts.push(part.map(Into::into));
        self
    }

    pub fn id_part(self, id: ElementId) -> Self {
        self.part(id.0.to_string())
    }

    pub fn tag(&self) -> KeyTag {
        self.tag
    }

    /// Unambiguous single-string form: `TAG|len:part|-|...`.
    pub fn encoded(&self) -> String {
        let mut out = String::from(self.tag.as_str());
        for part in &self.parts {
            out.push('|');
            match part {
                Some(p) => {
                    out.push_str(&p.len().to_string());
                    out.push(':');
                    out.push_str(p);
                }
                None => out.push('-'),
            }
        }
        out
    }

    // Convenience constructors for the keys every importer shares.

    pub fn node(name: &str) -> Self {
        Self::new(KeyTag::Node).part(name)
    }

    pub fn node_for_term(term: ElementId) -> Self {
        Self::new(KeyTag::Node).part("term").id_part(term)
    }

    pub fn base_term(namespace_prefix: Option<&str>, name: &str) -> Self {
        Self::new(KeyTag::Base).opt_part(namespace_prefix).part(name)
    }

    pub fn namespace(prefix: &str) -> Self {
        Self::new(KeyTag::Namespace).part(prefix)
    }

    pub fn citation(title: Option<&str>, reference: Option<&str>) -> Self {
        Self::new(KeyTag::Citation).opt_part(title).opt_part(reference)
    }

    pub fn support(citation: ElementId, evidence: &str) -> Self {
        Self::new(KeyTag::Support).id_part(citation).part(evidence)
    }

    pub fn predicate(name: &str) -> Self {
        Self::new(KeyTag::Predicate).part(name)
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag.as_str())?;
        for part in &self.parts {
            f.write_str(":")?;
            f.write_str(part.as_deref().unwrap_or("-"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_unambiguous_across_part_boundaries() {
        let a = NaturalKey::new(KeyTag::Base).part("a:b").part("c");
        let b = NaturalKey::new(KeyTag::Base).part("a").part("b:c");
        assert_ne!(a, b);
        assert_ne!(a.encoded(), b.encoded());
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn absent_part_differs_from_empty_part() {
        let absent = NaturalKey::base_term(None, "AKT1");
        let empty = NaturalKey::base_term(Some(""), "AKT1");
        assert_ne!(absent.encoded(), empty.encoded());
        assert_eq!(absent.encoded(), "BASE|-|4:AKT1");
    }

    #[test]
    fn tags_separate_key_spaces() {
        assert_ne!(NaturalKey::node("x"), NaturalKey::predicate("x"));
    }
}
