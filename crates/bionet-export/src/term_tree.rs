//! Nested term and statement reconstruction.
//!
//! A network stores terms flat; XBEL nests them. [`TermTreeBuilder`] walks a
//! node's term recursively, and statement construction recurses back into it
//! when an edge's object is a reified edge. Both share one visitation stack:
//!
//! - an id already on the stack is a [`EngineError::CyclicTerm`]
//! - a stack deeper than the configured bound is a
//!   [`EngineError::TermDepthExceeded`]
//!
//! Every entity rendered is marked processed on the caller's auditor.

use bionet_core::{
    BelFunction, CompletenessAuditor, ElementId, EngineError, EngineResult, EntityKind, Network,
    Relationship, Term,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TermTree {
    /// Namespace is `None` for the implicit default namespace.
    Parameter { ns: Option<String>, value: String },
    Function { function: String, args: Vec<TermTree> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementObject {
    Term(TermTree),
    Statement(Box<StatementTree>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementTree {
    pub edge: ElementId,
    pub subject: TermTree,
    pub relationship: Relationship,
    pub object: StatementObject,
    /// Edge properties, rendered as statement annotations.
    pub annotations: Vec<(String, String)>,
}

pub struct TermTreeBuilder<'a> {
    network: &'a Network,
    default_namespace: &'a str,
    max_depth: usize,
}

impl<'a> TermTreeBuilder<'a> {
    pub fn new(network: &'a Network, default_namespace: &'a str, max_depth: usize) -> Self {
        Self {
            network,
            default_namespace,
            max_depth,
        }
    }

    fn enter(&self, id: ElementId, visiting: &mut Vec<ElementId>) -> EngineResult<()> {
        if visiting.contains(&id) {
            let mut path = visiting.clone();
            path.push(id);
            return Err(EngineError::CyclicTerm { id, path });
        }
        if visiting.len() >= self.max_depth {
            return Err(EngineError::TermDepthExceeded {
                id,
                limit: self.max_depth,
            });
        }
        visiting.push(id);
        Ok(())
    }

    fn term_entity(&self, id: ElementId) -> EngineResult<&'a Term> {
        self.network.terms.get(&id).ok_or(EngineError::DanglingReference {
            from: id,
            to: id,
            expected: EntityKind::BaseTerm,
        })
    }

    /// Name of a base term used as a function or predicate label.
    fn label(&self, id: ElementId, auditor: &mut CompletenessAuditor) -> EngineResult<&'a str> {
        match self.term_entity(id)? {
            Term::Base(base) => {
                auditor.mark_processed(EntityKind::BaseTerm, id);
                Ok(base.name.as_str())
            }
            other => Err(EngineError::EntityKindMismatch {
                id,
                expected: EntityKind::BaseTerm,
                found: other.kind(),
            }),
        }
    }

    /// Nested rendering of term `id`.
    pub fn term(&self, id: ElementId, auditor: &mut CompletenessAuditor) -> EngineResult<TermTree> {
        self.term_at(id, &mut Vec::new(), auditor)
    }

    fn term_at(
        &self,
        id: ElementId,
        visiting: &mut Vec<ElementId>,
        auditor: &mut CompletenessAuditor,
    ) -> EngineResult<TermTree> {
        self.enter(id, visiting)?;
        let tree = match self.term_entity(id)? {
            Term::Base(base) => {
                auditor.mark_processed(EntityKind::BaseTerm, id);
                let ns = self
                    .network
                    .term_prefix(base)
                    .filter(|prefix| *prefix != self.default_namespace)
                    .map(str::to_string);
                TermTree::Parameter {
                    ns,
                    value: base.name.clone(),
                }
            }
            Term::Function(function) => {
                let name = self.label(function.function, auditor)?;
                let Some(known) = BelFunction::from_name(name) else {
                    return Err(EngineError::UnknownFunction {
                        function: name.to_string(),
                        term: id,
                    });
                };
                // BTreeMap iteration: ascending slot key.
                let args = function
                    .parameters
                    .values()
                    .map(|child| self.term_at(*child, visiting, auditor))
                    .collect::<EngineResult<Vec<_>>>()?;
                auditor.mark_processed(EntityKind::FunctionTerm, id);
                TermTree::Function {
                    function: known.as_xbel().to_string(),
                    args,
                }
            }
            Term::ReifiedEdge(_) => {
                return Err(EngineError::EntityKindMismatch {
                    id,
                    expected: EntityKind::FunctionTerm,
                    found: EntityKind::ReifiedEdgeTerm,
                });
            }
        };
        visiting.pop();
        Ok(tree)
    }

    /// Term labelling `node`; a node with no term falls back to its name.
    fn node_term(
        &self,
        node: ElementId,
        visiting: &mut Vec<ElementId>,
        auditor: &mut CompletenessAuditor,
    ) -> EngineResult<TermTree> {
        let entity = self.network.nodes.get(&node).ok_or(EngineError::DanglingReference {
            from: node,
            to: node,
            expected: EntityKind::Node,
        })?;
        auditor.mark_processed(EntityKind::Node, node);
        match (entity.represents, &entity.name) {
            (Some(term), _) => self.term_at(term, visiting, auditor),
            (None, Some(name)) => Ok(TermTree::Parameter {
                ns: None,
                value: name.clone(),
            }),
            (None, None) => Err(EngineError::UnlabeledNode { node }),
        }
    }

    /// Statement for `edge`, nesting statements for reified-edge objects.
    pub fn statement(
        &self,
        edge: ElementId,
        auditor: &mut CompletenessAuditor,
    ) -> EngineResult<StatementTree> {
        self.statement_at(edge, &mut Vec::new(), auditor)
    }

    fn statement_at(
        &self,
        edge_id: ElementId,
        visiting: &mut Vec<ElementId>,
        auditor: &mut CompletenessAuditor,
    ) -> EngineResult<StatementTree> {
        self.enter(edge_id, visiting)?;
        let edge = self.network.edges.get(&edge_id).ok_or(EngineError::DanglingReference {
            from: edge_id,
            to: edge_id,
            expected: EntityKind::Edge,
        })?;

        let subject = self.node_term(edge.subject, visiting, auditor)?;

        let predicate = self.label(edge.predicate, auditor)?;
        let relationship =
            Relationship::from_name(predicate).ok_or_else(|| EngineError::UnknownRelationship {
                predicate: predicate.to_string(),
                edge: edge_id,
            })?;

        let object = match self.reified_object(edge.object) {
            Some((reified, inner)) => {
                auditor.mark_processed(EntityKind::Node, edge.object);
                self.enter(reified, visiting)?;
                let nested = self.statement_at(inner, visiting, auditor)?;
                visiting.pop();
                auditor.mark_processed(EntityKind::ReifiedEdgeTerm, reified);
                StatementObject::Statement(Box::new(nested))
            }
            None => StatementObject::Term(self.node_term(edge.object, visiting, auditor)?),
        };

        auditor.mark_processed(EntityKind::Edge, edge_id);
        visiting.pop();
        Ok(StatementTree {
            edge: edge_id,
            subject,
            relationship,
            object,
            annotations: edge
                .properties
                .iter()
                .map(|p| (p.name.clone(), p.value.to_text()))
                .collect(),
        })
    }

    /// `(reified term, wrapped edge)` when `node` stands for an edge.
    fn reified_object(&self, node: ElementId) -> Option<(ElementId, ElementId)> {
        let term = self.network.nodes.get(&node)?.represents?;
        match self.network.terms.get(&term)? {
            Term::ReifiedEdge(reified) => Some((reified.id, reified.edge)),
            _ => None,
        }
    }
}
