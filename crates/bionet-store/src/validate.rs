//! Reference integrity checks run before a network is published.

use bionet_core::{ElementId, EngineError, EngineResult, EntityKind, Network, Term};

fn expect_kind(
    network: &Network,
    from: ElementId,
    to: ElementId,
    expected: EntityKind,
) -> EngineResult<()> {
    if network.kind_of(to) == Some(expected) {
        Ok(())
    } else {
        Err(EngineError::DanglingReference { from, to, expected })
    }
}

fn expect_term(network: &Network, from: ElementId, to: ElementId) -> EngineResult<()> {
    match network.terms.get(&to) {
        Some(_) => Ok(()),
        None => Err(EngineError::DanglingReference {
            from,
            to,
            expected: EntityKind::BaseTerm,
        }),
    }
}

/// Check that every cross-entity reference in `network` lands on an entity of
/// the right kind in the same network.
pub fn validate_references(network: &Network) -> EngineResult<()> {
    for term in network.terms.values() {
        match term {
            Term::Base(base) => {
                if let Some(ns) = base.namespace {
                    expect_kind(network, base.id, ns, EntityKind::Namespace)?;
                }
            }
            Term::Function(function) => {
                expect_kind(network, function.id, function.function, EntityKind::BaseTerm)?;
                for child in function.parameters.values() {
                    expect_term(network, function.id, *child)?;
                }
            }
            Term::ReifiedEdge(reified) => {
                expect_kind(network, reified.id, reified.edge, EntityKind::Edge)?;
            }
        }
    }

    for node in network.nodes.values() {
        if let Some(term) = node.represents {
            expect_term(network, node.id, term)?;
        }
        for term in node.aliases.iter().chain(node.related_terms.iter()) {
            expect_term(network, node.id, *term)?;
        }
        for citation in &node.citations {
            expect_kind(network, node.id, *citation, EntityKind::Citation)?;
        }
    }

    for edge in network.edges.values() {
        expect_kind(network, edge.id, edge.subject, EntityKind::Node)?;
        expect_kind(network, edge.id, edge.object, EntityKind::Node)?;
        expect_kind(network, edge.id, edge.predicate, EntityKind::BaseTerm)?;
        for support in &edge.supports {
            expect_kind(network, edge.id, *support, EntityKind::Support)?;
        }
        for citation in &edge.citations {
            expect_kind(network, edge.id, *citation, EntityKind::Citation)?;
        }
    }

    for support in network.supports.values() {
        expect_kind(network, support.id, support.citation, EntityKind::Citation)?;
    }

    Ok(())
}
