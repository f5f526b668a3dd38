//! Citation-scoped segmentation of a network for export.

use bionet_core::{ElementId, Network, Term};
use std::collections::BTreeSet;

/// One citation and the edges and supports exported under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub citation: ElementId,
    /// Top-level edges citing `citation`, in store order.
    pub edges: Vec<ElementId>,
    /// Supports owned by `citation`, in store order.
    pub supports: Vec<ElementId>,
}

impl Segment {
    /// Edges of this segment backed by `support`.
    pub fn edges_for_support<'a>(
        &'a self,
        network: &'a Network,
        support: ElementId,
    ) -> impl Iterator<Item = ElementId> + 'a {
        self.edges
            .iter()
            .copied()
            .filter(move |e| network.edges[e].supports.contains(&support))
    }

    /// Edges of this segment with no supports at all.
    pub fn unsupported_edges<'a>(
        &'a self,
        network: &'a Network,
    ) -> impl Iterator<Item = ElementId> + 'a {
        self.edges
            .iter()
            .copied()
            .filter(move |e| network.edges[e].supports.is_empty())
    }
}

/// Segments plus everything no segment can emit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub segments: Vec<Segment>,
    /// Top-level edges citing nothing.
    pub uncited_edges: Vec<ElementId>,
    /// `(segment citation, edge)`: the edge cites the segment's citation but
    /// every one of its supports belongs to another citation.
    pub stray_edges: Vec<(ElementId, ElementId)>,
}

/// Edges wrapped by a reified edge term; they are emitted nested only.
pub fn reified_edges(network: &Network) -> BTreeSet<ElementId> {
    network
        .terms
        .values()
        .filter_map(|t| match t {
            Term::ReifiedEdge(r) => Some(r.edge),
            _ => None,
        })
        .collect()
}

pub struct NetworkPartitioner<'a> {
    network: &'a Network,
}

impl<'a> NetworkPartitioner<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self { network }
    }

    /// Walk citations in store order; a citation with no top-level edges
    /// yields no segment.
    pub fn partition(&self) -> Partition {
        let network = self.network;
        let nested = reified_edges(network);
        let top_level: Vec<ElementId> = network
            .edges
            .keys()
            .copied()
            .filter(|id| !nested.contains(id))
            .collect();

        let mut partition = Partition::default();
        for citation in network.citations.keys().copied() {
            let edges: Vec<ElementId> = top_level
                .iter()
                .copied()
                .filter(|e| network.edges[e].citations.contains(&citation))
                .collect();
            if edges.is_empty() {
                continue;
            }
            let supports: Vec<ElementId> = network
                .supports
                .values()
                .filter(|s| s.citation == citation)
                .map(|s| s.id)
                .collect();

            for edge in &edges {
                let edge_supports = &network.edges[edge].supports;
                if !edge_supports.is_empty() && !supports.iter().any(|s| edge_supports.contains(s)) {
                    partition.stray_edges.push((citation, *edge));
                }
            }
            partition.segments.push(Segment {
                citation,
                edges,
                supports,
            });
        }
        partition.uncited_edges = top_level
            .into_iter()
            .filter(|e| network.edges[e].citations.is_empty())
            .collect();
        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bionet_core::{Citation, Edge, Support};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    /// Citations 1..=3; edges from 10 cite a subset of them.
    fn network(edge_citations: &[Vec<u64>]) -> Network {
        let mut net = Network::new();
        for c in 1..=3u64 {
            net.citations.insert(
                ElementId(c),
                Citation {
                    id: ElementId(c),
                    ..Citation::default()
                },
            );
        }
        for (offset, cites) in edge_citations.iter().enumerate() {
            let id = ElementId(10 + offset as u64);
            net.edges.insert(
                id,
                Edge {
                    id,
                    subject: ElementId(100),
                    predicate: ElementId(101),
                    object: ElementId(102),
                    supports: Default::default(),
                    citations: cites.iter().copied().map(ElementId).collect(),
                    properties: Vec::new(),
                },
            );
        }
        net
    }

    #[test]
    fn citation_without_edges_yields_no_segment() {
        let net = network(&[vec![1], vec![1, 3]]);
        let partition = NetworkPartitioner::new(&net).partition();
        let cited: Vec<ElementId> = partition.segments.iter().map(|s| s.citation).collect();
        assert_eq!(cited, vec![ElementId(1), ElementId(3)]);
        assert_eq!(partition.segments[0].edges, vec![ElementId(10), ElementId(11)]);
    }

    #[test]
    fn supports_follow_their_citation() {
        let mut net = network(&[vec![1], vec![2]]);
        for (id, citation) in [(50, 1), (51, 2), (52, 1)] {
            net.supports.insert(
                ElementId(id),
                Support {
                    id: ElementId(id),
                    text: format!("evidence {id}"),
                    citation: ElementId(citation),
                    metadata: BTreeMap::new(),
                },
            );
        }
        net.edges.get_mut(&ElementId(10)).unwrap().supports.insert(ElementId(51));

        let partition = NetworkPartitioner::new(&net).partition();
        assert_eq!(partition.segments[0].supports, vec![ElementId(50), ElementId(52)]);
        assert_eq!(partition.stray_edges, vec![(ElementId(1), ElementId(10))]);
    }

    #[test]
    fn reified_edges_are_not_top_level() {
        let mut net = network(&[vec![1], vec![1]]);
        net.terms.insert(
            ElementId(60),
            Term::ReifiedEdge(bionet_core::ReifiedEdgeTerm {
                id: ElementId(60),
                edge: ElementId(11),
            }),
        );
        let partition = NetworkPartitioner::new(&net).partition();
        assert_eq!(partition.segments[0].edges, vec![ElementId(10)]);
    }

    proptest! {
        #[test]
        fn every_top_level_edge_is_segmented_or_uncited(
            cites in prop::collection::vec(prop::collection::vec(1u64..=3, 0..3), 0..12)
        ) {
            let net = network(&cites);
            let partition = NetworkPartitioner::new(&net).partition();

            let mut covered: BTreeSet<ElementId> = partition
                .segments
                .iter()
                .flat_map(|s| s.edges.iter().copied())
                .collect();
            covered.extend(partition.uncited_edges.iter().copied());
            let all: BTreeSet<ElementId> = net.edges.keys().copied().collect();
            prop_assert_eq!(covered, all);

            for segment in &partition.segments {
                prop_assert!(!segment.edges.is_empty());
                for edge in &segment.edges {
                    prop_assert!(net.edges[edge].citations.contains(&segment.citation));
                }
            }
        }
    }
}
