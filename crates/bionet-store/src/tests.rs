//! Transaction and integrity tests for the in-memory store

use super::*;
use bionet_core::{EngineError, EntityKind};
use tempfile::tempdir;

fn id(n: u64) -> ElementId {
    ElementId(n)
}

/// Stage two nodes joined by one edge: 1 -[3]-> 2.
fn staged_pair(store: &MemoryStore) -> StoreTransaction {
    let mut tx = store.begin("pair");
    tx.find_or_create_node(id(1)).unwrap().name = Some("A".to_string());
    tx.find_or_create_node(id(2)).unwrap().name = Some("B".to_string());
    tx.find_or_create_base_term(id(3)).unwrap().name = "increases".to_string();
    tx.find_or_create_edge(
        id(4),
        EdgeEnds {
            subject: id(1),
            predicate: id(3),
            object: id(2),
        },
    )
    .unwrap();
    tx
}

#[test]
fn find_or_create_is_idempotent() {
    let store = MemoryStore::new();
    let mut tx = store.begin("idempotent");
    tx.find_or_create_node(id(1)).unwrap().name = Some("A".to_string());
    let again = tx.find_or_create_node(id(1)).unwrap();
    assert_eq!(again.name.as_deref(), Some("A"));
    assert_eq!(tx.network().nodes.len(), 1);
    tx.abort();
}

#[test]
fn id_bound_to_other_kind_is_rejected() {
    let store = MemoryStore::new();
    let mut tx = store.begin("kinds");
    tx.find_or_create_node(id(1)).unwrap();
    let err = tx.find_or_create_citation(id(1)).unwrap_err();
    assert!(matches!(
        err,
        EngineError::EntityKindMismatch {
            expected: EntityKind::Citation,
            found: EntityKind::Node,
            ..
        }
    ));
    tx.abort();
}

#[test]
fn edge_requires_resolved_ends() {
    let store = MemoryStore::new();
    let mut tx = store.begin("ends");
    tx.find_or_create_node(id(1)).unwrap();
    tx.find_or_create_base_term(id(3)).unwrap();
    let err = tx
        .find_or_create_edge(
            id(4),
            EdgeEnds {
                subject: id(1),
                predicate: id(3),
                object: id(99),
            },
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::DanglingReference { to, .. } if to == id(99)));
    assert!(tx.network().edges.is_empty());
    tx.abort();
}

#[test]
fn edge_ends_are_fixed_at_creation() {
    let store = MemoryStore::new();
    let mut tx = staged_pair(&store);
    let err = tx
        .find_or_create_edge(
            id(4),
            EdgeEnds {
                subject: id(2),
                predicate: id(3),
                object: id(1),
            },
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::ConflictingIdentity { .. }));
    tx.abort();
}

#[test]
fn support_must_reference_a_citation_in_the_session() {
    let store = MemoryStore::new();
    let mut tx = store.begin("support");
    assert!(tx.find_or_create_support(id(2), id(1)).is_err());
    tx.find_or_create_citation(id(1)).unwrap();
    tx.find_or_create_support(id(2), id(1)).unwrap().text = "evidence".to_string();
    assert_eq!(tx.network().supports[&id(2)].citation, id(1));
    tx.abort();
}

#[test]
fn namespace_prefix_is_unique() {
    let store = MemoryStore::new();
    let mut tx = store.begin("ns");
    tx.find_or_create_namespace(id(1), "HGNC").unwrap();
    let err = tx.find_or_create_namespace(id(2), "HGNC").unwrap_err();
    assert!(matches!(err, EngineError::ConflictingIdentity { .. }));
    tx.abort();
}

#[test]
fn commit_publishes_and_abort_discards() {
    let store = MemoryStore::new();

    staged_pair(&store).abort();
    assert!(store.is_empty());

    let network_id = staged_pair(&store).commit().unwrap();
    let network = store.get(network_id).unwrap();
    assert_eq!(network.summary.counts.nodes, 2);
    assert_eq!(network.summary.counts.edges, 1);
    assert_eq!(network.summary.counts.base_terms, 1);
}

#[test]
fn dropped_transaction_leaves_no_network() {
    let store = MemoryStore::new();
    {
        let _tx = staged_pair(&store);
    }
    assert!(store.is_empty());
}

#[test]
fn commit_rejects_dangling_node_label() {
    let store = MemoryStore::new();
    let mut tx = store.begin("dangling");
    tx.find_or_create_node(id(1)).unwrap().represents = Some(id(42));
    let err = tx.commit().unwrap_err();
    assert!(matches!(err, EngineError::DanglingReference { from, to, .. } if from == id(1) && to == id(42)));
    assert!(store.is_empty());
}

#[test]
fn reified_edge_may_precede_its_edge() {
    let store = MemoryStore::new();
    let mut tx = store.begin("reified");
    tx.find_or_create_reified_edge_term(id(10), id(4)).unwrap();
    assert!(tx.find_or_create_reified_edge_term(id(10), id(5)).is_err());

    tx.find_or_create_node(id(1)).unwrap();
    tx.find_or_create_node(id(2)).unwrap();
    tx.find_or_create_base_term(id(3)).unwrap();
    tx.find_or_create_edge(
        id(4),
        EdgeEnds {
            subject: id(1),
            predicate: id(3),
            object: id(2),
        },
    )
    .unwrap();
    tx.commit().unwrap();
}

#[test]
fn function_term_keeps_its_function_and_kind() {
    let store = MemoryStore::new();
    let mut tx = store.begin("function");
    tx.find_or_create_base_term(id(1)).unwrap().name = "p".to_string();
    tx.find_or_create_base_term(id(2)).unwrap().name = "r".to_string();

    tx.find_or_create_function_term(id(5), id(1))
        .unwrap()
        .parameters
        .insert("1".to_string(), id(2));
    let again = tx.find_or_create_function_term(id(5), id(1)).unwrap();
    assert_eq!(again.parameters.len(), 1);

    let err = tx.find_or_create_function_term(id(5), id(2)).unwrap_err();
    assert!(matches!(err, EngineError::ConflictingIdentity { .. }));
    let err = tx.find_or_create_reified_edge_term(id(5), id(9)).unwrap_err();
    assert!(matches!(
        err,
        EngineError::EntityKindMismatch {
            expected: EntityKind::ReifiedEdgeTerm,
            found: EntityKind::FunctionTerm,
            ..
        }
    ));
    tx.abort();
}

#[test]
fn concurrent_sessions_do_not_share_staged_state() {
    let store = MemoryStore::new();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            let store = store.clone();
            scope.spawn(move || staged_pair(&store).commit().unwrap());
        }
    });
    assert_eq!(store.len(), 4);
    for network_id in store.ids() {
        assert_eq!(store.get(network_id).unwrap().edges.len(), 1);
    }
}

#[test]
fn snapshot_round_trip_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pair.bnet");
    let store = MemoryStore::new();
    let network_id = staged_pair(&store).commit().unwrap();
    store.save_snapshot(network_id, &path).unwrap();

    let other = MemoryStore::new();
    let loaded_id = other.load_snapshot(&path).unwrap();
    assert_eq!(
        *other.get(loaded_id).unwrap(),
        *store.get(network_id).unwrap()
    );
}
