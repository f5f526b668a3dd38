use bionet_core::{EngineConfig, EngineError, PropertyValue, SessionReport};
use bionet_ingest::SourceDocument;
use bionet_ingest_xgmml::import_xgmml;
use bionet_store::MemoryStore;

const GRAPH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<graph label="Signalling" xmlns="http://www.cs.rpi.edu/XGMML">
  <att name="organism" value="Homo sapiens" type="string"/>
  <edge source="a" target="b" label="AKT1 (phosphorylates) GSK3B">
    <att name="weight" value="0.75" type="real"/>
  </edge>
  <node id="a" label="AKT1">
    <att name="degree" value="1" type="integer"/>
    <graphics type="ELLIPSE" h="40.0" w="40.0"/>
  </node>
  <node id="b" name="GSK3B"/>
</graph>"#;

fn import(text: &str, store: &MemoryStore) -> SessionReport {
    let source = SourceDocument::new("signalling.xgmml", text.as_bytes().to_vec());
    import_xgmml(&source, store.begin("xgmml"), &EngineConfig::default())
}

#[test]
fn graph_nodes_and_forward_edges_are_imported() {
    let store = MemoryStore::new();
    let report = import(GRAPH, &store);
    assert!(report.is_success(), "{:?}", report.reason());
    assert!(report.audit.is_complete(), "{:?}", report.audit);

    let network = store.get(report.network_id.unwrap()).unwrap();
    assert_eq!(network.summary.name.as_deref(), Some("Signalling"));
    assert!(network
        .summary
        .properties
        .iter()
        .any(|p| p.name == "organism" && p.value.to_text() == "Homo sapiens"));

    let names: Vec<Option<&str>> = network.nodes.values().map(|n| n.name.as_deref()).collect();
    assert_eq!(names, vec![Some("AKT1"), Some("GSK3B")]);

    let edge = network.edges.values().next().unwrap();
    assert_eq!(network.nodes[&edge.subject].name.as_deref(), Some("AKT1"));
    assert_eq!(network.base_term(edge.predicate).unwrap().name, "phosphorylates");
    assert_eq!(edge.properties[0].value, PropertyValue::Real(0.75));

    let akt1 = &network.nodes[&edge.subject];
    assert_eq!(akt1.properties[0].value, PropertyValue::Integer(1));
}

#[test]
fn edge_to_unknown_node_is_unresolved() {
    let store = MemoryStore::new();
    let report = import(
        r#"<graph><node id="a" label="A"/><edge source="a" target="zz"/></graph>"#,
        &store,
    );
    assert!(matches!(
        report.cause(),
        Some(EngineError::UnresolvedReference { token, .. }) if token == "zz"
    ));
    assert!(store.is_empty());
}

#[test]
fn wrong_root_fails() {
    let store = MemoryStore::new();
    let report = import("<document/>", &store);
    assert!(!report.is_success());
    assert!(report.reason().unwrap().contains("signalling.xgmml"));
}
