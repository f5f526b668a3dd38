use bionet_core::{EngineConfig, EngineError, Network, SessionReport};
use bionet_ingest::SourceDocument;
use bionet_ingest_biopax::{import_biopax, TYPE_PROPERTY};
use bionet_store::MemoryStore;
use std::sync::Arc;

const PATHWAY: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:owl="http://www.w3.org/2002/07/owl#"
         xmlns:bp="http://www.biopax.org/release/biopax-level3.owl#"
         xml:base="http://example.org/model#">
  <owl:Ontology rdf:about=""/>
  <bp:BiochemicalReaction rdf:ID="Reaction1">
    <bp:displayName>phosphorylation</bp:displayName>
    <bp:left rdf:resource="#Protein1"/>
    <bp:xref rdf:resource="#Pub1"/>
  </bp:BiochemicalReaction>
  <bp:Protein rdf:ID="Protein1">
    <bp:displayName>AKT1</bp:displayName>
    <bp:xref rdf:resource="#UX1"/>
    <bp:xref rdf:resource="#RX1"/>
  </bp:Protein>
  <bp:UnificationXref rdf:ID="UX1">
    <bp:db>UniProt</bp:db>
    <bp:id>P31749</bp:id>
  </bp:UnificationXref>
  <bp:RelationshipXref rdf:ID="RX1">
    <bp:id>GO:0004674</bp:id>
  </bp:RelationshipXref>
  <bp:PublicationXref rdf:ID="Pub1">
    <bp:db>PubMed</bp:db>
    <bp:id>1234</bp:id>
    <bp:title>Kinase paper</bp:title>
    <bp:author>Smith J</bp:author>
    <bp:year>2001</bp:year>
  </bp:PublicationXref>
</rdf:RDF>"##;

fn import(text: &str, store: &MemoryStore) -> SessionReport {
    let source = SourceDocument::new("pathway.owl", text.as_bytes().to_vec());
    import_biopax(&source, store.begin("biopax"), &EngineConfig::default())
}

fn imported(text: &str) -> Arc<Network> {
    let store = MemoryStore::new();
    let report = import(text, &store);
    assert!(report.is_success(), "{:?}", report.reason());
    assert!(report.audit.unprocessed.is_empty(), "{:?}", report.audit);
    store.get(report.network_id.unwrap()).unwrap()
}

fn node_named<'a>(network: &'a Network, name: &str) -> &'a bionet_core::Node {
    network
        .nodes
        .values()
        .find(|n| n.name.as_deref() == Some(name))
        .unwrap()
}

#[test]
fn entities_become_nodes_and_references_become_edges() {
    let network = imported(PATHWAY);
    assert_eq!(network.nodes.len(), 2);
    assert_eq!(network.edges.len(), 1);

    let reaction = node_named(&network, "Reaction1");
    let protein = node_named(&network, "Protein1");
    let edge = network.edges.values().next().unwrap();
    assert_eq!(edge.subject, reaction.id);
    assert_eq!(edge.object, protein.id);

    let predicate = network.base_term(edge.predicate).unwrap();
    assert_eq!(predicate.name, "left");
    assert_eq!(network.term_prefix(predicate), Some("bp"));
}

#[test]
fn xrefs_attach_to_nodes() {
    let network = imported(PATHWAY);
    let protein = node_named(&network, "Protein1");

    let alias = network.base_term(*protein.aliases.iter().next().unwrap()).unwrap();
    assert_eq!(alias.name, "P31749");
    assert_eq!(network.term_prefix(alias), Some("UniProt"));

    let related = network
        .base_term(*protein.related_terms.iter().next().unwrap())
        .unwrap();
    assert_eq!(related.name, "GO:0004674");
    assert_eq!(network.term_prefix(related), None);

    let reaction = node_named(&network, "Reaction1");
    let citation = &network.citations[reaction.citations.iter().next().unwrap()];
    assert_eq!(citation.identifier.as_deref(), Some("1234"));
    assert_eq!(citation.id_type.as_deref(), Some("PubMed"));
    assert_eq!(citation.title.as_deref(), Some("Kinase paper"));
    assert_eq!(citation.contributors, vec!["Smith J".to_string()]);
}

#[test]
fn literals_and_class_become_node_properties() {
    let network = imported(PATHWAY);
    let protein = node_named(&network, "Protein1");
    let props: Vec<(&str, String)> = protein
        .properties
        .iter()
        .map(|p| (p.name.as_str(), p.value.to_text()))
        .collect();
    assert!(props.contains(&("displayName", "AKT1".to_string())));
    assert!(props.contains(&(TYPE_PROPERTY, "Protein".to_string())));
}

#[test]
fn document_prefixes_become_namespaces() {
    let network = imported(PATHWAY);
    let bp = network.namespace_by_prefix("bp").unwrap();
    assert_eq!(
        bp.uri.as_deref(),
        Some("http://www.biopax.org/release/biopax-level3.owl#")
    );
    assert!(network.namespace_by_prefix("rdf").is_some());
}

#[test]
fn reference_to_missing_resource_fails_the_session() {
    let doc = r##"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
             xmlns:bp="http://www.biopax.org/release/biopax-level3.owl#"
             xml:base="http://example.org/m#">
      <bp:Complex rdf:ID="C1"><bp:component rdf:resource="#Missing"/></bp:Complex>
    </rdf:RDF>"##;
    let store = MemoryStore::new();
    let report = import(doc, &store);
    assert!(matches!(
        report.cause(),
        Some(EngineError::UnresolvedReference { token, .. }) if token.ends_with("#Missing")
    ));
    assert!(store.is_empty());
}
