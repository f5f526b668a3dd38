use bionet_core::{EngineConfig, EngineError, Network, SessionReport, Term};
use bionet_ingest::SourceDocument;
use bionet_ingest_xbel::import_xbel;
use bionet_store::MemoryStore;
use std::sync::Arc;

const SMALL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bel:document xmlns:bel="http://belframework.org/schema/1.0/xbel">
  <bel:header>
    <bel:name>Small Corpus</bel:name>
    <bel:description>two statements</bel:description>
    <bel:version>1.2</bel:version>
    <bel:authorGroup><bel:author>A. Curator</bel:author></bel:authorGroup>
  </bel:header>
  <bel:namespaceGroup>
    <bel:namespace bel:prefix="HGNC" bel:resourceLocation="http://resource/hgnc.belns"/>
  </bel:namespaceGroup>
  <bel:annotationDefinitionGroup>
    <bel:internalAnnotationDefinition bel:id="Tissue">
      <bel:description>tissues</bel:description>
      <bel:listAnnotation><bel:listValue>liver</bel:listValue><bel:listValue>lung</bel:listValue></bel:listAnnotation>
    </bel:internalAnnotationDefinition>
    <bel:externalAnnotationDefinition bel:id="Species" bel:url="http://resource/species.belanno"/>
  </bel:annotationDefinitionGroup>
  <bel:statementGroup>
    <bel:annotationGroup>
      <bel:citation bel:type="PubMed"><bel:name>Paper</bel:name><bel:reference>123</bel:reference></bel:citation>
      <bel:evidence>AKT1 activates GSK3B</bel:evidence>
      <bel:annotation bel:refID="Species">9606</bel:annotation>
    </bel:annotationGroup>
    <bel:statement bel:relationship="increases">
      <bel:subject><bel:term bel:function="proteinAbundance"><bel:parameter bel:ns="HGNC">AKT1</bel:parameter></bel:term></bel:subject>
      <bel:object><bel:term bel:function="proteinAbundance"><bel:parameter bel:ns="HGNC">GSK3B</bel:parameter></bel:term></bel:object>
    </bel:statement>
    <bel:statement bel:relationship="DECREASES">
      <bel:subject><bel:term bel:function="proteinAbundance"><bel:parameter bel:ns="HGNC">GSK3B</bel:parameter></bel:term></bel:subject>
      <bel:object><bel:term bel:function="abundance"><bel:parameter>glycogen</bel:parameter></bel:term></bel:object>
    </bel:statement>
  </bel:statementGroup>
</bel:document>"#;

fn import(text: &str, store: &MemoryStore) -> SessionReport {
    let source = SourceDocument::new("small.xbel", text.as_bytes().to_vec());
    import_xbel(&source, store.begin("xbel"), &EngineConfig::default())
}

fn imported(text: &str) -> Arc<Network> {
    let store = MemoryStore::new();
    let report = import(text, &store);
    assert!(report.is_success(), "{:?}", report.reason());
    store.get(report.network_id.unwrap()).unwrap()
}

fn base_names(network: &Network) -> Vec<String> {
    network
        .terms
        .values()
        .filter_map(|t| match t {
            Term::Base(b) => Some(b.name.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn statements_become_edges_with_shared_nodes() {
    let network = imported(SMALL);
    assert_eq!(network.nodes.len(), 3, "GSK3B node is shared");
    assert_eq!(network.edges.len(), 2);
    assert_eq!(network.citations.len(), 1);
    assert_eq!(network.supports.len(), 1);

    let support = network.supports.values().next().unwrap();
    assert_eq!(support.text, "AKT1 activates GSK3B");
    assert_eq!(support.metadata["Species"], "9606");

    for edge in network.edges.values() {
        assert_eq!(edge.supports.len(), 1);
        assert_eq!(edge.citations.len(), 1);
    }
}

#[test]
fn predicates_normalize_to_xbel_names() {
    let network = imported(SMALL);
    let predicates: Vec<&str> = network
        .edges
        .values()
        .map(|e| network.base_term(e.predicate).unwrap().name.as_str())
        .collect();
    assert_eq!(predicates, vec!["increases", "decreases"]);
}

#[test]
fn header_and_annotation_definitions_are_kept() {
    let network = imported(SMALL);
    assert_eq!(network.summary.name.as_deref(), Some("Small Corpus"));
    assert_eq!(network.summary.description.as_deref(), Some("two statements"));
    assert!(network
        .summary
        .properties
        .iter()
        .any(|p| p.name == "author" && p.value.to_text() == "A. Curator"));

    let tissue = network.namespace_by_prefix("Tissue").unwrap();
    assert_eq!(tissue.description.as_deref(), Some("tissues"));
    let names = base_names(&network);
    assert!(names.contains(&"liver".to_string()));
    assert!(names.contains(&"lung".to_string()));
    assert_eq!(
        network.namespace_by_prefix("Species").unwrap().uri.as_deref(),
        Some("http://resource/species.belanno")
    );
}

#[test]
fn unqualified_parameters_land_in_default_namespace() {
    let network = imported(SMALL);
    let glycogen = network
        .terms
        .values()
        .find_map(|t| match t {
            Term::Base(b) if b.name == "glycogen" => Some(b),
            _ => None,
        })
        .unwrap();
    assert_eq!(network.term_prefix(glycogen), Some("BEL"));
}

#[test]
fn function_parameters_keep_argument_order() {
    let doc = r#"<document><statementGroup><statement>
        <subject><term function="complexAbundance">
          <parameter ns="HGNC">B</parameter><parameter ns="HGNC">A</parameter>
        </term></subject>
    </statement></statementGroup></document>"#;
    let network = imported(doc);
    let complex = network
        .terms
        .values()
        .find_map(|t| match t {
            Term::Function(f) => Some(f),
            _ => None,
        })
        .unwrap();
    let args: Vec<&str> = complex
        .parameters
        .values()
        .map(|id| network.base_term(*id).unwrap().name.as_str())
        .collect();
    assert_eq!(args, vec!["B", "A"]);
    assert!(network.edges.is_empty());
    assert_eq!(network.nodes.len(), 1);
}

#[test]
fn nested_statement_is_reified() {
    let doc = r#"<document><statementGroup><statement relationship="increases">
        <subject><term function="abundance"><parameter>x</parameter></term></subject>
        <object><statement relationship="decreases">
          <subject><term function="abundance"><parameter>y</parameter></term></subject>
          <object><term function="abundance"><parameter>z</parameter></term></object>
        </statement></object>
    </statement></statementGroup></document>"#;
    let network = imported(doc);
    assert_eq!(network.edges.len(), 2);
    let reified = network
        .terms
        .values()
        .find_map(|t| match t {
            Term::ReifiedEdge(r) => Some(r),
            _ => None,
        })
        .unwrap();
    let inner = &network.edges[&reified.edge];
    assert_eq!(network.base_term(inner.predicate).unwrap().name, "decreases");

    let outer = network.edges.values().find(|e| e.id != inner.id).unwrap();
    assert_eq!(network.nodes[&outer.object].represents, Some(reified.id));
}

#[test]
fn evidence_without_citation_becomes_edge_property() {
    let doc = r#"<document><statementGroup>
        <annotationGroup><evidence>loose text</evidence></annotationGroup>
        <statement relationship="association">
          <subject><term function="abundance"><parameter>x</parameter></term></subject>
          <object><term function="abundance"><parameter>y</parameter></term></object>
        </statement>
    </statementGroup></document>"#;
    let store = MemoryStore::new();
    let report = import(doc, &store);
    assert!(report.is_success());
    assert_eq!(report.audit.warnings.len(), 1);

    let network = store.get(report.network_id.unwrap()).unwrap();
    let edge = network.edges.values().next().unwrap();
    assert!(edge
        .properties
        .iter()
        .any(|p| p.name == "evidence" && p.value.to_text() == "loose text"));
    assert!(network.supports.is_empty());
}

#[test]
fn unknown_relationship_fails_without_partial_network() {
    let doc = r#"<document><statementGroup><statement relationship="frobnicates">
        <subject><term function="abundance"><parameter>x</parameter></term></subject>
        <object><term function="abundance"><parameter>y</parameter></term></object>
    </statement></statementGroup></document>"#;
    let store = MemoryStore::new();
    let report = import(doc, &store);
    assert!(matches!(
        report.cause(),
        Some(EngineError::MalformedSourceElement { .. })
    ));
    assert!(store.is_empty());
}

#[test]
fn import_is_audited_complete() {
    let store = MemoryStore::new();
    let report = import(SMALL, &store);
    assert!(report.audit.unprocessed.is_empty(), "{:?}", report.audit);
    assert!(report.audit.repeated.is_empty());
    assert_eq!(report.counts.edges, 2);
}

#[test]
fn quoted_parameter_text_does_not_alias_another_term() {
    // The second subject is one parameter whose value is `a","b`.
    let doc = r#"<bel:document xmlns:bel="http://belframework.org/schema/1.0/xbel">
  <bel:statementGroup>
    <bel:annotationGroup>
      <bel:citation bel:type="PubMed"><bel:reference>7</bel:reference></bel:citation>
    </bel:annotationGroup>
    <bel:statement bel:relationship="increases">
      <bel:subject><bel:term bel:function="complexAbundance"><bel:parameter>a</bel:parameter><bel:parameter>b</bel:parameter></bel:term></bel:subject>
      <bel:object><bel:term bel:function="abundance"><bel:parameter>c</bel:parameter></bel:term></bel:object>
    </bel:statement>
    <bel:statement bel:relationship="increases">
      <bel:subject><bel:term bel:function="complexAbundance"><bel:parameter>a&quot;,&quot;b</bel:parameter></bel:term></bel:subject>
      <bel:object><bel:term bel:function="abundance"><bel:parameter>c</bel:parameter></bel:term></bel:object>
    </bel:statement>
  </bel:statementGroup>
</bel:document>"#;
    let network = imported(doc);
    assert_eq!(network.edges.len(), 2);
    assert_eq!(network.nodes.len(), 3, "two complexes and one shared object");
    let subjects: std::collections::BTreeSet<_> =
        network.edges.values().map(|e| e.subject).collect();
    assert_eq!(subjects.len(), 2);
}
