use crate::rdf::{local_name, read_triples, RdfNode, RdfObject, RDF_TYPE};
use bionet_core::{EngineError, EngineResult, SourceLocation};
use std::collections::HashMap;

const BIOPAX_MARKER: &str = "biopax-level";

/// Value of one entity property: a literal, or a reference to another
/// resource of the same document.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyRef {
    Literal(String),
    Resource(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XrefFields {
    pub rdf_id: String,
    pub db: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublicationFields {
    pub rdf_id: String,
    pub db: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub urls: Vec<String>,
    pub authors: Vec<String>,
    pub year: Option<String>,
    pub source: Option<String>,
}

/// The closed BioPAX element set the importer handles.
#[derive(Debug, Clone, PartialEq)]
pub enum BiopaxElement {
    PublicationXref(PublicationFields),
    UnificationXref(XrefFields),
    RelationshipXref(XrefFields),
    Entity {
        rdf_id: String,
        /// BioPAX class local name (`Protein`, `BiochemicalReaction`, ...).
        class: String,
        /// `(property local name, value)` in document order.
        properties: Vec<(String, PropertyRef)>,
    },
}

impl BiopaxElement {
    pub fn rdf_id(&self) -> &str {
        match self {
            BiopaxElement::PublicationXref(p) => &p.rdf_id,
            BiopaxElement::UnificationXref(x) | BiopaxElement::RelationshipXref(x) => &x.rdf_id,
            BiopaxElement::Entity { rdf_id, .. } => rdf_id,
        }
    }
}

/// Triples of one subject, in first-seen order.
#[derive(Debug, Default)]
struct Resource {
    class: Option<String>,
    properties: Vec<(String, PropertyRef)>,
}

impl Resource {
    fn literal(&self, name: &str) -> Option<String> {
        self.literals(name).next()
    }

    fn literals<'a>(&'a self, name: &'a str) -> impl Iterator<Item = String> + 'a {
        self.properties.iter().filter_map(move |(k, v)| match v {
            PropertyRef::Literal(text) if k == name => Some(text.clone()),
            _ => None,
        })
    }
}

fn classify(rdf_id: String, class: String, resource: Resource, index: usize) -> EngineResult<BiopaxElement> {
    let xref = |resource: &Resource| XrefFields {
        rdf_id: rdf_id.clone(),
        db: resource.literal("db"),
        id: resource.literal("id"),
    };
    let element = match class.as_str() {
        "UnificationXref" | "RelationshipXref" => {
            let fields = xref(&resource);
            if fields.id.is_none() {
                return Err(EngineError::malformed(
                    class.as_str(),
                    format!("no id for {class} {rdf_id}"),
                    Some(SourceLocation::Element(index)),
                ));
            }
            if class == "UnificationXref" {
                BiopaxElement::UnificationXref(fields)
            } else {
                BiopaxElement::RelationshipXref(fields)
            }
        }
        "PublicationXref" => BiopaxElement::PublicationXref(PublicationFields {
            rdf_id: rdf_id.clone(),
            db: resource.literal("db"),
            id: resource.literal("id"),
            title: resource.literal("title"),
            urls: resource.literals("url").collect(),
            authors: resource.literals("author").collect(),
            year: resource.literal("year"),
            source: resource.literal("source"),
        }),
        _ => BiopaxElement::Entity {
            rdf_id,
            class,
            properties: resource.properties,
        },
    };
    Ok(element)
}

/// Group a BioPAX RDF/XML document's triples by subject.
///
/// Subjects without a BioPAX `rdf:type` (the `owl:Ontology` header, say) are
/// skipped.
pub fn read_document(bytes: &[u8]) -> EngineResult<Vec<BiopaxElement>> {
    let triples = read_triples(bytes)?;

    let mut order: Vec<RdfNode> = Vec::new();
    let mut resources: HashMap<RdfNode, Resource> = HashMap::new();
    for triple in triples {
        let resource = resources.entry(triple.subject.clone()).or_insert_with(|| {
            order.push(triple.subject.clone());
            Resource::default()
        });
        match (triple.predicate.as_str(), triple.object) {
            (RDF_TYPE, RdfObject::Node(RdfNode::Iri(class))) => {
                if class.contains(BIOPAX_MARKER) {
                    resource.class = Some(local_name(&class).to_string());
                }
            }
            (_, RdfObject::Literal(text)) => resource
                .properties
                .push((local_name(&triple.predicate).to_string(), PropertyRef::Literal(text))),
            (_, RdfObject::Node(node)) => resource
                .properties
                .push((local_name(&triple.predicate).to_string(), PropertyRef::Resource(node.token()))),
        }
    }

    let mut out = Vec::new();
    for subject in order {
        let Some(resource) = resources.remove(&subject) else {
            continue;
        };
        let Some(class) = resource.class.clone() else {
            tracing::debug!(subject = %subject.token(), "skipping resource without a BioPAX type");
            continue;
        };
        let index = out.len();
        out.push(classify(subject.token(), class, resource, index)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:owl="http://www.w3.org/2002/07/owl#"
         xmlns:bp="http://www.biopax.org/release/biopax-level3.owl#"
         xml:base="http://example.org/model#">
  <owl:Ontology rdf:about=""/>
  <bp:Protein rdf:ID="Protein1">
    <bp:displayName rdf:datatype="http://www.w3.org/2001/XMLSchema#string">AKT1</bp:displayName>
    <bp:xref rdf:resource="#UnificationXref1"/>
  </bp:Protein>
  <bp:UnificationXref rdf:ID="UnificationXref1">
    <bp:db rdf:datatype="http://www.w3.org/2001/XMLSchema#string">UniProt</bp:db>
    <bp:id rdf:datatype="http://www.w3.org/2001/XMLSchema#string">P31749</bp:id>
  </bp:UnificationXref>
</rdf:RDF>"##;

    #[test]
    fn groups_triples_by_subject_into_closed_set() {
        let elements = read_document(DOC.as_bytes()).unwrap();
        assert_eq!(elements.len(), 2);
        let BiopaxElement::Entity {
            rdf_id,
            class,
            properties,
        } = &elements[0]
        else {
            panic!("expected entity first, got {:?}", elements[0]);
        };
        assert_eq!(rdf_id, "http://example.org/model#Protein1");
        assert_eq!(class, "Protein");
        assert!(properties.contains(&(
            "xref".to_string(),
            PropertyRef::Resource("http://example.org/model#UnificationXref1".to_string())
        )));
        let BiopaxElement::UnificationXref(xref) = &elements[1] else {
            panic!("expected xref second");
        };
        assert_eq!(xref.db.as_deref(), Some("UniProt"));
        assert_eq!(xref.id.as_deref(), Some("P31749"));
    }

    #[test]
    fn xref_without_id_is_malformed() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                 xmlns:bp="http://www.biopax.org/release/biopax-level3.owl#"
                 xml:base="http://example.org/m#">
          <bp:RelationshipXref rdf:ID="R1"><bp:db>GO</bp:db></bp:RelationshipXref>
        </rdf:RDF>"#;
        let err = read_document(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::MalformedSourceElement { .. }));
    }
}
