use crate::document::{read_document, BiopaxElement, PropertyRef, PublicationFields, XrefFields};
use crate::rdf::local_name;
use bionet_core::{
    ElementId, EngineResult, EntityKind, KeyTag, NaturalKey, Property, SourceLocation,
};
use bionet_ingest::xml::parse_root;
use bionet_ingest::{FormatImporter, ImportContext, LocalRefMap};
use bionet_store::{EdgeEnds, ElementStore};

pub const PREDICATE_PREFIX: &str = "bp";
pub const TYPE_PROPERTY: &str = "ndex:biopaxType";

/// What an RDF id was materialized as in pass 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Node(ElementId),
    Alias(ElementId),
    Related(ElementId),
    Publication(ElementId),
}

#[derive(Debug, Default)]
pub struct BiopaxImporter {
    refs: LocalRefMap<Bound>,
    prefixes: Vec<(String, String)>,
}

impl BiopaxImporter {
    fn xref_term<S: ElementStore>(
        &self,
        xref: &XrefFields,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<ElementId> {
        let id = xref.id.as_deref().unwrap_or_default();
        cx.base_term(xref.db.as_deref(), id)
    }

    fn publication<S: ElementStore>(
        &self,
        publication: &PublicationFields,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<ElementId> {
        let (identifier, id_type) = match (&publication.id, &publication.db) {
            (Some(id), Some(db)) => (id.clone(), db.clone()),
            (id, _) => (
                publication
                    .urls
                    .first()
                    .or(id.as_ref())
                    .cloned()
                    .unwrap_or_else(|| "unspecified".to_string()),
                "unspecified".to_string(),
            ),
        };

        let id = cx.resolve(NaturalKey::citation(
            publication.title.as_deref(),
            Some(&format!("{id_type}:{identifier}")),
        ))?;
        if cx.is_processed(id) {
            return Ok(id);
        }
        let citation = cx.store().find_or_create_citation(id)?;
        citation.title = publication.title.clone();
        citation.identifier = Some(identifier);
        citation.id_type = Some(id_type);
        citation.contributors = publication.authors.clone();
        for (name, value) in [("year", &publication.year), ("source", &publication.source)] {
            if let Some(value) = value {
                citation.properties.push(Property::text(name, value.clone()));
            }
        }
        cx.created(EntityKind::Citation, id);
        Ok(id)
    }

    fn entity_node<S: ElementStore>(
        &self,
        rdf_id: &str,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<ElementId> {
        let term = cx.base_term(None, rdf_id)?;
        let id = cx.resolve(NaturalKey::node(rdf_id))?;
        let node = cx.store().find_or_create_node(id)?;
        node.name = Some(local_name(rdf_id).to_string());
        node.represents = Some(term);
        cx.placeholder(EntityKind::Node, id);
        Ok(id)
    }

    fn wire_entity<S: ElementStore>(
        &self,
        rdf_id: &str,
        class: &str,
        properties: &[(String, PropertyRef)],
        index: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        let at = || Some(SourceLocation::Element(index));
        let Bound::Node(subject) = self.refs.resolve(rdf_id, rdf_id, at())? else {
            return Ok(());
        };

        let mut literals = Vec::new();
        for (name, value) in properties {
            let token = match value {
                PropertyRef::Literal(text) => {
                    literals.push(Property::text(name.clone(), text.clone()));
                    continue;
                }
                PropertyRef::Resource(token) => token,
            };
            match self.refs.resolve(token, rdf_id, at())? {
                Bound::Publication(citation) => {
                    cx.store().find_or_create_node(subject)?.citations.insert(citation);
                }
                Bound::Alias(term) => {
                    cx.store().find_or_create_node(subject)?.aliases.insert(term);
                }
                Bound::Related(term) => {
                    cx.store().find_or_create_node(subject)?.related_terms.insert(term);
                }
                Bound::Node(object) => {
                    let predicate = cx.base_term(Some(PREDICATE_PREFIX), name)?;
                    let id = cx.resolve(
                        NaturalKey::new(KeyTag::Edge)
                            .id_part(subject)
                            .id_part(predicate)
                            .id_part(object),
                    )?;
                    cx.store().find_or_create_edge(
                        id,
                        EdgeEnds {
                            subject,
                            predicate,
                            object,
                        },
                    )?;
                    cx.created(EntityKind::Edge, id);
                }
            }
        }
        literals.push(Property::text(TYPE_PROPERTY, class));

        cx.store()
            .find_or_create_node(subject)?
            .properties
            .extend(literals);
        cx.wired(EntityKind::Node, subject);
        Ok(())
    }
}

impl FormatImporter for BiopaxImporter {
    type Element = BiopaxElement;

    fn format_name(&self) -> &'static str {
        "biopax"
    }

    fn read(&mut self, bytes: &[u8]) -> EngineResult<Vec<BiopaxElement>> {
        self.prefixes = parse_root(bytes)?.namespace_declarations();
        read_document(bytes)
    }

    fn begin<S: ElementStore>(&mut self, cx: &mut ImportContext<S>) -> EngineResult<()> {
        for (prefix, uri) in &self.prefixes {
            cx.namespace(prefix, Some(uri))?;
        }
        Ok(())
    }

    fn materialize<S: ElementStore>(
        &mut self,
        element: &BiopaxElement,
        _index: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        let bound = match element {
            BiopaxElement::UnificationXref(xref) => Bound::Alias(self.xref_term(xref, cx)?),
            BiopaxElement::RelationshipXref(xref) => Bound::Related(self.xref_term(xref, cx)?),
            BiopaxElement::PublicationXref(publication) => {
                Bound::Publication(self.publication(publication, cx)?)
            }
            BiopaxElement::Entity { rdf_id, .. } => Bound::Node(self.entity_node(rdf_id, cx)?),
        };
        self.refs.bind(element.rdf_id(), bound)
    }

    fn wire<S: ElementStore>(
        &mut self,
        element: &BiopaxElement,
        index: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        match element {
            BiopaxElement::Entity {
                rdf_id,
                class,
                properties,
            } => self.wire_entity(rdf_id, class, properties, index, cx),
            _ => Ok(()),
        }
    }
}
