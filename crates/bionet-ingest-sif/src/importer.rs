use crate::document::{read_document, SifElement};
use bionet_core::{
    ElementId, EngineResult, EntityKind, KeyTag, NaturalKey, Property, SourceLocation,
};
use bionet_ingest::{FormatImporter, ImportContext, LocalRefMap};
use bionet_store::{EdgeEnds, ElementStore};

pub const PUBMED_ID_TYPE: &str = "pubmed";

/// `PREFIX:local` tokens become a base term in namespace `PREFIX`.
fn split_prefixed(token: &str) -> (Option<&str>, &str) {
    match token.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, token),
    }
}

#[derive(Debug, Default)]
pub struct SifImporter {
    nodes: LocalRefMap,
}

impl SifImporter {
    fn term<S: ElementStore>(&self, token: &str, cx: &mut ImportContext<S>) -> EngineResult<ElementId> {
        let (prefix, local) = split_prefixed(token);
        cx.base_term(prefix, local)
    }

    fn node<S: ElementStore>(&mut self, name: &str, cx: &mut ImportContext<S>) -> EngineResult<ElementId> {
        if let Some(id) = self.nodes.get(name) {
            return Ok(id);
        }
        let term = self.term(name, cx)?;
        let id = cx.resolve(NaturalKey::node(name))?;
        let node = cx.store().find_or_create_node(id)?;
        node.name = Some(name.to_string());
        node.represents = Some(term);
        cx.placeholder(EntityKind::Node, id);
        self.nodes.bind(name, id)?;
        Ok(id)
    }

    fn edge_key(line: usize, target: usize) -> NaturalKey {
        NaturalKey::new(KeyTag::Edge)
            .part(line.to_string())
            .part(target.to_string())
    }

    fn pubmed_citation<S: ElementStore>(
        &self,
        pubmed_id: &str,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<ElementId> {
        let id = cx.resolve(NaturalKey::citation(
            None,
            Some(&format!("{PUBMED_ID_TYPE}:{pubmed_id}")),
        ))?;
        if !cx.is_processed(id) {
            let citation = cx.store().find_or_create_citation(id)?;
            citation.identifier = Some(pubmed_id.to_string());
            citation.id_type = Some(PUBMED_ID_TYPE.to_string());
            citation.citation_type = Some(PUBMED_ID_TYPE.to_string());
            cx.created(EntityKind::Citation, id);
        }
        Ok(id)
    }
}

impl FormatImporter for SifImporter {
    type Element = SifElement;

    fn format_name(&self) -> &'static str {
        "sif"
    }

    fn read(&mut self, bytes: &[u8]) -> EngineResult<Vec<SifElement>> {
        read_document(bytes)
    }

    fn materialize<S: ElementStore>(
        &mut self,
        element: &SifElement,
        _index: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        match element {
            SifElement::Participant { name, .. } => {
                self.node(name, cx)?;
            }
            SifElement::Interaction {
                source,
                targets,
                pubmed_ids,
                ..
            } => {
                self.node(source, cx)?;
                for target in targets {
                    self.node(target, cx)?;
                }
                for pubmed_id in pubmed_ids {
                    self.pubmed_citation(pubmed_id, cx)?;
                }
            }
        }
        Ok(())
    }

    fn wire<S: ElementStore>(
        &mut self,
        element: &SifElement,
        _index: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        match element {
            SifElement::Participant {
                line,
                name,
                properties,
                aliases,
                related,
            } => {
                let id = self
                    .nodes
                    .resolve(name, "participant row", Some(SourceLocation::Line(*line)))?;
                let aliases = aliases
                    .iter()
                    .map(|a| self.term(a, cx))
                    .collect::<EngineResult<Vec<_>>>()?;
                let related = related
                    .iter()
                    .map(|r| self.term(r, cx))
                    .collect::<EngineResult<Vec<_>>>()?;
                let node = cx.store().find_or_create_node(id)?;
                node.aliases.extend(aliases);
                node.related_terms.extend(related);
                node.properties.extend(
                    properties
                        .iter()
                        .map(|(k, v)| Property::text(k.clone(), v.clone())),
                );
                cx.wired(EntityKind::Node, id);
            }
            SifElement::Interaction {
                line,
                source,
                predicate,
                targets,
                properties,
                pubmed_ids,
            } => {
                let at = || Some(SourceLocation::Line(*line));
                let subject = self.nodes.resolve(source, "interaction", at())?;
                let predicate = cx.predicate(predicate)?;
                let citations = pubmed_ids
                    .iter()
                    .map(|p| self.pubmed_citation(p, cx))
                    .collect::<EngineResult<Vec<_>>>()?;
                cx.wired(EntityKind::Node, subject);

                for (position, target) in targets.iter().enumerate() {
                    let object = self.nodes.resolve(target, "interaction", at())?;
                    let id = cx.resolve(Self::edge_key(*line, position))?;
                    let edge = cx.store().find_or_create_edge(
                        id,
                        EdgeEnds {
                            subject,
                            predicate,
                            object,
                        },
                    )?;
                    edge.citations.extend(citations.iter().copied());
                    edge.properties.extend(
                        properties
                            .iter()
                            .map(|(k, v)| Property::text(k.clone(), v.clone())),
                    );
                    cx.created(EntityKind::Edge, id);
                    cx.wired(EntityKind::Node, object);
                }
            }
        }
        Ok(())
    }
}
