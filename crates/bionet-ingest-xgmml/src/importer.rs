use crate::document::{read_document, XgmmlElement};
use bionet_core::{EngineResult, EntityKind, KeyTag, NaturalKey, SourceLocation};
use bionet_ingest::{FormatImporter, ImportContext, LocalRefMap};
use bionet_store::{EdgeEnds, ElementStore};

#[derive(Debug, Default)]
pub struct XgmmlImporter {
    /// XGMML node id -> node.
    nodes: LocalRefMap,
}

impl FormatImporter for XgmmlImporter {
    type Element = XgmmlElement;

    fn format_name(&self) -> &'static str {
        "xgmml"
    }

    fn read(&mut self, bytes: &[u8]) -> EngineResult<Vec<XgmmlElement>> {
        read_document(bytes)
    }

    fn materialize<S: ElementStore>(
        &mut self,
        element: &XgmmlElement,
        _index: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        match element {
            XgmmlElement::Graph { label, properties } => {
                let summary = cx.store().summary_mut();
                if label.is_some() {
                    summary.name = label.clone();
                }
                summary.properties.extend(properties.iter().cloned());
            }
            XgmmlElement::Node { id, name, .. } => {
                let node_id = cx.resolve(NaturalKey::node(id))?;
                let term = match name {
                    Some(name) => Some(cx.base_term(None, name)?),
                    None => None,
                };
                let node = cx.store().find_or_create_node(node_id)?;
                node.name = name.clone();
                node.represents = term;
                cx.placeholder(EntityKind::Node, node_id);
                self.nodes.bind(id, node_id)?;
            }
            XgmmlElement::Edge { .. } => {}
        }
        Ok(())
    }

    fn wire<S: ElementStore>(
        &mut self,
        element: &XgmmlElement,
        index: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        match element {
            XgmmlElement::Node { id, properties, line, .. } => {
                let node_id = self
                    .nodes
                    .resolve(id, "node", Some(SourceLocation::Line(*line)))?;
                cx.store()
                    .find_or_create_node(node_id)?
                    .properties
                    .extend(properties.iter().cloned());
                cx.wired(EntityKind::Node, node_id);
            }
            XgmmlElement::Edge {
                source,
                target,
                predicate,
                properties,
                line,
            } => {
                let at = || Some(SourceLocation::Line(*line));
                let referrer = format!("edge {source} -> {target}");
                let subject = self.nodes.resolve(source, &referrer, at())?;
                let object = self.nodes.resolve(target, &referrer, at())?;
                let predicate = cx.predicate(predicate)?;
                let id = cx.resolve(NaturalKey::new(KeyTag::Edge).part(index.to_string()))?;
                cx.store()
                    .find_or_create_edge(
                        id,
                        EdgeEnds {
                            subject,
                            predicate,
                            object,
                        },
                    )?
                    .properties
                    .extend(properties.iter().cloned());
                cx.created(EntityKind::Edge, id);
            }
            XgmmlElement::Graph { .. } => {}
        }
        Ok(())
    }
}
