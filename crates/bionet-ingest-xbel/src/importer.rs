use crate::document::{
    read_document, AnnotationDefinition, CitationRef, GroupContext, ObjectNode, StatementNode,
    TermNode, XbelElement, XbelHeader,
};
use bionet_core::{
    BelFunction, ElementId, EngineError, EngineResult, EntityKind, KeyTag, NamespaceKind,
    NaturalKey, Property, Relationship, SourceLocation,
};
use bionet_ingest::{FormatImporter, ImportContext, LocalRefMap};
use bionet_store::{EdgeEnds, ElementStore};

/// Zero-padded so lexicographic slot order is argument order.
fn slot_key(position: usize) -> String {
    format!("{position:06}")
}

fn reified_token(path: &str) -> String {
    format!("statement:{path}")
}

/// Citation and support ids in force for one statement.
#[derive(Debug, Clone, Copy, Default)]
struct ContextIds {
    citation: Option<ElementId>,
    support: Option<ElementId>,
}

#[derive(Debug, Default)]
pub struct XbelImporter {
    /// Canonical term text / reified statement path -> node.
    nodes: LocalRefMap,
    /// Statement path -> edge.
    edges: LocalRefMap,
}

impl XbelImporter {
    fn citation<S: ElementStore>(
        &self,
        citation: &CitationRef,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<ElementId> {
        let id = cx.resolve(NaturalKey::citation(
            citation.name.as_deref(),
            citation.reference.as_deref(),
        ))?;
        if cx.is_processed(id) {
            return Ok(id);
        }
        let entity = cx.store().find_or_create_citation(id)?;
        entity.title = citation.name.clone();
        entity.identifier = citation.reference.clone();
        entity.citation_type = citation.citation_type.clone();
        entity.id_type = citation.citation_type.clone();
        entity.contributors = citation.authors.clone();
        entity.comment = citation.comment.clone();
        cx.created(EntityKind::Citation, id);
        Ok(id)
    }

    /// Resolve (and in pass 1 populate) the citation and support of a group.
    fn context_ids<S: ElementStore>(
        &self,
        context: &GroupContext,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<ContextIds> {
        let Some(citation_ref) = &context.citation else {
            return Ok(ContextIds::default());
        };
        let citation = self.citation(citation_ref, cx)?;
        let Some(evidence) = &context.evidence else {
            return Ok(ContextIds {
                citation: Some(citation),
                support: None,
            });
        };
        let id = cx.resolve(NaturalKey::support(citation, evidence))?;
        if !cx.is_processed(id) {
            let support = cx.store().find_or_create_support(id, citation)?;
            support.text = evidence.clone();
            support.metadata = context.annotations.iter().cloned().collect();
            cx.created(EntityKind::Support, id);
        }
        Ok(ContextIds {
            citation: Some(citation),
            support: Some(id),
        })
    }

    fn term<S: ElementStore>(
        &self,
        term: &TermNode,
        line: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<ElementId> {
        match term {
            TermNode::Parameter { ns, value } => {
                let prefix = ns
                    .clone()
                    .unwrap_or_else(|| cx.config().default_namespace.clone());
                cx.base_term(Some(&prefix), value)
            }
            TermNode::Function { function, args } => {
                let Some(known) = BelFunction::from_name(function) else {
                    return Err(EngineError::malformed(
                        "term",
                        format!("unknown function `{function}`"),
                        Some(SourceLocation::Line(line)),
                    ));
                };
                let function_id = cx.default_namespace_term(known.as_xbel())?;
                let children = args
                    .iter()
                    .map(|arg| self.term(arg, line, cx))
                    .collect::<EngineResult<Vec<_>>>()?;

                let key = children.iter().fold(
                    NaturalKey::new(KeyTag::Function).id_part(function_id),
                    |key, child| key.id_part(*child),
                );
                let id = cx.resolve(key)?;
                let entity = cx.store().find_or_create_function_term(id, function_id)?;
                if entity.parameters.is_empty() && !children.is_empty() {
                    entity.parameters = children
                        .iter()
                        .enumerate()
                        .map(|(position, child)| (slot_key(position), *child))
                        .collect();
                }
                cx.created(EntityKind::FunctionTerm, id);
                Ok(id)
            }
        }
    }

    /// Node labelled by `term`, bound under the term's canonical text.
    fn term_node<S: ElementStore>(
        &mut self,
        term: &TermNode,
        line: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<ElementId> {
        let term_id = self.term(term, line, cx)?;
        let node = self.node_for(term_id, cx)?;
        self.nodes.bind(&term.canonical(), node)?;
        Ok(node)
    }

    fn node_for<S: ElementStore>(
        &self,
        term_id: ElementId,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<ElementId> {
        let node = cx.resolve(NaturalKey::node_for_term(term_id))?;
        cx.store().find_or_create_node(node)?.represents = Some(term_id);
        cx.placeholder(EntityKind::Node, node);
        Ok(node)
    }

    /// Pass 1 for one statement (recursing into nested objects).
    fn materialize_statement<S: ElementStore>(
        &mut self,
        statement: &StatementNode,
        path: &str,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        self.term_node(&statement.subject, statement.line, cx)?;
        let Some(object) = &statement.object else {
            tracing::debug!(path, line = statement.line, "subject-only statement; no edge");
            return Ok(());
        };

        let edge = cx.resolve(NaturalKey::new(KeyTag::Edge).part(path))?;
        self.edges.bind(path, edge)?;

        match object {
            ObjectNode::Term(term) => {
                self.term_node(term, statement.line, cx)?;
            }
            ObjectNode::Statement(inner) => {
                let inner_path = format!("{path}/object");
                self.materialize_statement(inner, &inner_path, cx)?;
                let inner_edge = self.edges.resolve(&inner_path, path, None)?;
                let reified = cx.resolve(NaturalKey::new(KeyTag::Reified).id_part(inner_edge))?;
                cx.store().find_or_create_reified_edge_term(reified, inner_edge)?;
                cx.created(EntityKind::ReifiedEdgeTerm, reified);
                let node = self.node_for(reified, cx)?;
                self.nodes.bind(&reified_token(&inner_path), node)?;
            }
        }
        Ok(())
    }

    /// Pass 2 for one statement. Nested objects are wired before the outer edge.
    fn wire_statement<S: ElementStore>(
        &mut self,
        statement: &StatementNode,
        path: &str,
        context: &GroupContext,
        ids: ContextIds,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        let at = || Some(SourceLocation::Line(statement.line));
        let subject = self
            .nodes
            .resolve(&statement.subject.canonical(), path, at())?;
        cx.wired(EntityKind::Node, subject);

        let (Some(relationship), Some(object)) = (&statement.relationship, &statement.object)
        else {
            return Ok(());
        };

        let Some(relationship) = Relationship::from_name(relationship) else {
            return Err(EngineError::malformed(
                "statement",
                format!("unknown relationship `{relationship}`"),
                at(),
            ));
        };
        let predicate = cx.default_namespace_term(relationship.as_xbel())?;

        let object = match object {
            ObjectNode::Term(term) => self.nodes.resolve(&term.canonical(), path, at())?,
            ObjectNode::Statement(inner) => {
                let inner_path = format!("{path}/object");
                self.wire_statement(inner, &inner_path, context, ids, cx)?;
                self.nodes.resolve(&reified_token(&inner_path), path, at())?
            }
        };
        cx.wired(EntityKind::Node, object);

        let id = self.edges.resolve(path, "statement", at())?;
        let edge = cx.store().find_or_create_edge(
            id,
            EdgeEnds {
                subject,
                predicate,
                object,
            },
        )?;
        edge.citations.extend(ids.citation);
        edge.supports.extend(ids.support);
        if ids.support.is_none() {
            edge.properties.extend(
                context
                    .annotations
                    .iter()
                    .map(|(k, v)| Property::text(k.clone(), v.clone())),
            );
        }
        edge.properties.extend(
            statement
                .annotations
                .iter()
                .map(|(k, v)| Property::text(k.clone(), v.clone())),
        );
        let orphan_evidence = match (&context.evidence, ids.citation) {
            (Some(evidence), None) => {
                edge.properties.push(Property::text("evidence", evidence.clone()));
                true
            }
            _ => false,
        };
        cx.created(EntityKind::Edge, id);
        if orphan_evidence {
            cx.warn(format!("{path}: evidence without citation kept as an edge property"));
        }
        Ok(())
    }

    fn header<S: ElementStore>(&self, header: &XbelHeader, cx: &mut ImportContext<S>) {
        let summary = cx.store().summary_mut();
        summary.name = header.name.clone();
        summary.description = header.description.clone();
        let fields = [
            ("version", header.version.clone()),
            ("copyright", header.copyright.clone()),
            ("contactInfo", header.contact_info.clone()),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                summary.properties.push(Property::text(name, value));
            }
        }
        for author in &header.authors {
            summary.properties.push(Property::text("author", author.clone()));
        }
        for license in &header.licenses {
            summary.properties.push(Property::text("license", license.clone()));
        }
    }

    fn annotation_definition<S: ElementStore>(
        &self,
        definition: &AnnotationDefinition,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        match definition {
            AnnotationDefinition::External { id, url } => {
                cx.namespace_of_kind(id, url.as_deref(), NamespaceKind::ExternalAnnotation)?;
            }
            AnnotationDefinition::Internal {
                id,
                description,
                usage,
                values,
            } => {
                let ns = cx.namespace_of_kind(id, None, NamespaceKind::InternalAnnotation)?;
                let text = match (description, usage) {
                    (Some(d), Some(u)) => Some(format!("{d}\n{u}")),
                    (d, u) => d.clone().or_else(|| u.clone()),
                };
                cx.store().find_or_create_namespace(ns, id)?.description = text;
                for value in values {
                    cx.base_term(Some(id), value)?;
                }
            }
        }
        Ok(())
    }
}

impl FormatImporter for XbelImporter {
    type Element = XbelElement;

    fn format_name(&self) -> &'static str {
        "xbel"
    }

    fn read(&mut self, bytes: &[u8]) -> EngineResult<Vec<XbelElement>> {
        read_document(bytes)
    }

    fn begin<S: ElementStore>(&mut self, cx: &mut ImportContext<S>) -> EngineResult<()> {
        let prefix = cx.config().default_namespace.clone();
        cx.namespace(&prefix, None)?;
        Ok(())
    }

    fn materialize<S: ElementStore>(
        &mut self,
        element: &XbelElement,
        _index: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        match element {
            XbelElement::Header(header) => self.header(header, cx),
            XbelElement::Namespace {
                prefix,
                resource_location,
            } => {
                cx.namespace(prefix, resource_location.as_deref())?;
            }
            XbelElement::AnnotationDefinition(definition) => {
                self.annotation_definition(definition, cx)?;
            }
            XbelElement::Statement(statement) => {
                self.context_ids(&statement.context, cx)?;
                self.materialize_statement(&statement.statement, &statement.path, cx)?;
            }
        }
        Ok(())
    }

    fn wire<S: ElementStore>(
        &mut self,
        element: &XbelElement,
        _index: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()> {
        if let XbelElement::Statement(statement) = element {
            let ids = self.context_ids(&statement.context, cx)?;
            self.wire_statement(
                &statement.statement,
                &statement.path,
                &statement.context,
                ids,
                cx,
            )?;
        }
        Ok(())
    }
}
