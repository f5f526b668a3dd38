//! Export sessions.
//!
//! A session builds the complete document (header, namespaces, annotation
//! definitions, one segment tree per citation) before handing anything to the
//! writer, so a fatal error leaves the writer untouched.

use crate::partition::{NetworkPartitioner, Segment};
use crate::term_tree::{StatementTree, TermTreeBuilder};
use crate::writer::{
    AnnotationDefinitionEntry, CitationEntry, DocumentHeader, DocumentWriter, EvidenceGroup,
    NamespaceEntry, SegmentTree, XbelWriter,
};
use bionet_core::{
    CompletenessAuditor, ElementId, EngineConfig, EngineError, EngineResult, EntityKind,
    NamespaceKind, Network, Property, SessionError, SessionOperation, SessionReport, Term,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Everything a writer receives, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub header: DocumentHeader,
    pub namespaces: Vec<NamespaceEntry>,
    pub annotation_definitions: Vec<AnnotationDefinitionEntry>,
    pub segments: Vec<SegmentTree>,
}

impl ExportDocument {
    pub fn write_to<W: DocumentWriter>(&self, writer: &mut W) -> EngineResult<()> {
        writer.write_header(&self.header)?;
        writer.write_namespaces(&self.namespaces)?;
        writer.write_annotation_definitions(&self.annotation_definitions)?;
        for segment in &self.segments {
            writer.write_segment(segment)?;
        }
        writer.close()
    }
}

fn property_texts<'a>(
    properties: &'a [Property],
    name: &'a str,
) -> impl Iterator<Item = String> + 'a {
    properties
        .iter()
        .filter(move |p| p.name == name)
        .map(|p| p.value.to_text())
}

fn first_property(properties: &[Property], name: &str) -> Option<String> {
    property_texts(properties, name).next()
}

/// One export of one network. Owns its auditor; never shared.
pub struct ExportSession<'a> {
    network: &'a Network,
    config: &'a EngineConfig,
    auditor: CompletenessAuditor,
}

impl<'a> ExportSession<'a> {
    pub fn new(network: &'a Network, config: &'a EngineConfig) -> Self {
        Self {
            network,
            config,
            auditor: CompletenessAuditor::for_network(network),
        }
    }

    pub fn auditor(&self) -> &CompletenessAuditor {
        &self.auditor
    }

    pub fn into_auditor(self) -> CompletenessAuditor {
        self.auditor
    }

    fn warn(&mut self, message: String) {
        tracing::warn!(%message, "export integrity warning");
        self.auditor.warn(message);
    }

    /// Build the full document. `fallback_name` names a network whose summary
    /// has no name.
    pub fn build(&mut self, fallback_name: &str) -> EngineResult<ExportDocument> {
        let partition = NetworkPartitioner::new(self.network).partition();
        for edge in &partition.uncited_edges {
            self.warn(format!("edge {edge} cites no citation and is not exported"));
        }
        for (citation, edge) in &partition.stray_edges {
            self.warn(format!(
                "edge {edge} cites {citation} but none of its supports belong to it"
            ));
        }

        let header = self.header(fallback_name);
        let namespaces = self.namespaces();
        let annotation_definitions = self.annotation_definitions();

        let config = self.config;
        let builder =
            TermTreeBuilder::new(self.network, &config.default_namespace, config.max_term_depth);
        let mut segments = Vec::with_capacity(partition.segments.len());
        for segment in &partition.segments {
            segments.push(self.segment(segment, &builder)?);
        }
        tracing::debug!(segments = segments.len(), "export segments built");

        Ok(ExportDocument {
            header,
            namespaces,
            annotation_definitions,
            segments,
        })
    }

    fn header(&self, fallback_name: &str) -> DocumentHeader {
        let summary = &self.network.summary;
        let defaults = &self.config.header;
        let properties = summary.properties.as_slice();

        let authors: Vec<String> = property_texts(properties, "author").collect();
        let licenses: Vec<String> = property_texts(properties, "license").collect();
        DocumentHeader {
            name: summary
                .name
                .clone()
                .unwrap_or_else(|| fallback_name.to_string()),
            description: summary.description.clone().unwrap_or_default(),
            version: first_property(properties, "version")
                .unwrap_or_else(|| defaults.version.clone()),
            copyright: first_property(properties, "copyright")
                .or_else(|| defaults.copyright.clone()),
            contact_info: first_property(properties, "contactInfo")
                .or_else(|| defaults.contact_info.clone()),
            authors: if authors.is_empty() {
                defaults.authors.clone()
            } else {
                authors
            },
            licenses: if licenses.is_empty() {
                defaults.licenses.clone()
            } else {
                licenses
            },
        }
    }

    /// Term namespaces except the implicit default one.
    fn namespaces(&self) -> Vec<NamespaceEntry> {
        self.network
            .namespaces
            .values()
            .filter(|ns| ns.kind == NamespaceKind::Term)
            .filter(|ns| ns.prefix != self.config.default_namespace)
            .map(|ns| NamespaceEntry {
                prefix: ns.prefix.clone(),
                resource_location: ns.uri.clone(),
            })
            .collect()
    }

    fn annotation_definitions(&mut self) -> Vec<AnnotationDefinitionEntry> {
        let network = self.network;
        let mut definitions = Vec::new();
        for ns in network.namespaces.values() {
            match ns.kind {
                NamespaceKind::Term => {}
                NamespaceKind::ExternalAnnotation => {
                    definitions.push(AnnotationDefinitionEntry::External {
                        id: ns.prefix.clone(),
                        url: ns.uri.clone(),
                    });
                }
                NamespaceKind::InternalAnnotation => {
                    let mut values = Vec::new();
                    for term in network.terms.values() {
                        if let Term::Base(base) = term {
                            if base.namespace == Some(ns.id) {
                                self.auditor.mark_processed(EntityKind::BaseTerm, base.id);
                                values.push(base.name.clone());
                            }
                        }
                    }
                    definitions.push(AnnotationDefinitionEntry::Internal {
                        id: ns.prefix.clone(),
                        description: ns.description.clone(),
                        values,
                    });
                }
            }
        }
        definitions
    }

    fn statements(
        &mut self,
        edges: impl Iterator<Item = ElementId>,
        builder: &TermTreeBuilder<'_>,
    ) -> EngineResult<Vec<StatementTree>> {
        edges
            .map(|edge| builder.statement(edge, &mut self.auditor))
            .collect()
    }

    fn segment(
        &mut self,
        segment: &Segment,
        builder: &TermTreeBuilder<'_>,
    ) -> EngineResult<SegmentTree> {
        let network = self.network;
        let citation = &network.citations[&segment.citation];
        self.auditor.mark_processed(EntityKind::Citation, citation.id);

        let mut groups = Vec::new();
        for support_id in &segment.supports {
            let edges: Vec<ElementId> = segment.edges_for_support(network, *support_id).collect();
            if edges.is_empty() {
                self.warn(format!(
                    "support {support_id} of citation {} backs no exported edge",
                    citation.id
                ));
                continue;
            }
            let support = &network.supports[support_id];
            self.auditor.mark_processed(EntityKind::Support, support.id);
            groups.push(EvidenceGroup {
                evidence: support.text.clone(),
                annotations: support
                    .metadata
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                statements: self.statements(edges.into_iter(), builder)?,
            });
        }
        let statements = self.statements(segment.unsupported_edges(network), builder)?;

        Ok(SegmentTree {
            citation: CitationEntry {
                citation_type: citation.citation_type.clone(),
                name: citation.title.clone(),
                reference: citation.identifier.clone(),
                authors: citation.contributors.clone(),
                comment: citation.comment.clone(),
            },
            groups,
            statements,
        })
    }
}

// ============================================================================
// Entry points
// ============================================================================

fn export_error(name: &str, cause: EngineError) -> SessionError {
    SessionError {
        operation: SessionOperation::Export,
        source_name: name.to_string(),
        cause,
    }
}

/// Export `network` through `writer`. `name` is used in errors and as the
/// document name when the network has none.
pub fn export_network<W: DocumentWriter>(
    network: &Network,
    writer: &mut W,
    config: &EngineConfig,
    name: &str,
) -> SessionReport {
    tracing::info!(network = %name, "export session started");
    let counts = network.counts();
    let mut session = ExportSession::new(network, config);
    let outcome = session
        .build(name)
        .and_then(|document| document.write_to(writer));
    let audit = session.into_auditor().report();

    match outcome {
        Ok(()) => {
            if !audit.unprocessed.is_empty() {
                tracing::warn!(
                    network = %name,
                    unprocessed = audit.unprocessed.len(),
                    "export left entities unreachable"
                );
            }
            tracing::info!(network = %name, "export session finished");
            SessionReport::success(None, counts, audit)
        }
        Err(cause) => {
            tracing::warn!(network = %name, error = %cause, "export failed");
            SessionReport::failed(export_error(name, cause), counts, audit)
        }
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Export to an XBEL file. Output goes to a sibling temp file that replaces
/// `path` only when the export succeeds.
pub fn export_to_path(network: &Network, path: &Path, config: &EngineConfig) -> SessionReport {
    let name = path.display().to_string();
    let temp = temp_sibling(path);
    let file = match File::create(&temp) {
        Ok(file) => file,
        Err(err) => {
            return SessionReport::failed(
                export_error(&name, EngineError::Io(err)),
                network.counts(),
                Default::default(),
            )
        }
    };

    let mut writer = XbelWriter::new(BufWriter::new(file));
    let report = export_network(network, &mut writer, config, &name);
    drop(writer);

    if report.is_success() {
        if let Err(err) = std::fs::rename(&temp, path) {
            let _ = std::fs::remove_file(&temp);
            return SessionReport::failed(
                export_error(&name, EngineError::Io(err)),
                report.counts,
                report.audit,
            );
        }
    } else {
        let _ = std::fs::remove_file(&temp);
    }
    report
}
