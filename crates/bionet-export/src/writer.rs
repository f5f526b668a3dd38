//! Document writers.
//!
//! An export session drives a [`DocumentWriter`] in strict order:
//! `write_header`, `write_namespaces`, `write_annotation_definitions`,
//! `write_segment` once per segment, then `close`. Writers emit in call order.

use crate::term_tree::{StatementObject, StatementTree, TermTree};
use bionet_core::{EngineError, EngineResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

pub const XBEL_NAMESPACE: &str = "http://belframework.org/schema/1.0/xbel";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentHeader {
    pub name: String,
    pub description: String,
    pub version: String,
    pub copyright: Option<String>,
    pub contact_info: Option<String>,
    pub authors: Vec<String>,
    pub licenses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceEntry {
    pub prefix: String,
    pub resource_location: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationDefinitionEntry {
    Internal {
        id: String,
        description: Option<String>,
        values: Vec<String>,
    },
    External {
        id: String,
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitationEntry {
    pub citation_type: Option<String>,
    pub name: Option<String>,
    pub reference: Option<String>,
    pub authors: Vec<String>,
    pub comment: Option<String>,
}

/// Statements backed by one support.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceGroup {
    pub evidence: String,
    pub annotations: Vec<(String, String)>,
    pub statements: Vec<StatementTree>,
}

/// One citation's statements: evidence groups first, then statements with no
/// support.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTree {
    pub citation: CitationEntry,
    pub groups: Vec<EvidenceGroup>,
    pub statements: Vec<StatementTree>,
}

pub trait DocumentWriter {
    fn write_header(&mut self, header: &DocumentHeader) -> EngineResult<()>;
    fn write_namespaces(&mut self, namespaces: &[NamespaceEntry]) -> EngineResult<()>;
    fn write_annotation_definitions(
        &mut self,
        definitions: &[AnnotationDefinitionEntry],
    ) -> EngineResult<()>;
    fn write_segment(&mut self, segment: &SegmentTree) -> EngineResult<()>;
    fn close(&mut self) -> EngineResult<()>;
}

// ============================================================================
// XBEL
// ============================================================================

fn xml_error(err: impl std::fmt::Display) -> EngineError {
    EngineError::xml(err, None)
}

/// XBEL 1.0 writer with the `bel:` prefix on every element and attribute.
pub struct XbelWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XbelWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', 2),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn event(&mut self, event: Event<'_>) -> EngineResult<()> {
        self.writer.write_event(event).map_err(xml_error)
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> EngineResult<()> {
        let mut start = BytesStart::new(name);
        for attribute in attributes {
            start.push_attribute(*attribute);
        }
        self.event(Event::Start(start))
    }

    fn end(&mut self, name: &str) -> EngineResult<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> EngineResult<()> {
        let mut start = BytesStart::new(name);
        for attribute in attributes {
            start.push_attribute(*attribute);
        }
        self.event(Event::Empty(start))
    }

    fn text_element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> EngineResult<()> {
        self.open(name, attributes)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn optional_text(&mut self, name: &str, text: Option<&str>) -> EngineResult<()> {
        match text {
            Some(text) => self.text_element(name, &[], text),
            None => Ok(()),
        }
    }

    fn list(&mut self, group: &str, item: &str, values: &[String]) -> EngineResult<()> {
        if values.is_empty() {
            return Ok(());
        }
        self.open(group, &[])?;
        for value in values {
            self.text_element(item, &[], value)?;
        }
        self.end(group)
    }

    fn annotations(&mut self, annotations: &[(String, String)]) -> EngineResult<()> {
        for (key, value) in annotations {
            self.text_element("bel:annotation", &[("bel:refID", key.as_str())], value)?;
        }
        Ok(())
    }

    fn term(&mut self, term: &TermTree) -> EngineResult<()> {
        match term {
            TermTree::Parameter { ns: Some(ns), value } => {
                self.text_element("bel:parameter", &[("bel:ns", ns.as_str())], value)
            }
            TermTree::Parameter { ns: None, value } => {
                self.text_element("bel:parameter", &[], value)
            }
            TermTree::Function { function, args } => {
                self.open("bel:term", &[("bel:function", function.as_str())])?;
                for arg in args {
                    self.term(arg)?;
                }
                self.end("bel:term")
            }
        }
    }

    fn statement(&mut self, statement: &StatementTree) -> EngineResult<()> {
        self.open(
            "bel:statement",
            &[("bel:relationship", statement.relationship.as_xbel())],
        )?;
        if !statement.annotations.is_empty() {
            self.open("bel:annotationGroup", &[])?;
            self.annotations(&statement.annotations)?;
            self.end("bel:annotationGroup")?;
        }
        self.open("bel:subject", &[])?;
        self.term(&statement.subject)?;
        self.end("bel:subject")?;
        self.open("bel:object", &[])?;
        match &statement.object {
            StatementObject::Term(term) => self.term(term)?,
            StatementObject::Statement(nested) => self.statement(nested)?,
        }
        self.end("bel:object")?;
        self.end("bel:statement")
    }

    fn citation(&mut self, citation: &CitationEntry) -> EngineResult<()> {
        let attributes: Vec<(&str, &str)> = citation
            .citation_type
            .as_deref()
            .map(|t| ("bel:type", t))
            .into_iter()
            .collect();
        self.open("bel:citation", &attributes)?;
        self.optional_text("bel:name", citation.name.as_deref())?;
        self.optional_text("bel:comment", citation.comment.as_deref())?;
        self.optional_text("bel:reference", citation.reference.as_deref())?;
        self.list("bel:authorGroup", "bel:author", &citation.authors)?;
        self.end("bel:citation")
    }
}

impl<W: Write> DocumentWriter for XbelWriter<W> {
    fn write_header(&mut self, header: &DocumentHeader) -> EngineResult<()> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.open("bel:document", &[("xmlns:bel", XBEL_NAMESPACE)])?;
        self.open("bel:header", &[])?;
        self.text_element("bel:name", &[], &header.name)?;
        self.text_element("bel:description", &[], &header.description)?;
        self.text_element("bel:version", &[], &header.version)?;
        self.optional_text("bel:copyright", header.copyright.as_deref())?;
        self.optional_text("bel:contactInfo", header.contact_info.as_deref())?;
        self.list("bel:authorGroup", "bel:author", &header.authors)?;
        self.list("bel:licenseGroup", "bel:license", &header.licenses)?;
        self.end("bel:header")
    }

    fn write_namespaces(&mut self, namespaces: &[NamespaceEntry]) -> EngineResult<()> {
        if namespaces.is_empty() {
            return Ok(());
        }
        self.open("bel:namespaceGroup", &[])?;
        for ns in namespaces {
            match &ns.resource_location {
                Some(location) => self.empty(
                    "bel:namespace",
                    &[
                        ("bel:prefix", ns.prefix.as_str()),
                        ("bel:resourceLocation", location.as_str()),
                    ],
                )?,
                None => self.empty("bel:namespace", &[("bel:prefix", ns.prefix.as_str())])?,
            }
        }
        self.end("bel:namespaceGroup")
    }

    fn write_annotation_definitions(
        &mut self,
        definitions: &[AnnotationDefinitionEntry],
    ) -> EngineResult<()> {
        if definitions.is_empty() {
            return Ok(());
        }
        self.open("bel:annotationDefinitionGroup", &[])?;
        for definition in definitions {
            match definition {
                AnnotationDefinitionEntry::External { id, url } => {
                    let mut attributes = vec![("bel:id", id.as_str())];
                    if let Some(url) = url {
                        attributes.push(("bel:url", url.as_str()));
                    }
                    self.empty("bel:externalAnnotationDefinition", &attributes)?;
                }
                AnnotationDefinitionEntry::Internal {
                    id,
                    description,
                    values,
                } => {
                    self.open("bel:internalAnnotationDefinition", &[("bel:id", id.as_str())])?;
                    self.optional_text("bel:description", description.as_deref())?;
                    self.list("bel:listAnnotation", "bel:listValue", values)?;
                    self.end("bel:internalAnnotationDefinition")?;
                }
            }
        }
        self.end("bel:annotationDefinitionGroup")
    }

    fn write_segment(&mut self, segment: &SegmentTree) -> EngineResult<()> {
        self.open("bel:statementGroup", &[])?;
        self.open("bel:annotationGroup", &[])?;
        self.citation(&segment.citation)?;
        self.end("bel:annotationGroup")?;
        for group in &segment.groups {
            self.open("bel:statementGroup", &[])?;
            self.open("bel:annotationGroup", &[])?;
            self.text_element("bel:evidence", &[], &group.evidence)?;
            self.annotations(&group.annotations)?;
            self.end("bel:annotationGroup")?;
            for statement in &group.statements {
                self.statement(statement)?;
            }
            self.end("bel:statementGroup")?;
        }
        for statement in &segment.statements {
            self.statement(statement)?;
        }
        self.end("bel:statementGroup")
    }

    fn close(&mut self) -> EngineResult<()> {
        self.end("bel:document")?;
        self.writer.get_mut().flush()?;
        Ok(())
    }
}
