use bionet_core::{EngineError, EngineResult, SourceLocation};
use bionet_ingest::xml::{parse_tree, XmlElement};

// ============================================================================
// Element set
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XbelHeader {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub copyright: Option<String>,
    pub contact_info: Option<String>,
    pub authors: Vec<String>,
    pub licenses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationDefinition {
    Internal {
        id: String,
        description: Option<String>,
        usage: Option<String>,
        values: Vec<String>,
    },
    External {
        id: String,
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitationRef {
    pub citation_type: Option<String>,
    pub name: Option<String>,
    pub reference: Option<String>,
    pub authors: Vec<String>,
    pub comment: Option<String>,
}

/// Citation, evidence and annotations in force for a statement, after
/// inheritance from enclosing groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupContext {
    pub citation: Option<CitationRef>,
    pub evidence: Option<String>,
    pub annotations: Vec<(String, String)>,
}

impl GroupContext {
    fn nested(&self, group: &XmlElement) -> GroupContext {
        let mut context = self.clone();
        if let Some(annotations) = group.child("annotationGroup") {
            if let Some(citation) = annotations.child("citation") {
                context.citation = Some(read_citation(citation));
            }
            if let Some(evidence) = annotations.child_text("evidence") {
                context.evidence = Some(evidence);
            }
            for (key, value) in read_annotations(annotations) {
                context.annotations.retain(|(k, _)| *k != key);
                context.annotations.push((key, value));
            }
        }
        context
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TermNode {
    Parameter { ns: Option<String>, value: String },
    Function { function: String, args: Vec<TermNode> },
}

/// Backslash-escape backslashes and every char in `special`.
fn escape(text: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl TermNode {
    /// BEL-style rendering, used as the term's local reference token.
    ///
    /// Prefixes and values are escaped, so distinct terms never share a token.
    pub fn canonical(&self) -> String {
        match self {
            TermNode::Parameter { ns: Some(ns), value } => format!(
                "{}:\"{}\"",
                escape(ns, &['"', ':', '(', ')', ',']),
                escape(value, &['"'])
            ),
            TermNode::Parameter { ns: None, value } => format!("\"{}\"", escape(value, &['"'])),
            TermNode::Function { function, args } => {
                let args: Vec<String> = args.iter().map(TermNode::canonical).collect();
                format!("{function}({})", args.join(","))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectNode {
    Term(TermNode),
    Statement(Box<StatementNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementNode {
    pub relationship: Option<String>,
    pub annotations: Vec<(String, String)>,
    pub subject: TermNode,
    pub object: Option<ObjectNode>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XbelStatement {
    /// Structural path, unique within the document.
    pub path: String,
    pub context: GroupContext,
    pub statement: StatementNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XbelElement {
    Header(XbelHeader),
    Namespace {
        prefix: String,
        resource_location: Option<String>,
    },
    AnnotationDefinition(AnnotationDefinition),
    Statement(XbelStatement),
}

// ============================================================================
// Reader
// ============================================================================

fn malformed(element: &XmlElement, reason: impl Into<String>) -> EngineError {
    EngineError::malformed(element.local_name(), reason, element.location())
}

fn read_header(header: &XmlElement) -> XbelHeader {
    XbelHeader {
        name: header.child_text("name"),
        description: header.child_text("description"),
        version: header.child_text("version"),
        copyright: header.child_text("copyright"),
        contact_info: header.child_text("contactInfo"),
        authors: header
            .child("authorGroup")
            .map(|g| g.children_named("author").map(|a| a.text.trim().to_string()).collect())
            .unwrap_or_default(),
        licenses: header
            .child("licenseGroup")
            .map(|g| g.children_named("license").map(|l| l.text.trim().to_string()).collect())
            .unwrap_or_default(),
    }
}

fn read_citation(citation: &XmlElement) -> CitationRef {
    CitationRef {
        citation_type: citation.attr("type").map(str::to_string),
        name: citation.child_text("name"),
        reference: citation.child_text("reference"),
        authors: citation
            .child("authorGroup")
            .map(|g| g.children_named("author").map(|a| a.text.trim().to_string()).collect())
            .unwrap_or_default(),
        comment: citation.child_text("comment"),
    }
}

fn read_annotations(group: &XmlElement) -> Vec<(String, String)> {
    group
        .children_named("annotation")
        .filter_map(|a| {
            a.attr("refID")
                .map(|key| (key.to_string(), a.text.trim().to_string()))
        })
        .collect()
}

fn read_annotation_definition(def: &XmlElement) -> EngineResult<AnnotationDefinition> {
    let id = def
        .attr("id")
        .ok_or_else(|| malformed(def, "annotation definition has no id"))?
        .to_string();
    if def.is("externalAnnotationDefinition") {
        return Ok(AnnotationDefinition::External {
            id,
            url: def.attr("url").map(str::to_string),
        });
    }
    let values = def
        .child("listAnnotation")
        .map(|list| {
            list.children_named("listValue")
                .map(|v| v.text.trim().to_string())
                .collect()
        })
        .unwrap_or_default();
    Ok(AnnotationDefinition::Internal {
        id,
        description: def.child_text("description"),
        usage: def.child_text("usage"),
        values,
    })
}

fn read_term(element: &XmlElement) -> EngineResult<TermNode> {
    if element.is("parameter") {
        return Ok(TermNode::Parameter {
            ns: element.attr("ns").map(str::to_string),
            value: element.text.trim().to_string(),
        });
    }
    if !element.is("term") {
        return Err(malformed(element, "expected <term> or <parameter>"));
    }
    let function = element
        .attr("function")
        .ok_or_else(|| malformed(element, "term has no function"))?
        .to_string();
    let args = element
        .children
        .iter()
        .map(read_term)
        .collect::<EngineResult<Vec<_>>>()?;
    Ok(TermNode::Function { function, args })
}

fn single_child<'a>(slot: &'a XmlElement) -> EngineResult<&'a XmlElement> {
    match slot.children.as_slice() {
        [only] => Ok(only),
        _ => Err(malformed(slot, "expected exactly one child")),
    }
}

fn read_statement(element: &XmlElement) -> EngineResult<StatementNode> {
    let subject_slot = element
        .child("subject")
        .ok_or_else(|| malformed(element, "statement has no subject"))?;
    let subject = read_term(single_child(subject_slot)?)?;

    let object = match element.child("object") {
        Some(slot) => {
            let inner = single_child(slot)?;
            if inner.is("statement") {
                Some(ObjectNode::Statement(Box::new(read_statement(inner)?)))
            } else {
                Some(ObjectNode::Term(read_term(inner)?))
            }
        }
        None => None,
    };

    let relationship = element.attr("relationship").map(str::to_string);
    match (&relationship, &object) {
        (Some(_), None) => return Err(malformed(element, "relationship without object")),
        (None, Some(_)) => return Err(malformed(element, "object without relationship")),
        _ => {}
    }

    Ok(StatementNode {
        relationship,
        annotations: element
            .child("annotationGroup")
            .map(read_annotations)
            .unwrap_or_default(),
        subject,
        object,
        line: element.line,
    })
}

fn read_group(
    group: &XmlElement,
    path: &str,
    inherited: &GroupContext,
    out: &mut Vec<XbelElement>,
) -> EngineResult<()> {
    let context = inherited.nested(group);
    let mut statements = 0usize;
    let mut groups = 0usize;
    for child in &group.children {
        if child.is("statement") {
            out.push(XbelElement::Statement(XbelStatement {
                path: format!("{path}/statement[{statements}]"),
                context: context.clone(),
                statement: read_statement(child)?,
            }));
            statements += 1;
        } else if child.is("statementGroup") {
            read_group(child, &format!("{path}/statementGroup[{groups}]"), &context, out)?;
            groups += 1;
        }
    }
    Ok(())
}

/// Parse an XBEL document into its flattened element sequence.
pub fn read_document(bytes: &[u8]) -> EngineResult<Vec<XbelElement>> {
    let root = parse_tree(bytes)?;
    if !root.is("document") {
        return Err(EngineError::malformed(
            root.local_name(),
            "XBEL root element must be <document>",
            Some(SourceLocation::Line(root.line)),
        ));
    }

    let mut out = Vec::new();
    let mut groups = 0usize;
    for child in &root.children {
        match child.local_name() {
            "header" => out.push(XbelElement::Header(read_header(child))),
            "namespaceGroup" => {
                for ns in child.children_named("namespace") {
                    let prefix = ns
                        .attr("prefix")
                        .ok_or_else(|| malformed(ns, "namespace has no prefix"))?;
                    out.push(XbelElement::Namespace {
                        prefix: prefix.to_string(),
                        resource_location: ns.attr("resourceLocation").map(str::to_string),
                    });
                }
            }
            "annotationDefinitionGroup" => {
                for def in &child.children {
                    out.push(XbelElement::AnnotationDefinition(read_annotation_definition(def)?));
                }
            }
            "statementGroup" => {
                read_group(
                    child,
                    &format!("statementGroup[{groups}]"),
                    &GroupContext::default(),
                    &mut out,
                )?;
                groups += 1;
            }
            other => {
                tracing::debug!(element = other, line = child.line, "skipping unsupported XBEL element")
            }
        }
    }
    Ok(out)
}
