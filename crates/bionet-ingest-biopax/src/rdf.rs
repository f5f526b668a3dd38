//! RDF/XML triples via `sophia`, reduced to plain strings.
//!
//! Terms are read back from their N-Triples display form, which keeps this
//! module independent of sophia's term API:
//!
//! - `<iri>` -> [`RdfNode::Iri`]
//! - `_:label` -> [`RdfNode::Blank`]
//! - `"lexical"` (with optional `@lang` / `^^<datatype>`) -> [`RdfObject::Literal`]

use bionet_core::{EngineError, EngineResult};
use sophia::api::prelude::*;
use sophia::api::triple::Triple as _;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfNode {
    Iri(String),
    Blank(String),
}

impl RdfNode {
    /// Token used to reference this resource inside one document.
    pub fn token(&self) -> String {
        match self {
            RdfNode::Iri(iri) => iri.clone(),
            RdfNode::Blank(label) => format!("_:{label}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RdfObject {
    Node(RdfNode),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Triple {
    pub subject: RdfNode,
    pub predicate: String,
    pub object: RdfObject,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TripleSinkError(String);

/// Fragment or last path segment of an IRI.
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}

fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn parse_term_display(term: &str) -> Result<RdfObject, TripleSinkError> {
    let s = term.trim();
    if let Some(iri) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(RdfObject::Node(RdfNode::Iri(iri.to_string())));
    }
    if let Some(label) = s.strip_prefix("_:") {
        return Ok(RdfObject::Node(RdfNode::Blank(label.to_string())));
    }
    if s.starts_with('"') {
        let mut escaped = false;
        let end = s.char_indices().skip(1).find_map(|(i, ch)| {
            let closes = ch == '"' && !escaped;
            escaped = ch == '\\' && !escaped;
            closes.then_some(i)
        });
        let Some(end) = end else {
            return Err(TripleSinkError(format!("unterminated literal: {s}")));
        };
        // Language tags and datatypes are not kept: BioPAX literals land as text.
        return Ok(RdfObject::Literal(unescape_literal(&s[1..end])));
    }
    Err(TripleSinkError(format!("unsupported RDF term form: {s}")))
}

fn parse_node_display(term: &str) -> Result<RdfNode, TripleSinkError> {
    match parse_term_display(term)? {
        RdfObject::Node(node) => Ok(node),
        RdfObject::Literal(_) => Err(TripleSinkError(format!("expected a resource, got {term}"))),
    }
}

/// Every triple of an RDF/XML document, in parser order.
pub fn read_triples(bytes: &[u8]) -> EngineResult<Vec<Triple>> {
    let reader = std::io::BufReader::new(std::io::Cursor::new(bytes));
    let mut out = Vec::new();
    let mut parser = sophia::xml::parser::parse_bufread(reader);
    parser
        .try_for_each_triple(|t| -> Result<(), TripleSinkError> {
            let subject = parse_node_display(&t.s().to_string())?;
            let RdfNode::Iri(predicate) = parse_node_display(&t.p().to_string())? else {
                return Ok(());
            };
            let object = parse_term_display(&t.o().to_string())?;
            out.push(Triple {
                subject,
                predicate,
                object,
            });
            Ok(())
        })
        .map_err(|e| EngineError::Rdf(format!("failed to parse RDF/XML: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms_are_recognised() {
        assert_eq!(
            parse_term_display("<http://x.org/a#B>").unwrap(),
            RdfObject::Node(RdfNode::Iri("http://x.org/a#B".to_string()))
        );
        assert_eq!(
            parse_term_display("_:n3").unwrap(),
            RdfObject::Node(RdfNode::Blank("n3".to_string()))
        );
        assert_eq!(
            parse_term_display(r#""say \"hi\"\n"^^<http://www.w3.org/2001/XMLSchema#string>"#)
                .unwrap(),
            RdfObject::Literal("say \"hi\"\n".to_string())
        );
        assert_eq!(
            parse_term_display(r#""Zelle"@de"#).unwrap(),
            RdfObject::Literal("Zelle".to_string())
        );
        assert!(parse_term_display("\"open").is_err());
    }

    #[test]
    fn local_names_split_on_fragment_or_path() {
        assert_eq!(local_name("http://www.biopax.org/release/biopax-level3.owl#Protein"), "Protein");
        assert_eq!(local_name("http://example.org/things/P1"), "P1");
        assert_eq!(local_name("plain"), "plain");
    }
}
