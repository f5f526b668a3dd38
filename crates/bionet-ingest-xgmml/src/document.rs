use bionet_core::{EngineError, EngineResult, Property, PropertyValue, SourceLocation};
use bionet_ingest::xml::{parse_tree, XmlElement};
use regex::Regex;
use std::sync::OnceLock;

pub const INTERACTION_ATT: &str = "interaction";

fn truthy() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(1|true|yes)$").expect("static pattern"))
}

fn label_type() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^()]+)\)").expect("static pattern"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum XgmmlElement {
    Graph {
        label: Option<String>,
        properties: Vec<Property>,
    },
    Node {
        id: String,
        name: Option<String>,
        properties: Vec<Property>,
        line: usize,
    },
    Edge {
        source: String,
        target: String,
        predicate: String,
        properties: Vec<Property>,
        line: usize,
    },
}

fn malformed(element: &XmlElement, reason: impl Into<String>) -> EngineError {
    EngineError::malformed(element.local_name(), reason, element.location())
}

/// `\t` and `\n` escape sequences in string values.
fn unescape(value: &str) -> String {
    value.replace("\\t", "\t").replace("\\n", "\n")
}

fn att_value(att: &XmlElement) -> EngineResult<Option<PropertyValue>> {
    let kind = att.attr("type").unwrap_or("string");
    if kind == "list" {
        let items = att
            .children_named("att")
            .map(att_value)
            .collect::<EngineResult<Vec<_>>>()?;
        return Ok(Some(PropertyValue::List(items.into_iter().flatten().collect())));
    }
    let Some(raw) = att.attr("value") else {
        return Ok(None);
    };
    let value = match kind {
        "integer" => PropertyValue::Integer(
            raw.trim()
                .parse()
                .map_err(|_| malformed(att, format!("`{raw}` is not an integer")))?,
        ),
        "real" => PropertyValue::Real(
            raw.trim()
                .parse()
                .map_err(|_| malformed(att, format!("`{raw}` is not a real")))?,
        ),
        "boolean" => PropertyValue::Boolean(truthy().is_match(raw.trim())),
        _ => PropertyValue::Text(unescape(raw)),
    };
    Ok(Some(value))
}

/// Typed properties from the `att` children of `element`. Atts without a
/// name or a value (metadata blobs) are skipped.
fn atts(element: &XmlElement) -> EngineResult<Vec<Property>> {
    let mut out = Vec::new();
    for att in element.children_named("att") {
        let Some(name) = att.attr("name") else {
            continue;
        };
        if let Some(value) = att_value(att)? {
            out.push(Property {
                name: name.to_string(),
                value,
            });
        }
    }
    Ok(out)
}

fn read_node(node: &XmlElement) -> EngineResult<XgmmlElement> {
    if node.qualified_attr("xlink:href").is_some() || node.attr("href").is_some() {
        return Err(malformed(node, "node references (xlink:href) are not supported"));
    }
    let id = node
        .attr("id")
        .ok_or_else(|| malformed(node, "node has no id"))?;
    if node.child("graphics").is_some() {
        tracing::debug!(node = id, "skipping node graphics");
    }
    Ok(XgmmlElement::Node {
        id: id.to_string(),
        name: node.attr("label").or_else(|| node.attr("name")).map(str::to_string),
        properties: atts(node)?,
        line: node.line,
    })
}

fn read_edge(edge: &XmlElement) -> EngineResult<XgmmlElement> {
    let source = edge
        .attr("source")
        .ok_or_else(|| malformed(edge, "edge has no source"))?;
    let target = edge
        .attr("target")
        .ok_or_else(|| malformed(edge, "edge has no target"))?;
    let mut properties = atts(edge)?;

    let from_att = properties
        .iter()
        .position(|p| p.name == INTERACTION_ATT)
        .map(|i| properties.remove(i).value.to_text());
    let from_label = || {
        edge.attr("label")
            .and_then(|l| label_type().captures(l))
            .map(|caps| caps[1].trim().to_string())
    };
    let predicate = from_att
        .or_else(from_label)
        .unwrap_or_else(|| "interacts with".to_string());

    Ok(XgmmlElement::Edge {
        source: source.to_string(),
        target: target.to_string(),
        predicate,
        properties,
        line: edge.line,
    })
}

/// Parse an XGMML document: the graph header, then nodes and edges in
/// document order.
pub fn read_document(bytes: &[u8]) -> EngineResult<Vec<XgmmlElement>> {
    let root = parse_tree(bytes)?;
    if !root.is("graph") {
        return Err(EngineError::malformed(
            root.local_name(),
            "XGMML root element must be <graph>",
            Some(SourceLocation::Line(root.line)),
        ));
    }

    let mut out = vec![XgmmlElement::Graph {
        label: root.attr("label").map(str::to_string),
        properties: atts(&root)?,
    }];
    for child in &root.children {
        match child.local_name() {
            "node" => out.push(read_node(child)?),
            "edge" => out.push(read_edge(child)?),
            "graphics" => tracing::debug!("skipping graph graphics"),
            _ => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn att_types_are_parsed() {
        let doc = br#"<graph label="g">
          <att name="n" value="42" type="integer"/>
          <att name="r" value="0.5" type="real"/>
          <att name="b" value="YES" type="boolean"/>
          <att name="s" value="a\tb" type="string"/>
          <att name="l" type="list"><att value="x" type="string"/><att value="2" type="integer"/></att>
          <att name="metadata"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"/></att>
        </graph>"#;
        let elements = read_document(doc).unwrap();
        let XgmmlElement::Graph { label, properties } = &elements[0] else {
            panic!("graph first");
        };
        assert_eq!(label.as_deref(), Some("g"));
        let values: Vec<&PropertyValue> = properties.iter().map(|p| &p.value).collect();
        assert_eq!(
            values,
            vec![
                &PropertyValue::Integer(42),
                &PropertyValue::Real(0.5),
                &PropertyValue::Boolean(true),
                &PropertyValue::Text("a\tb".to_string()),
                &PropertyValue::List(vec![
                    PropertyValue::Text("x".to_string()),
                    PropertyValue::Integer(2)
                ]),
            ]
        );
    }

    #[test]
    fn predicate_falls_back_to_label_then_default() {
        let doc = br#"<graph>
          <edge source="1" target="2"><att name="interaction" value="pp"/></edge>
          <edge source="1" target="2" label="A (binds) B"/>
          <edge source="1" target="2"/>
        </graph>"#;
        let predicates: Vec<String> = read_document(doc)
            .unwrap()
            .into_iter()
            .filter_map(|e| match e {
                XgmmlElement::Edge {
                    predicate,
                    properties,
                    ..
                } => {
                    assert!(properties.is_empty());
                    Some(predicate)
                }
                _ => None,
            })
            .collect();
        assert_eq!(predicates, vec!["pp", "binds", "interacts with"]);
    }

    #[test]
    fn bad_integer_and_xlink_nodes_are_malformed() {
        let err = read_document(br#"<graph><att name="n" value="x" type="integer"/></graph>"#)
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedSourceElement { .. }));

        let err = read_document(
            br##"<graph xmlns:xlink="http://www.w3.org/1999/xlink"><node id="1" xlink:href="#2"/></graph>"##,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::MalformedSourceElement { .. }));
    }
}
