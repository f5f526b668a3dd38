//! Small element tree over `quick-xml` events for the XML-based readers.
//!
//! Element and attribute names are kept qualified (`bel:statement`); lookups
//! go by local name so documents may use any prefix.

use bionet_core::{EngineError, EngineResult, SourceLocation};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
    /// 1-based line of the start tag.
    pub line: usize,
}

fn local(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

impl XmlElement {
    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    pub fn is(&self, local_name: &str) -> bool {
        self.local_name() == local_name
    }

    /// Attribute by local name (`bel:function` matches `function`).
    pub fn attr(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| !k.starts_with("xmlns") && local(k) == local_name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute by exact qualified name.
    pub fn qualified_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, local_name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.is(local_name))
    }

    pub fn children_named<'a>(
        &'a self,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.is(local_name))
    }

    /// Trimmed text of a child element, if present and non-empty.
    pub fn child_text(&self, local_name: &str) -> Option<String> {
        self.child(local_name)
            .map(|c| c.text.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    pub fn location(&self) -> Option<SourceLocation> {
        Some(SourceLocation::Line(self.line))
    }

    /// `prefix -> uri` for every `xmlns:prefix` declaration on this element.
    pub fn namespace_declarations(&self) -> Vec<(String, String)> {
        self.attributes
            .iter()
            .filter_map(|(k, v)| k.strip_prefix("xmlns:").map(|p| (p.to_string(), v.clone())))
            .collect()
    }
}

fn line_at(bytes: &[u8], position: usize) -> usize {
    let end = position.min(bytes.len());
    bytes[..end].iter().filter(|b| **b == b'\n').count() + 1
}

fn start_element(bytes: &[u8], position: usize, start: &BytesStart<'_>) -> EngineResult<XmlElement> {
    let line = line_at(bytes, position);
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| EngineError::xml(e, Some(SourceLocation::Line(line))))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| EngineError::xml(e, Some(SourceLocation::Line(line))))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
        line,
    })
}

/// Root element only (attributes, no children); stops at the first start tag.
pub fn parse_root(bytes: &[u8]) -> EngineResult<XmlElement> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);
    let mut buf = Vec::new();
    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| EngineError::xml(e, Some(SourceLocation::Line(line_at(bytes, position)))))?;
        match event {
            Event::Start(start) | Event::Empty(start) => {
                return start_element(bytes, reader.buffer_position(), &start);
            }
            Event::Eof => return Err(EngineError::xml("document has no root element", None)),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse a whole document into its root element.
pub fn parse_tree(bytes: &[u8]) -> EngineResult<XmlElement> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| EngineError::xml(e, Some(SourceLocation::Line(line_at(bytes, position)))))?;
        let end = reader.buffer_position();
        match event {
            Event::Start(start) => {
                stack.push(start_element(bytes, end, &start)?);
            }
            Event::Empty(start) => {
                let element = start_element(bytes, end, &start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| EngineError::xml(e, Some(SourceLocation::Line(current.line))))?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(EngineError::xml(
                        "unbalanced end tag",
                        Some(SourceLocation::Line(line_at(bytes, position))),
                    ));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(EngineError::xml(
            format!("unclosed element <{}>", open.name),
            open.location(),
        ));
    }
    root.ok_or_else(|| EngineError::xml("document has no root element", None))
}
