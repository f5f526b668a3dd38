use bionet_core::{EngineError, EngineResult, SourceLocation};
use regex::Regex;
use std::sync::OnceLock;

pub const EDGE_HEADER: &str = "PARTICIPANT_A";
pub const NODE_HEADER: &str = "PARTICIPANT";
const PUBMED_COLUMN: &str = "INTERACTION_PUBMED_ID";
const UNIFICATION_COLUMN: &str = "UNIFICATION_XREF";
const RELATIONSHIP_COLUMN: &str = "RELATIONSHIP_XREF";

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"))
}

fn pubmed_id() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?i:pubmed:)?(\d+)$").expect("static pattern"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum SifElement {
    /// `source predicate target [target ...]`; simple SIF fans out to every target.
    Interaction {
        line: usize,
        source: String,
        predicate: String,
        targets: Vec<String>,
        properties: Vec<(String, String)>,
        pubmed_ids: Vec<String>,
    },
    /// A node row (extended SIF) or a lone node name (simple SIF).
    Participant {
        line: usize,
        name: String,
        properties: Vec<(String, String)>,
        aliases: Vec<String>,
        related: Vec<String>,
    },
}

fn malformed(line: usize, reason: impl Into<String>) -> EngineError {
    EngineError::malformed("sif row", reason, Some(SourceLocation::Line(line)))
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(';')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn read_simple(line: usize, text: &str) -> EngineResult<SifElement> {
    let columns: Vec<&str> = if text.contains('\t') {
        text.split('\t').map(str::trim).filter(|c| !c.is_empty()).collect()
    } else {
        whitespace().split(text.trim()).collect()
    };
    match columns.as_slice() {
        [name] => Ok(SifElement::Participant {
            line,
            name: name.to_string(),
            properties: Vec::new(),
            aliases: Vec::new(),
            related: Vec::new(),
        }),
        [_, _] => Err(malformed(line, "interaction has no target")),
        [source, predicate, targets @ ..] => Ok(SifElement::Interaction {
            line,
            source: source.to_string(),
            predicate: predicate.to_string(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
            properties: Vec::new(),
            pubmed_ids: Vec::new(),
        }),
        [] => Err(malformed(line, "empty row")),
    }
}

fn read_edge_row(line: usize, header: &[&str], text: &str) -> EngineResult<SifElement> {
    let columns: Vec<&str> = text.split('\t').map(str::trim).collect();
    let [source, predicate, target, rest @ ..] = columns.as_slice() else {
        return Err(malformed(line, "interaction row needs three columns"));
    };
    if source.is_empty() || predicate.is_empty() || target.is_empty() {
        return Err(malformed(line, "interaction row has an empty participant or type"));
    }
    let mut properties = Vec::new();
    let mut pubmed_ids = Vec::new();
    for (name, value) in header.iter().skip(3).zip(rest) {
        if value.is_empty() {
            tracing::trace!(line, column = *name, "empty interaction column");
            continue;
        }
        if *name == PUBMED_COLUMN {
            for id in split_list(value) {
                match pubmed_id().captures(&id) {
                    Some(caps) => pubmed_ids.push(caps[1].to_string()),
                    None => return Err(malformed(line, format!("bad pubmed id `{id}`"))),
                }
            }
        } else {
            properties.push((name.to_string(), value.to_string()));
        }
    }
    Ok(SifElement::Interaction {
        line,
        source: source.to_string(),
        predicate: predicate.to_string(),
        targets: vec![target.to_string()],
        properties,
        pubmed_ids,
    })
}

fn read_node_row(line: usize, header: &[&str], text: &str) -> EngineResult<SifElement> {
    let columns: Vec<&str> = text.split('\t').map(str::trim).collect();
    let Some((name, rest)) = columns.split_first().filter(|(n, _)| !n.is_empty()) else {
        return Err(malformed(line, "participant row has no name"));
    };
    let mut properties = Vec::new();
    let mut aliases = Vec::new();
    let mut related = Vec::new();
    for (column, value) in header.iter().skip(1).zip(rest) {
        match *column {
            _ if value.is_empty() => {}
            UNIFICATION_COLUMN => aliases.extend(split_list(value)),
            RELATIONSHIP_COLUMN => related.extend(split_list(value)),
            _ => properties.push((column.to_string(), value.to_string())),
        }
    }
    Ok(SifElement::Participant {
        line,
        name: name.to_string(),
        properties,
        aliases,
        related,
    })
}

enum Section<'a> {
    Simple,
    Edges(Vec<&'a str>),
    Nodes(Vec<&'a str>),
}

/// Parse SIF text. A first row starting with `PARTICIPANT_A` selects the
/// extended format, whose node section starts at a `PARTICIPANT` header row.
pub fn read_document(bytes: &[u8]) -> EngineResult<Vec<SifElement>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| EngineError::malformed("sif", format!("not UTF-8: {e}"), None))?;

    let mut out = Vec::new();
    let mut section: Option<Section<'_>> = None;
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let row = raw.trim_end_matches('\r');
        if row.trim().is_empty() || row.starts_with('#') {
            continue;
        }
        let first = row.split('\t').next().unwrap_or_default().trim();
        if first == EDGE_HEADER {
            tracing::debug!(line, "extended SIF interaction section");
            section = Some(Section::Edges(row.split('\t').map(str::trim).collect()));
            continue;
        }
        if first == NODE_HEADER {
            tracing::debug!(line, "extended SIF participant section");
            section = Some(Section::Nodes(row.split('\t').map(str::trim).collect()));
            continue;
        }
        let current = section.get_or_insert(Section::Simple);
        out.push(match current {
            Section::Simple => read_simple(line, row)?,
            Section::Edges(header) => read_edge_row(line, header, row)?,
            Section::Nodes(header) => read_node_row(line, header, row)?,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_rows_fan_out_and_allow_lone_nodes() {
        let elements = read_document(b"A pp B C\nD\n").unwrap();
        assert_eq!(elements.len(), 2);
        let SifElement::Interaction { targets, .. } = &elements[0] else {
            panic!("expected interaction");
        };
        assert_eq!(targets, &vec!["B".to_string(), "C".to_string()]);
        assert!(matches!(&elements[1], SifElement::Participant { name, .. } if name == "D"));
    }

    #[test]
    fn extended_sections_are_split_by_header() {
        let doc = "PARTICIPANT_A\tINTERACTION_TYPE\tPARTICIPANT_B\tINTERACTION_DATA_SOURCE\tINTERACTION_PUBMED_ID\n\
                   P1\tcontrols-state-change-of\tP2\tReactome\tpubmed:11;22\n\
                   \n\
                   PARTICIPANT\tPARTICIPANT_TYPE\tPARTICIPANT_NAME\tUNIFICATION_XREF\tRELATIONSHIP_XREF\n\
                   P1\tProteinReference\tAKT1\tUniProt:P31749\tRefSeq:NP_1;HGNC:391\n";
        let elements = read_document(doc.as_bytes()).unwrap();
        let SifElement::Interaction {
            properties,
            pubmed_ids,
            ..
        } = &elements[0]
        else {
            panic!("expected interaction");
        };
        assert_eq!(pubmed_ids, &vec!["11".to_string(), "22".to_string()]);
        assert_eq!(
            properties,
            &vec![("INTERACTION_DATA_SOURCE".to_string(), "Reactome".to_string())]
        );
        let SifElement::Participant {
            line,
            aliases,
            related,
            properties,
            ..
        } = &elements[1]
        else {
            panic!("expected participant");
        };
        assert_eq!(*line, 5);
        assert_eq!(aliases, &vec!["UniProt:P31749".to_string()]);
        assert_eq!(related.len(), 2);
        assert_eq!(properties.len(), 2);
    }

    #[test]
    fn predicate_without_target_is_malformed() {
        let err = read_document(b"A\tpp\n").unwrap_err();
        assert!(matches!(
            err,
            EngineError::MalformedSourceElement {
                location: Some(SourceLocation::Line(1)),
                ..
            }
        ));
    }
}
