//! Diagram type detection from Mermaid source.

use crate::types::DiagramType;

/// Leading keywords in priority order. Anything else is a flowchart.
const PREFIXES: &[(&str, DiagramType)] = &[
    ("sequenceDiagram", DiagramType::Sequence),
    ("classDiagram", DiagramType::Class),
    ("erDiagram", DiagramType::EntityRelationship),
    ("gantt", DiagramType::Gantt),
    ("pie", DiagramType::Pie),
];

/// Classify diagram code by its leading keyword (case-sensitive).
///
/// Total: empty or malformed code yields [`DiagramType::Flowchart`].
pub fn classify(diagram_code: &str) -> DiagramType {
    let code = diagram_code.trim();
    PREFIXES
        .iter()
        .find(|(prefix, _)| code.starts_with(prefix))
        .map(|(_, kind)| *kind)
        .unwrap_or_default()
}
