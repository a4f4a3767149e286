//! Pulls a fenced Mermaid block out of free-form model text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::classify::classify;
use crate::types::DiagramResult;

/// Opening fence tagged `mermaid`, lazy body, closing fence on its own line.
static MERMAID_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```mermaid\r?\n([\s\S]*?)\r?\n```").expect("mermaid block regex is valid")
});

/// Extract the first Mermaid block from `raw_text`.
///
/// Returns `None` when the text holds no tagged block; that is a plain
/// conversational reply, not an error. The explanation is the text with the
/// matched block (and any identical copy of it) removed, trimmed.
pub fn extract(raw_text: &str) -> Option<DiagramResult> {
    let Some(caps) = MERMAID_BLOCK_RE.captures(raw_text) else {
        debug!("No mermaid block found in reply");
        return None;
    };
    let (Some(block), Some(body)) = (caps.get(0), caps.get(1)) else {
        return None;
    };

    let diagram_code = body.as_str().trim().to_string();
    let diagram_type = classify(&diagram_code);

    // Every verbatim copy of the block goes, not just the matched one.
    let explanation = raw_text.replace(block.as_str(), "").trim().to_string();

    debug!(
        diagram_type = %diagram_type,
        code_len = diagram_code.len(),
        explanation_len = explanation.len(),
        "Extracted mermaid block"
    );

    Some(DiagramResult {
        diagram_code,
        diagram_type,
        explanation,
    })
}
