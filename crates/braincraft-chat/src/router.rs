//! Deterministic per-turn routing.
//!
//! Decides whether a user turn is a plain conversational message, a request
//! for a new diagram, or feedback on the diagram already in the session.

use std::sync::LazyLock;

use regex::Regex;

use crate::capability::Capability;

// =============================================================================
// Compiled regex sets (compiled once, reused across calls)
// =============================================================================

struct RoutePatterns {
    refine: Vec<Regex>,
    generate: Vec<Regex>,
}

static ROUTE_PATTERNS: LazyLock<RoutePatterns> = LazyLock::new(|| {
    let mk = |pats: &[&str]| -> Vec<Regex> {
        pats.iter()
            .map(|p| Regex::new(p).expect("Invalid route regex"))
            .collect()
    };

    RoutePatterns {
        // Only consulted when the session already holds a diagram.
        refine: mk(&[
            r"(?i)\b(?:change|modify|update|refine|tweak|adjust|improve)\b",
            r"(?i)\b(?:rename|remove|delete|drop|replace|swap|move)\b",
            r"(?i)\badd\b",
            r"(?i)\bfix\b",
            r"(?i)\bmake\s+(?:it|the|them|this)\b",
            r"(?i)\binstead\b",
            r"(?i)\b(?:connect|link)\b",
            r"(?i)\b(?:simplify|expand)\b",
        ]),
        generate: mk(&[
            r"(?i)\bdiagrams?\b",
            r"(?i)\bflow\s?charts?\b",
            r"(?i)\bsequence\b",
            r"(?i)\b(?:chart|graph)s?\b",
            r"(?i)\bdraw\b",
            r"(?i)\bvisuali[sz]e\b",
            r"(?i)\bmap\s+out\b",
            r"(?i)\bmind\s?maps?\b",
            r"(?i)\b(?:gantt|timeline|roadmap)\b",
            r"(?i)\bpie\b",
            r"(?i)\b(?:er|entity[-\s]relationship)\b",
            r"(?i)\bmermaid\b",
        ]),
    }
});

/// Outcome of routing one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnRoute {
    /// Answer under the agent instruction alone.
    Converse,
    /// Run a diagram capability with the conversation as context.
    Capability(Capability),
}

impl TurnRoute {
    pub fn label(&self) -> &'static str {
        match self {
            TurnRoute::Converse => "converse",
            TurnRoute::Capability(c) => c.name(),
        }
    }
}

/// Rule-based turn router.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnRouter;

impl TurnRouter {
    pub fn new() -> Self {
        Self
    }

    /// Route a user message.
    ///
    /// Checks in order: Refine (only with a current diagram), Generate,
    /// then falls back to Converse.
    pub fn route(&self, message: &str, current_diagram: Option<&str>) -> TurnRoute {
        let pats = &*ROUTE_PATTERNS;

        if let Some(code) = current_diagram {
            if pats.refine.iter().any(|re| re.is_match(message)) {
                return TurnRoute::Capability(Capability::Refine {
                    current_code: code.to_string(),
                    feedback: message.to_string(),
                });
            }
        }

        if pats.generate.iter().any(|re| re.is_match(message)) {
            return TurnRoute::Capability(Capability::Generate {
                description: message.to_string(),
            });
        }

        TurnRoute::Converse
    }
}
