//! Decision source identification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The rule that produced a rollout decision.
///
/// This names the step of resolution that decided, not a ranking between
/// sources. A disabled decision always reports [`DecisionSource::Global`],
/// even for a canary tenant that was force-disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    /// A local development/testing override pinned the surfaces.
    Override,
    /// The tenant is on the canary list and was enabled through it.
    Canary,
    /// Global configuration decided, including every disabled outcome.
    Global,
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionSource::Override => write!(f, "override"),
            DecisionSource::Canary => write!(f, "canary"),
            DecisionSource::Global => write!(f, "global"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_display_matches_serde() {
        for source in [
            DecisionSource::Override,
            DecisionSource::Canary,
            DecisionSource::Global,
        ] {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{}\"", source));
        }
    }

    #[test]
    fn test_source_deserializes_lowercase() {
        let source: DecisionSource = serde_json::from_str("\"canary\"").unwrap();
        assert_eq!(source, DecisionSource::Canary);
        assert!(serde_json::from_str::<DecisionSource>("\"Canary\"").is_err());
    }
}
