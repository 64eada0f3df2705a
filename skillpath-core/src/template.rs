//! Assessment templates
//!
//! A template is the ordered round plan a session is created from, with
//! per-round policy flags. Templates are validated against the round
//! catalog before a session is built from them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{RoundCatalog, RoundId};
use crate::error::SessionError;

/// One round in a template, with its policy flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRound {
    /// Round identifier
    pub id: RoundId,
    /// Whether a candidate may skip this round
    #[serde(default)]
    pub skippable: bool,
}

/// Ordered round plan for an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentTemplate {
    /// Human-readable name
    pub name: String,
    /// Rounds in attempt order
    pub rounds: Vec<TemplateRound>,
}

impl AssessmentTemplate {
    /// Create an empty template with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rounds: Vec::new(),
        }
    }

    /// Append a mandatory round.
    #[must_use]
    pub fn with_round(mut self, id: RoundId) -> Self {
        self.rounds.push(TemplateRound {
            id,
            skippable: false,
        });
        self
    }

    /// Append a skippable round.
    #[must_use]
    pub fn with_skippable_round(mut self, id: RoundId) -> Self {
        self.rounds.push(TemplateRound {
            id,
            skippable: true,
        });
        self
    }

    /// Validate the template against a catalog.
    ///
    /// The plan must be non-empty, reference only registered rounds, and
    /// not repeat a round id (round states are keyed by id).
    pub fn validate(&self, catalog: &RoundCatalog) -> Result<(), SessionError> {
        if self.rounds.is_empty() {
            return Err(SessionError::InvalidTemplate(
                "template has no rounds".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for round in &self.rounds {
            if !catalog.contains(round.id) {
                return Err(SessionError::InvalidTemplate(format!(
                    "round {} is not in the catalog",
                    round.id
                )));
            }
            if !seen.insert(round.id) {
                return Err(SessionError::InvalidTemplate(format!(
                    "round {} appears more than once",
                    round.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_template_passes_validation() {
        let template = AssessmentTemplate::new("campus-drive")
            .with_round(RoundId::Aptitude)
            .with_skippable_round(RoundId::GroupDiscussion)
            .with_round(RoundId::Coding);

        assert!(template.validate(&RoundCatalog::standard()).is_ok());
    }

    #[test]
    fn empty_template_fails_validation() {
        let template = AssessmentTemplate::new("empty");

        let result = template.validate(&RoundCatalog::standard());

        assert!(matches!(result, Err(SessionError::InvalidTemplate(_))));
    }

    #[test]
    fn template_with_duplicate_round_fails_validation() {
        let template = AssessmentTemplate::new("dup")
            .with_round(RoundId::Coding)
            .with_round(RoundId::Coding);

        let result = template.validate(&RoundCatalog::standard());

        assert!(matches!(result, Err(SessionError::InvalidTemplate(_))));
    }

    #[test]
    fn template_referencing_unregistered_round_fails_validation() {
        let standard = RoundCatalog::standard();
        // Catalog that only offers the aptitude round
        let catalog =
            RoundCatalog::new(vec![standard.lookup(RoundId::Aptitude).unwrap().clone()]);
        let template = AssessmentTemplate::new("bad").with_round(RoundId::Coding);

        let result = template.validate(&catalog);

        assert!(matches!(result, Err(SessionError::InvalidTemplate(_))));
    }

    #[test]
    fn template_serialization_roundtrip() {
        let template = AssessmentTemplate::new("campus-drive")
            .with_round(RoundId::Aptitude)
            .with_skippable_round(RoundId::HrInterview);

        let json = serde_json::to_string(&template).unwrap();
        let parsed: AssessmentTemplate = serde_json::from_str(&json).unwrap();

        assert_eq!(template, parsed);
    }

    #[test]
    fn skippable_defaults_to_false_when_absent() {
        let json = r#"{"name":"t","rounds":[{"id":"aptitude"}]}"#;
        let template: AssessmentTemplate = serde_json::from_str(json).unwrap();
        assert!(!template.rounds[0].skippable);
    }
}
