//! Static registry of assessment rounds.
//!
//! The catalog maps a [`RoundId`] to its metadata. It is built once at
//! startup and never mutated afterwards, so it is safe to share behind an
//! `Arc` without locking.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Identifier for one assessment round type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundId {
    /// Cognitive aptitude test
    Aptitude,
    /// Soft skills assessment
    SoftSkills,
    /// Moderated group discussion
    GroupDiscussion,
    /// Technical multiple-choice test
    TechnicalMcq,
    /// Coding challenge
    Coding,
    /// Technical interview
    TechnicalInterview,
    /// HR interview
    HrInterview,
}

impl RoundId {
    /// All round identifiers, in the conventional plan order.
    pub const ALL: [RoundId; 7] = [
        RoundId::Aptitude,
        RoundId::SoftSkills,
        RoundId::GroupDiscussion,
        RoundId::TechnicalMcq,
        RoundId::Coding,
        RoundId::TechnicalInterview,
        RoundId::HrInterview,
    ];

    /// Convert to the wire/database string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aptitude => "aptitude",
            Self::SoftSkills => "soft_skills",
            Self::GroupDiscussion => "group_discussion",
            Self::TechnicalMcq => "technical_mcq",
            Self::Coding => "coding",
            Self::TechnicalInterview => "technical_interview",
            Self::HrInterview => "hr_interview",
        }
    }

    /// Parse from the string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "aptitude" => Some(Self::Aptitude),
            "soft_skills" => Some(Self::SoftSkills),
            "group_discussion" => Some(Self::GroupDiscussion),
            "technical_mcq" => Some(Self::TechnicalMcq),
            "coding" => Some(Self::Coding),
            "technical_interview" => Some(Self::TechnicalInterview),
            "hr_interview" => Some(Self::HrInterview),
            _ => None,
        }
    }

    /// Whether submissions for this round type carry a per-topic score
    /// breakdown. Only item-based rounds do; interviews and discussions
    /// produce a single score.
    #[must_use]
    pub fn has_topic_breakdown(&self) -> bool {
        matches!(self, Self::Aptitude | Self::TechnicalMcq | Self::Coding)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad category a round belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundCategory {
    Cognitive,
    Behavioral,
    Technical,
    Interview,
}

impl RoundCategory {
    /// Convert to the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cognitive => "cognitive",
            Self::Behavioral => "behavioral",
            Self::Technical => "technical",
            Self::Interview => "interview",
        }
    }
}

/// Metadata for one round type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundDefinition {
    /// Round identifier
    pub id: RoundId,
    /// Human-readable name
    pub display_name: String,
    /// Short description shown to candidates
    pub description: String,
    /// Expected time to complete, in minutes
    pub expected_duration_minutes: u32,
    /// Category for grouping on dashboards
    pub category: RoundCategory,
}

/// Immutable lookup table of round definitions.
#[derive(Debug, Clone)]
pub struct RoundCatalog {
    definitions: HashMap<RoundId, RoundDefinition>,
}

impl RoundCatalog {
    /// Build a catalog from explicit definitions.
    ///
    /// Later definitions with a duplicate id replace earlier ones.
    #[must_use]
    pub fn new(definitions: Vec<RoundDefinition>) -> Self {
        Self {
            definitions: definitions.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    /// The standard catalog with all seven round types registered.
    #[must_use]
    pub fn standard() -> Self {
        fn def(
            id: RoundId,
            display_name: &str,
            description: &str,
            expected_duration_minutes: u32,
            category: RoundCategory,
        ) -> RoundDefinition {
            RoundDefinition {
                id,
                display_name: display_name.to_string(),
                description: description.to_string(),
                expected_duration_minutes,
                category,
            }
        }

        Self::new(vec![
            def(
                RoundId::Aptitude,
                "Aptitude Test",
                "Timed quantitative, logical and verbal reasoning questions",
                60,
                RoundCategory::Cognitive,
            ),
            def(
                RoundId::SoftSkills,
                "Soft Skills Assessment",
                "Situational judgement and communication exercises",
                30,
                RoundCategory::Behavioral,
            ),
            def(
                RoundId::GroupDiscussion,
                "Group Discussion",
                "Moderated discussion on an assigned topic",
                20,
                RoundCategory::Behavioral,
            ),
            def(
                RoundId::TechnicalMcq,
                "Technical MCQ",
                "Multiple-choice questions across core technical topics",
                45,
                RoundCategory::Technical,
            ),
            def(
                RoundId::Coding,
                "Coding Challenge",
                "Hands-on programming problems graded by test cases",
                90,
                RoundCategory::Technical,
            ),
            def(
                RoundId::TechnicalInterview,
                "Technical Interview",
                "Live interview with an engineer",
                45,
                RoundCategory::Interview,
            ),
            def(
                RoundId::HrInterview,
                "HR Interview",
                "Culture-fit and expectations discussion",
                30,
                RoundCategory::Interview,
            ),
        ])
    }

    /// Look up the definition for a round id.
    pub fn lookup(&self, id: RoundId) -> Result<&RoundDefinition, CatalogError> {
        self.definitions
            .get(&id)
            .ok_or(CatalogError::UnknownRound(id))
    }

    /// Whether a round id is registered.
    #[must_use]
    pub fn contains(&self, id: RoundId) -> bool {
        self.definitions.contains_key(&id)
    }

    /// Iterate over all registered definitions (unordered).
    pub fn definitions(&self) -> impl Iterator<Item = &RoundDefinition> {
        self.definitions.values()
    }

    /// Number of registered rounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for RoundCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
