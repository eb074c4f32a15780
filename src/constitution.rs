// 🏷️ Constitution Scorer
// Element balance → four linear archetype scores → single winning label

use crate::balance::ElementBalance;
use crate::tables::Element;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// LABEL
// ============================================================================

/// The four constitution archetypes, in their fixed enumeration order.
/// That order is also the tie-break order of the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstitutionLabel {
    Alpha,
    Beta,
    Gamma,
    Delta,
}

pub const ALL_LABELS: [ConstitutionLabel; 4] = [
    ConstitutionLabel::Alpha,
    ConstitutionLabel::Beta,
    ConstitutionLabel::Gamma,
    ConstitutionLabel::Delta,
];

impl ConstitutionLabel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Alpha => "Alpha",
            Self::Beta => "Beta",
            Self::Gamma => "Gamma",
            Self::Delta => "Delta",
        }
    }

    /// Single-letter code used by previously generated registries.
    pub fn code(&self) -> char {
        match self {
            Self::Alpha => 'T',
            Self::Beta => 'S',
            Self::Gamma => 'E',
            Self::Delta => 'U',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        ALL_LABELS.into_iter().find(|l| l.code() == code.to_ascii_uppercase())
    }
}

impl fmt::Display for ConstitutionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown label name or code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown constitution label '{0}' (expected Alpha/Beta/Gamma/Delta or T/S/E/U)")]
pub struct ParseLabelError(pub String);

impl FromStr for ConstitutionLabel {
    type Err = ParseLabelError;

    /// Accepts the label name (case-insensitive) or its single-letter code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Some(label) = ALL_LABELS
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(trimmed))
        {
            return Ok(label);
        }

        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_code(c).ok_or_else(|| ParseLabelError(s.to_string())),
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}

// ============================================================================
// SCORES
// ============================================================================

/// Per-label scores derived from an element balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConstitutionScore {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
}

impl ConstitutionScore {
    pub fn from_balance(balance: &ElementBalance) -> Self {
        let wood = balance.get(Element::Wood) as f64;
        let fire = balance.get(Element::Fire) as f64;
        let earth = balance.get(Element::Earth) as f64;
        let metal = balance.get(Element::Metal) as f64;
        let water = balance.get(Element::Water) as f64;

        ConstitutionScore {
            alpha: fire * 1.5 + wood * 1.0 - water * 0.5,
            beta: fire * 1.0 + earth * 1.2 - metal * 0.3 + wood * 0.5,
            gamma: earth * 1.5 + metal * 1.0 - wood * 0.3 + water * 0.3,
            delta: water * 1.5 + metal * 1.0 - fire * 0.5,
        }
    }

    pub fn get(&self, label: ConstitutionLabel) -> f64 {
        match label {
            ConstitutionLabel::Alpha => self.alpha,
            ConstitutionLabel::Beta => self.beta,
            ConstitutionLabel::Gamma => self.gamma,
            ConstitutionLabel::Delta => self.delta,
        }
    }

    /// Labels ordered by descending score. Stable: equal scores keep the
    /// enumeration order.
    pub fn ranked(&self) -> [(ConstitutionLabel, f64); 4] {
        let mut ranked = ALL_LABELS.map(|l| (l, self.get(l)));
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Highest-scoring label; an exact tie goes to the earlier label.
    pub fn winner(&self) -> ConstitutionLabel {
        self.ranked()[0].0
    }
}

/// Classify an element balance into exactly one label.
pub fn classify(balance: &ElementBalance) -> ConstitutionLabel {
    ConstitutionScore::from_balance(balance).winner()
}
