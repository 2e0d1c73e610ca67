//! Observation lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Review status of an observation.
///
/// Workflow graph: `BROUILLON -> EN_ATTENTE -> {A_CORRIGER, VALIDEE}`,
/// with `A_CORRIGER -> EN_ATTENTE` on resubmission. `VALIDEE` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Statut {
    #[default]
    Brouillon,
    EnAttente,
    ACorriger,
    Validee,
}

impl Statut {
    pub const ALL: [Statut; 4] = [
        Self::Brouillon,
        Self::EnAttente,
        Self::ACorriger,
        Self::Validee,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brouillon => "BROUILLON",
            Self::EnAttente => "EN_ATTENTE",
            Self::ACorriger => "A_CORRIGER",
            Self::Validee => "VALIDEE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Brouillon => "Brouillon",
            Self::EnAttente => "En attente de relecture",
            Self::ACorriger => "À corriger",
            Self::Validee => "Validée",
        }
    }

    /// Whether the workflow allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: Statut) -> bool {
        matches!(
            (self, next),
            (Self::Brouillon, Self::EnAttente)
                | (Self::EnAttente, Self::ACorriger)
                | (Self::EnAttente, Self::Validee)
                | (Self::ACorriger, Self::EnAttente)
        )
    }

    /// Entering this status marks the observation as submitted.
    pub fn is_submission(self) -> bool {
        self == Self::EnAttente
    }
}

impl fmt::Display for Statut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the [`Statut`] choices.
#[derive(Debug, Error)]
#[error("unknown observation status: {0:?}")]
pub struct UnknownStatut(pub String);

impl FromStr for Statut {
    type Err = UnknownStatut;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|statut| statut.as_str() == s)
            .ok_or_else(|| UnknownStatut(s.to_owned()))
    }
}
