//! User domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a MedObs account. The two roles are mutually exclusive.
///
/// Wire and column format: `"ETUDIANT"` / `"PROFESSEUR"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Etudiant,
    Professeur,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Etudiant => "ETUDIANT",
            Self::Professeur => "PROFESSEUR",
        }
    }

    /// Human label shown next to the stored value.
    pub fn label(self) -> &'static str {
        match self {
            Self::Etudiant => "Étudiant",
            Self::Professeur => "Professeur",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the [`Role`] choices.
#[derive(Debug, Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ETUDIANT" => Ok(Self::Etudiant),
            "PROFESSEUR" => Ok(Self::Professeur),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}
