use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Kind of interval being counted down or staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Work,
    Break,
}

impl Phase {
    /// The phase staged after this one expires.
    pub fn other(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
        }
    }

    /// Human-facing label for mode tabs and headers.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Pomodoro",
            Phase::Break => "Break",
        }
    }
}

impl FromStr for Phase {
    type Err = ValidationError;

    /// Accepts the serialized names and the tab labels, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "work" | "pomodoro" => Ok(Phase::Work),
            "break" => Ok(Phase::Break),
            _ => Err(ValidationError::UnknownPhase(s.to_string())),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
