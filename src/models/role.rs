//! Closed enumerations carried by a participation: the side a player
//! played on, and the secondary performance tag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A value outside one of the closed enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} value: {value:?}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

/// The side a participant played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Villain,
    #[default]
    Kind,
}

impl Role {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Villain => "villain",
            Role::Kind => "kind",
        }
    }

    /// The opposing side.
    pub fn opponent(&self) -> Role {
        match self {
            Role::Villain => Role::Kind,
            Role::Kind => Role::Villain,
        }
    }

    /// Parse `raw`, keeping `fallback` when it is not a known role.
    pub fn parse_or(raw: Option<&str>, fallback: Role) -> Role {
        match raw {
            Some(raw) => raw.parse().unwrap_or_else(|e: UnknownValue| {
                tracing::warn!("{}, keeping {}", e, fallback);
                fallback
            }),
            None => fallback,
        }
    }
}

impl FromStr for Role {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "villain" => Ok(Role::Villain),
            "kind" => Ok(Role::Kind),
            _ => Err(UnknownValue {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary per-participation label, independent of role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InfoTag {
    Pire,
    #[default]
    Neutre,
    Meilleur,
}

impl InfoTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoTag::Pire => "pire",
            InfoTag::Neutre => "neutre",
            InfoTag::Meilleur => "meilleur",
        }
    }

    /// Parse `raw`, keeping `fallback` when it is not a known tag.
    pub fn parse_or(raw: Option<&str>, fallback: InfoTag) -> InfoTag {
        match raw {
            Some(raw) => raw.parse().unwrap_or_else(|e: UnknownValue| {
                tracing::warn!("{}, keeping {}", e, fallback);
                fallback
            }),
            None => fallback,
        }
    }
}

impl FromStr for InfoTag {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pire" => Ok(InfoTag::Pire),
            "neutre" => Ok(InfoTag::Neutre),
            "meilleur" => Ok(InfoTag::Meilleur),
            _ => Err(UnknownValue {
                kind: "info",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for InfoTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
