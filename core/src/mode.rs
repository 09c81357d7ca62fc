//! Retrieval modes selecting the grouping topology.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How todos are grouped before enrichment.
///
/// The set is closed: every consumer dispatches with an exhaustive `match`,
/// so adding a variant is a compile error until each topology handles it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetrievalMode {
    /// One flat group per user, enriched as a single unordered stage.
    #[serde(rename = "USER_ID", alias = "USERID")]
    UserId,
    /// Even users first, then odd users, with a barrier between the two.
    #[default]
    #[serde(rename = "EVEN_ODD")]
    EvenOdd,
}

impl RetrievalMode {
    /// Every supported mode.
    pub const ALL: [Self; 2] = [Self::UserId, Self::EvenOdd];

    /// Canonical wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserId => "USER_ID",
            Self::EvenOdd => "EVEN_ODD",
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalMode {
    type Err = PipelineError;

    /// Parse a mode name, ignoring ASCII case and treating `-` like `_`.
    ///
    /// `USERID` is accepted as an alias of `USER_ID`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "USER_ID" | "USERID" => Ok(Self::UserId),
            "EVEN_ODD" => Ok(Self::EvenOdd),
            _ => Err(PipelineError::UnsupportedMode(s.to_string())),
        }
    }
}
