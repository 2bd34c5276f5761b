use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "Easy" => Ok(Self::Easy),
            "Medium" => Ok(Self::Medium),
            "Hard" => Ok(Self::Hard),
            other => Err(Error::InvalidRecord(format!("unknown difficulty: {}", other))),
        }
    }
}

/// One practice problem. Wire field names match the upstream dataset;
/// everything except `done` is immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Acceptance")]
    pub acceptance: String,
    #[serde(rename = "Difficulty")]
    pub difficulty: Difficulty,
    #[serde(rename = "Frequency")]
    pub frequency: f64,
    #[serde(rename = "Leetcode Question Link")]
    pub link: String,
    #[serde(rename = "Done", default)]
    pub done: bool,
}

impl ProblemRecord {
    /// Ids are digit strings in the dataset; sortable numerically when they parse.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }

    /// Acceptance arrives as a percentage string ("44.5%").
    pub fn acceptance_pct(&self) -> Option<f64> {
        self.acceptance.trim().trim_end_matches('%').parse().ok()
    }
}
