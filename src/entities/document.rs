//! Document header - the metadata row of an FMEA document

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::team::Team;

/// Lifecycle stage of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Stage {
    #[default]
    Planning,
    Analysis,
    Optimization,
    Review,
    Released,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Planning => write!(f, "planning"),
            Stage::Analysis => write!(f, "analysis"),
            Stage::Optimization => write!(f, "optimization"),
            Stage::Review => write!(f, "review"),
            Stage::Released => write!(f, "released"),
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planning" => Ok(Stage::Planning),
            "analysis" => Ok(Stage::Analysis),
            "optimization" => Ok(Stage::Optimization),
            "review" => Ok(Stage::Review),
            "released" => Ok(Stage::Released),
            _ => Err(format!("Unknown stage: {}", s)),
        }
    }
}

/// Planning metadata (who, for whom, when)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
}

/// Header of an FMEA document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeader {
    /// Unique document code
    pub code: String,

    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub stage: Stage,

    /// Code of the level-0 structure
    pub root_structure_code: String,

    #[serde(default)]
    pub planning: Planning,

    #[serde(default)]
    pub team: Team,

    pub created: DateTime<Utc>,

    pub updated: DateTime<Utc>,

    /// Persisted revision the document was loaded at (0 = never stored)
    #[serde(default)]
    pub generation: u64,
}

fn default_version() -> String {
    "1".to_string()
}

impl DocumentHeader {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        root_structure_code: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            code: code.into(),
            name: name.into(),
            version: default_version(),
            stage: Stage::default(),
            root_structure_code: root_structure_code.into(),
            planning: Planning::default(),
            team: Team::default(),
            created: now,
            updated: now,
            generation: 0,
        }
    }
}
