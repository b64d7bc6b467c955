//! Entity trait - common interface for structures, functions and faults

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three kinds of entity a document holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Structure,
    Function,
    Fault,
}

impl EntityKind {
    /// Code prefix used by generated codes
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Structure => "STR",
            EntityKind::Function => "FUN",
            EntityKind::Fault => "FLT",
        }
    }

    /// Storage table holding this kind
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Structure => "structures",
            EntityKind::Function => "functions",
            EntityKind::Fault => "faults",
        }
    }

    pub fn all() -> &'static [EntityKind] {
        &[EntityKind::Structure, EntityKind::Function, EntityKind::Fault]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Structure => write!(f, "structure"),
            EntityKind::Function => write!(f, "function"),
            EntityKind::Fault => write!(f, "fault"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "structure" | "str" => Ok(EntityKind::Structure),
            "function" | "fun" => Ok(EntityKind::Function),
            "fault" | "flt" => Ok(EntityKind::Fault),
            _ => Err(format!("Unknown entity kind: {}", s)),
        }
    }
}

/// A code-list field that refers to other entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Structure -> child structures
    Decomposition,
    /// Structure -> attached functions
    Functions,
    /// Function -> prerequisite functions
    Prerequisites,
    /// Function -> faults
    FaultRefs,
    /// Fault -> cause faults
    Causes,
}

impl Relation {
    /// Kind of entity the codes in this list point to
    pub fn target(&self) -> EntityKind {
        match self {
            Relation::Decomposition => EntityKind::Structure,
            Relation::Functions | Relation::Prerequisites => EntityKind::Function,
            Relation::FaultRefs | Relation::Causes => EntityKind::Fault,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Decomposition => write!(f, "decomposition"),
            Relation::Functions => write!(f, "functions"),
            Relation::Prerequisites => write!(f, "prerequisites"),
            Relation::FaultRefs => write!(f, "fault_refs"),
            Relation::Causes => write!(f, "causes"),
        }
    }
}

/// Common trait for all document entities
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// The entity kind
    const KIND: EntityKind;

    /// Unique, immutable code
    fn code(&self) -> &str;

    /// Display name
    fn long_name(&self) -> &str;

    /// Sibling order (1-based)
    fn seq(&self) -> u32;

    fn set_seq(&mut self, seq: u32);

    /// Depth within its hierarchy
    fn level(&self) -> u32;

    fn set_level(&mut self, level: u32);

    /// Label used by tree and graph views: `code/long_name`
    fn label(&self) -> String {
        format!("{}/{}", self.code(), self.long_name())
    }
}
