//! Structure entity - a node of the system decomposition (system, subsystem, component)

use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, EntityKind};

/// A structure node
///
/// The parent is never stored; it is derived by scanning for the structure
/// whose `decomposition` contains this code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// Unique, immutable code
    pub code: String,

    pub long_name: String,

    #[serde(default)]
    pub short_name: String,

    /// Category (system, subsystem, component, ... user-defined)
    #[serde(default)]
    pub category: String,

    /// 1-based order among siblings
    #[serde(default)]
    pub seq: u32,

    /// Depth from the root (root = 0)
    #[serde(default)]
    pub level: u32,

    /// Ordered child structure codes
    #[serde(default)]
    pub decomposition: Vec<String>,

    /// Ordered codes of functions attached to this structure
    #[serde(default)]
    pub functions: Vec<String>,
}

impl Entity for Structure {
    const KIND: EntityKind = EntityKind::Structure;

    fn code(&self) -> &str {
        &self.code
    }

    fn long_name(&self) -> &str {
        &self.long_name
    }

    fn seq(&self) -> u32 {
        self.seq
    }

    fn set_seq(&mut self, seq: u32) {
        self.seq = seq;
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn set_level(&mut self, level: u32) {
        self.level = level;
    }
}

impl Structure {
    /// Create a detached structure; seq and level are assigned on insertion
    pub fn new(code: impl Into<String>, long_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            long_name: long_name.into(),
            short_name: String::new(),
            category: String::new(),
            seq: 1,
            level: 0,
            decomposition: Vec::new(),
            functions: Vec::new(),
        }
    }
}

/// Caller-supplied fields for a new structure
#[derive(Debug, Clone, Default)]
pub struct StructureDraft {
    pub long_name: String,
    pub short_name: String,
    pub category: String,
}

impl StructureDraft {
    pub fn new(long_name: impl Into<String>) -> Self {
        Self {
            long_name: long_name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn into_structure(self, code: String) -> Structure {
        Structure {
            short_name: self.short_name,
            category: self.category,
            ..Structure::new(code, self.long_name)
        }
    }
}

/// Field updates for an existing structure
#[derive(Debug, Clone, Default)]
pub struct StructurePatch {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub category: Option<String>,
}

impl StructurePatch {
    pub(crate) fn apply(self, structure: &mut Structure) {
        if let Some(long_name) = self.long_name {
            structure.long_name = long_name;
        }
        if let Some(short_name) = self.short_name {
            structure.short_name = short_name;
        }
        if let Some(category) = self.category {
            structure.category = category;
        }
    }
}
