//! Function entity - a behavior attached to a structure

use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, EntityKind};

/// A function attached to a structure node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Unique, immutable code
    pub code: String,

    pub long_name: String,

    #[serde(default)]
    pub short_name: String,

    /// 1-based order within the owning structure's `functions`
    #[serde(default)]
    pub seq: u32,

    /// 1 when attached under a level-1 structure, +1 per prerequisite hop
    #[serde(default)]
    pub level: u32,

    /// Owning structure
    pub structure_code: String,

    /// Ordered codes of functions this function depends on
    #[serde(default)]
    pub prerequisites: Vec<String>,

    /// Ordered fault codes
    #[serde(default)]
    pub fault_refs: Vec<String>,
}

impl Entity for Function {
    const KIND: EntityKind = EntityKind::Function;

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

impl Function {
    pub fn new(
        code: impl Into<String>,
        long_name: impl Into<String>,
        structure_code: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            long_name: long_name.into(),
            short_name: String::new(),
            seq: 1,
            level: 0,
            structure_code: structure_code.into(),
            prerequisites: Vec::new(),
            fault_refs: Vec::new(),
        }
    }
}

/// Caller-supplied fields for a new function
#[derive(Debug, Clone, Default)]
pub struct FunctionDraft {
    pub long_name: String,
    pub short_name: String,
}

impl FunctionDraft {
    pub fn new(long_name: impl Into<String>) -> Self {
        Self {
            long_name: long_name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn into_function(self, code: String, structure_code: String) -> Function {
        Function {
            short_name: self.short_name,
            ..Function::new(code, self.long_name, structure_code)
        }
    }
}

/// Field updates for an existing function
#[derive(Debug, Clone, Default)]
pub struct FunctionPatch {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
}

impl FunctionPatch {
    pub(crate) fn apply(self, function: &mut Function) {
        if let Some(long_name) = self.long_name {
            function.long_name = long_name;
        }
        if let Some(short_name) = self.short_name {
            function.short_name = short_name;
        }
    }
}
