//! Fault entity - a failure mode attached to a function, with a cause chain

use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, EntityKind};

/// Significance tier of a fault, derived from its level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FaultTier {
    /// Failure effect (level 1)
    #[serde(rename = "FE")]
    Effect,
    /// Failure mode (level 2)
    #[serde(rename = "FM")]
    Mode,
    /// Failure cause (level 3)
    #[serde(rename = "FC")]
    Cause,
}

impl FaultTier {
    /// Deepest level a fault may sit at
    pub const MAX_LEVEL: u32 = 3;

    pub fn from_level(level: u32) -> Option<Self> {
        match level {
            1 => Some(FaultTier::Effect),
            2 => Some(FaultTier::Mode),
            3 => Some(FaultTier::Cause),
            _ => None,
        }
    }
}

impl std::fmt::Display for FaultTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultTier::Effect => write!(f, "FE"),
            FaultTier::Mode => write!(f, "FM"),
            FaultTier::Cause => write!(f, "FC"),
        }
    }
}

/// A fault attached to a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    /// Unique, immutable code
    pub code: String,

    pub long_name: String,

    #[serde(default)]
    pub short_name: String,

    /// Positive ranking factor; stored as entered, never computed
    #[serde(default = "default_risk_priority_factor")]
    pub risk_priority_factor: u32,

    /// 1-based order within the owning function's `fault_refs`
    #[serde(default)]
    pub seq: u32,

    /// 1..=3 (FE/FM/FC)
    #[serde(default)]
    pub level: u32,

    /// Owning function
    pub function_code: String,

    /// Ordered codes of child (cause) faults
    #[serde(default)]
    pub causes: Vec<String>,
}

fn default_risk_priority_factor() -> u32 {
    1
}

impl Entity for Fault {
    const KIND: EntityKind = EntityKind::Fault;

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

impl Fault {
    pub fn new(
        code: impl Into<String>,
        long_name: impl Into<String>,
        function_code: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            long_name: long_name.into(),
            short_name: String::new(),
            risk_priority_factor: default_risk_priority_factor(),
            seq: 1,
            level: 1,
            function_code: function_code.into(),
            causes: Vec::new(),
        }
    }

    /// Tier for the current level, if it is within 1..=3
    pub fn tier(&self) -> Option<FaultTier> {
        FaultTier::from_level(self.level)
    }
}

/// Caller-supplied fields for a new fault
#[derive(Debug, Clone)]
pub struct FaultDraft {
    pub long_name: String,
    pub short_name: String,
    pub risk_priority_factor: u32,
}

impl Default for FaultDraft {
    fn default() -> Self {
        Self {
            long_name: String::new(),
            short_name: String::new(),
            risk_priority_factor: default_risk_priority_factor(),
        }
    }
}

impl FaultDraft {
    pub fn new(long_name: impl Into<String>) -> Self {
        Self {
            long_name: long_name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn into_fault(self, code: String, function_code: String) -> Fault {
        Fault {
            short_name: self.short_name,
            risk_priority_factor: self.risk_priority_factor,
            ..Fault::new(code, self.long_name, function_code)
        }
    }
}

/// Field updates for an existing fault
#[derive(Debug, Clone, Default)]
pub struct FaultPatch {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub risk_priority_factor: Option<u32>,
}

impl FaultPatch {
    pub(crate) fn apply(self, fault: &mut Fault) {
        if let Some(long_name) = self.long_name {
            fault.long_name = long_name;
        }
        if let Some(short_name) = self.short_name {
            fault.short_name = short_name;
        }
        if let Some(rpf) = self.risk_priority_factor {
            fault.risk_priority_factor = rpf;
        }
    }
}
