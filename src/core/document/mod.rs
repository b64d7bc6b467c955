//! In-memory FMEA document
//!
//! A [`Document`] owns three flat arenas of entities keyed by code. Every
//! relationship is a list of codes, looked up afresh on each traversal, so the
//! document never holds references into itself. The engine operations are
//! split across submodules, each adding an `impl Document` block:
//!
//! - `resolve` - code lists to entities, reverse (parent) lookups
//! - `levels` - depth computation
//! - `flatten` - pre-order flattening of structures and functions
//! - `cycles` - cycle and parent-chain checks
//! - `tree` - display tree and function graph projections
//! - `mutate` - create / edit / move / delete / link
//! - `validate` - aggregate rule checking

mod cycles;
mod flatten;
mod levels;
mod mutate;
mod resolve;
mod tree;
mod validate;

pub use cycles::check_parent_chain;
pub use mutate::MoveDirection;
pub use tree::{GraphNode, TreeNode};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::core::entity::{Entity, EntityKind};
use crate::core::error::{FmeaError, Result};
use crate::entities::{DocumentHeader, Fault, Function, Structure};

/// Flat collection of one entity kind, keyed by code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena<T> {
    items: BTreeMap<String, T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl<T: Entity> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<&T> {
        self.items.get(code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut T> {
        self.items.get_mut(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.items.contains_key(code)
    }

    /// Insert an entity, returning any entity previously stored under its code
    pub fn insert(&mut self, entity: T) -> Option<T> {
        self.items.insert(entity.code().to_string(), entity)
    }

    pub fn remove(&mut self, code: &str) -> Option<T> {
        self.items.remove(code)
    }

    /// Entities in code order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.values_mut()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Entity> FromIterator<T> for Arena<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arena = Arena::new();
        for entity in iter {
            arena.insert(entity);
        }
        arena
    }
}

impl<T: Entity> Serialize for Arena<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.values())
    }
}

impl<'de, T: Entity> Deserialize<'de> for Arena<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(|items| items.into_iter().collect())
    }
}

/// An FMEA document: header plus the three entity collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub header: DocumentHeader,

    #[serde(default)]
    pub structures: Arena<Structure>,

    #[serde(default)]
    pub functions: Arena<Function>,

    #[serde(default)]
    pub faults: Arena<Fault>,
}

impl Document {
    /// Start a document with a single root structure at level 0
    pub fn new(mut header: DocumentHeader, mut root: Structure) -> Self {
        header.root_structure_code = root.code.clone();
        root.level = 0;
        root.seq = 1;
        Self {
            header,
            structures: std::iter::once(root).collect(),
            functions: Arena::new(),
            faults: Arena::new(),
        }
    }

    /// Assemble a document from flat collections; code lists stay unresolved
    pub fn from_parts(
        header: DocumentHeader,
        structures: impl IntoIterator<Item = Structure>,
        functions: impl IntoIterator<Item = Function>,
        faults: impl IntoIterator<Item = Fault>,
    ) -> Self {
        Self {
            header,
            structures: structures.into_iter().collect(),
            functions: functions.into_iter().collect(),
            faults: faults.into_iter().collect(),
        }
    }

    pub fn code(&self) -> &str {
        &self.header.code
    }

    /// The level-0 structure named by the header
    pub fn root(&self) -> Result<&Structure> {
        self.structure(&self.header.root_structure_code)
    }

    pub fn structure(&self, code: &str) -> Result<&Structure> {
        self.structures
            .get(code)
            .ok_or_else(|| FmeaError::not_found(EntityKind::Structure, code))
    }

    pub fn function(&self, code: &str) -> Result<&Function> {
        self.functions
            .get(code)
            .ok_or_else(|| FmeaError::not_found(EntityKind::Function, code))
    }

    pub fn fault(&self, code: &str) -> Result<&Fault> {
        self.faults
            .get(code)
            .ok_or_else(|| FmeaError::not_found(EntityKind::Fault, code))
    }

    pub(crate) fn structure_mut(&mut self, code: &str) -> Result<&mut Structure> {
        self.structures
            .get_mut(code)
            .ok_or_else(|| FmeaError::not_found(EntityKind::Structure, code))
    }

    pub(crate) fn function_mut(&mut self, code: &str) -> Result<&mut Function> {
        self.functions
            .get_mut(code)
            .ok_or_else(|| FmeaError::not_found(EntityKind::Function, code))
    }

    pub(crate) fn fault_mut(&mut self, code: &str) -> Result<&mut Fault> {
        self.faults
            .get_mut(code)
            .ok_or_else(|| FmeaError::not_found(EntityKind::Fault, code))
    }

    /// Kind of the entity using `code`, if any
    pub fn kind_of(&self, code: &str) -> Option<EntityKind> {
        if self.structures.contains(code) {
            Some(EntityKind::Structure)
        } else if self.functions.contains(code) {
            Some(EntityKind::Function)
        } else if self.faults.contains(code) {
            Some(EntityKind::Fault)
        } else {
            None
        }
    }

    /// Every code in use, across all three kinds
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.structures
            .codes()
            .chain(self.functions.codes())
            .chain(self.faults.codes())
    }

    /// Faults ranked by risk priority factor, highest first
    pub fn ranked_faults(&self) -> Vec<&Fault> {
        let mut faults: Vec<&Fault> = self.faults.iter().collect();
        faults.sort_by(|a, b| {
            b.risk_priority_factor
                .cmp(&a.risk_priority_factor)
                .then_with(|| a.code.cmp(&b.code))
        });
        faults
    }
}

/// Order entities for display by their own `seq`
pub(crate) fn by_seq<T: Entity>(mut entities: Vec<&T>) -> Vec<&T> {
    entities.sort_by_key(|e| e.seq());
    entities
}

/// Shared fixtures for the engine tests
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::core::identity::{CodeGenerator, SequentialCodes};
    use crate::entities::{FaultDraft, FunctionDraft, StructureDraft};

    /// Root `S1` (level 0) with child `S1.1` (level 1) holding function `F1`
    pub fn scenario() -> Document {
        let mut doc = Document::new(
            DocumentHeader::new("DOC-1", "Brake FMEA", "S1"),
            Structure::new("S1", "Vehicle"),
        );
        doc.create_child_structure("S1", StructureDraft::new("Brake"), &mut |_: EntityKind| {
            "S1.1".to_string()
        })
        .unwrap();
        doc.create_child_function("S1.1", None, FunctionDraft::new("Stop vehicle"), &mut |_: EntityKind| {
            "F1".to_string()
        })
        .unwrap();
        doc
    }

    /// Vehicle -> {Brake -> {Caliper, Disc}, Steering} with a function net
    /// crossing two structure levels and a three-tier fault chain
    pub fn vehicle() -> (Document, SequentialCodes) {
        let mut codes = SequentialCodes::new();
        let root = Structure::new(codes.next_code(EntityKind::Structure), "Vehicle");
        let mut doc = Document::new(DocumentHeader::new("DOC-1", "Vehicle FMEA", ""), root);

        // STR-2 Brake, STR-3 Steering, STR-4 Caliper, STR-5 Disc
        doc.create_child_structure("STR-1", StructureDraft::new("Brake"), &mut codes)
            .unwrap();
        doc.create_child_structure("STR-1", StructureDraft::new("Steering"), &mut codes)
            .unwrap();
        doc.create_child_structure("STR-2", StructureDraft::new("Caliper"), &mut codes)
            .unwrap();
        doc.create_child_structure("STR-2", StructureDraft::new("Disc"), &mut codes)
            .unwrap();

        // FUN-1 on Brake (level 1), FUN-2 on Caliper as its prerequisite (level 2)
        doc.create_child_function("STR-2", None, FunctionDraft::new("Decelerate"), &mut codes)
            .unwrap();
        doc.create_child_function(
            "STR-4",
            Some("FUN-1"),
            FunctionDraft::new("Clamp disc"),
            &mut codes,
        )
        .unwrap();

        // FLT-1 effect on FUN-1, FLT-2 mode on FUN-2
        doc.create_child_fault("FUN-1", None, FaultDraft::new("No deceleration"), &mut codes)
            .unwrap();
        doc.create_child_fault(
            "FUN-2",
            Some("FLT-1"),
            FaultDraft::new("Piston stuck"),
            &mut codes,
        )
        .unwrap();

        (doc, codes)
    }
}
