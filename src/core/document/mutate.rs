//! Structural mutation: create, edit, move, delete and link
//!
//! Every operation checks its preconditions before touching the document, so
//! a failed call leaves the document as it was. Sibling `seq` values stay a
//! contiguous 1..N run after every insert, move and delete.

use tracing::debug;

use super::{check_parent_chain, resolve::resolve, Arena, Document};
use crate::core::entity::{Entity, EntityKind, Relation};
use crate::core::error::{FmeaError, Result};
use crate::core::identity::CodeGenerator;
use crate::entities::{
    FaultDraft, FaultPatch, FaultTier, FunctionDraft, FunctionPatch, StructureDraft,
    StructurePatch,
};

/// Direction for sibling reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Swap `code` with its neighbour in `list`; false when already at the end
fn swap_sibling(list: &mut [String], code: &str, direction: MoveDirection) -> bool {
    let Some(index) = list.iter().position(|c| c == code) else {
        return false;
    };
    let last = list.len().saturating_sub(1);
    let target = match direction {
        MoveDirection::Up => index.saturating_sub(1),
        MoveDirection::Down => (index + 1).min(last),
    };
    if target == index {
        return false;
    }
    list.swap(index, target);
    true
}

/// Set every listed entity's `seq` to its 1-based list position
fn renumber<T: Entity>(arena: &mut Arena<T>, codes: &[String]) {
    for (i, code) in codes.iter().enumerate() {
        if let Some(entity) = arena.get_mut(code) {
            entity.set_seq(i as u32 + 1);
        }
    }
}

fn next_seq<T: Entity>(siblings: &[&T]) -> u32 {
    siblings.iter().map(|s| s.seq()).max().unwrap_or(0) + 1
}

fn require_name(long_name: &str) -> Result<()> {
    if long_name.trim().is_empty() {
        return Err(FmeaError::InvalidField {
            field: "long_name",
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn require_risk_factor(risk_priority_factor: u32) -> Result<()> {
    if risk_priority_factor == 0 {
        return Err(FmeaError::InvalidField {
            field: "risk_priority_factor",
            message: "must be a positive integer".to_string(),
        });
    }
    Ok(())
}

impl Document {
    fn fresh_code(&self, kind: EntityKind, codes: &mut dyn CodeGenerator) -> Result<String> {
        let code = codes.next_code(kind);
        if code.trim().is_empty() {
            return Err(FmeaError::InvalidField {
                field: "code",
                message: "generated code is empty".to_string(),
            });
        }
        if self.kind_of(&code).is_some() {
            return Err(FmeaError::DuplicateCode(code));
        }
        Ok(code)
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Add a structure at the end of `parent`'s decomposition
    ///
    /// Returns the new code.
    pub fn create_child_structure(
        &mut self,
        parent: &str,
        draft: StructureDraft,
        codes: &mut dyn CodeGenerator,
    ) -> Result<String> {
        require_name(&draft.long_name)?;
        let parent_node = self.structure(parent)?;
        let seq = next_seq(&self.children(parent_node)?);
        let level = parent_node.level + 1;
        let code = self.fresh_code(EntityKind::Structure, codes)?;

        let mut structure = draft.into_structure(code.clone());
        structure.seq = seq;
        structure.level = level;

        self.structure_mut(parent)?.decomposition.push(code.clone());
        self.structures.insert(structure);
        debug!(%code, %parent, seq, level, "structure created");
        Ok(code)
    }

    /// Attach a function to `structure`, optionally as a prerequisite of
    /// `parent_function`
    ///
    /// The function sits at its structure's level. With a parent function,
    /// that level must be exactly one below the parent's.
    pub fn create_child_function(
        &mut self,
        structure: &str,
        parent_function: Option<&str>,
        draft: FunctionDraft,
        codes: &mut dyn CodeGenerator,
    ) -> Result<String> {
        require_name(&draft.long_name)?;
        let owner = self.structure(structure)?;
        let seq = next_seq(&self.functions_of(owner)?);
        let level = owner.level;
        let parent_level = match parent_function {
            Some(parent) => Some(self.function(parent)?.level),
            None => None,
        };
        let code = self.fresh_code(EntityKind::Function, codes)?;

        if let Some(parent_level) = parent_level {
            if level != parent_level + 1 {
                return Err(FmeaError::LevelMismatch {
                    kind: EntityKind::Function,
                    code,
                    expected: parent_level + 1,
                    actual: level,
                });
            }
        }

        let mut function = draft.into_function(code.clone(), structure.to_string());
        function.seq = seq;
        function.level = level;

        self.structure_mut(structure)?.functions.push(code.clone());
        if let Some(parent) = parent_function {
            self.function_mut(parent)?.prerequisites.push(code.clone());
        }
        self.functions.insert(function);
        debug!(%code, %structure, ?parent_function, seq, level, "function created");
        Ok(code)
    }

    /// Attach a fault to `function`, optionally as a cause of `parent_fault`
    ///
    /// The fault sits at its function's level (at least 1). With a parent
    /// fault, that level must be exactly one below the parent's. Faults deeper
    /// than the cause tier are rejected.
    pub fn create_child_fault(
        &mut self,
        function: &str,
        parent_fault: Option<&str>,
        draft: FaultDraft,
        codes: &mut dyn CodeGenerator,
    ) -> Result<String> {
        require_name(&draft.long_name)?;
        require_risk_factor(draft.risk_priority_factor)?;
        let owner = self.function(function)?;
        let seq = next_seq(&self.faults_of(owner)?);
        let level = owner.level.max(1);
        let parent_level = match parent_fault {
            Some(parent) => Some(self.fault(parent)?.level),
            None => None,
        };
        let code = self.fresh_code(EntityKind::Fault, codes)?;

        if let Some(parent_level) = parent_level {
            if level != parent_level + 1 {
                return Err(FmeaError::LevelMismatch {
                    kind: EntityKind::Fault,
                    code,
                    expected: parent_level + 1,
                    actual: level,
                });
            }
        }
        if level > FaultTier::MAX_LEVEL {
            return Err(FmeaError::InvalidField {
                field: "level",
                message: format!(
                    "fault {} would sit at level {}; faults stop at level {}",
                    code,
                    level,
                    FaultTier::MAX_LEVEL
                ),
            });
        }

        let mut fault = draft.into_fault(code.clone(), function.to_string());
        fault.seq = seq;
        fault.level = level;

        self.function_mut(function)?.fault_refs.push(code.clone());
        if let Some(parent) = parent_fault {
            self.fault_mut(parent)?.causes.push(code.clone());
        }
        self.faults.insert(fault);
        debug!(%code, %function, ?parent_fault, seq, level, "fault created");
        Ok(code)
    }

    // =========================================================================
    // Edit
    // =========================================================================

    /// Update descriptive fields; code, links and level never change
    pub fn edit_structure(&mut self, code: &str, patch: StructurePatch) -> Result<()> {
        if let Some(long_name) = &patch.long_name {
            require_name(long_name)?;
        }
        patch.apply(self.structure_mut(code)?);
        debug!(%code, "structure edited");
        Ok(())
    }

    pub fn edit_function(&mut self, code: &str, patch: FunctionPatch) -> Result<()> {
        if let Some(long_name) = &patch.long_name {
            require_name(long_name)?;
        }
        patch.apply(self.function_mut(code)?);
        debug!(%code, "function edited");
        Ok(())
    }

    pub fn edit_fault(&mut self, code: &str, patch: FaultPatch) -> Result<()> {
        if let Some(long_name) = &patch.long_name {
            require_name(long_name)?;
        }
        if let Some(factor) = patch.risk_priority_factor {
            require_risk_factor(factor)?;
        }
        patch.apply(self.fault_mut(code)?);
        debug!(%code, "fault edited");
        Ok(())
    }

    // =========================================================================
    // Move
    // =========================================================================

    /// Swap a structure with its previous or next sibling
    ///
    /// Siblings are taken in list order. Moving the first sibling up or the
    /// last one down does nothing and returns false.
    pub fn move_structure(&mut self, code: &str, direction: MoveDirection) -> Result<bool> {
        self.structure(code)?;
        let parent = self
            .parent_structure(code)
            .ok_or_else(|| FmeaError::ParentNotFound {
                kind: EntityKind::Structure,
                code: code.to_string(),
            })?;
        let parent_code = parent.code.clone();
        let mut siblings = parent.decomposition.clone();
        resolve(&self.structures, &parent_code, Relation::Decomposition, &siblings)?;

        let moved = swap_sibling(&mut siblings, code, direction);
        if moved {
            renumber(&mut self.structures, &siblings);
            self.structure_mut(&parent_code)?.decomposition = siblings;
            debug!(%code, ?direction, "structure moved");
        }
        Ok(moved)
    }

    /// Swap a function with its neighbour in the owning structure's list
    pub fn move_function(&mut self, code: &str, direction: MoveDirection) -> Result<bool> {
        self.function(code)?;
        let owner = self
            .owning_structure(code)
            .ok_or_else(|| FmeaError::ParentNotFound {
                kind: EntityKind::Function,
                code: code.to_string(),
            })?;
        let owner_code = owner.code.clone();
        let mut siblings = owner.functions.clone();
        resolve(&self.functions, &owner_code, Relation::Functions, &siblings)?;

        let moved = swap_sibling(&mut siblings, code, direction);
        if moved {
            renumber(&mut self.functions, &siblings);
            self.structure_mut(&owner_code)?.functions = siblings;
            debug!(%code, ?direction, "function moved");
        }
        Ok(moved)
    }

    /// Swap a fault with its neighbour in the owning function's list
    pub fn move_fault(&mut self, code: &str, direction: MoveDirection) -> Result<bool> {
        self.fault(code)?;
        let owner = self
            .owning_function(code)
            .ok_or_else(|| FmeaError::ParentNotFound {
                kind: EntityKind::Fault,
                code: code.to_string(),
            })?;
        let owner_code = owner.code.clone();
        let mut siblings = owner.fault_refs.clone();
        resolve(&self.faults, &owner_code, Relation::FaultRefs, &siblings)?;

        let moved = swap_sibling(&mut siblings, code, direction);
        if moved {
            renumber(&mut self.faults, &siblings);
            self.function_mut(&owner_code)?.fault_refs = siblings;
            debug!(%code, ?direction, "fault moved");
        }
        Ok(moved)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Remove a leaf structure with no attached functions
    pub fn delete_structure(&mut self, code: &str) -> Result<()> {
        let structure = self.structure(code)?;
        if code == self.header.root_structure_code {
            return Err(FmeaError::CannotDeleteRoot(code.to_string()));
        }
        if !structure.decomposition.is_empty() {
            return Err(FmeaError::HasChildren {
                kind: EntityKind::Structure,
                code: code.to_string(),
            });
        }
        if !structure.functions.is_empty() {
            return Err(FmeaError::HasAttachedFunctions(code.to_string()));
        }
        if self.parent_structure(code).is_none() {
            return Err(FmeaError::ParentNotFound {
                kind: EntityKind::Structure,
                code: code.to_string(),
            });
        }

        self.structures.remove(code);
        let parents: Vec<String> = self
            .structures
            .iter()
            .filter(|s| s.decomposition.iter().any(|c| c == code))
            .map(|s| s.code.clone())
            .collect();
        for parent in parents {
            let parent = self.structure_mut(&parent)?;
            parent.decomposition.retain(|c| c != code);
            let siblings = parent.decomposition.clone();
            renumber(&mut self.structures, &siblings);
        }
        debug!(%code, "structure deleted");
        Ok(())
    }

    /// Remove a function with no prerequisites and no faults
    pub fn delete_function(&mut self, code: &str) -> Result<()> {
        let function = self.function(code)?;
        if !function.prerequisites.is_empty() {
            return Err(FmeaError::HasChildren {
                kind: EntityKind::Function,
                code: code.to_string(),
            });
        }
        if !function.fault_refs.is_empty() {
            return Err(FmeaError::HasAttachedFaults(code.to_string()));
        }
        if self.owning_structure(code).is_none() {
            return Err(FmeaError::ParentNotFound {
                kind: EntityKind::Function,
                code: code.to_string(),
            });
        }

        self.functions.remove(code);
        for function in self.functions.iter_mut() {
            function.prerequisites.retain(|c| c != code);
        }
        let owners: Vec<String> = self
            .structures
            .iter()
            .filter(|s| s.functions.iter().any(|c| c == code))
            .map(|s| s.code.clone())
            .collect();
        for owner in owners {
            let owner = self.structure_mut(&owner)?;
            owner.functions.retain(|c| c != code);
            let siblings = owner.functions.clone();
            renumber(&mut self.functions, &siblings);
        }
        debug!(%code, "function deleted");
        Ok(())
    }

    /// Remove a fault with no causes
    pub fn delete_fault(&mut self, code: &str) -> Result<()> {
        let fault = self.fault(code)?;
        if !fault.causes.is_empty() {
            return Err(FmeaError::HasChildren {
                kind: EntityKind::Fault,
                code: code.to_string(),
            });
        }
        if self.owning_function(code).is_none() {
            return Err(FmeaError::ParentNotFound {
                kind: EntityKind::Fault,
                code: code.to_string(),
            });
        }

        self.faults.remove(code);
        for fault in self.faults.iter_mut() {
            fault.causes.retain(|c| c != code);
        }
        let owners: Vec<String> = self
            .functions
            .iter()
            .filter(|f| f.fault_refs.iter().any(|c| c == code))
            .map(|f| f.code.clone())
            .collect();
        for owner in owners {
            let owner = self.function_mut(&owner)?;
            owner.fault_refs.retain(|c| c != code);
            let siblings = owner.fault_refs.clone();
            renumber(&mut self.faults, &siblings);
        }
        debug!(%code, "fault deleted");
        Ok(())
    }

    // =========================================================================
    // Prerequisite links
    // =========================================================================

    /// Make `prerequisite` a prerequisite of `function` and recompute levels
    ///
    /// Returns false when the link already exists. Rejected without changes
    /// when the deeper levels would push a fault past the cause tier.
    pub fn link_prerequisite(&mut self, function: &str, prerequisite: &str) -> Result<bool> {
        let target = self.function(function)?;
        self.function(prerequisite)?;
        if target.prerequisites.iter().any(|c| c == prerequisite) {
            return Ok(false);
        }

        check_parent_chain(EntityKind::Function, function, |c| {
            self.dependents(c).first().map(|f| f.code.clone())
        })?;
        if function == prerequisite || self.prerequisite_reaches(prerequisite, function) {
            return Err(FmeaError::CircularReference {
                kind: EntityKind::Function,
                code: function.to_string(),
            });
        }

        let mut linked = self.clone();
        linked
            .function_mut(function)?
            .prerequisites
            .push(prerequisite.to_string());
        linked.setup_levels()?;
        if let Some(fault) = linked
            .faults
            .iter()
            .find(|f| FaultTier::from_level(f.level).is_none())
        {
            return Err(FmeaError::InvalidField {
                field: "level",
                message: format!(
                    "linking {} under {} would push fault {} to level {}; faults stop at level {}",
                    prerequisite,
                    function,
                    fault.code,
                    fault.level,
                    FaultTier::MAX_LEVEL
                ),
            });
        }
        *self = linked;
        debug!(%function, %prerequisite, "prerequisite linked");
        Ok(true)
    }

    /// Drop the link; returns false when there was none
    pub fn unlink_prerequisite(&mut self, function: &str, prerequisite: &str) -> Result<bool> {
        let target = self.function_mut(function)?;
        let before = target.prerequisites.len();
        target.prerequisites.retain(|c| c != prerequisite);
        if target.prerequisites.len() == before {
            return Ok(false);
        }
        self.setup_levels()?;
        debug!(%function, %prerequisite, "prerequisite unlinked");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::entities::DocumentHeader;
    use crate::entities::{Fault, Function, Structure};

    fn seqs(doc: &Document, parent: &str) -> Vec<(String, u32)> {
        doc.structure(parent)
            .unwrap()
            .decomposition
            .iter()
            .map(|c| (c.clone(), doc.structure(c).unwrap().seq))
            .collect()
    }

    // =========================================================================
    // Create
    // =========================================================================

    #[test]
    fn test_create_child_structure_invariants() {
        let (mut doc, mut codes) = fixtures::vehicle();
        let code = doc
            .create_child_structure("STR-2", StructureDraft::new("Pads"), &mut codes)
            .unwrap();
        assert_eq!(code, "STR-6");

        let child = doc.structure(&code).unwrap();
        assert_eq!(child.seq, 3);
        assert_eq!(child.level, 2);
        let parent = doc.structure("STR-2").unwrap();
        assert_eq!(parent.decomposition.iter().filter(|c| **c == code).count(), 1);
    }

    #[test]
    fn test_create_child_seq_follows_max_not_count() {
        let (mut doc, mut codes) = fixtures::vehicle();
        doc.structures.get_mut("STR-5").unwrap().seq = 7;
        let code = doc
            .create_child_structure("STR-2", StructureDraft::new("Pads"), &mut codes)
            .unwrap();
        assert_eq!(doc.structure(&code).unwrap().seq, 8);
    }

    #[test]
    fn test_first_child_gets_seq_one() {
        let mut doc = Document::new(
            DocumentHeader::new("DOC-1", "Test", ""),
            Structure::new("S1", "Root"),
        );
        doc.create_child_structure("S1", StructureDraft::new("Only"), &mut |_: EntityKind| {
            "S1.1".to_string()
        })
        .unwrap();
        assert_eq!(doc.structure("S1.1").unwrap().seq, 1);
        assert_eq!(doc.structure("S1.1").unwrap().level, 1);
    }

    #[test]
    fn test_create_rejects_duplicate_code() {
        let (mut doc, _) = fixtures::vehicle();
        let before = doc.clone();
        let err = doc
            .create_child_structure("STR-1", StructureDraft::new("Again"), &mut |_: EntityKind| {
                "FUN-1".to_string()
            })
            .unwrap_err();
        assert!(matches!(err, FmeaError::DuplicateCode(code) if code == "FUN-1"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let (mut doc, mut codes) = fixtures::vehicle();
        let err = doc
            .create_child_structure("STR-1", StructureDraft::new("  "), &mut codes)
            .unwrap_err();
        assert!(matches!(err, FmeaError::InvalidField { field: "long_name", .. }));
    }

    #[test]
    fn test_function_with_parent_function_must_be_one_level_down() {
        let mut doc = fixtures::scenario();
        let before = doc.clone();
        let err = doc
            .create_child_function(
                "S1.1",
                Some("F1"),
                FunctionDraft::new("Build pressure"),
                &mut |_: EntityKind| "F1.1".to_string(),
            )
            .unwrap_err();
        match err {
            FmeaError::LevelMismatch {
                kind,
                code,
                expected,
                actual,
            } => {
                assert_eq!(kind, EntityKind::Function);
                assert_eq!(code, "F1.1");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("expected level mismatch, got {:?}", other),
        }
        assert_eq!(doc, before);
    }

    #[test]
    fn test_function_takes_structure_level() {
        let mut doc = fixtures::scenario();
        let f1 = doc.function("F1").unwrap();
        assert_eq!(f1.level, 1);
        assert_eq!(f1.seq, 1);
        assert_eq!(f1.structure_code, "S1.1");

        doc.create_child_function(
            "S1.1",
            None,
            FunctionDraft::new("Hold vehicle"),
            &mut |_: EntityKind| "F2".to_string(),
        )
        .unwrap();
        assert_eq!(doc.function("F2").unwrap().seq, 2);
        assert_eq!(doc.structure("S1.1").unwrap().functions, vec!["F1", "F2"]);
    }

    #[test]
    fn test_prerequisite_function_is_linked_to_parent() {
        let (doc, _) = fixtures::vehicle();
        assert_eq!(doc.function("FUN-1").unwrap().prerequisites, vec!["FUN-2"]);
        assert_eq!(doc.structure("STR-4").unwrap().functions, vec!["FUN-2"]);
    }

    #[test]
    fn test_fault_chain_levels_and_links() {
        let (mut doc, mut codes) = fixtures::vehicle();
        assert_eq!(doc.function("FUN-1").unwrap().fault_refs, vec!["FLT-1"]);
        assert_eq!(doc.fault("FLT-1").unwrap().causes, vec!["FLT-2"]);
        assert_eq!(doc.fault("FLT-2").unwrap().tier(), Some(FaultTier::Mode));

        // a cause of the FM on a level-2 function would need a level-3 function
        let err = doc
            .create_child_fault("FUN-2", Some("FLT-2"), FaultDraft::new("Corrosion"), &mut codes)
            .unwrap_err();
        assert!(matches!(err, FmeaError::LevelMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_fault_beyond_cause_tier_rejected() {
        let (mut doc, mut codes) = fixtures::vehicle();
        let s6 = doc
            .create_child_structure("STR-4", StructureDraft::new("Piston"), &mut codes)
            .unwrap();
        let s7 = doc
            .create_child_structure(&s6, StructureDraft::new("Seal"), &mut codes)
            .unwrap();
        let f3 = doc
            .create_child_function(&s6, Some("FUN-2"), FunctionDraft::new("Seal fluid"), &mut codes)
            .unwrap();
        let f4 = doc
            .create_child_function(&s7, Some(f3.as_str()), FunctionDraft::new("Stay elastic"), &mut codes)
            .unwrap();
        assert_eq!(doc.function(&f4).unwrap().level, 4);

        let fc = doc
            .create_child_fault(&f3, Some("FLT-2"), FaultDraft::new("Seal leaks"), &mut codes)
            .unwrap();
        assert_eq!(doc.fault(&fc).unwrap().tier(), Some(FaultTier::Cause));

        let err = doc
            .create_child_fault(&f4, Some(fc.as_str()), FaultDraft::new("Seal hardens"), &mut codes)
            .unwrap_err();
        assert!(matches!(err, FmeaError::InvalidField { field: "level", .. }));
    }

    #[test]
    fn test_fault_requires_positive_risk_factor() {
        let (mut doc, mut codes) = fixtures::vehicle();
        let draft = FaultDraft {
            risk_priority_factor: 0,
            ..FaultDraft::new("Noise")
        };
        let err = doc
            .create_child_fault("FUN-1", None, draft, &mut codes)
            .unwrap_err();
        assert!(matches!(
            err,
            FmeaError::InvalidField {
                field: "risk_priority_factor",
                ..
            }
        ));
    }

    #[test]
    fn test_engine_mutations_never_create_cycles() {
        let (mut doc, mut codes) = fixtures::vehicle();
        for parent in ["STR-3", "STR-5", "STR-1"] {
            doc.create_child_structure(parent, StructureDraft::new("Part"), &mut codes)
                .unwrap();
        }
        doc.move_structure("STR-3", MoveDirection::Up).unwrap();
        doc.delete_structure("STR-6").unwrap();
        doc.setup_levels().unwrap();
        assert!(doc.check_cycles().is_ok());
    }

    // =========================================================================
    // Edit
    // =========================================================================

    #[test]
    fn test_edit_changes_fields_only() {
        let (mut doc, _) = fixtures::vehicle();
        doc.edit_structure(
            "STR-2",
            StructurePatch {
                long_name: Some("Brake system".to_string()),
                category: Some("subsystem".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let brake = doc.structure("STR-2").unwrap();
        assert_eq!(brake.long_name, "Brake system");
        assert_eq!(brake.category, "subsystem");
        assert_eq!(brake.decomposition, vec!["STR-4", "STR-5"]);
        assert_eq!(brake.level, 1);
    }

    #[test]
    fn test_edit_fault_validates_risk_factor() {
        let (mut doc, _) = fixtures::vehicle();
        let err = doc
            .edit_fault(
                "FLT-1",
                FaultPatch {
                    risk_priority_factor: Some(0),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, FmeaError::InvalidField { .. }));

        doc.edit_fault(
            "FLT-1",
            FaultPatch {
                risk_priority_factor: Some(8),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(doc.fault("FLT-1").unwrap().risk_priority_factor, 8);
    }

    // =========================================================================
    // Move
    // =========================================================================

    #[test]
    fn test_move_up_swaps_with_predecessor() {
        let (mut doc, _) = fixtures::vehicle();
        assert!(doc.move_structure("STR-5", MoveDirection::Up).unwrap());
        assert_eq!(
            seqs(&doc, "STR-2"),
            vec![("STR-5".to_string(), 1), ("STR-4".to_string(), 2)]
        );
    }

    #[test]
    fn test_move_first_up_is_noop() {
        let (mut doc, _) = fixtures::vehicle();
        let before = doc.clone();
        assert!(!doc.move_structure("STR-4", MoveDirection::Up).unwrap());
        assert!(!doc.move_structure("STR-5", MoveDirection::Down).unwrap());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_move_uses_list_position_not_seq() {
        let (mut doc, mut codes) = fixtures::vehicle();
        doc.create_child_structure("STR-2", StructureDraft::new("Pads"), &mut codes)
            .unwrap();
        // scramble seq values; the list order still decides the neighbour
        doc.structures.get_mut("STR-4").unwrap().seq = 9;
        doc.structures.get_mut("STR-6").unwrap().seq = 4;
        doc.move_structure("STR-6", MoveDirection::Up).unwrap();
        assert_eq!(
            seqs(&doc, "STR-2"),
            vec![
                ("STR-4".to_string(), 1),
                ("STR-6".to_string(), 2),
                ("STR-5".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_move_root_has_no_parent() {
        let (mut doc, _) = fixtures::vehicle();
        let err = doc.move_structure("STR-1", MoveDirection::Down).unwrap_err();
        assert!(matches!(err, FmeaError::ParentNotFound { .. }));
    }

    #[test]
    fn test_move_function_and_fault() {
        let (mut doc, mut codes) = fixtures::vehicle();
        let fun = doc
            .create_child_function("STR-2", None, FunctionDraft::new("Hold"), &mut codes)
            .unwrap();
        doc.move_function(&fun, MoveDirection::Up).unwrap();
        assert_eq!(doc.structure("STR-2").unwrap().functions, vec![fun.as_str(), "FUN-1"]);
        assert_eq!(doc.function(&fun).unwrap().seq, 1);
        assert_eq!(doc.function("FUN-1").unwrap().seq, 2);

        let flt = doc
            .create_child_fault("FUN-1", None, FaultDraft::new("Judder"), &mut codes)
            .unwrap();
        doc.move_fault("FLT-1", MoveDirection::Down).unwrap();
        assert_eq!(doc.function("FUN-1").unwrap().fault_refs, vec![flt.as_str(), "FLT-1"]);
    }

    // =========================================================================
    // Delete
    // =========================================================================

    #[test]
    fn test_delete_gates_leave_document_unchanged() {
        let (mut doc, _) = fixtures::vehicle();
        let before = doc.clone();

        assert!(matches!(
            doc.delete_structure("STR-1"),
            Err(FmeaError::CannotDeleteRoot(_))
        ));
        assert!(matches!(
            doc.delete_structure("STR-2"),
            Err(FmeaError::HasChildren { .. })
        ));
        assert!(matches!(
            doc.delete_structure("STR-4"),
            Err(FmeaError::HasAttachedFunctions(_))
        ));
        assert!(matches!(
            doc.delete_function("FUN-1"),
            Err(FmeaError::HasChildren { .. })
        ));
        assert!(matches!(
            doc.delete_function("FUN-2"),
            Err(FmeaError::HasAttachedFaults(_))
        ));
        assert!(matches!(
            doc.delete_fault("FLT-1"),
            Err(FmeaError::HasChildren { .. })
        ));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_delete_leaf_renumbers_siblings() {
        let (mut doc, mut codes) = fixtures::vehicle();
        doc.create_child_structure("STR-2", StructureDraft::new("Pads"), &mut codes)
            .unwrap();
        doc.delete_structure("STR-5").unwrap();
        assert!(doc.structure("STR-5").is_err());
        assert_eq!(
            seqs(&doc, "STR-2"),
            vec![("STR-4".to_string(), 1), ("STR-6".to_string(), 2)]
        );
    }

    #[test]
    fn test_delete_chain_bottom_up() {
        let (mut doc, _) = fixtures::vehicle();
        doc.delete_fault("FLT-2").unwrap();
        assert!(doc.fault("FLT-1").unwrap().causes.is_empty());
        assert!(doc.function("FUN-2").unwrap().fault_refs.is_empty());

        doc.delete_function("FUN-2").unwrap();
        assert!(doc.function("FUN-1").unwrap().prerequisites.is_empty());
        assert!(doc.structure("STR-4").unwrap().functions.is_empty());

        doc.delete_structure("STR-4").unwrap();
        assert_eq!(seqs(&doc, "STR-2"), vec![("STR-5".to_string(), 1)]);
    }

    #[test]
    fn test_delete_detached_entities_fails() {
        let (mut doc, _) = fixtures::vehicle();
        doc.structures.insert(Structure::new("STR-9", "Loose bracket"));
        doc.functions.insert(Function::new("FUN-9", "Hold bracket", "STR-2"));
        doc.faults.insert(Fault::new("FLT-9", "Bracket loose", "FUN-1"));
        let before = doc.clone();

        assert!(matches!(
            doc.delete_structure("STR-9"),
            Err(FmeaError::ParentNotFound { kind: EntityKind::Structure, .. })
        ));
        assert!(matches!(
            doc.delete_function("FUN-9"),
            Err(FmeaError::ParentNotFound { kind: EntityKind::Function, .. })
        ));
        assert!(matches!(
            doc.delete_fault("FLT-9"),
            Err(FmeaError::ParentNotFound { kind: EntityKind::Fault, .. })
        ));
        assert_eq!(doc, before);
    }

    // =========================================================================
    // Prerequisite links
    // =========================================================================

    #[test]
    fn test_link_rejects_cycles() {
        let (mut doc, _) = fixtures::vehicle();
        let before = doc.clone();
        assert!(matches!(
            doc.link_prerequisite("FUN-2", "FUN-1"),
            Err(FmeaError::CircularReference { .. })
        ));
        assert!(matches!(
            doc.link_prerequisite("FUN-1", "FUN-1"),
            Err(FmeaError::CircularReference { .. })
        ));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_link_and_unlink_recompute_levels() {
        let (mut doc, mut codes) = fixtures::vehicle();
        let hold = doc
            .create_child_function("STR-5", None, FunctionDraft::new("Dissipate heat"), &mut codes)
            .unwrap();
        assert_eq!(doc.function(&hold).unwrap().level, 2);

        assert!(doc.link_prerequisite("FUN-2", &hold).unwrap());
        assert!(!doc.link_prerequisite("FUN-2", &hold).unwrap());
        assert_eq!(doc.function(&hold).unwrap().level, 3);

        assert!(doc.unlink_prerequisite("FUN-2", &hold).unwrap());
        assert!(!doc.unlink_prerequisite("FUN-2", &hold).unwrap());
        assert_eq!(doc.function(&hold).unwrap().level, 2);
    }

    #[test]
    fn test_link_rejects_fault_beyond_cause_tier() {
        let (mut doc, mut codes) = fixtures::vehicle();
        let piston = doc
            .create_child_structure("STR-4", StructureDraft::new("Piston"), &mut codes)
            .unwrap();
        let push = doc
            .create_child_function(&piston, Some("FUN-2"), FunctionDraft::new("Push pad"), &mut codes)
            .unwrap();
        let seized = doc
            .create_child_fault(&push, None, FaultDraft::new("Piston seized"), &mut codes)
            .unwrap();
        let retract = doc
            .create_child_function(&piston, Some("FUN-2"), FunctionDraft::new("Retract pad"), &mut codes)
            .unwrap();
        assert_eq!(doc.fault(&seized).unwrap().level, 3);
        let before = doc.clone();

        // `push` would sit one hop below `retract`, taking its fault to level 4
        let err = doc.link_prerequisite(&retract, &push).unwrap_err();
        assert!(matches!(err, FmeaError::InvalidField { field: "level", .. }));
        assert_eq!(doc, before);
        assert!(doc.validate().is_empty());
    }
}
