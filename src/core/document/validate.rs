//! Whole-document rule checking
//!
//! Unlike the engine operations, validation does not stop at the first
//! problem: every violation is collected into one [`ValidationErrors`].

use std::collections::HashMap;

use super::{resolve::resolve, Arena, Document};
use crate::core::entity::{Entity, Relation};
use crate::core::error::ValidationErrors;
use crate::entities::FaultTier;

impl Document {
    /// Check every hierarchy rule and report all violations
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.check_root(&mut errors);
        self.check_references(&mut errors);
        self.check_ownership(&mut errors);
        self.check_sequences(&mut errors);
        self.check_faults(&mut errors);

        match self.check_cycles() {
            Ok(()) => self.check_levels(&mut errors),
            Err(e) => errors.push(
                e.to_string(),
                Some("Levels cannot be checked until the cycle is removed"),
            ),
        }
        errors
    }

    fn check_root(&self, errors: &mut ValidationErrors) {
        let root = &self.header.root_structure_code;
        let Some(structure) = self.structures.get(root) else {
            errors.push(
                format!("Root structure {} does not exist", root),
                Some("Every document needs a level-0 root structure"),
            );
            return;
        };
        if structure.level != 0 {
            errors.push(
                format!("Root structure {} has level {} instead of 0", root, structure.level),
                None,
            );
        }
        if let Some(parent) = self.parent_structure(root) {
            errors.push(
                format!("Root structure {} is listed as a child of {}", root, parent.code),
                None,
            );
        }
    }

    fn check_references(&self, errors: &mut ValidationErrors) {
        for s in self.structures.iter() {
            push_unresolved(errors, &self.structures, &s.code, Relation::Decomposition, &s.decomposition);
            push_unresolved(errors, &self.functions, &s.code, Relation::Functions, &s.functions);
        }
        for f in self.functions.iter() {
            push_unresolved(errors, &self.functions, &f.code, Relation::Prerequisites, &f.prerequisites);
            push_unresolved(errors, &self.faults, &f.code, Relation::FaultRefs, &f.fault_refs);
        }
        for f in self.faults.iter() {
            push_unresolved(errors, &self.faults, &f.code, Relation::Causes, &f.causes);
        }
    }

    fn check_ownership(&self, errors: &mut ValidationErrors) {
        // A tree: each structure has at most one parent and hangs off the root
        let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
        for s in self.structures.iter() {
            for child in &s.decomposition {
                parents.entry(child.as_str()).or_default().push(&s.code);
            }
        }
        for s in self.structures.iter() {
            match parents.get(s.code.as_str()) {
                Some(claimed) if claimed.len() > 1 => errors.push(
                    format!(
                        "Structure {} is listed by more than one parent: {}",
                        s.code,
                        claimed.join(", ")
                    ),
                    Some("A structure belongs to exactly one decomposition"),
                ),
                None if s.code != self.header.root_structure_code => errors.push(
                    format!("Structure {} is not part of the decomposition tree", s.code),
                    Some("Attach it under a parent or delete it"),
                ),
                _ => {}
            }
        }

        let mut owners: HashMap<&str, Vec<&str>> = HashMap::new();
        for s in self.structures.iter() {
            for code in &s.functions {
                owners.entry(code.as_str()).or_default().push(&s.code);
            }
        }
        for f in self.functions.iter() {
            match owners.get(f.code.as_str()).map(Vec::as_slice) {
                None | Some([]) => errors.push(
                    format!("Function {} is not attached to any structure", f.code),
                    None,
                ),
                Some([owner]) if *owner != f.structure_code => errors.push(
                    format!(
                        "Function {} names structure {} but is attached to {}",
                        f.code, f.structure_code, owner
                    ),
                    None,
                ),
                Some([_]) => {}
                Some(many) => errors.push(
                    format!("Function {} is attached to several structures: {}", f.code, many.join(", ")),
                    None,
                ),
            }
        }

        let mut owners: HashMap<&str, Vec<&str>> = HashMap::new();
        for f in self.functions.iter() {
            for code in &f.fault_refs {
                owners.entry(code.as_str()).or_default().push(&f.code);
            }
        }
        for f in self.faults.iter() {
            match owners.get(f.code.as_str()).map(Vec::as_slice) {
                None | Some([]) => errors.push(
                    format!("Fault {} is not attached to any function", f.code),
                    None,
                ),
                Some([owner]) if *owner != f.function_code => errors.push(
                    format!(
                        "Fault {} names function {} but is attached to {}",
                        f.code, f.function_code, owner
                    ),
                    None,
                ),
                Some([_]) => {}
                Some(many) => errors.push(
                    format!("Fault {} is attached to several functions: {}", f.code, many.join(", ")),
                    None,
                ),
            }
        }
    }

    fn check_sequences(&self, errors: &mut ValidationErrors) {
        for s in self.structures.iter() {
            push_gapped(errors, &self.structures, &s.code, Relation::Decomposition, &s.decomposition);
            push_gapped(errors, &self.functions, &s.code, Relation::Functions, &s.functions);
        }
        for f in self.functions.iter() {
            push_gapped(errors, &self.faults, &f.code, Relation::FaultRefs, &f.fault_refs);
        }
    }

    fn check_faults(&self, errors: &mut ValidationErrors) {
        for f in self.faults.iter() {
            if FaultTier::from_level(f.level).is_none() {
                errors.push(
                    format!(
                        "Fault {} is at level {}; faults must be at level 1 to {}",
                        f.code,
                        f.level,
                        FaultTier::MAX_LEVEL
                    ),
                    Some("Faults are effects (1), modes (2) or causes (3)"),
                );
            }
            if f.risk_priority_factor == 0 {
                errors.push(
                    format!("Fault {} has a risk priority factor of 0", f.code),
                    Some("Risk priority factors are positive integers"),
                );
            }
        }
    }

    /// Stored levels must match a fresh recomputation
    fn check_levels(&self, errors: &mut ValidationErrors) {
        let mut expected = self.clone();
        if let Err(e) = expected.setup_levels() {
            errors.push(e.to_string(), None);
            return;
        }
        push_stale_levels(errors, &self.structures, &expected.structures);
        push_stale_levels(errors, &self.functions, &expected.functions);
        push_stale_levels(errors, &self.faults, &expected.faults);
    }
}

fn push_unresolved<T: Entity>(
    errors: &mut ValidationErrors,
    arena: &Arena<T>,
    owner: &str,
    relation: Relation,
    codes: &[String],
) {
    if let Err(e) = resolve(arena, owner, relation, codes) {
        let missing: Vec<&str> = codes
            .iter()
            .filter(|c| !arena.contains(c))
            .map(String::as_str)
            .collect();
        let detail = if missing.is_empty() {
            "duplicate code in list".to_string()
        } else {
            format!("unknown {}", missing.join(", "))
        };
        errors.push(format!("{} ({})", e, detail), None);
    }
}

fn push_gapped<T: Entity>(
    errors: &mut ValidationErrors,
    arena: &Arena<T>,
    owner: &str,
    relation: Relation,
    codes: &[String],
) {
    let mut seqs: Vec<u32> = codes.iter().filter_map(|c| arena.get(c)).map(|e| e.seq()).collect();
    seqs.sort_unstable();
    if seqs.iter().zip(1..).any(|(seq, expected)| *seq != expected) {
        errors.push(
            format!(
                "{} {} entries are not numbered 1..{} (found {:?})",
                owner,
                relation,
                seqs.len(),
                seqs
            ),
            Some("Moving or re-saving the entries renumbers them"),
        );
    }
}

fn push_stale_levels<T: Entity>(errors: &mut ValidationErrors, stored: &Arena<T>, expected: &Arena<T>) {
    for entity in stored.iter() {
        if let Some(want) = expected.get(entity.code()) {
            if want.level() != entity.level() {
                errors.push(
                    format!(
                        "{} {} has level {} but should be at level {}",
                        T::KIND,
                        entity.code(),
                        entity.level(),
                        want.level()
                    ),
                    None,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;

    #[test]
    fn test_engine_built_document_is_valid() {
        let (doc, _) = fixtures::vehicle();
        let errors = doc.validate();
        assert!(errors.is_empty(), "{:?}", errors.messages());
        assert!(fixtures::scenario().validate().is_empty());
    }

    #[test]
    fn test_reports_every_problem_at_once() {
        let (mut doc, _) = fixtures::vehicle();
        doc.structures.get_mut("STR-3").unwrap().seq = 5;
        doc.structures.get_mut("STR-4").unwrap().level = 7;
        doc.faults.get_mut("FLT-1").unwrap().risk_priority_factor = 0;
        doc.functions
            .get_mut("FUN-1")
            .unwrap()
            .prerequisites
            .push("FUN-404".to_string());

        let errors = doc.validate();
        let messages = errors.messages().join("\n");
        assert!(messages.contains("FUN-404"), "{}", messages);
        assert!(messages.contains("STR-1 decomposition entries are not numbered"), "{}", messages);
        assert!(messages.contains("structure STR-4 has level 7"), "{}", messages);
        assert!(messages.contains("risk priority factor of 0"), "{}", messages);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_shared_structure_is_flagged() {
        let (mut doc, _) = fixtures::vehicle();
        doc.structures
            .get_mut("STR-3")
            .unwrap()
            .decomposition
            .push("STR-5".to_string());
        let errors = doc.validate();
        assert!(errors
            .messages()
            .iter()
            .any(|m| m.contains("STR-5 is listed by more than one parent")));
    }

    #[test]
    fn test_cycle_is_reported_not_thrown() {
        let (mut doc, _) = fixtures::vehicle();
        doc.structures
            .get_mut("STR-4")
            .unwrap()
            .decomposition
            .push("STR-2".to_string());
        let errors = doc.validate();
        assert!(errors.messages().iter().any(|m| m.contains("Circular reference")));
    }

    #[test]
    fn test_owner_mismatch_and_orphans() {
        let (mut doc, _) = fixtures::vehicle();
        doc.functions.get_mut("FUN-2").unwrap().structure_code = "STR-5".to_string();
        doc.structures
            .get_mut("STR-1")
            .unwrap()
            .decomposition
            .retain(|c| c != "STR-3");
        let messages = doc.validate().messages().join("\n");
        assert!(messages.contains("Function FUN-2 names structure STR-5 but is attached to STR-4"));
        assert!(messages.contains("Structure STR-3 is not part of the decomposition tree"));
    }

    #[test]
    fn test_missing_root() {
        let (mut doc, _) = fixtures::vehicle();
        doc.header.root_structure_code = "STR-99".to_string();
        let messages = doc.validate().messages().join("\n");
        assert!(messages.contains("Root structure STR-99 does not exist"));
    }
}
