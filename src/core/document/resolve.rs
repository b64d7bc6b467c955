//! Reference resolution
//!
//! Every traversal of the document goes through these lookups. Resolution is
//! strict: a code list that does not resolve one-to-one is corruption and
//! fails with [`FmeaError::ReferenceCountMismatch`].

use std::collections::HashSet;

use super::{Arena, Document};
use crate::core::entity::{Entity, Relation};
use crate::core::error::{FmeaError, Result};
use crate::entities::{Fault, Function, Structure};

/// Resolve `codes` against `arena`, keeping the order of the list
pub(crate) fn resolve<'a, T: Entity>(
    arena: &'a Arena<T>,
    owner: &str,
    relation: Relation,
    codes: &[String],
) -> Result<Vec<&'a T>> {
    let mut seen = HashSet::with_capacity(codes.len());
    let resolved: Vec<&T> = codes
        .iter()
        .filter(|code| seen.insert(code.as_str()))
        .filter_map(|code| arena.get(code))
        .collect();

    if resolved.len() != codes.len() {
        return Err(FmeaError::ReferenceCountMismatch {
            owner: owner.to_string(),
            relation,
            expected: codes.len(),
            found: resolved.len(),
        });
    }
    Ok(resolved)
}

impl Document {
    /// Child structures, in decomposition order
    pub fn children(&self, structure: &Structure) -> Result<Vec<&Structure>> {
        resolve(
            &self.structures,
            &structure.code,
            Relation::Decomposition,
            &structure.decomposition,
        )
    }

    /// Functions attached to a structure
    pub fn functions_of(&self, structure: &Structure) -> Result<Vec<&Function>> {
        resolve(
            &self.functions,
            &structure.code,
            Relation::Functions,
            &structure.functions,
        )
    }

    pub fn prerequisites(&self, function: &Function) -> Result<Vec<&Function>> {
        resolve(
            &self.functions,
            &function.code,
            Relation::Prerequisites,
            &function.prerequisites,
        )
    }

    pub fn faults_of(&self, function: &Function) -> Result<Vec<&Fault>> {
        resolve(
            &self.faults,
            &function.code,
            Relation::FaultRefs,
            &function.fault_refs,
        )
    }

    pub fn causes(&self, fault: &Fault) -> Result<Vec<&Fault>> {
        resolve(&self.faults, &fault.code, Relation::Causes, &fault.causes)
    }

    /// The structure whose decomposition lists `code` (reverse scan)
    pub fn parent_structure(&self, code: &str) -> Option<&Structure> {
        self.structures
            .iter()
            .find(|s| s.decomposition.iter().any(|c| c == code))
    }

    /// The structure whose `functions` list holds `function_code`
    pub fn owning_structure(&self, function_code: &str) -> Option<&Structure> {
        self.structures
            .iter()
            .find(|s| s.functions.iter().any(|c| c == function_code))
    }

    /// The function whose `fault_refs` list holds `fault_code`
    pub fn owning_function(&self, fault_code: &str) -> Option<&Function> {
        self.functions
            .iter()
            .find(|f| f.fault_refs.iter().any(|c| c == fault_code))
    }

    /// Functions listing `function_code` as a prerequisite
    pub fn dependents(&self, function_code: &str) -> Vec<&Function> {
        self.functions
            .iter()
            .filter(|f| f.prerequisites.iter().any(|c| c == function_code))
            .collect()
    }

    /// Faults listing `fault_code` as a cause
    pub fn effects_of(&self, fault_code: &str) -> Vec<&Fault> {
        self.faults
            .iter()
            .filter(|f| f.causes.iter().any(|c| c == fault_code))
            .collect()
    }
}
