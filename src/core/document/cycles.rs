//! Cycle detection
//!
//! Two independent checks:
//!
//! - [`Document::check_cycles`] walks each forward relation depth-first with a
//!   current-path set. Re-entering a node on the current path is a cycle. A
//!   node that has been fully processed is never walked again, so a node
//!   shared by two branches (DAG sharing) passes.
//! - [`check_parent_chain`] walks parent links upward with a visited set and
//!   catches a cycle introduced by assigning a parent, before anything walks
//!   the forward lists.

use std::collections::HashSet;

use super::Document;
use crate::core::entity::EntityKind;
use crate::core::error::{FmeaError, Result};

/// Walk parent links from `start` until one is missing
///
/// Fails with [`FmeaError::CircularReference`] on the first code seen twice.
pub fn check_parent_chain<F>(kind: EntityKind, start: &str, parent_of: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let mut visited = HashSet::new();
    let mut current = start.to_string();
    loop {
        if !visited.insert(current.clone()) {
            return Err(FmeaError::CircularReference {
                kind,
                code: current,
            });
        }
        match parent_of(&current) {
            Some(parent) => current = parent,
            None => return Ok(()),
        }
    }
}

struct CycleSearch<'a, F> {
    kind: EntityKind,
    edges: F,
    path: HashSet<&'a str>,
    visited: HashSet<&'a str>,
}

impl<'a, F> CycleSearch<'a, F>
where
    F: Fn(&str) -> Option<&'a [String]>,
{
    fn new(kind: EntityKind, edges: F) -> Self {
        Self {
            kind,
            edges,
            path: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    fn visit(&mut self, code: &'a str) -> Result<()> {
        if self.path.contains(code) {
            return Err(FmeaError::CircularReference {
                kind: self.kind,
                code: code.to_string(),
            });
        }
        if self.visited.contains(code) {
            return Ok(());
        }

        self.path.insert(code);
        // Dangling codes are leaves here; the resolver reports them
        if let Some(children) = (self.edges)(code) {
            for child in children {
                self.visit(child)?;
            }
        }
        self.path.remove(code);
        self.visited.insert(code);
        Ok(())
    }
}

impl Document {
    /// Check decomposition, prerequisites and causes for cycles
    pub fn check_cycles(&self) -> Result<()> {
        // Root first so a cycle reachable from it is reported along the live tree
        let mut structures = CycleSearch::new(EntityKind::Structure, |code| {
            self.structures.get(code).map(|s| s.decomposition.as_slice())
        });
        if let Some(root) = self.structures.get(&self.header.root_structure_code) {
            structures.visit(&root.code)?;
        }
        for code in self.structures.codes() {
            structures.visit(code)?;
        }

        let mut functions = CycleSearch::new(EntityKind::Function, |code| {
            self.functions.get(code).map(|f| f.prerequisites.as_slice())
        });
        for code in self.functions.codes() {
            functions.visit(code)?;
        }

        let mut faults = CycleSearch::new(EntityKind::Fault, |code| {
            self.faults.get(code).map(|f| f.causes.as_slice())
        });
        for code in self.faults.codes() {
            faults.visit(code)?;
        }
        Ok(())
    }

    /// Walk the structure's ancestors via reverse decomposition lookup
    pub fn check_structure_ancestry(&self, code: &str) -> Result<()> {
        check_parent_chain(EntityKind::Structure, code, |c| {
            self.parent_structure(c).map(|p| p.code.clone())
        })
    }

    /// True when `target` is reachable from `from` through prerequisites
    pub fn prerequisite_reaches(&self, from: &str, target: &str) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(code) = stack.pop() {
            if code == target {
                return true;
            }
            if !seen.insert(code) {
                continue;
            }
            if let Some(function) = self.functions.get(code) {
                stack.extend(function.prerequisites.iter().map(String::as_str));
            }
        }
        false
    }
}
