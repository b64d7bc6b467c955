//! Pre-order flattening
//!
//! Flattening starts from the level-1 entities, not from the level-0 root:
//! the root itself never appears in the flattened structure list.

use std::collections::HashSet;

use super::{by_seq, Document};
use crate::core::error::Result;
use crate::entities::{Function, Structure};

impl Document {
    /// Structures in pre-order, starting from every level-1 structure
    pub fn flatten_structures(&self) -> Result<Vec<&Structure>> {
        self.check_cycles()?;

        let forest = by_seq(self.structures.iter().filter(|s| s.level == 1).collect());
        let mut out = Vec::with_capacity(self.structures.len());
        let mut seen = HashSet::new();
        for structure in forest {
            self.flatten_structure(structure, &mut out, &mut seen)?;
        }
        Ok(out)
    }

    fn flatten_structure<'a>(
        &'a self,
        structure: &'a Structure,
        out: &mut Vec<&'a Structure>,
        seen: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if !seen.insert(&structure.code) {
            return Ok(());
        }
        out.push(structure);
        for child in by_seq(self.children(structure)?) {
            self.flatten_structure(child, out, seen)?;
        }
        Ok(())
    }

    /// Functions in pre-order through `prerequisites`, starting from every
    /// level-1 function
    pub fn flatten_functions(&self) -> Result<Vec<&Function>> {
        self.check_cycles()?;

        let forest = by_seq(self.functions.iter().filter(|f| f.level == 1).collect());
        let mut out = Vec::with_capacity(self.functions.len());
        let mut seen = HashSet::new();
        for function in forest {
            self.flatten_function(function, &mut out, &mut seen)?;
        }
        Ok(out)
    }

    fn flatten_function<'a>(
        &'a self,
        function: &'a Function,
        out: &mut Vec<&'a Function>,
        seen: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if !seen.insert(&function.code) {
            return Ok(());
        }
        out.push(function);
        for prerequisite in self.prerequisites(function)? {
            self.flatten_function(prerequisite, out, seen)?;
        }
        Ok(())
    }
}
