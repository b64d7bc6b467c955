//! Level computation

use std::collections::HashMap;

use tracing::debug;

use super::Document;
use crate::core::error::Result;

impl Document {
    /// Recompute every level from scratch
    ///
    /// Structures take their depth below the root along `decomposition`.
    /// Functions start at their owning structure's level; functions of level-1
    /// structures are then set to 1 and walked through `prerequisites`, one
    /// level per hop. Faults start at their owning function's level (at least
    /// 1); faults of level-1 functions are set to 1 and walked through
    /// `causes` the same way. Every previous level is overwritten.
    ///
    /// An entity reached along several paths takes the deepest of them, even
    /// when that lifts a function of a level-1 structure above level 1.
    ///
    /// Runs the cycle check first, so a cyclic document is rejected before any
    /// level is touched.
    pub fn setup_levels(&mut self) -> Result<()> {
        self.check_cycles()?;

        let structure_levels = self.structure_depths();
        for structure in self.structures.iter_mut() {
            structure.level = structure_levels.get(&structure.code).copied().unwrap_or(0);
        }

        let function_levels = self.function_depths();
        for function in self.functions.iter_mut() {
            function.level = function_levels.get(&function.code).copied().unwrap_or(0);
        }

        let fault_levels = self.fault_depths();
        for fault in self.faults.iter_mut() {
            fault.level = fault_levels.get(&fault.code).copied().unwrap_or(1);
        }

        debug!(
            document = %self.header.code,
            structures = structure_levels.len(),
            functions = function_levels.len(),
            faults = fault_levels.len(),
            "levels recomputed"
        );
        Ok(())
    }

    fn structure_depths(&self) -> HashMap<String, u32> {
        let mut depths = HashMap::new();
        let root = self.header.root_structure_code.clone();
        if self.structures.contains(&root) {
            self.walk(&[root], 0, &mut depths, |doc, code| {
                doc.structures
                    .get(code)
                    .map(|s| s.decomposition.clone())
                    .unwrap_or_default()
            });
        }
        depths
    }

    fn function_depths(&self) -> HashMap<String, u32> {
        let mut depths = HashMap::new();
        for structure in self.structures.iter() {
            for code in &structure.functions {
                depths.insert(code.clone(), structure.level);
            }
        }

        let starts: Vec<String> = self
            .structures
            .iter()
            .filter(|s| s.level == 1)
            .flat_map(|s| s.functions.iter().cloned())
            .collect();
        self.walk(&starts, 1, &mut depths, |doc, code| {
            doc.functions
                .get(code)
                .map(|f| f.prerequisites.clone())
                .unwrap_or_default()
        });
        depths
    }

    fn fault_depths(&self) -> HashMap<String, u32> {
        let mut depths = HashMap::new();
        for function in self.functions.iter() {
            for code in &function.fault_refs {
                depths.insert(code.clone(), function.level.max(1));
            }
        }

        let starts: Vec<String> = self
            .functions
            .iter()
            .filter(|f| f.level == 1)
            .flat_map(|f| f.fault_refs.iter().cloned())
            .collect();
        self.walk(&starts, 1, &mut depths, |doc, code| {
            doc.faults
                .get(code)
                .map(|f| f.causes.clone())
                .unwrap_or_default()
        });
        depths
    }

    /// Assign `depth` to each start and one more per hop below it, replacing
    /// any baseline in `depths`. A node reached by two paths keeps the deeper
    /// level.
    fn walk<F>(&self, starts: &[String], depth: u32, depths: &mut HashMap<String, u32>, next: F)
    where
        F: Fn(&Document, &str) -> Vec<String> + Copy,
    {
        let mut walked = HashMap::new();
        for code in starts {
            self.descend(code, depth, &mut walked, next);
        }
        depths.extend(walked);
    }

    fn descend<F>(&self, code: &str, depth: u32, walked: &mut HashMap<String, u32>, next: F)
    where
        F: Fn(&Document, &str) -> Vec<String> + Copy,
    {
        if walked.get(code).is_some_and(|&known| known >= depth) {
            return;
        }
        walked.insert(code.to_string(), depth);
        for child in next(self, code) {
            self.descend(&child, depth + 1, walked, next);
        }
    }
}
