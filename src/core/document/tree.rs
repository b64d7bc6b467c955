//! Read-side projections: display tree and function graph

use serde::Serialize;
use std::fmt::Write as _;

use super::{by_seq, Document};
use crate::core::entity::{Entity, EntityKind};
use crate::core::error::Result;
use crate::entities::{Function, Structure};

/// A display node labeled `code/long_name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// Entity code
    pub key: String,
    pub label: String,
    pub kind: EntityKind,
    pub children: Vec<TreeNode>,
    pub is_leaf: bool,
}

impl TreeNode {
    fn leaf<T: Entity>(entity: &T) -> Self {
        Self {
            key: entity.code().to_string(),
            label: entity.label(),
            kind: T::KIND,
            children: Vec::new(),
            is_leaf: true,
        }
    }

    /// Number of nodes in this subtree, including this one
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Box-drawing text rendering, one node per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.label);
        render_children(&self.children, "", &mut out);
        out
    }
}

fn render_children(children: &[TreeNode], prefix: &str, out: &mut String) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let branch = if is_last { "└─ " } else { "├─ " };
        let _ = writeln!(out, "{}{}{}", prefix, branch, child.label);

        let nested = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
        render_children(&child.children, &nested, out);
    }
}

/// A function in the prerequisite graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub code: String,
    pub label: String,
    pub level: u32,
    pub structure_code: String,
    /// Outgoing edges, in list order
    pub prerequisites: Vec<String>,
}

impl Document {
    /// Build the display tree below `root`
    ///
    /// Structures are ordered by `seq` at every level. Functions (and their
    /// faults) are added as children when requested. The document is not
    /// modified.
    pub fn generate_tree(
        &self,
        root: &str,
        include_functions: bool,
        include_faults: bool,
    ) -> Result<TreeNode> {
        self.check_cycles()?;
        let root = self.structure(root)?;
        self.structure_node(root, include_functions, include_faults)
    }

    fn structure_node(
        &self,
        structure: &Structure,
        include_functions: bool,
        include_faults: bool,
    ) -> Result<TreeNode> {
        let mut node = TreeNode::leaf(structure);

        let children = by_seq(self.children(structure)?);
        let has_children = !children.is_empty();
        for child in children {
            node.children
                .push(self.structure_node(child, include_functions, include_faults)?);
        }

        let mut has_functions = false;
        if include_functions {
            let functions = by_seq(self.functions_of(structure)?);
            has_functions = !functions.is_empty();
            for function in functions {
                node.children.push(self.function_node(function, include_faults)?);
            }
        }

        node.is_leaf = !has_children && !has_functions;
        Ok(node)
    }

    fn function_node(&self, function: &Function, include_faults: bool) -> Result<TreeNode> {
        let mut node = TreeNode::leaf(function);
        if include_faults {
            node.children = by_seq(self.faults_of(function)?)
                .into_iter()
                .map(TreeNode::leaf)
                .collect();
            node.is_leaf = node.children.is_empty();
        }
        Ok(node)
    }

    /// Every function with its prerequisite edges, ordered by level then code
    pub fn function_graph(&self) -> Result<Vec<GraphNode>> {
        let mut nodes = Vec::with_capacity(self.functions.len());
        for function in self.functions.iter() {
            let prerequisites = self
                .prerequisites(function)?
                .into_iter()
                .map(|p| p.code.clone())
                .collect();
            nodes.push(GraphNode {
                code: function.code.clone(),
                label: function.label(),
                level: function.level,
                structure_code: function.structure_code.clone(),
                prerequisites,
            });
        }
        nodes.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.code.cmp(&b.code)));
        Ok(nodes)
    }
}
