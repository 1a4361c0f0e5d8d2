// src/detection/call_tree.rs
//! Ephemeral invocation-reachability structure used only during
//! extract/inline detection. A node is (caller, callee, call site); the
//! tree is expanded recursively over the candidate operation set with an
//! explicit membership guard, since helper-call chains are input-controlled
//! and may be cyclic.

use crate::deadline::Deadline;
use crate::error::Result;
use crate::model::{Invocation, Operation};

#[derive(Debug, Clone)]
pub struct CallTreeNode<'m> {
    pub caller: &'m Operation,
    pub callee: &'m Operation,
    pub invocation: Invocation,
    pub parent: Option<usize>,
}

#[derive(Debug)]
pub struct CallTree<'m> {
    nodes: Vec<CallTreeNode<'m>>,
}

impl<'m> CallTree<'m> {
    /// Roots a tree at `invocation` (caller -> callee) and expands it into
    /// further candidate operations reachable from the callee.
    pub fn build(
        caller: &'m Operation,
        callee: &'m Operation,
        invocation: &Invocation,
        candidates: &[&'m Operation],
        deadline: &Deadline,
    ) -> Result<Self> {
        let root = CallTreeNode {
            caller,
            callee,
            invocation: invocation.clone(),
            parent: None,
        };
        let mut tree = Self { nodes: vec![root] };
        tree.expand(0, candidates, deadline)?;
        Ok(tree)
    }

    fn expand(
        &mut self,
        node_index: usize,
        candidates: &[&'m Operation],
        deadline: &Deadline,
    ) -> Result<()> {
        deadline.check()?;
        let callee = self.nodes[node_index].callee;
        let invocations: Vec<Invocation> =
            callee.all_invocations().into_iter().cloned().collect();
        for candidate in candidates {
            for invocation in &invocations {
                if !invocation.matches_operation(candidate) {
                    continue;
                }
                // membership guard: a callee already on the path to the
                // root, or already a sibling, is not expanded again
                if self.contains_in_path_to_root_or_sibling(node_index, candidate) {
                    continue;
                }
                let child = CallTreeNode {
                    caller: callee,
                    callee: candidate,
                    invocation: invocation.clone(),
                    parent: Some(node_index),
                };
                self.nodes.push(child);
                let child_index = self.nodes.len() - 1;
                self.expand(child_index, candidates, deadline)?;
            }
        }
        Ok(())
    }

    fn contains_in_path_to_root_or_sibling(&self, node_index: usize, callee: &Operation) -> bool {
        let mut current = Some(node_index);
        while let Some(index) = current {
            if self.nodes[index].callee.key() == callee.key() {
                return true;
            }
            current = self.nodes[index].parent;
        }
        self.nodes
            .iter()
            .any(|n| n.parent == Some(node_index) && n.callee.key() == callee.key())
    }

    /// Nodes in breadth-first order, root first.
    #[must_use]
    pub fn nodes_in_breadth_first_order(&self) -> Vec<&CallTreeNode<'m>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut frontier = vec![0usize];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for index in frontier {
                out.push(&self.nodes[index]);
                for (i, node) in self.nodes.iter().enumerate() {
                    if node.parent == Some(index) {
                        next.push(i);
                    }
                }
            }
            frontier = next;
        }
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
