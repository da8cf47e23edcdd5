//! Implementation of exact and longest-prefix lookups.

use std::cmp::Ordering;

use crate::{Block, Node};

impl<T> Node<T> {
    /// Locate the node whose block equals `query`, or, with `allow_supernet`, the most specific
    /// node whose block contains it.
    pub(crate) fn find_node(&self, query: &Block, allow_supernet: bool) -> Option<&Node<T>> {
        match self.block.cmp_mask(query) {
            // Nodes of equal specificity are mutually exclusive: only a byte-identical address
            // can match, and no descendant can.
            Ordering::Equal => self.block.same_addr(query).then_some(self),
            // This node is narrower than the query, so it is neither the query nor an ancestor.
            Ordering::Greater => None,
            Ordering::Less => {
                if !self.block.contains_addr(query.addr()) {
                    return None;
                }
                // Siblings are disjoint: at most one child can succeed.
                for child in &self.children {
                    if let Some(found) = child.find_node(query, allow_supernet) {
                        return Some(found);
                    }
                }
                allow_supernet.then_some(self)
            }
        }
    }

    /// Same descent as [`Node::find_node`], returning a mutable node.
    pub(crate) fn find_node_mut(
        &mut self,
        query: &Block,
        allow_supernet: bool,
    ) -> Option<&mut Node<T>> {
        match self.block.cmp_mask(query) {
            Ordering::Equal => {
                if self.block.same_addr(query) {
                    Some(self)
                } else {
                    None
                }
            }
            Ordering::Greater => None,
            Ordering::Less => {
                if !self.block.contains_addr(query.addr()) {
                    return None;
                }
                // Probe immutably first: a failed mutable child search would keep `self`
                // borrowed and rule out the supernet fallback.
                let hit = self
                    .children
                    .iter()
                    .position(|child| child.find_node(query, allow_supernet).is_some());
                match hit {
                    Some(i) => self.children[i].find_node_mut(query, allow_supernet),
                    None if allow_supernet => Some(self),
                    None => None,
                }
            }
        }
    }
}
