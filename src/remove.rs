//! Implementation of removal and root dissolution.

use std::cmp::Ordering;

use crate::{Block, Node};

/// The outcome of a successful [`CidrTree::remove`](crate::CidrTree::remove).
#[must_use = "a removal may dissolve the tree's root"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal<T> {
    /// The matching node, detached from its parent together with its whole subtree.
    Removed(Node<T>),
    /// The root itself matched. Its former children are now independent roots, and the tree is
    /// left empty; adopt one with [`CidrTree::from_root`](crate::CidrTree::from_root).
    RootRemoved {
        /// The removed root's value.
        value: T,
        /// The removed root's direct children, in no particular order of preference.
        roots: Vec<Node<T>>,
    },
}

/// One step of the removal descent.
pub(crate) enum Extraction<T> {
    /// A node below `self` matched and has been spliced out of its parent.
    Removed(Node<T>),
    /// `self` is the exact match; the caller owns the splice.
    IsSelf,
    /// Nothing in this subtree matches.
    NotFound,
}

impl<T> Node<T> {
    /// Locate the node whose block equals `block` and splice it out of its parent's child list,
    /// keeping the remaining siblings in order. A match of `self` is reported upward instead.
    pub(crate) fn remove_in(&mut self, block: &Block) -> Extraction<T> {
        match self.block.cmp_mask(block) {
            Ordering::Equal => {
                if self.block.same_addr(block) {
                    Extraction::IsSelf
                } else {
                    Extraction::NotFound
                }
            }
            Ordering::Greater => Extraction::NotFound,
            Ordering::Less => {
                if !self.block.contains_addr(block.addr()) {
                    return Extraction::NotFound;
                }
                for i in 0..self.children.len() {
                    match self.children[i].remove_in(block) {
                        Extraction::NotFound => {}
                        Extraction::IsSelf => {
                            return Extraction::Removed(self.children.remove(i));
                        }
                        removed => return removed,
                    }
                }
                Extraction::NotFound
            }
        }
    }
}
