//! Implementation of insertion: placement, sibling splicing, and root promotion.

use std::cmp::Ordering;
use std::mem;

use crate::{Block, Node};

/// The outcome of a successful [`CidrTree::insert`](crate::CidrTree::insert).
#[must_use = "an insertion may change which node is the root"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion<T> {
    /// The block was new; a node was created for it below the existing root.
    Inserted,
    /// The exact block was already present; its value was overwritten in place.
    Replaced(T),
    /// The block contains the previous root. The tree's root is now a node for this block, with
    /// the previous root (unchanged) as its only child.
    NewRoot,
}

/// A block/value pair a subtree could not place, handed back to the parent level together with
/// how the subtree relates to it.
pub(crate) struct Unplaced<T> {
    pub(crate) block: Block,
    pub(crate) value: T,
    /// The subtree's root block lies inside `block`'s range.
    pub(crate) is_child: bool,
    /// The subtree's address sorts before `block`'s, so later siblings may still match.
    pub(crate) check_next: bool,
}

/// One step of the insertion descent.
pub(crate) enum Placed<T> {
    /// The pair was stored in the subtree; carries the replaced value on an exact match.
    Done(Option<T>),
    /// The subtree does not cover the pair.
    Miss(Unplaced<T>),
}

impl<T> Node<T> {
    /// Place `block` in the subtree rooted at `self`. Where the block subsumes a contiguous run
    /// of children, the run is spliced under the new node.
    pub(crate) fn insert_in(&mut self, block: Block, value: T) -> Placed<T> {
        let by_mask = self.block.cmp_mask(&block);
        let check_next = self.block.cmp_addr(&block) == Ordering::Less;

        if by_mask == Ordering::Equal {
            if self.block.same_addr(&block) {
                return Placed::Done(Some(mem::replace(&mut self.value, value)));
            }
            // Equal specificity, different address: disjoint from self.
            return Placed::Miss(Unplaced {
                block,
                value,
                is_child: false,
                check_next,
            });
        }
        if by_mask == Ordering::Greater {
            // Self is narrower than the new block and may end up below it.
            let is_child = block.contains_addr(self.block.addr());
            return Placed::Miss(Unplaced {
                block,
                value,
                is_child,
                check_next,
            });
        }
        if !self.block.contains_addr(block.addr()) {
            return Placed::Miss(Unplaced {
                block,
                value,
                is_child: false,
                check_next,
            });
        }

        // Self covers the new block: either one child covers it too, or the new node becomes a
        // child of self, absorbing the contiguous run of children it subsumes.
        let mut run_start = 0;
        let mut run_len = 0;
        let (mut block, mut value) = (block, value);
        for i in 0..self.children.len() {
            match self.children[i].insert_in(block, value) {
                Placed::Done(replaced) => return Placed::Done(replaced),
                Placed::Miss(miss) => {
                    block = miss.block;
                    value = miss.value;
                    if miss.is_child {
                        if run_len == 0 {
                            run_start = i;
                        }
                        run_len += 1;
                    } else if !miss.check_next {
                        // This child already sorts above the new block: splice here.
                        let at = if run_len > 0 { run_start } else { i };
                        self.splice(at, run_len, block, value);
                        return Placed::Done(None);
                    }
                }
            }
        }
        // Ran past the last child: append, absorbing a trailing run if one was found.
        let at = if run_len > 0 {
            run_start
        } else {
            self.children.len()
        };
        self.splice(at, run_len, block, value);
        Placed::Done(None)
    }

    /// Replace `take` children starting at `at` with a single node for `block` that owns them.
    fn splice(&mut self, at: usize, take: usize, block: Block, value: T) {
        let absorbed: Vec<Node<T>> = self.children.drain(at..at + take).collect();
        self.children.insert(at, Node::with_children(block, value, absorbed));
    }
}
