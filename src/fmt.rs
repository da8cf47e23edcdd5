//! Formatting implementation for the CidrTree

use std::fmt::{Debug, Formatter, Result};

use crate::{CidrTree, Node};

impl<T: Debug> Debug for Node<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.children.is_empty() {
            f.debug_map().entry(&self.block, &self.value).finish()
        } else {
            f.debug_map()
                .entry(&self.block, &(&self.value, &self.children))
                .finish()
        }
    }
}

impl<T: Debug> Debug for CidrTree<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.root {
            Some(root) => root.fmt(f),
            None => f.write_str("{}"),
        }
    }
}
