//! Implementation of the CIDR tree handle.

use std::mem;

use crate::insert::Placed;
use crate::remove::Extraction;
use crate::traverse::{Blocks, Values};
use crate::{Block, InsertError, Insertion, Iter, LengthError, LookupError, Node, Removal};

/// A tree of network blocks with a value attached to every node.
///
/// The tree is keyed by containment: every child's block lies strictly inside its parent's
/// block, and siblings are disjoint and sorted by address. Lookups match either exactly or by
/// longest prefix, and mutations keep the containment structure intact by re-nesting nodes as
/// needed.
///
/// All blocks in one tree share a single address byte length, fixed at construction (4 for
/// IPv4, 16 for IPv6). Operations given a block of any other length fail without touching the
/// tree.
///
/// ```
/// # use cidr_tree::*;
/// # use ipnet::Ipv4Net;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = CidrTree::with_root("10.0.0.0/8".parse::<Ipv4Net>()?.into(), "rfc1918");
/// let _ = tree.insert("10.1.0.0/16".parse::<Ipv4Net>()?.into(), "site")?;
/// let _ = tree.insert("10.1.2.0/24".parse::<Ipv4Net>()?.into(), "lab")?;
///
/// // longest-prefix match
/// assert_eq!(tree.find(&Block::host(&[10, 1, 2, 3]), true)?, &"lab");
/// assert_eq!(tree.find(&Block::host(&[10, 1, 9, 9]), true)?, &"site");
/// assert_eq!(tree.find(&Block::host(&[10, 9, 9, 9]), true)?, &"rfc1918");
///
/// // exact match only
/// assert_eq!(tree.find(&Block::host(&[10, 1, 2, 3]), false), Err(LookupError::NotFound));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CidrTree<T> {
    pub(crate) root: Option<Node<T>>,
    addr_len: usize,
}

impl<T> CidrTree<T> {
    /// Create a tree whose root is the all-zero block of `addr_len` bytes (`0.0.0.0/0` for
    /// length 4), holding `root_value`. Such a root contains every block of that length, so
    /// insertions can never fail with [`InsertError::Disjoint`] or promote a new root.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// let tree = CidrTree::new(4, "default");
    /// assert_eq!(tree.root().unwrap().block().to_string(), "0.0.0.0/0");
    /// ```
    pub fn new(addr_len: usize, root_value: T) -> Self {
        Self {
            root: Some(Node::new(Block::zero(addr_len), root_value)),
            addr_len,
        }
    }

    /// Create a tree rooted at an explicit block. The tree's address length is the block's.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let tree = CidrTree::with_root("192.168.0.0/16".parse::<Ipv4Net>()?.into(), 1);
    /// assert_eq!(tree.addr_len(), 4);
    /// assert_eq!(tree.count(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_root(block: Block, value: T) -> Self {
        Self::from_root(Node::new(block, value))
    }

    /// Adopt an existing node (and its whole subtree) as a tree, for instance one of the roots
    /// vended by [`Removal::RootRemoved`].
    pub fn from_root(root: Node<T>) -> Self {
        Self {
            addr_len: root.block().addr_len(),
            root: Some(root),
        }
    }

    /// Create a tree without any nodes. Every lookup and removal fails with
    /// [`LookupError::NotFound`] until a first insertion establishes the root.
    pub fn empty(addr_len: usize) -> Self {
        Self {
            root: None,
            addr_len,
        }
    }

    /// The address byte length every block in this tree must have.
    pub fn addr_len(&self) -> usize {
        self.addr_len
    }

    /// The number of nodes in the tree.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = CidrTree::new(4, 0);
    /// assert_eq!(tree.count(), 1);
    /// let _ = tree.insert("192.168.0.0/16".parse::<Ipv4Net>()?.into(), 1)?;
    /// assert_eq!(tree.count(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn count(&self) -> usize {
        self.root.as_ref().map_or(0, Node::count)
    }

    /// Whether the tree has no nodes (only possible after the root was removed, or for a tree
    /// built with [`CidrTree::empty`]).
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The root node, if the tree is not empty.
    pub fn root(&self) -> Option<&Node<T>> {
        self.root.as_ref()
    }

    /// Get the value stored for `block`. Without `allow_supernet` only a byte-identical block
    /// matches; with it, the most specific block containing `block` is returned instead.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = CidrTree::with_root("192.168.0.0/16".parse::<Ipv4Net>()?.into(), 0);
    /// let _ = tree.insert("192.168.2.0/24".parse::<Ipv4Net>()?.into(), 5)?;
    ///
    /// let host = Block::host(&[192, 168, 2, 1]);
    /// assert_eq!(tree.find(&host, true)?, &5);
    /// assert_eq!(tree.find(&host, false), Err(LookupError::NotFound));
    /// # Ok(())
    /// # }
    /// ```
    pub fn find(&self, block: &Block, allow_supernet: bool) -> Result<&T, LookupError> {
        self.find_entry(block, allow_supernet).map(|(_, value)| value)
    }

    /// Like [`CidrTree::find`], but also returns the block of the matching node, which for
    /// supernet lookups is not necessarily the queried block.
    pub fn find_entry(
        &self,
        block: &Block,
        allow_supernet: bool,
    ) -> Result<(&Block, &T), LookupError> {
        self.check(block)?;
        self.root
            .as_ref()
            .and_then(|root| root.find_node(block, allow_supernet))
            .map(|node| (&node.block, &node.value))
            .ok_or(LookupError::NotFound)
    }

    /// Like [`CidrTree::find`], but returns a mutable reference to the value.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = CidrTree::with_root("192.168.0.0/16".parse::<Ipv4Net>()?.into(), 1);
    /// *tree.find_mut(&Block::host(&[192, 168, 0, 1]), true)? += 1;
    /// assert_eq!(tree.root().unwrap().value(), &2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn find_mut(&mut self, block: &Block, allow_supernet: bool) -> Result<&mut T, LookupError> {
        self.check(block)?;
        self.root
            .as_mut()
            .and_then(|root| root.find_node_mut(block, allow_supernet))
            .map(|node| &mut node.value)
            .ok_or(LookupError::NotFound)
    }

    /// Insert `value` at `block`, or overwrite the value if the exact block is already present.
    ///
    /// If `block` strictly contains the current root, the tree is re-rooted: the new node takes
    /// the root's place and the previous root becomes its only child, reported as
    /// [`Insertion::NewRoot`]. If `block` subsumes a contiguous run of existing siblings
    /// somewhere in the tree, those siblings become children of the new node.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = CidrTree::with_root("192.168.0.0/16".parse::<Ipv4Net>()?.into(), 0);
    /// let block: Block = "192.168.2.0/24".parse::<Ipv4Net>()?.into();
    /// assert_eq!(tree.insert(block.clone(), 1)?, Insertion::Inserted);
    /// assert_eq!(tree.insert(block, 2)?, Insertion::Replaced(1));
    ///
    /// // a block containing the root re-roots the tree
    /// assert_eq!(tree.insert("192.0.0.0/8".parse::<Ipv4Net>()?.into(), 3)?, Insertion::NewRoot);
    /// assert_eq!(tree.root().unwrap().block().to_string(), "192.0.0.0/8");
    ///
    /// // a block unrelated to the root has no place in the tree
    /// let distant: Block = "10.0.0.0/8".parse::<Ipv4Net>()?.into();
    /// assert_eq!(tree.insert(distant, 4), Err(InsertError::Disjoint));
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert(&mut self, block: Block, value: T) -> Result<Insertion<T>, InsertError> {
        self.check(&block)?;
        let root = match self.root.as_mut() {
            Some(root) => root,
            None => {
                self.root = Some(Node::new(block, value));
                return Ok(Insertion::NewRoot);
            }
        };
        match root.insert_in(block, value) {
            Placed::Done(None) => Ok(Insertion::Inserted),
            Placed::Done(Some(old)) => Ok(Insertion::Replaced(old)),
            Placed::Miss(miss) if miss.is_child => {
                let old = mem::replace(root, Node::new(miss.block, miss.value));
                root.children.push(old);
                Ok(Insertion::NewRoot)
            }
            Placed::Miss(_) => Err(InsertError::Disjoint),
        }
    }

    /// Remove the node whose block is byte-identical to `block` (supernet matches never apply),
    /// detaching its whole subtree from the tree.
    ///
    /// Removing the root dissolves the tree: the former root's children are handed back as
    /// independent roots in [`Removal::RootRemoved`], and the tree is left empty. Which of them
    /// to keep, if any, is the caller's decision.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = CidrTree::with_root("192.168.0.0/16".parse::<Ipv4Net>()?.into(), 0);
    /// let _ = tree.insert("192.168.2.0/24".parse::<Ipv4Net>()?.into(), 1)?;
    ///
    /// match tree.remove(&"192.168.0.0/16".parse::<Ipv4Net>()?.into())? {
    ///     Removal::RootRemoved { value: 0, roots } => {
    ///         assert_eq!(roots.len(), 1);
    ///         let tree = CidrTree::from_root(roots.into_iter().next().unwrap());
    ///         assert_eq!(tree.root().unwrap().block().to_string(), "192.168.2.0/24");
    ///     }
    ///     _ => unreachable!(),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn remove(&mut self, block: &Block) -> Result<Removal<T>, LookupError> {
        self.check(block)?;
        let step = match self.root.as_mut() {
            Some(root) => root.remove_in(block),
            None => Extraction::NotFound,
        };
        match step {
            Extraction::NotFound => Err(LookupError::NotFound),
            Extraction::Removed(node) => Ok(Removal::Removed(node)),
            Extraction::IsSelf => match self.root.take() {
                Some(root) => {
                    let (_, value, roots) = root.into_parts();
                    Ok(Removal::RootRemoved { value, roots })
                }
                None => unreachable!(),
            },
        }
    }

    /// Call `visit` for every node in pre-order, passing its block, its value, and its depth
    /// (the root has depth 0). The walk stops at the first visitor error, which is returned;
    /// nodes visited before the failure stay visited.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = CidrTree::with_root("192.168.0.0/16".parse::<Ipv4Net>()?.into(), 0);
    /// let _ = tree.insert("192.168.2.0/24".parse::<Ipv4Net>()?.into(), 1)?;
    ///
    /// let mut lines = Vec::new();
    /// tree.traverse(|block, value, depth| {
    ///     lines.push(format!("{}{}: {}", " ".repeat(depth), block, value));
    ///     Ok::<(), std::convert::Infallible>(())
    /// })
    /// .unwrap();
    /// assert_eq!(lines, ["192.168.0.0/16: 0", " 192.168.2.0/24: 1"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn traverse<F, E>(&self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&Block, &T, usize) -> Result<(), E>,
    {
        match &self.root {
            Some(root) => root.walk(0, &mut visit),
            None => Ok(()),
        }
    }

    /// Iterate over `(block, value, depth)` of every node in pre-order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root.as_ref())
    }

    /// Iterate over the blocks of every node in pre-order.
    pub fn blocks(&self) -> Blocks<'_, T> {
        Blocks(self.iter())
    }

    /// Iterate over the values of every node in pre-order.
    pub fn values(&self) -> Values<'_, T> {
        Values(self.iter())
    }

    fn check(&self, block: &Block) -> Result<(), LengthError> {
        if block.addr_len() == self.addr_len {
            Ok(())
        } else {
            Err(LengthError {
                expected: self.addr_len,
                found: block.addr_len(),
            })
        }
    }
}
