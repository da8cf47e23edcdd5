//! Error types returned by tree operations.
//!
//! Topology changes ([`Insertion::NewRoot`](crate::Insertion::NewRoot) and
//! [`Removal::RootRemoved`](crate::Removal::RootRemoved)) are *not* errors; they live in the
//! success value of the respective operation so that callers are forced to handle them
//! separately from actual failures.

use std::error::Error;
use std::fmt;

/// A block's address/mask byte length does not match the expected length.
///
/// For tree operations, `expected` is the tree's configured length. For
/// [`Block::new`](crate::Block::new), `expected` is the address length and `found` the mask
/// length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthError {
    /// The required byte length.
    pub expected: usize,
    /// The byte length that was passed in.
    pub found: usize,
}

impl fmt::Display for LengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block length {} does not match the expected length {}",
            self.found, self.expected
        )
    }
}

impl Error for LengthError {}

/// Errors returned by [`CidrTree::find`](crate::CidrTree::find) and
/// [`CidrTree::remove`](crate::CidrTree::remove).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// No node matches the requested block.
    NotFound,
    /// The block has a different byte length than the tree.
    WrongLength(LengthError),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("no matching block in the tree"),
            Self::WrongLength(e) => e.fmt(f),
        }
    }
}

impl Error for LookupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound => None,
            Self::WrongLength(e) => Some(e),
        }
    }
}

impl From<LengthError> for LookupError {
    fn from(e: LengthError) -> Self {
        Self::WrongLength(e)
    }
}

/// Errors returned by [`CidrTree::insert`](crate::CidrTree::insert).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// The block has a different byte length than the tree.
    WrongLength(LengthError),
    /// The block neither lies within the root's range nor contains the root, so there is no
    /// place for it in this tree.
    Disjoint,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength(e) => e.fmt(f),
            Self::Disjoint => f.write_str("block is disjoint from the tree's root"),
        }
    }
}

impl Error for InsertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::WrongLength(e) => Some(e),
            Self::Disjoint => None,
        }
    }
}

impl From<LengthError> for InsertError {
    fn from(e: LengthError) -> Self {
        Self::WrongLength(e)
    }
}
