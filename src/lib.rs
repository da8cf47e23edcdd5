//! This crate provides a CIDR tree: an associative datastructure keyed by IP network blocks
//! (address plus prefix mask) that answers both exact and longest-prefix-match lookups. It is
//! the kind of structure sitting inside routers, firewalls, and policy engines that must decide
//! which configured rule applies to an address. Blocks can be built from
//! [ipnet](https://docs.rs/ipnet/2.10.0), [ipnetwork](https://crates.io/crates/ipnetwork), or
//! [cidr](https://crates.io/crates/cidr) network types, from raw bytes of any length, or from
//! any tuple `(R, u8)` where `R` is an unsigned primitive integer.
//!
//! # Description of the Tree
//!
//! The tree is structured by containment. Every node owns a [`Block`], a value, and an ordered
//! list of children; each child's block lies strictly inside its parent's block, and siblings
//! are pairwise disjoint and sorted by address. Containment between stored blocks is always
//! expressed as nesting. Because of this, the descendants of a node that fall inside any
//! candidate block always form one contiguous run of its sorted child list, which lets an
//! insertion re-nest them with a single splice instead of a re-sort.
//!
//! Insertion and removal can change which node is the root. These topology changes are not
//! errors: they are separate variants of the operation's result ([`Insertion::NewRoot`] and
//! [`Removal::RootRemoved`]), so the type system forces callers to acknowledge them.
//!
//! ```
//! # use cidr_tree::*;
//! # use ipnet::Ipv4Net;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree = CidrTree::with_root("192.168.0.0/16".parse::<Ipv4Net>()?.into(), "site");
//! let _ = tree.insert("192.168.2.0/24".parse::<Ipv4Net>()?.into(), "lab")?;
//! let _ = tree.insert("192.168.2.0/25".parse::<Ipv4Net>()?.into(), "bench")?;
//!
//! // the most specific containing block wins
//! assert_eq!(tree.find(&Block::host(&[192, 168, 2, 2]), true)?, &"bench");
//! assert_eq!(tree.find(&Block::host(&[192, 168, 2, 200]), true)?, &"lab");
//! # Ok(())
//! # }
//! ```
//!
//! # Traversals
//!
//! [`CidrTree::traverse`] walks the tree in pre-order (a node before its descendants, children
//! left to right), passing each node's block, value, and depth to a visitor; the first visitor
//! error ends the walk. [`CidrTree::iter`] yields the same sequence as an iterator.
//!
//! # Wire format
//!
//! [`CidrTree::serialize`] and [`CidrTree::deserialize`] convert a tree to and from a compact
//! binary stream, using a caller-supplied [`Codec`] for the values (see [`crate::wire`]'s module
//! documentation for the exact layout). Decoding rebuilds the tree through the regular insertion
//! algorithm and rejects any stream that does not describe a single tree.
//!
//! # Preconditions
//!
//! Specificity and ordering of blocks are decided by lexicographic comparison of the raw mask
//! and address bytes. This is correct for contiguous prefix masks, which is all the provided
//! conversions produce; trees fed hand-built non-contiguous masks behave in unspecified ways.
//!
//! The tree performs no internal locking and is not safe for concurrent mutation; wrap it in
//! your own synchronization if it is shared.

#![deny(missing_docs)]

mod block;
mod errors;
mod find;
mod fmt;
mod insert;
mod node;
mod remove;
#[cfg(feature = "serde")]
mod serde;
mod traverse;
mod tree;
pub mod wire;

#[cfg(test)]
mod fuzzing;

pub use block::Block;
pub use errors::{InsertError, LengthError, LookupError};
pub use insert::Insertion;
pub use node::Node;
pub use remove::Removal;
pub use traverse::{Blocks, Iter, Values};
pub use tree::CidrTree;
pub use wire::{BytesCodec, Codec, CodecError, StrCodec, WireError, MAX_VALUE_LEN};
