//! The binary wire format: a length header, one record per node in pre-order, and a terminal
//! marker.
//!
//! The stream starts with the tree's address byte length as a big-endian `u16`. Each record is
//! a 1-byte marker describing the depth transition from the previous record, the raw address
//! and mask bytes, and the value encoding prefixed with its big-endian `u16` length. The stream
//! ends with a single end marker.
//!
//! The decoder rebuilds the tree purely through the insertion algorithm; the depth markers make
//! the stream self-describing but are not trusted structurally. A stream produced from a valid
//! tree can never re-root the reconstruction, so any such outcome aborts with
//! [`WireError::Corrupt`] and no partial tree is returned.

use std::fmt;
use std::io::{self, Read, Write};

use crate::{Block, CidrTree, InsertError, Insertion, Node};

/// First record of the stream (the root).
pub(crate) const MARK_ROOT: u8 = 0;
/// The record is one level deeper than its predecessor.
pub(crate) const MARK_DOWN: u8 = 1;
/// The record is at least one level above its predecessor.
pub(crate) const MARK_UP: u8 = 2;
/// The record is at the same depth as its predecessor.
pub(crate) const MARK_SAME: u8 = 3;
/// End of stream.
pub(crate) const MARK_END: u8 = 4;

/// The largest value encoding that fits a record's 2-byte length field.
pub const MAX_VALUE_LEN: usize = u16::MAX as usize;

/// The boxed error vended by [`Codec`] implementations.
pub type CodecError = Box<dyn std::error::Error + Send + Sync>;

/// Converts values to and from their wire encoding. The tree treats the encoding as an opaque
/// blob; it only requires that it fits [`MAX_VALUE_LEN`] bytes.
pub trait Codec<T> {
    /// Encode a value.
    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError>;
    /// Decode a value from the bytes produced by [`Codec::encode`].
    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// A codec for raw byte values, stored on the wire as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Codec<Vec<u8>> for BytesCodec {
    fn encode(&self, value: &Vec<u8>) -> Result<Vec<u8>, CodecError> {
        Ok(value.clone())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(bytes.to_vec())
    }
}

/// A codec for string values, stored on the wire as UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrCodec;

impl Codec<String> for StrCodec {
    fn encode(&self, value: &String) -> Result<Vec<u8>, CodecError> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// Errors produced while writing or reading the wire format.
#[derive(Debug)]
pub enum WireError {
    /// The underlying reader or writer failed.
    Io(io::Error),
    /// The value codec failed.
    Codec(CodecError),
    /// An encoded value does not fit the record's 2-byte length field.
    ValueTooLarge(usize),
    /// A node's address/mask length disagrees with the stream's length header.
    BlockLength {
        /// The length from the stream header.
        expected: usize,
        /// The length found on the node.
        found: usize,
    },
    /// An unknown marker byte.
    Marker(u8),
    /// The records do not describe a single tree.
    Corrupt(&'static str),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Codec(e) => write!(f, "value codec error: {e}"),
            Self::ValueTooLarge(len) => {
                write!(f, "value encoding of {len} bytes exceeds {MAX_VALUE_LEN}")
            }
            Self::BlockLength { expected, found } => write!(
                f,
                "block length {found} does not match the stream length {expected}"
            ),
            Self::Marker(marker) => write!(f, "unknown marker byte {marker:#04x}"),
            Self::Corrupt(what) => write!(f, "corrupt stream: {what}"),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Codec(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for WireError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

fn read_u8<R: Read>(input: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    input.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(input: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    input.read_exact(&mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

impl<T> CidrTree<T> {
    /// Write the tree to `out` in the wire format, encoding every value with `codec`.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = CidrTree::with_root("192.168.0.0/16".parse::<Ipv4Net>()?.into(), "a".to_string());
    /// let _ = tree.insert("192.168.2.0/24".parse::<Ipv4Net>()?.into(), "b".to_string())?;
    ///
    /// let mut buf = Vec::new();
    /// tree.serialize(&mut buf, &StrCodec)?;
    /// let copy: CidrTree<String> = CidrTree::deserialize(buf.as_slice(), &StrCodec)?;
    /// assert!(copy.iter().eq(tree.iter()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn serialize<W, C>(&self, mut out: W, codec: &C) -> Result<(), WireError>
    where
        W: Write,
        C: Codec<T>,
    {
        let len = self.addr_len();
        if len > u16::MAX as usize {
            return Err(WireError::Corrupt("address length exceeds the 16-bit header"));
        }
        out.write_all(&(len as u16).to_be_bytes())?;
        let mut last_depth = None;
        self.traverse(|block, value, depth| {
            if block.addr_len() != len {
                return Err(WireError::BlockLength {
                    expected: len,
                    found: block.addr_len(),
                });
            }
            let marker = match last_depth {
                None => MARK_ROOT,
                Some(last) if depth > last => MARK_DOWN,
                Some(last) if depth < last => MARK_UP,
                Some(_) => MARK_SAME,
            };
            last_depth = Some(depth);
            let encoded = codec.encode(value).map_err(WireError::Codec)?;
            if encoded.len() > MAX_VALUE_LEN {
                return Err(WireError::ValueTooLarge(encoded.len()));
            }
            out.write_all(&[marker])?;
            out.write_all(block.addr())?;
            out.write_all(block.mask())?;
            out.write_all(&(encoded.len() as u16).to_be_bytes())?;
            out.write_all(&encoded)?;
            Ok(())
        })?;
        out.write_all(&[MARK_END])?;
        Ok(())
    }

    /// Read a tree from `input`, decoding every value with `codec`.
    ///
    /// The first record establishes the root; every further record is installed through
    /// [`CidrTree::insert`]. Truncated streams, unknown markers, codec failures, and records
    /// that would change the root all abort the reconstruction.
    pub fn deserialize<R, C>(mut input: R, codec: &C) -> Result<Self, WireError>
    where
        R: Read,
        C: Codec<T>,
    {
        let len = read_u16(&mut input)? as usize;
        let mut tree: Option<CidrTree<T>> = None;
        loop {
            let marker = read_u8(&mut input)?;
            if marker == MARK_END {
                break;
            }
            if marker > MARK_END {
                return Err(WireError::Marker(marker));
            }
            if tree.is_none() && marker != MARK_ROOT {
                return Err(WireError::Corrupt("stream does not start with a root record"));
            }
            if tree.is_some() && marker == MARK_ROOT {
                return Err(WireError::Corrupt("second root record in stream"));
            }
            let mut addr = vec![0u8; len];
            input.read_exact(&mut addr)?;
            let mut mask = vec![0u8; len];
            input.read_exact(&mut mask)?;
            let value_len = read_u16(&mut input)? as usize;
            let mut encoded = vec![0u8; value_len];
            input.read_exact(&mut encoded)?;
            let value = codec.decode(&encoded).map_err(WireError::Codec)?;
            let block = Block::from_raw(addr, mask);
            match tree.as_mut() {
                None => tree = Some(CidrTree::from_root(Node::new(block, value))),
                Some(tree) => match tree.insert(block, value) {
                    // A pre-order stream of a valid tree can never relocate the root.
                    Ok(Insertion::NewRoot) => {
                        return Err(WireError::Corrupt("record relocates the stream's root"))
                    }
                    Ok(_) => {}
                    Err(InsertError::Disjoint) => {
                        return Err(WireError::Corrupt("record outside the root's range"))
                    }
                    Err(InsertError::WrongLength(_)) => {
                        return Err(WireError::Corrupt("record length differs from the header"))
                    }
                },
            }
        }
        Ok(tree.unwrap_or_else(|| CidrTree::empty(len)))
    }
}
