//! Description of network blocks and the byte-level comparisons between them.

use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "cidr")]
use cidr::{Ipv4Cidr, Ipv6Cidr};
#[cfg(feature = "ipnet")]
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
#[cfg(feature = "ipnetwork")]
use ipnetwork::{Ipv4Network, Ipv6Network};
use num_traits::{NumCast, PrimInt, ToPrimitive, Unsigned, Zero};

use crate::LengthError;

/// An address plus a prefix mask, describing a contiguous range of addresses.
///
/// Both parts are raw bytes in network byte order and always have the same length. Every block
/// stored in one [`CidrTree`](crate::CidrTree) has the same length as the tree itself.
///
/// All ordering and specificity decisions compare the raw bytes lexicographically. For contiguous
/// prefix masks (the only kind the provided conversions produce) this coincides with numeric
/// order and "narrower mask sorts after broader mask". Blocks with non-contiguous masks can be
/// constructed through [`Block::new`], but the tree's behavior for them is unspecified.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    addr: Box<[u8]>,
    mask: Box<[u8]>,
}

impl Block {
    /// Create a block from raw address and mask bytes. The bytes are stored as given; in
    /// particular, the address is *not* masked. Fails if the two lengths differ.
    ///
    /// ```
    /// # use cidr_tree::Block;
    /// let block = Block::new(vec![192, 168, 0, 0], vec![255, 255, 0, 0]).unwrap();
    /// assert_eq!(block.to_string(), "192.168.0.0/16");
    /// assert!(Block::new(vec![192, 168, 0, 0], vec![255, 255, 0]).is_err());
    /// ```
    pub fn new(
        addr: impl Into<Box<[u8]>>,
        mask: impl Into<Box<[u8]>>,
    ) -> Result<Self, LengthError> {
        let (addr, mask) = (addr.into(), mask.into());
        if addr.len() != mask.len() {
            return Err(LengthError {
                expected: addr.len(),
                found: mask.len(),
            });
        }
        Ok(Self { addr, mask })
    }

    /// Create a block from parts of equal length.
    pub(crate) fn from_raw(addr: impl Into<Box<[u8]>>, mask: impl Into<Box<[u8]>>) -> Self {
        let (addr, mask) = (addr.into(), mask.into());
        debug_assert_eq!(addr.len(), mask.len());
        Self { addr, mask }
    }

    /// The all-zero block of the given byte length (`0.0.0.0/0` for length 4). It contains every
    /// address of that length.
    pub fn zero(len: usize) -> Self {
        Self {
            addr: vec![0; len].into_boxed_slice(),
            mask: vec![0; len].into_boxed_slice(),
        }
    }

    /// The block covering exactly one address (an all-ones mask).
    ///
    /// ```
    /// # use cidr_tree::Block;
    /// assert_eq!(Block::host(&[192, 168, 2, 1]).to_string(), "192.168.2.1/32");
    /// ```
    pub fn host(addr: &[u8]) -> Self {
        Self {
            addr: addr.into(),
            mask: vec![0xff; addr.len()].into_boxed_slice(),
        }
    }

    /// The raw address bytes.
    pub fn addr(&self) -> &[u8] {
        &self.addr
    }

    /// The raw mask bytes.
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// The byte length of the address (and of the mask).
    pub fn addr_len(&self) -> usize {
        self.addr.len()
    }

    /// The number of leading one bits of the mask, or `None` if the mask is not contiguous.
    ///
    /// ```
    /// # use cidr_tree::Block;
    /// let block = Block::new(vec![192, 168, 4, 0], vec![255, 255, 254, 0]).unwrap();
    /// assert_eq!(block.prefix_len(), Some(23));
    /// let odd = Block::new(vec![192, 168, 4, 0], vec![255, 0, 255, 0]).unwrap();
    /// assert_eq!(odd.prefix_len(), None);
    /// ```
    pub fn prefix_len(&self) -> Option<u32> {
        let mut len = 0;
        let mut partial = false;
        for &byte in self.mask.iter() {
            if partial && byte != 0 {
                return None;
            }
            if byte == 0xff {
                len += 8;
            } else {
                if byte.count_ones() != byte.leading_ones() {
                    return None;
                }
                len += byte.leading_ones();
                partial = true;
            }
        }
        Some(len)
    }

    /// Lexicographic order of the two addresses.
    pub(crate) fn cmp_addr(&self, other: &Block) -> Ordering {
        self.addr.cmp(&other.addr)
    }

    /// Compare mask specificity: `Greater` means `self` has the narrower range.
    pub(crate) fn cmp_mask(&self, other: &Block) -> Ordering {
        self.mask.cmp(&other.mask)
    }

    /// Byte-identical addresses.
    pub(crate) fn same_addr(&self, other: &Block) -> bool {
        self.addr == other.addr
    }

    /// Check whether an address lies within this block's masked range. Always `false` for an
    /// address of a different length.
    ///
    /// ```
    /// # use cidr_tree::Block;
    /// let block = Block::new(vec![192, 168, 0, 0], vec![255, 255, 0, 0]).unwrap();
    /// assert!(block.contains_addr(&[192, 168, 55, 1]));
    /// assert!(!block.contains_addr(&[192, 169, 0, 1]));
    /// assert!(!block.contains_addr(&[192, 168]));
    /// ```
    pub fn contains_addr(&self, addr: &[u8]) -> bool {
        self.addr.len() == addr.len()
            && self
                .addr
                .iter()
                .zip(self.mask.iter())
                .zip(addr)
                .all(|((a, m), b)| a & m == b & m)
    }

    /// Check whether `other`'s entire range lies within this block's range. This also holds when
    /// the two blocks are identical.
    pub fn contains(&self, other: &Block) -> bool {
        self.cmp_mask(other) != Ordering::Greater && self.contains_addr(&other.addr)
    }
}

/// A contiguous mask of `prefix_len` leading one bits, `len` bytes long.
pub(crate) fn mask_bytes(prefix_len: u8, len: usize) -> Box<[u8]> {
    let mut mask = vec![0u8; len];
    let mut bits = prefix_len as usize;
    for byte in mask.iter_mut() {
        if bits >= 8 {
            *byte = 0xff;
            bits -= 8;
        } else {
            *byte = !(0xffu8 >> bits);
            break;
        }
    }
    mask.into_boxed_slice()
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.addr {
            [a, b, c, d] => write!(f, "{}", std::net::Ipv4Addr::new(*a, *b, *c, *d))?,
            addr if addr.len() == 16 => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(addr);
                write!(f, "{}", std::net::Ipv6Addr::from(octets))?
            }
            addr => {
                for byte in addr {
                    write!(f, "{byte:02x}")?
                }
            }
        }
        match self.prefix_len() {
            Some(len) => write!(f, "/{len}"),
            None => {
                write!(f, "/")?;
                for byte in self.mask.iter() {
                    write!(f, "{byte:02x}")?
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(feature = "ipnet")]
impl From<Ipv4Net> for Block {
    fn from(net: Ipv4Net) -> Self {
        Self::from_raw(net.network().octets().to_vec(), net.netmask().octets().to_vec())
    }
}

#[cfg(feature = "ipnet")]
impl From<Ipv6Net> for Block {
    fn from(net: Ipv6Net) -> Self {
        Self::from_raw(net.network().octets().to_vec(), net.netmask().octets().to_vec())
    }
}

#[cfg(feature = "ipnet")]
impl From<IpNet> for Block {
    fn from(net: IpNet) -> Self {
        match net {
            IpNet::V4(net) => net.into(),
            IpNet::V6(net) => net.into(),
        }
    }
}

#[cfg(feature = "ipnetwork")]
impl From<Ipv4Network> for Block {
    fn from(net: Ipv4Network) -> Self {
        Self::from_raw(net.network().octets().to_vec(), net.mask().octets().to_vec())
    }
}

#[cfg(feature = "ipnetwork")]
impl From<Ipv6Network> for Block {
    fn from(net: Ipv6Network) -> Self {
        Self::from_raw(net.network().octets().to_vec(), net.mask().octets().to_vec())
    }
}

#[cfg(feature = "cidr")]
impl From<Ipv4Cidr> for Block {
    fn from(net: Ipv4Cidr) -> Self {
        Self::from_raw(
            net.first_address().octets().to_vec(),
            net.mask().octets().to_vec(),
        )
    }
}

#[cfg(feature = "cidr")]
impl From<Ipv6Cidr> for Block {
    fn from(net: Ipv6Cidr) -> Self {
        Self::from_raw(
            net.first_address().octets().to_vec(),
            net.mask().octets().to_vec(),
        )
    }
}

/// Build a block from an unsigned integer representation and a prefix length. The integer is in
/// host bit order (the most significant bit is the first address bit) and is masked down to the
/// prefix length.
impl<R> From<(R, u8)> for Block
where
    R: Unsigned + PrimInt + Zero,
{
    fn from((repr, prefix_len): (R, u8)) -> Self {
        let len = (R::zero().count_zeros() / 8) as usize;
        let mask = mask_bytes(prefix_len, len);
        let mut addr = vec![0u8; len];
        let byte_mask: R = NumCast::from(0xffu32).unwrap();
        for (i, byte) in addr.iter_mut().enumerate() {
            let shift = 8 * (len - 1 - i);
            *byte = ((repr >> shift) & byte_mask).to_u8().unwrap() & mask[i];
        }
        Self::from_raw(addr, mask)
    }
}
