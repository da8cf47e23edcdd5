//! Serialization and Deserialization implementation
//!
//! A tree is represented as its address length plus the pre-order list of `(block, value)`
//! entries. Deserialization rebuilds the structure through the insertion algorithm, so only
//! entry lists that describe a single tree are accepted.

use ::serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Block, CidrTree, Insertion, Node};

impl<T: Serialize> Serialize for CidrTree<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries: Vec<(&Block, &T)> = self.iter().map(|(block, value, _)| (block, value)).collect();
        (self.addr_len(), entries).serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for CidrTree<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (addr_len, entries): (usize, Vec<(Block, T)>) =
            Deserialize::deserialize(deserializer)?;
        let mut entries = entries.into_iter();
        let mut tree = match entries.next() {
            Some((block, value)) => {
                if block.addr_len() != addr_len {
                    return Err(de::Error::custom(
                        "block length differs from the recorded address length",
                    ));
                }
                CidrTree::from_root(Node::new(block, value))
            }
            None => return Ok(CidrTree::empty(addr_len)),
        };
        for (block, value) in entries {
            match tree.insert(block, value) {
                Ok(Insertion::NewRoot) => {
                    return Err(de::Error::custom("entry relocates the recorded root"))
                }
                Ok(_) => {}
                Err(e) => return Err(de::Error::custom(e)),
            }
        }
        Ok(tree)
    }
}
