use super::*;
use crate::wire::CodecError;

struct I32Codec;

impl Codec<i32> for I32Codec {
    fn encode(&self, value: &i32) -> Result<Vec<u8>, CodecError> {
        Ok(value.to_be_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<i32, CodecError> {
        let bytes: [u8; 4] = bytes.try_into().map_err(|_| "value is not 4 bytes")?;
        Ok(i32::from_be_bytes(bytes))
    }
}

qc!(wire_round_trip, _wire_round_trip);
fn _wire_round_trip(list: Vec<Operation<i32>>) -> bool {
    let mut tree = CidrTree::new(4, 0);
    let mut model = Model::new();
    if !apply(&mut tree, &mut model, list) {
        return false;
    }

    let mut buf = Vec::new();
    if tree.serialize(&mut buf, &I32Codec).is_err() {
        return false;
    }
    let copy: CidrTree<i32> = match CidrTree::deserialize(buf.as_slice(), &I32Codec) {
        Ok(copy) => copy,
        Err(_) => return false,
    };

    // the (block, value, depth) pre-order sequence survives the round trip exactly
    copy.iter().eq(tree.iter()) && copy.addr_len() == tree.addr_len()
}

qc!(wire_rejects_truncation, _wire_rejects_truncation);
fn _wire_rejects_truncation(list: Vec<Operation<i32>>) -> bool {
    let mut tree = CidrTree::new(4, 0);
    let mut model = Model::new();
    if !apply(&mut tree, &mut model, list) {
        return false;
    }

    let mut buf = Vec::new();
    if tree.serialize(&mut buf, &I32Codec).is_err() {
        return false;
    }
    // cutting the stream anywhere before the end marker must fail, never yield a partial tree
    let cut = buf.len() - 1;
    CidrTree::<i32>::deserialize(&buf[..cut], &I32Codec).is_err()
}
