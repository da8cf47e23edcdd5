//! Module for testing using fuzzing (quickcheck)
#![allow(clippy::type_complexity)]

use std::fmt::Debug;

use quickcheck::Arbitrary;

use crate::*;

mod basic;
mod wire;

#[derive(Debug, PartialEq, Clone, Copy)]
enum Operation<T> {
    Add(TestBlock, T),
    Remove(TestBlock),
}

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 1000;
const DEFAULT_GEN_SIZE: usize = 100;

fn proptest_runner<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = quickcheck::Gen::new(gen_size);

    // sample all inputs
    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        let input_c = input.clone();
        let success = f(input_c);
        if !success {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for i in input.shrink() {
        let i_c = i.clone();
        let success = f(i_c);
        if !success {
            shrink_failure(f, i)
        }
    }
    // if we reach this point, then all shrunken inputs work. Therefore, `inputs` is the minimal
    // input
    panic!(
        "[QUICKCHECK] Test case failed!\n  Minimal input:\n    {:?}",
        input
    );
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}

/// A compact IPv4 block for generated inputs. The prefix length stays at 1 or above so that the
/// fuzzed trees always keep their `0.0.0.0/0` root.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
struct TestBlock(u32, u8);

impl TestBlock {
    fn new(repr: u32, len: u8) -> Self {
        let mask = if len == 0 { 0 } else { !0u32 << (32 - len) };
        Self(repr & mask, len)
    }

    fn block(self) -> Block {
        Block::from((self.0, self.1))
    }
}

impl Debug for TestBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.block())
    }
}

impl Arbitrary for TestBlock {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                1,
                2, 2,
                3, 3, 3,
                4, 4, 4, 4,
                5, 5, 5, 5, 5,
                6, 6, 6, 6, 6, 6,
                7, 7, 7, 7, 7, 7, 7,
                8, 8, 8, 8, 8, 8, 8, 8,
                9, 9, 9, 9, 9, 9, 9, 9, 9,
            ])
            .unwrap();
        let x = u32::arbitrary(g);
        Self::new(x, len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 <= 1 {
            quickcheck::empty_shrinker()
        } else {
            quickcheck::single_shrinker(Self::new(self.0, self.1 - 1))
        }
    }
}

impl<T: Arbitrary> Arbitrary for Operation<T> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let block = TestBlock::arbitrary(g);
        if g.choose(&[
            true, true, true, true, true, true, true, false, false, false,
        ])
        .copied()
        .unwrap_or_default()
        {
            let t = T::arbitrary(g);
            Self::Add(block, t)
        } else {
            Self::Remove(block)
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Operation::Add(block, t) => {
                let t = t.clone();
                Box::new(block.shrink().map(move |b| Operation::Add(b, t.clone())))
            }
            Operation::Remove(block) => Box::new(block.shrink().map(Operation::Remove)),
        }
    }
}

/// A naive reference model: a flat list of entries with the same visible behavior as the tree.
/// The tree under test always starts as `CidrTree::new(4, 0)`, so the model starts with the
/// matching all-zero entry.
#[derive(Debug, Clone)]
struct Model {
    entries: Vec<(Block, i32)>,
}

impl Model {
    fn new() -> Self {
        Self {
            entries: vec![(Block::zero(4), 0)],
        }
    }

    fn insert(&mut self, block: Block, value: i32) {
        match self.entries.iter_mut().find(|(b, _)| *b == block) {
            Some((_, old)) => *old = value,
            None => self.entries.push((block, value)),
        }
    }

    /// Remove `block` and everything contained in it, returning how many entries went away
    /// (0 when the exact block is absent).
    fn remove(&mut self, block: &Block) -> usize {
        if !self.entries.iter().any(|(b, _)| b == block) {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|(b, _)| !block.contains(b));
        before - self.entries.len()
    }

    fn get_exact(&self, block: &Block) -> Option<i32> {
        self.entries
            .iter()
            .find(|(b, _)| b == block)
            .map(|(_, v)| *v)
    }

    /// The value of the most specific entry containing `addr`.
    fn lpm(&self, addr: &[u8]) -> Option<(Block, i32)> {
        self.entries
            .iter()
            .filter(|(b, _)| b.contains_addr(addr))
            .max_by(|(a, _), (b, _)| a.mask().cmp(b.mask()))
            .map(|(b, v)| (b.clone(), *v))
    }

    /// All entries in pre-order of the tree, which for nested blocks is exactly the
    /// address-major block order.
    fn sorted(&self) -> Vec<(Block, i32)> {
        use itertools::Itertools;
        self.entries
            .iter()
            .cloned()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .collect()
    }
}

fn entries(tree: &CidrTree<i32>) -> Vec<(Block, i32)> {
    tree.iter().map(|(b, v, _)| (b.clone(), *v)).collect()
}

fn apply(tree: &mut CidrTree<i32>, model: &mut Model, ops: Vec<Operation<i32>>) -> bool {
    for op in ops {
        match op {
            Operation::Add(block, value) => {
                model.insert(block.block(), value);
                match tree.insert(block.block(), value) {
                    Ok(Insertion::Inserted) | Ok(Insertion::Replaced(_)) => {}
                    // the /0 root contains every generated block
                    _ => return false,
                }
            }
            Operation::Remove(block) => {
                let expected = model.remove(&block.block());
                match tree.remove(&block.block()) {
                    Ok(Removal::Removed(node)) => {
                        if node.count() != expected {
                            return false;
                        }
                    }
                    Err(LookupError::NotFound) => {
                        if expected != 0 {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
        }
    }
    true
}
