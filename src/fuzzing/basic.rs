use super::*;

qc!(inserts_match_model, _inserts_match_model);
fn _inserts_match_model(list: Vec<(TestBlock, i32)>) -> bool {
    let mut tree = CidrTree::new(4, 0);
    let mut model = Model::new();

    for (block, value) in list {
        let _ = tree.insert(block.block(), value);
        model.insert(block.block(), value);
    }

    // the pre-order of the tree is the address-major order of the model
    entries(&tree) == model.sorted()
}

qc!(mods_match_model, _mods_match_model);
fn _mods_match_model(list: Vec<Operation<i32>>) -> bool {
    let mut tree = CidrTree::new(4, 0);
    let mut model = Model::new();

    apply(&mut tree, &mut model, list) && entries(&tree) == model.sorted()
}

qc!(exact_find_matches_model, _exact_find_matches_model);
fn _exact_find_matches_model((list, queries): (Vec<Operation<i32>>, Vec<TestBlock>)) -> bool {
    let mut tree = CidrTree::new(4, 0);
    let mut model = Model::new();
    if !apply(&mut tree, &mut model, list) {
        return false;
    }

    queries.into_iter().all(|q| {
        tree.find(&q.block(), false).ok().copied() == model.get_exact(&q.block())
    })
}

qc!(lpm_matches_model, _lpm_matches_model);
fn _lpm_matches_model((list, addrs): (Vec<Operation<i32>>, Vec<u32>)) -> bool {
    let mut tree = CidrTree::new(4, 0);
    let mut model = Model::new();
    if !apply(&mut tree, &mut model, list) {
        return false;
    }

    addrs.into_iter().all(|addr| {
        let octets = addr.to_be_bytes();
        let host = Block::host(&octets);
        let got = tree
            .find_entry(&host, true)
            .ok()
            .map(|(b, v)| (b.clone(), *v));
        got == model.lpm(&octets)
    })
}

qc!(invariants_hold, _invariants_hold);
fn _invariants_hold(list: Vec<Operation<i32>>) -> bool {
    let mut tree = CidrTree::new(4, 0);
    let mut model = Model::new();
    if !apply(&mut tree, &mut model, list) {
        return false;
    }
    tree.root().map_or(true, check_node)
}

/// Check the structural invariants of a subtree: children strictly contained in their parent,
/// sorted by address, and pairwise disjoint.
fn check_node(node: &Node<i32>) -> bool {
    let children = node.children();
    for child in children {
        if !node.block().contains(child.block()) || node.block() == child.block() {
            return false;
        }
    }
    for pair in children.windows(2) {
        let (a, b) = (pair[0].block(), pair[1].block());
        if a.addr() >= b.addr() || a.contains(b) || b.contains(a) {
            return false;
        }
    }
    children.iter().all(check_node)
}

qc!(count_matches_model, _count_matches_model);
fn _count_matches_model(list: Vec<Operation<i32>>) -> bool {
    let mut tree = CidrTree::new(4, 0);
    let mut model = Model::new();
    if !apply(&mut tree, &mut model, list) {
        return false;
    }
    tree.count() == model.entries.len() && tree.iter().count() == tree.count()
}
