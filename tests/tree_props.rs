use proptest::prelude::*;
use treechurn::tree::{build, count, Tree};

fn max_children_gap(tree: &Tree) -> u32 {
    match tree.children() {
        None => 0,
        Some((left, right)) => {
            let here = count(left).abs_diff(count(right)) as u32;
            here.max(max_children_gap(left)).max(max_children_gap(right))
        }
    }
}

proptest! {
    #[test]
    fn count_is_perfect_tree_size(depth in 0u32..14) {
        let tree = build(depth);
        prop_assert_eq!(count(&tree), (1u64 << (depth + 1)) - 1);
    }

    #[test]
    fn subtrees_are_balanced(depth in 0u32..10) {
        prop_assert_eq!(max_children_gap(&build(depth)), 0);
    }
}
