//! Intrusive red-black tree.
//!
//! A balanced binary search tree whose three-word node header is embedded
//! inside caller-owned records. The tree stores no keys and allocates
//! nothing: callers descend with their own comparator, link new nodes into
//! the slot the descent found, and hand colour fix-up to the library. One
//! record can participate in several indexes by embedding several headers.
//!
//! Beyond the classic set/map use, subtree summaries ("augmentation") can
//! be maintained through every rotation via a three-hook callback trait,
//! which is what interval trees and order-statistic queries are built from.
//! The no-op instantiation compiles down to plain tree maintenance.
//!
//! Writers must be serialised externally. Readers that only descend
//! (`find_rcu`) may run concurrently with a single writer: all child
//! pointer stores are publication-ordered, so such a reader can miss a
//! concurrently moving subtree (and must treat null as "not known to be
//! present") but never observes a torn pointer, a cycle, or a node that
//! was not part of some consistent tree shape.

#![cfg_attr(not(test), no_std)]

mod augment;
mod balance;
mod cached;
mod find;
mod node;
mod traverse;

pub use augment::{AugmentCallbacks, DummyAugment};
pub use cached::RbRootCached;
pub use find::rb_next_match;
pub use node::{rb_link_node, rb_link_node_rcu, RbColor, RbNode, RbRoot};


#[cfg(test)]
mod scenario_tests {
    use super::test_util::*;
    use super::*;

    #[test]
    fn test_scattered_inserts_sort() {
        let (root, _nodes) = build_tree(&[5, 2, 8, 1, 3, 7, 9, 4, 6]);
        unsafe {
            assert_eq!(validate(&root), 9);
            assert_eq!(inorder_keys(&root), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
            assert!(height(root.rb_node) <= 6);
        }
    }

    #[test]
    fn test_ascending_inserts_then_erases() {
        let (mut root, mut nodes) = build_tree(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        unsafe {
            for erased in [5, 1, 10] {
                let victim = nodes.iter_mut().find(|n| n.key == erased).unwrap();
                root.erase(&mut victim.rb);
                validate(&root);
            }
            assert_eq!(inorder_keys(&root), vec![2, 3, 4, 6, 7, 8, 9]);
        }
    }

    #[test]
    fn test_find_in_sparse_keys() {
        let keys: Vec<i32> = (0..100).step_by(10).collect();
        let (root, _nodes) = build_tree(&keys);
        unsafe {
            let found = root.find(&50, cmp_key);
            assert_eq!(key_of(found), 50);
            assert!(root.find(&55, cmp_key).is_null());
        }
    }

    #[test]
    fn test_pseudorandom_stress() {
        // Multiplicative congruential generator, fixed seed.
        let mut state: u64 = 0x853c49e6748fea9b;
        let mut keys = Vec::with_capacity(1000);
        for _ in 0..1000 {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            keys.push(((state >> 33) % 10_000) as i32);
        }

        let (mut root, mut nodes) = build_tree(&keys);
        unsafe {
            assert_eq!(validate(&root), 1000);
            let inorder = inorder_keys(&root);
            assert!(inorder.windows(2).all(|w| w[0] <= w[1]));
            assert!(height(root.rb_node) <= 20);

            // Tear half of it back down and re-check.
            for node in nodes.iter_mut().step_by(2) {
                root.erase(&mut node.rb);
            }
            assert_eq!(validate(&root), 500);
        }
    }

    #[test]
    fn test_empty_tree_boundaries() {
        let root = RbRoot::new();
        assert!(root.is_empty());
        unsafe {
            assert!(root.rb_first().is_null());
            assert!(root.rb_last().is_null());
            assert!(root.find(&42, cmp_key).is_null());
        }
    }

    #[test]
    fn test_one_node_boundaries() {
        let (root, nodes) = build_tree(&[7]);
        unsafe {
            let node = root.rb_node;
            assert!((*node).is_black());
            assert_eq!(root.rb_first(), node);
            assert_eq!(root.rb_last(), node);
            assert!(RbNode::rb_next(node).is_null());
            assert!(RbNode::rb_prev(node).is_null());
        }
        drop(nodes);
    }

    #[test]
    fn test_erase_root_of_two_node_tree() {
        let (mut root, nodes) = build_tree(&[1, 2]);
        unsafe {
            let old_root = root.rb_node;
            root.erase(old_root);
            let node = root.rb_node;
            assert!(!node.is_null());
            assert!((*node).is_black());
            assert!(RbNode::rb_next(node).is_null());
        }
        drop(nodes);
    }

    #[test]
    fn test_insert_then_erase_roundtrip() {
        let (mut root, _nodes) = build_tree(&[4, 2, 6, 1, 3, 5, 7]);
        let mut extra = Box::new(TestNode::new(8));
        unsafe {
            let before = inorder_keys(&root);
            root.add(&mut extra.rb, less);
            root.erase(&mut extra.rb);
            assert_eq!(inorder_keys(&root), before);
            validate(&root);
        }
    }

    #[test]
    fn test_replace_roundtrip_restores_shape() {
        let (mut root, mut nodes) = build_tree(&[4, 2, 6, 1, 3, 5, 7]);
        let mut spare = Box::new(TestNode::new(2));

        unsafe {
            let victim = &mut nodes.iter_mut().find(|n| n.key == 2).unwrap().rb as *mut RbNode;
            let pc = (*victim).__rb_parent_color;
            let left = (*victim).rb_left;
            let right = (*victim).rb_right;

            root.replace_node(victim, &mut spare.rb);
            assert_eq!(spare.rb.__rb_parent_color, pc);
            assert_eq!(spare.rb.rb_left, left);
            assert_eq!(spare.rb.rb_right, right);

            root.replace_node(&mut spare.rb, victim);
            assert_eq!((*victim).__rb_parent_color, pc);
            assert_eq!((*victim).rb_left, left);
            assert_eq!((*victim).rb_right, right);
            validate(&root);
        }
    }

    #[test]
    fn test_postorder_walk_frees_every_node() {
        let keys = [5, 2, 8, 1, 3, 7, 9];
        let mut root = RbRoot::new();
        for &k in keys.iter() {
            let node = Box::into_raw(Box::new(TestNode::new(k)));
            unsafe {
                root.add(&mut (*node).rb, less);
            }
        }

        // The walk hands out each node only after both children, so the
        // current node can be freed before stepping on.
        let mut freed = 0;
        unsafe {
            let mut node = root.rb_first_postorder();
            while !node.is_null() {
                let next = RbNode::rb_next_postorder(node);
                drop(Box::from_raw(rb_entry!(node, TestNode, rb)));
                freed += 1;
                node = next;
            }
        }
        assert_eq!(freed, keys.len());
    }
}




#[cfg(test)]
mod property_tests {
    use super::test_util::*;
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    proptest! {
        #[test]
        fn inserts_keep_the_tree_valid(keys in prop::collection::vec(0i32..10_000, 0..200)) {
            let (root, _nodes) = build_tree(&keys);
            unsafe {
                prop_assert_eq!(validate(&root), keys.len());
                let mut sorted = keys.clone();
                sorted.sort_unstable();
                prop_assert_eq!(inorder_keys(&root), sorted);
            }
        }

        #[test]
        fn insert_erase_interleavings_keep_the_tree_valid(
            ops in prop::collection::vec((0i32..1_000, any::<bool>()), 0..200)
        ) {
            let keys: Vec<i32> = ops.iter().map(|&(k, _)| k).collect();
            let (mut root, mut nodes) = build_tree(&keys);

            let mut remaining = Vec::new();
            unsafe {
                for (node, &(key, erase)) in nodes.iter_mut().zip(ops.iter()) {
                    if erase {
                        root.erase(&mut node.rb);
                    } else {
                        remaining.push(key);
                    }
                }
                prop_assert_eq!(validate(&root), remaining.len());
                remaining.sort_unstable();
                prop_assert_eq!(inorder_keys(&root), remaining);
            }
        }

        #[test]
        fn find_add_agrees_with_a_set_model(keys in prop::collection::vec(0i32..100, 0..100)) {
            let mut root = RbRoot::new();
            let mut nodes = make_nodes(&keys);
            let mut model = BTreeSet::new();

            unsafe {
                for (node, &key) in nodes.iter_mut().zip(keys.iter()) {
                    let inserted_fresh = root.find_add(&mut node.rb, cmp_nodes).is_null();
                    prop_assert_eq!(inserted_fresh, model.insert(key));
                }
                for key in 0..100 {
                    let found = root.find(&key, cmp_key);
                    prop_assert_eq!(!found.is_null(), model.contains(&key));
                    if !found.is_null() {
                        prop_assert_eq!(key_of(found), key);
                    }
                }
                prop_assert_eq!(validate(&root), model.len());
            }
        }

        #[test]
        fn cached_first_always_matches_full_descent(
            ops in prop::collection::vec((0i32..1_000, any::<bool>()), 0..100)
        ) {
            let keys: Vec<i32> = ops.iter().map(|&(k, _)| k).collect();
            let mut root = RbRootCached::new();
            let mut nodes = make_nodes(&keys);

            unsafe {
                for node in nodes.iter_mut() {
                    root.add(&mut node.rb, less);
                    prop_assert_eq!(root.first(), root.rb_root.rb_first());
                }
                for (node, &(_, erase)) in nodes.iter_mut().zip(ops.iter()) {
                    if erase {
                        root.erase(&mut node.rb);
                        prop_assert_eq!(root.first(), root.rb_root.rb_first());
                    }
                }
            }
        }
    }
}
