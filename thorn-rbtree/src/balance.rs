//! Insert and erase rebalancing.
//!
//! Red-black tree properties:
//!
//!  1) A node is either red or black
//!  2) The root is black
//!  3) All leaves (null) are black
//!  4) Both children of every red node are black
//!  5) Every simple path from root to leaves contains the same number of
//!     black nodes.
//!
//! 4 and 5 give the O(log n) guarantee, since 4 implies you cannot have two
//! consecutive red nodes in a path and every red node is therefore followed
//! by a black. So if B is the number of black nodes on every simple path
//! (as per 5), then the longest possible path due to 4 is 2B.
//!
//! In the case diagrams below black nodes are uppercase and red nodes
//! lowercase; unknown-colour nodes are drawn red within parentheses.
//!
//! On lockless lookups: all stores to `rb_left`/`rb_right` in this module go
//! through the ordered-store primitive, and no intermediate state contains a
//! cycle as seen in program order. A concurrent descent may miss an entire
//! subtree mid-rotation (a false negative), but it only ever sees valid
//! nodes and always terminates. Parent-and-colour words are not ordered and
//! readers must not rely on them.

use crate::augment::{AugmentCallbacks, DummyAugment};
use crate::node::{
    change_child, pc_is_black, pc_parent, red_parent, write_once, RbColor, RbNode, RbRoot,
};

use core::ptr::null_mut;

/// Helper for rotations:
/// - `old`'s parent and colour get assigned to `new`
/// - `old` gets assigned `new` as a parent and `color` as a colour.
unsafe fn rotate_set_parents(
    old: *mut RbNode,
    new: *mut RbNode,
    root: &mut RbRoot,
    color: RbColor,
) {
    let parent = (*old).parent();
    (*new).__rb_parent_color = (*old).__rb_parent_color;
    (*old).set_parent_color(new, color);
    change_child(old, new, parent, root);
}

/// Restore the red-black invariants after a fresh red node was linked.
///
/// Loop invariant: `node` is red.
pub(crate) unsafe fn insert_fixup<A: AugmentCallbacks>(mut node: *mut RbNode, root: &mut RbRoot) {
    let mut parent = red_parent(node);
    let mut gparent;
    let mut tmp;

    loop {
        if parent.is_null() {
            // The inserted node is root. Either this is the first node, or
            // we recursed at Case 1 below and are no longer violating 4).
            (*node).set_parent_color(null_mut(), RbColor::Black);
            break;
        }

        // If there is a black parent, we are done. Otherwise, take some
        // corrective action as, per 4), we don't want a red root or two
        // consecutive red nodes.
        if (*parent).is_black() {
            break;
        }

        gparent = red_parent(parent);

        tmp = (*gparent).rb_right;
        if parent != tmp {
            // parent == gparent->rb_left
            if !tmp.is_null() && (*tmp).is_red() {
                // Case 1 - node's uncle is red (colour flips).
                //
                //       G            g
                //      / \          / \
                //     p   u  -->   P   U
                //    /            /
                //   n            n
                //
                // However, since g's parent might be red, and 4) does not
                // allow this, we need to recurse at g.
                (*tmp).set_parent_color(gparent, RbColor::Black);
                (*parent).set_parent_color(gparent, RbColor::Black);
                node = gparent;
                parent = (*node).parent();
                (*node).set_parent_color(parent, RbColor::Red);
                continue;
            }

            tmp = (*parent).rb_right;
            if node == tmp {
                // Case 2 - node's uncle is black and node is the parent's
                // right child (left rotate at parent).
                //
                //      G             G
                //     / \           / \
                //    p   U  -->    n   U
                //     \           /
                //      n         p
                //
                // This still leaves us in violation of 4), the continuation
                // into Case 3 will fix that.
                tmp = (*node).rb_left;
                write_once(&mut (*parent).rb_right, tmp);
                write_once(&mut (*node).rb_left, parent);
                if !tmp.is_null() {
                    (*tmp).set_parent_color(parent, RbColor::Black);
                }
                (*parent).set_parent_color(node, RbColor::Red);
                A::rotate(parent, node);
                parent = node;
                tmp = (*node).rb_right;
            }

            // Case 3 - node's uncle is black and node is the parent's left
            // child (right rotate at gparent).
            //
            //        G           P
            //       / \         / \
            //      p   U  -->  n   g
            //     /                 \
            //    n                   U
            write_once(&mut (*gparent).rb_left, tmp); // == parent->rb_right
            write_once(&mut (*parent).rb_right, gparent);
            if !tmp.is_null() {
                (*tmp).set_parent_color(gparent, RbColor::Black);
            }
            rotate_set_parents(gparent, parent, root, RbColor::Red);
            A::rotate(gparent, parent);
            break;
        } else {
            tmp = (*gparent).rb_left;
            if !tmp.is_null() && (*tmp).is_red() {
                // Case 1 - colour flips
                (*tmp).set_parent_color(gparent, RbColor::Black);
                (*parent).set_parent_color(gparent, RbColor::Black);
                node = gparent;
                parent = (*node).parent();
                (*node).set_parent_color(parent, RbColor::Red);
                continue;
            }

            tmp = (*parent).rb_left;
            if node == tmp {
                // Case 2 - right rotate at parent
                tmp = (*node).rb_right;
                write_once(&mut (*parent).rb_left, tmp);
                write_once(&mut (*node).rb_right, parent);
                if !tmp.is_null() {
                    (*tmp).set_parent_color(parent, RbColor::Black);
                }
                (*parent).set_parent_color(node, RbColor::Red);
                A::rotate(parent, node);
                parent = node;
                tmp = (*node).rb_left;
            }

            // Case 3 - left rotate at gparent
            write_once(&mut (*gparent).rb_right, tmp); // == parent->rb_left
            write_once(&mut (*parent).rb_left, gparent);
            if !tmp.is_null() {
                (*tmp).set_parent_color(gparent, RbColor::Black);
            }
            rotate_set_parents(gparent, parent, root, RbColor::Red);
            A::rotate(gparent, parent);
            break;
        }
    }
}

/// Restore invariant 5) starting at a doubly-black position.
///
/// Loop invariants:
/// - `node` is black (or null on first iteration)
/// - `node` is not the root (`parent` is not null)
/// - All leaf paths going through `parent` and `node` have a black node
///   count that is 1 lower than other leaf paths.
pub(crate) unsafe fn erase_fixup<A: AugmentCallbacks>(mut parent: *mut RbNode, root: &mut RbRoot) {
    let mut node: *mut RbNode = null_mut();
    let mut sibling;
    let mut tmp1;
    let mut tmp2;

    loop {
        sibling = (*parent).rb_right;
        if node != sibling {
            // node == parent->rb_left
            if (*sibling).is_red() {
                // Case 1 - left rotate at parent
                //
                //     P               S
                //    / \             / \
                //   N   s    -->    p   Sr
                //      / \         / \
                //     Sl  Sr      N   Sl
                tmp1 = (*sibling).rb_left;
                write_once(&mut (*parent).rb_right, tmp1);
                write_once(&mut (*sibling).rb_left, parent);
                (*tmp1).set_parent_color(parent, RbColor::Black);
                rotate_set_parents(parent, sibling, root, RbColor::Red);
                A::rotate(parent, sibling);
                sibling = tmp1;
            }
            tmp1 = (*sibling).rb_right;
            if tmp1.is_null() || (*tmp1).is_black() {
                tmp2 = (*sibling).rb_left;
                if tmp2.is_null() || (*tmp2).is_black() {
                    // Case 2 - sibling colour flip
                    // (p could be either colour here)
                    //
                    //    (p)           (p)
                    //    / \           / \
                    //   N   S    -->  N   s
                    //      / \           / \
                    //     Sl  Sr        Sl  Sr
                    //
                    // This leaves us violating 5) which can be fixed by
                    // flipping p to black if it was red, or by recursing
                    // at p. p is red when coming from Case 1.
                    (*sibling).set_parent_color(parent, RbColor::Red);
                    if (*parent).is_red() {
                        (*parent).set_black();
                    } else {
                        node = parent;
                        parent = (*node).parent();
                        if !parent.is_null() {
                            continue;
                        }
                    }
                    break;
                }
                // Case 3 - right rotate at sibling
                // (p could be either colour here)
                //
                //   (p)           (p)
                //   / \           / \
                //  N   S    -->  N   sl
                //     / \             \
                //    sl  Sr            S
                //                       \
                //                        Sr
                //
                // Note: p might be red, and then both p and sl are red
                // after the rotation (which breaks property 4). This is
                // fixed in Case 4, which sets sl the colour of p and sets
                // p black.
                //
                //   (p)            (sl)
                //   / \            /  \
                //  N   sl   -->   P    S
                //       \        /      \
                //        S      N        Sr
                //         \
                //          Sr
                tmp1 = (*tmp2).rb_right;
                write_once(&mut (*sibling).rb_left, tmp1);
                write_once(&mut (*tmp2).rb_right, sibling);
                write_once(&mut (*parent).rb_right, tmp2);
                if !tmp1.is_null() {
                    (*tmp1).set_parent_color(sibling, RbColor::Black);
                }
                A::rotate(sibling, tmp2);
                tmp1 = sibling;
                sibling = tmp2;
            }
            // Case 4 - left rotate at parent + colour flips
            // (p and sl could be either colour here. After rotation, p
            // becomes black, s acquires p's colour, and sl keeps its
            // colour)
            //
            //      (p)             (s)
            //      / \             / \
            //     N   S     -->   P   Sr
            //        / \         / \
            //      (sl) sr      N  (sl)
            tmp2 = (*sibling).rb_left;
            write_once(&mut (*parent).rb_right, tmp2);
            write_once(&mut (*sibling).rb_left, parent);
            (*tmp1).set_parent_color(sibling, RbColor::Black);
            if !tmp2.is_null() {
                (*tmp2).set_parent(parent);
            }
            rotate_set_parents(parent, sibling, root, RbColor::Black);
            A::rotate(parent, sibling);
            break;
        } else {
            sibling = (*parent).rb_left;
            if (*sibling).is_red() {
                // Case 1 - right rotate at parent
                tmp1 = (*sibling).rb_right;
                write_once(&mut (*parent).rb_left, tmp1);
                write_once(&mut (*sibling).rb_right, parent);
                (*tmp1).set_parent_color(parent, RbColor::Black);
                rotate_set_parents(parent, sibling, root, RbColor::Red);
                A::rotate(parent, sibling);
                sibling = tmp1;
            }
            tmp1 = (*sibling).rb_left;
            if tmp1.is_null() || (*tmp1).is_black() {
                tmp2 = (*sibling).rb_right;
                if tmp2.is_null() || (*tmp2).is_black() {
                    // Case 2 - sibling colour flip
                    (*sibling).set_parent_color(parent, RbColor::Red);
                    if (*parent).is_red() {
                        (*parent).set_black();
                    } else {
                        node = parent;
                        parent = (*node).parent();
                        if !parent.is_null() {
                            continue;
                        }
                    }
                    break;
                }
                // Case 3 - left rotate at sibling
                tmp1 = (*tmp2).rb_left;
                write_once(&mut (*sibling).rb_right, tmp1);
                write_once(&mut (*tmp2).rb_left, sibling);
                write_once(&mut (*parent).rb_left, tmp2);
                if !tmp1.is_null() {
                    (*tmp1).set_parent_color(sibling, RbColor::Black);
                }
                A::rotate(sibling, tmp2);
                tmp1 = sibling;
                sibling = tmp2;
            }
            // Case 4 - right rotate at parent + colour flips
            tmp2 = (*sibling).rb_right;
            write_once(&mut (*parent).rb_left, tmp2);
            write_once(&mut (*sibling).rb_right, parent);
            (*tmp1).set_parent_color(sibling, RbColor::Black);
            if !tmp2.is_null() {
                (*tmp2).set_parent(parent);
            }
            rotate_set_parents(parent, sibling, root, RbColor::Black);
            A::rotate(parent, sibling);
            break;
        }
    }
}

/// Splice `node` out of the tree and return the parent of the doubly-black
/// position that still needs a colour fix-up, or null when none is needed.
pub(crate) unsafe fn erase_splice<A: AugmentCallbacks>(
    node: *mut RbNode,
    root: &mut RbRoot,
) -> *mut RbNode {
    let child = (*node).rb_right;
    let mut tmp = (*node).rb_left;
    let rebalance;
    let pc;

    if tmp.is_null() {
        // Case 1: node to erase has no more than 1 child (easy!)
        //
        // Note that if there is one child it must be red due to 5) and
        // node must be black due to 4). We adjust colours locally so as to
        // bypass the colour fix-up later on.
        pc = (*node).__rb_parent_color;
        let parent = pc_parent(pc);
        change_child(node, child, parent, root);
        if !child.is_null() {
            (*child).__rb_parent_color = pc;
            rebalance = null_mut();
        } else {
            rebalance = if pc_is_black(pc) { parent } else { null_mut() };
        }
        tmp = parent;
    } else if child.is_null() {
        // Still case 1, but this time the child is node->rb_left
        pc = (*node).__rb_parent_color;
        (*tmp).__rb_parent_color = pc;
        let parent = pc_parent(pc);
        change_child(node, tmp, parent, root);
        rebalance = null_mut();
        tmp = parent;
    } else {
        let mut successor = child;
        let mut parent;
        let child2;

        tmp = (*child).rb_left;
        if tmp.is_null() {
            // Case 2: node's successor is its right child
            //
            //    (n)          (s)
            //    / \          / \
            //  (x) (s)  ->  (x) (c)
            //        \
            //        (c)
            parent = successor;
            child2 = (*successor).rb_right;

            A::copy(node, successor);
        } else {
            // Case 3: node's successor is leftmost under node's right
            // child subtree
            //
            //    (n)          (s)
            //    / \          / \
            //  (x) (y)  ->  (x) (y)
            //      /            /
            //    (p)          (p)
            //    /            /
            //  (s)          (c)
            //    \
            //    (c)
            loop {
                parent = successor;
                successor = tmp;
                tmp = (*tmp).rb_left;
                if tmp.is_null() {
                    break;
                }
            }
            child2 = (*successor).rb_right;
            write_once(&mut (*parent).rb_left, child2);
            write_once(&mut (*successor).rb_right, child);
            (*child).set_parent(successor);

            A::copy(node, successor);
            A::propagate(parent, successor);
        }

        tmp = (*node).rb_left;
        write_once(&mut (*successor).rb_left, tmp);
        (*tmp).set_parent(successor);

        pc = (*node).__rb_parent_color;
        tmp = pc_parent(pc);
        change_child(node, successor, tmp, root);

        if !child2.is_null() {
            (*child2).set_parent_color(parent, RbColor::Black);
            rebalance = null_mut();
        } else {
            rebalance = if (*successor).is_black() {
                parent
            } else {
                null_mut()
            };
        }
        (*successor).__rb_parent_color = pc;
        tmp = successor;
    }

    A::propagate(tmp, null_mut());
    rebalance
}

impl RbRoot {
    /// Rebalance after attaching a fresh red node with
    /// [`rb_link_node`](crate::rb_link_node).
    ///
    /// # Safety
    /// `node` must have just been linked into this tree.
    pub unsafe fn insert_color(&mut self, node: *mut RbNode) {
        insert_fixup::<DummyAugment>(node, self);
    }

    /// [`RbRoot::insert_color`] for augmented trees; rebalancing calls back
    /// into `A` to keep subtree summaries consistent.
    ///
    /// # Safety
    /// `node` must have just been linked into this tree, with the summaries
    /// on the path to it already updated by the caller.
    pub unsafe fn insert_augmented<A: AugmentCallbacks>(&mut self, node: *mut RbNode) {
        insert_fixup::<A>(node, self);
    }

    /// Remove `node` from the tree and rebalance.
    ///
    /// After this returns, `node` is unreachable from any tree operation
    /// and its storage may be released.
    ///
    /// # Safety
    /// `node` must be in this tree.
    pub unsafe fn erase(&mut self, node: *mut RbNode) {
        let rebalance = erase_splice::<DummyAugment>(node, self);
        if !rebalance.is_null() {
            erase_fixup::<DummyAugment>(rebalance, self);
        }
    }

    /// [`RbRoot::erase`] for augmented trees.
    ///
    /// # Safety
    /// `node` must be in this tree and the tree's records must carry the
    /// augmentation `A`.
    pub unsafe fn erase_augmented<A: AugmentCallbacks>(&mut self, node: *mut RbNode) {
        let rebalance = erase_splice::<A>(node, self);
        if !rebalance.is_null() {
            erase_fixup::<A>(rebalance, self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::rb_link_node;

    #[test]
    fn test_first_insert_becomes_black_root() {
        let mut root = RbRoot::new();
        let mut node = RbNode::new();

        unsafe {
            rb_link_node(&mut node, null_mut(), &mut root.rb_node);
            root.insert_color(&mut node);
        }
        assert_eq!(root.rb_node, &mut node as *mut RbNode);
        assert!(node.is_black(), "root must be black");
    }

    #[test]
    fn test_second_insert_stays_red() {
        let mut root = RbRoot::new();
        let mut node1 = RbNode::new();
        let mut node2 = RbNode::new();

        unsafe {
            rb_link_node(&mut node1, null_mut(), &mut root.rb_node);
            root.insert_color(&mut node1);

            rb_link_node(&mut node2, &mut node1, &mut node1.rb_left);
            root.insert_color(&mut node2);
        }
        assert!(node2.is_red(), "a child of a black parent keeps its colour");
        assert!(node1.is_black());
    }

    #[test]
    fn test_erase_leaf_and_single_child() {
        let mut root = RbRoot::new();
        let mut node1 = RbNode::new();
        let mut node2 = RbNode::new();
        let mut node3 = RbNode::new();

        unsafe {
            // Build: node2 black root, node1/node3 red leaves.
            root.rb_node = &mut node2 as *mut RbNode;
            node2.set_parent_color(null_mut(), RbColor::Black);
            node2.rb_left = &mut node1 as *mut RbNode;
            node2.rb_right = &mut node3 as *mut RbNode;
            node1.set_parent_color(&mut node2, RbColor::Red);
            node3.set_parent_color(&mut node2, RbColor::Red);
            node1.rb_left = null_mut();
            node1.rb_right = null_mut();
            node3.rb_left = null_mut();
            node3.rb_right = null_mut();

            root.erase(&mut node1);
            assert!(node2.rb_left.is_null());

            root.erase(&mut node2);
            assert_eq!(root.rb_node, &mut node3 as *mut RbNode);
            assert!(node3.is_black(), "promoted child must turn black");
        }
    }
}
