//! In-order and post-order traversal.

use crate::node::{RbNode, RbRoot};

use core::ptr::null_mut;

impl RbNode {
    /// Find the next node in sorted order.
    ///
    /// If the node has a right subtree, the successor is its leftmost node;
    /// otherwise it is the first ancestor of which the node's subtree hangs
    /// to the left. Returns null for the last node, and for a node that has
    /// been [cleared](RbNode::clear).
    ///
    /// # Safety
    /// `node` must be a valid pointer to a node in a tree, or cleared.
    pub unsafe fn rb_next(node: *const RbNode) -> *mut RbNode {
        if node.is_null() || (*node).is_empty() {
            return null_mut();
        }

        // If we have a right-hand child, go down and then left as far as
        // we can.
        if !(*node).rb_right.is_null() {
            let mut n = (*node).rb_right;
            while !(*n).rb_left.is_null() {
                n = (*n).rb_left;
            }
            return n;
        }

        // No right-hand children. Everything down and left is smaller than
        // us, so any 'next' node must be in the general direction of our
        // parent. Go up the tree; any time the ancestor is a right-hand
        // child of its parent, keep going up. First time it's a left-hand
        // child of its parent, said parent is our 'next' node.
        let mut n = node as *mut RbNode;
        let mut parent = (*n).parent();
        while !parent.is_null() && n == (*parent).rb_right {
            n = parent;
            parent = (*n).parent();
        }
        parent
    }

    /// Find the previous node in sorted order (mirror of
    /// [`RbNode::rb_next`]).
    ///
    /// # Safety
    /// `node` must be a valid pointer to a node in a tree, or cleared.
    pub unsafe fn rb_prev(node: *const RbNode) -> *mut RbNode {
        if node.is_null() || (*node).is_empty() {
            return null_mut();
        }

        // If we have a left-hand child, go down and then right as far as
        // we can.
        if !(*node).rb_left.is_null() {
            let mut n = (*node).rb_left;
            while !(*n).rb_right.is_null() {
                n = (*n).rb_right;
            }
            return n;
        }

        // No left-hand children. Go up till we find an ancestor which is a
        // right-hand child of its parent.
        let mut n = node as *mut RbNode;
        let mut parent = (*n).parent();
        while !parent.is_null() && n == (*parent).rb_left {
            n = parent;
            parent = (*n).parent();
        }
        parent
    }

    /// Find the next node of a post-order walk.
    ///
    /// Every node is returned after all of its descendants, so the caller
    /// may release the current node's storage before stepping on.
    ///
    /// # Safety
    /// `node` must be null or a valid pointer to a node in a tree.
    pub unsafe fn rb_next_postorder(node: *const RbNode) -> *mut RbNode {
        if node.is_null() {
            return null_mut();
        }
        let parent = (*node).parent();

        // If we're sitting on node, we've already seen our children.
        if !parent.is_null()
            && node == (*parent).rb_left as *const RbNode
            && !(*parent).rb_right.is_null()
        {
            // If we are the parent's left node, go to the parent's right
            // node then all the way down to the left.
            left_deepest_node((*parent).rb_right)
        } else {
            // Otherwise we are the parent's right node, and the parent
            // should be next.
            parent
        }
    }
}

unsafe fn left_deepest_node(mut node: *const RbNode) -> *mut RbNode {
    loop {
        if !(*node).rb_left.is_null() {
            node = (*node).rb_left;
        } else if !(*node).rb_right.is_null() {
            node = (*node).rb_right;
        } else {
            return node as *mut RbNode;
        }
    }
}

impl RbRoot {
    /// Find the first (leftmost, smallest) node in the tree, or null.
    ///
    /// # Safety
    /// Returned pointer is only valid while the node stays in the tree.
    pub unsafe fn rb_first(&self) -> *mut RbNode {
        let mut n = self.rb_node;
        if n.is_null() {
            return null_mut();
        }
        while !(*n).rb_left.is_null() {
            n = (*n).rb_left;
        }
        n
    }

    /// Find the last (rightmost, largest) node in the tree, or null.
    ///
    /// # Safety
    /// Returned pointer is only valid while the node stays in the tree.
    pub unsafe fn rb_last(&self) -> *mut RbNode {
        let mut n = self.rb_node;
        if n.is_null() {
            return null_mut();
        }
        while !(*n).rb_right.is_null() {
            n = (*n).rb_right;
        }
        n
    }

    /// First node of a post-order walk: the left-then-right deepest leaf.
    ///
    /// # Safety
    /// Returned pointer is only valid while the node stays in the tree.
    pub unsafe fn rb_first_postorder(&self) -> *mut RbNode {
        if self.rb_node.is_null() {
            return null_mut();
        }
        left_deepest_node(self.rb_node)
    }
}
