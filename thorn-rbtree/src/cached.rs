//! Leftmost-cached root: a root holder carrying a direct reference to the
//! smallest node, for O(1) first().
//!
//! Only the leftmost node is cached. A rightmost cache would double the
//! footprint for far fewer users; callers that want it can keep their own.

use crate::augment::AugmentCallbacks;
use crate::node::{rb_link_node, RbNode, RbRoot};

use core::cmp::Ordering;
use core::ptr::null_mut;

/// Red-black tree root with a cached leftmost node.
#[repr(C)]
#[derive(Debug)]
pub struct RbRootCached {
    pub rb_root: RbRoot,
    pub rb_leftmost: *mut RbNode,
}

impl RbRootCached {
    /// Create a new empty tree.
    pub const fn new() -> Self {
        Self {
            rb_root: RbRoot::new(),
            rb_leftmost: null_mut(),
        }
    }

    /// Check if tree is empty.
    pub fn is_empty(&self) -> bool {
        self.rb_root.is_empty()
    }

    /// The smallest node, or null. O(1): a field read.
    pub fn first(&self) -> *mut RbNode {
        self.rb_leftmost
    }

    /// Rebalance after linking, updating the leftmost cache.
    ///
    /// `leftmost` is true when the caller's descent never went right, i.e.
    /// the new node is the smallest.
    ///
    /// # Safety
    /// `node` must have just been linked into this tree, and `leftmost`
    /// must be accurate for it.
    pub unsafe fn insert_color(&mut self, node: *mut RbNode, leftmost: bool) {
        if leftmost {
            self.rb_leftmost = node;
        }
        self.rb_root.insert_color(node);
    }

    /// [`RbRootCached::insert_color`] for augmented trees.
    ///
    /// # Safety
    /// Same contract as [`RbRootCached::insert_color`], with the path
    /// summaries already updated by the caller.
    pub unsafe fn insert_augmented<A: AugmentCallbacks>(&mut self, node: *mut RbNode, leftmost: bool) {
        if leftmost {
            self.rb_leftmost = node;
        }
        self.rb_root.insert_augmented::<A>(node);
    }

    /// Remove `node`, recomputing the leftmost cache when `node` was the
    /// smallest.
    ///
    /// Returns the new leftmost node when the cache moved, else null.
    ///
    /// # Safety
    /// `node` must be in this tree.
    pub unsafe fn erase(&mut self, node: *mut RbNode) -> *mut RbNode {
        let mut leftmost = null_mut();

        if self.rb_leftmost == node {
            // The successor is still reachable here; after the splice it
            // would not be.
            leftmost = RbNode::rb_next(node);
            self.rb_leftmost = leftmost;
        }

        self.rb_root.erase(node);

        leftmost
    }

    /// [`RbRootCached::erase`] for augmented trees.
    ///
    /// # Safety
    /// `node` must be in this tree and the tree's records must carry the
    /// augmentation `A`.
    pub unsafe fn erase_augmented<A: AugmentCallbacks>(&mut self, node: *mut RbNode) {
        if self.rb_leftmost == node {
            self.rb_leftmost = RbNode::rb_next(node);
        }
        self.rb_root.erase_augmented::<A>(node);
    }

    /// Replace `victim` with `new` without rebalancing, redirecting the
    /// cache when the victim was the smallest node.
    ///
    /// # Safety
    /// Same contract as [`RbRoot::replace_node`].
    pub unsafe fn replace_node(&mut self, victim: *mut RbNode, new: *mut RbNode) {
        if self.rb_leftmost == victim {
            self.rb_leftmost = new;
        }
        self.rb_root.replace_node(victim, new);
    }

    /// Insert `node` by a less-than predicate, maintaining the cache.
    ///
    /// Returns `node` when it became the new leftmost, else null.
    ///
    /// # Safety
    /// `node` must not be in any tree; `less` must be consistent with the
    /// order the tree was built under.
    pub unsafe fn add<F>(&mut self, node: *mut RbNode, less: F) -> *mut RbNode
    where
        F: Fn(*mut RbNode, *const RbNode) -> bool,
    {
        let mut link: *mut *mut RbNode = &mut self.rb_root.rb_node;
        let mut parent = null_mut();
        let mut leftmost = true;

        while !(*link).is_null() {
            parent = *link;
            if less(node, parent) {
                link = &mut (*parent).rb_left;
            } else {
                link = &mut (*parent).rb_right;
                leftmost = false;
            }
        }

        rb_link_node(node, parent, link);
        self.insert_color(node, leftmost);

        if leftmost {
            node
        } else {
            null_mut()
        }
    }

    /// [`RbRootCached::add`] for augmented trees: the path to the new node
    /// is re-propagated before the colour fix-up.
    ///
    /// # Safety
    /// `node` must not be in any tree and the tree's records must carry the
    /// augmentation `A`.
    pub unsafe fn add_augmented<A, F>(&mut self, node: *mut RbNode, less: F) -> *mut RbNode
    where
        A: AugmentCallbacks,
        F: Fn(*mut RbNode, *const RbNode) -> bool,
    {
        let mut link: *mut *mut RbNode = &mut self.rb_root.rb_node;
        let mut parent = null_mut();
        let mut leftmost = true;

        while !(*link).is_null() {
            parent = *link;
            if less(node, parent) {
                link = &mut (*parent).rb_left;
            } else {
                link = &mut (*parent).rb_right;
                leftmost = false;
            }
        }

        rb_link_node(node, parent, link);
        A::propagate(parent, null_mut());
        self.insert_augmented::<A>(node, leftmost);

        if leftmost {
            node
        } else {
            null_mut()
        }
    }

    /// Find the node equivalent to `node`, or insert `node`, maintaining
    /// the cache.
    ///
    /// Returns the already-present match and leaves the tree unchanged, or
    /// null after inserting `node`.
    ///
    /// # Safety
    /// `node` must not be in any tree; `cmp` must be consistent with the
    /// order the tree was built under.
    pub unsafe fn find_add<F>(&mut self, node: *mut RbNode, cmp: F) -> *mut RbNode
    where
        F: Fn(*const RbNode, *const RbNode) -> Ordering,
    {
        let mut link: *mut *mut RbNode = &mut self.rb_root.rb_node;
        let mut parent = null_mut();
        let mut leftmost = true;

        while !(*link).is_null() {
            parent = *link;
            link = match cmp(node, parent) {
                Ordering::Less => &mut (*parent).rb_left,
                Ordering::Greater => {
                    leftmost = false;
                    &mut (*parent).rb_right
                }
                Ordering::Equal => return parent,
            };
        }

        rb_link_node(node, parent, link);
        self.insert_color(node, leftmost);
        null_mut()
    }
}
