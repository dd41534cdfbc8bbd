//! Generic search and insert over a caller-supplied comparator.
//!
//! Two operator shapes are used, related like:
//!
//! ```text
//! cmp(key, b) == Less     := less(a, b)
//! cmp(key, b) == Greater  := less(b, a)
//! cmp(key, b) == Equal    := !less(a, b) && !less(b, a)
//! ```
//!
//! If the operators only define a partial order, no guarantee is made on
//! which of the matching nodes [`RbRoot::find`] returns; use
//! [`RbRoot::find_first`] and [`rb_next_match`] to iterate a whole
//! equivalence class in order.

use crate::node::{rb_link_node, rb_link_node_rcu, RbNode, RbRoot};

use core::cmp::Ordering;
use core::ptr::null_mut;
use core::sync::atomic::{AtomicPtr, Ordering as MemOrdering};

/// Acquire-load a child slot; pairs with the writer's release stores.
unsafe fn read_acquire(slot: *const *mut RbNode) -> *mut RbNode {
    (*(slot as *const AtomicPtr<RbNode>)).load(MemOrdering::Acquire)
}

impl RbRoot {
    /// Find `key` in the tree.
    ///
    /// Returns the matching node or null. With a partial order this may be
    /// any node of the equivalence class.
    ///
    /// # Safety
    /// `cmp` must be consistent with the order the tree was built under.
    pub unsafe fn find<K, F>(&self, key: &K, cmp: F) -> *mut RbNode
    where
        F: Fn(&K, *const RbNode) -> Ordering,
    {
        let mut node = self.rb_node;

        while !node.is_null() {
            match cmp(key, node) {
                Ordering::Less => node = (*node).rb_left,
                Ordering::Greater => node = (*node).rb_right,
                Ordering::Equal => return node,
            }
        }

        null_mut()
    }

    /// [`RbRoot::find`] for a tree that may be rotated underneath us by a
    /// concurrent writer.
    ///
    /// Child pointers are acquire-loaded, pairing with the writer's ordered
    /// stores. The descent can race a rotation and miss a present key; a
    /// null result therefore means "not known to be present", never
    /// "definitely absent". A returned node, however, is a true match.
    ///
    /// # Safety
    /// `cmp` must be consistent with the order the tree was built under,
    /// and any concurrent writer must be the single serialised writer of
    /// the store-ordering contract.
    pub unsafe fn find_rcu<K, F>(&self, key: &K, cmp: F) -> *mut RbNode
    where
        F: Fn(&K, *const RbNode) -> Ordering,
    {
        let mut node = read_acquire(&self.rb_node);

        while !node.is_null() {
            match cmp(key, node) {
                Ordering::Less => node = read_acquire(&(*node).rb_left),
                Ordering::Greater => node = read_acquire(&(*node).rb_right),
                Ordering::Equal => return node,
            }
        }

        null_mut()
    }

    /// Find the leftmost node matching `key`, or null.
    ///
    /// On equality the descent keeps going left, so with a partial order
    /// this lands on the first node of the equivalence class.
    ///
    /// # Safety
    /// `cmp` must be consistent with the order the tree was built under.
    pub unsafe fn find_first<K, F>(&self, key: &K, cmp: F) -> *mut RbNode
    where
        F: Fn(&K, *const RbNode) -> Ordering,
    {
        let mut node = self.rb_node;
        let mut best = null_mut();

        while !node.is_null() {
            match cmp(key, node) {
                Ordering::Less => node = (*node).rb_left,
                Ordering::Greater => node = (*node).rb_right,
                Ordering::Equal => {
                    best = node;
                    node = (*node).rb_left;
                }
            }
        }

        best
    }

    /// Insert `node` by a less-than predicate.
    ///
    /// Equal keys are inserted to the right, so duplicates are permitted
    /// and preserve insertion order under in-order traversal.
    ///
    /// # Safety
    /// `node` must not be in any tree; `less` must be consistent with the
    /// order the tree was built under.
    pub unsafe fn add<F>(&mut self, node: *mut RbNode, less: F)
    where
        F: Fn(*mut RbNode, *const RbNode) -> bool,
    {
        let mut link: *mut *mut RbNode = &mut self.rb_node;
        let mut parent = null_mut();

        while !(*link).is_null() {
            parent = *link;
            link = if less(node, parent) {
                &mut (*parent).rb_left
            } else {
                &mut (*parent).rb_right
            };
        }

        rb_link_node(node, parent, link);
        self.insert_color(node);
    }

    /// Find the node equivalent to `node`, or insert `node`.
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
        let mut link: *mut *mut RbNode = &mut self.rb_node;
        let mut parent = null_mut();

        while !(*link).is_null() {
            parent = *link;
            link = match cmp(node, parent) {
                Ordering::Less => &mut (*parent).rb_left,
                Ordering::Greater => &mut (*parent).rb_right,
                Ordering::Equal => return parent,
            };
        }

        rb_link_node(node, parent, link);
        self.insert_color(node);
        null_mut()
    }

    /// [`RbRoot::find_add`] with a release-ordered link store, for trees
    /// read locklessly.
    ///
    /// # Safety
    /// Same contract as [`RbRoot::find_add`].
    pub unsafe fn find_add_rcu<F>(&mut self, node: *mut RbNode, cmp: F) -> *mut RbNode
    where
        F: Fn(*const RbNode, *const RbNode) -> Ordering,
    {
        let mut link: *mut *mut RbNode = &mut self.rb_node;
        let mut parent = null_mut();

        while !(*link).is_null() {
            parent = *link;
            link = match cmp(node, parent) {
                Ordering::Less => &mut (*parent).rb_left,
                Ordering::Greater => &mut (*parent).rb_right,
                Ordering::Equal => return parent,
            };
        }

        rb_link_node_rcu(node, parent, link);
        self.insert_color(node);
        null_mut()
    }
}

/// Step from one match to the next within an equivalence class.
///
/// Returns `rb_next(node)` while it still compares equal to `key`, else
/// null. Pairs with [`RbRoot::find_first`].
///
/// # Safety
/// `node` must be a valid pointer to a node in a tree; `cmp` must be
/// consistent with the order the tree was built under.
pub unsafe fn rb_next_match<K, F>(key: &K, node: *mut RbNode, cmp: F) -> *mut RbNode
where
    F: Fn(&K, *const RbNode) -> Ordering,
{
    let next = RbNode::rb_next(node);
    if !next.is_null() && cmp(key, next) != Ordering::Equal {
        return null_mut();
    }
    next
}
