//! Augmentation callbacks: per-subtree summaries maintained through
//! rotations.
//!
//! The insert and erase machinery is generic over an [`AugmentCallbacks`]
//! implementation, so the no-op case ([`DummyAugment`]) monomorphises to
//! plain tree maintenance with the hook calls compiled out entirely.
//!
//! On insertion the caller updates the summaries on the path leading to the
//! new node, links it with [`rb_link_node`](crate::rb_link_node) as usual
//! and then calls [`RbRoot::insert_augmented`](crate::RbRoot::insert_augmented)
//! instead of the plain colour fix-up; any rebalancing calls back into the
//! hooks to keep the affected subtrees consistent.

use crate::node::RbNode;

/// Hooks invoked wherever a structural change moves subtree boundaries.
///
/// Implementations are usually generated with
/// [`rb_declare_callbacks!`](crate::rb_declare_callbacks) or
/// [`rb_declare_callbacks_max!`](crate::rb_declare_callbacks_max).
pub trait AugmentCallbacks {
    /// Recompute summaries walking from `node` toward the root, stopping at
    /// `stop` (null to run to the root) or as soon as a level's summary is
    /// already correct.
    ///
    /// # Safety
    /// `node` must be null, equal to `stop`, or a valid node in a tree whose
    /// records carry this augmentation.
    unsafe fn propagate(node: *mut RbNode, stop: *mut RbNode);

    /// Copy the summary from `old` to `new`; used when a node is moved into
    /// another's position without recomputation.
    ///
    /// # Safety
    /// Both must be valid nodes in records carrying this augmentation.
    unsafe fn copy(old: *mut RbNode, new: *mut RbNode);

    /// Rotation hook: `new` now dominates the subtree `old` used to, so it
    /// adopts `old`'s summary, and `old` (now a child) is recomputed.
    ///
    /// # Safety
    /// Both must be valid nodes in records carrying this augmentation.
    unsafe fn rotate(old: *mut RbNode, new: *mut RbNode);
}

/// The no-op callback triple used by the non-augmented entry points.
pub struct DummyAugment;

impl AugmentCallbacks for DummyAugment {
    #[inline(always)]
    unsafe fn propagate(_node: *mut RbNode, _stop: *mut RbNode) {}

    #[inline(always)]
    unsafe fn copy(_old: *mut RbNode, _new: *mut RbNode) {}

    #[inline(always)]
    unsafe fn rotate(_old: *mut RbNode, _new: *mut RbNode) {}
}

/// Recover the record containing an embedded [`RbNode`](crate::RbNode).
///
/// `$node` is a raw node pointer, `$type` the record type, `$field` the name
/// of the record's node field. Must be used where raw-pointer arithmetic is
/// allowed (an `unsafe` context).
#[macro_export]
macro_rules! rb_entry {
    ($node:expr, $type:ty, $field:ident) => {
        ($node as *const u8).sub(::core::mem::offset_of!($type, $field)) as *mut $type
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rb_impl_callbacks {
    ($name:ident, $struct:ty, $field:ident, $augmented:ident, $compute:expr) => {
        impl $crate::AugmentCallbacks for $name {
            unsafe fn propagate(mut node: *mut $crate::RbNode, stop: *mut $crate::RbNode) {
                while node != stop {
                    let entry = $crate::rb_entry!(node, $struct, $field);
                    if ($compute)(entry, true) {
                        break;
                    }
                    node = (*node).parent();
                }
            }

            unsafe fn copy(old: *mut $crate::RbNode, new: *mut $crate::RbNode) {
                let old = $crate::rb_entry!(old, $struct, $field);
                let new = $crate::rb_entry!(new, $struct, $field);
                (*new).$augmented = (*old).$augmented;
            }

            unsafe fn rotate(old: *mut $crate::RbNode, new: *mut $crate::RbNode) {
                let old = $crate::rb_entry!(old, $struct, $field);
                let new = $crate::rb_entry!(new, $struct, $field);
                (*new).$augmented = (*old).$augmented;
                ($compute)(old, false);
            }
        }
    };
}

/// Declare an [`AugmentCallbacks`] implementation for a record type
/// (generic case).
///
/// - `$name`: name of the unit struct to declare.
/// - `$struct`: record type containing the node.
/// - `$field`: name of the [`RbNode`](crate::RbNode) field within the record.
/// - `$augmented`: name of the record field holding the subtree summary.
/// - `$compute`: `unsafe fn(*mut $struct, bool) -> bool` recomputing the
///   summary of one record from its children; when the second argument is
///   true it returns true instead of storing if the summary is already
///   correct.
#[macro_export]
macro_rules! rb_declare_callbacks {
    ($vis:vis $name:ident, $struct:ty, $field:ident, $augmented:ident, $compute:path) => {
        $vis struct $name;

        $crate::__rb_impl_callbacks!($name, $struct, $field, $augmented, $compute);
    };
}

/// Declare an [`AugmentCallbacks`] implementation computing the summary as
/// the maximum of a per-record scalar over the subtree.
///
/// - `$type`: type of the summary field.
/// - `$compute`: `fn(*mut $struct) -> $type` returning the record's own
///   scalar.
///
/// `propagate` stops at the first level whose stored maximum is unchanged.
#[macro_export]
macro_rules! rb_declare_callbacks_max {
    ($vis:vis $name:ident, $struct:ty, $field:ident, $type:ty, $augmented:ident, $compute:path) => {
        $vis struct $name;

        impl $name {
            /// Recompute one record's subtree maximum; with `exit` set,
            /// returns true instead of storing when nothing changed.
            unsafe fn compute_max(node: *mut $struct, exit: bool) -> bool {
                let mut max: $type = ($compute)(node);
                let left = (*node).$field.rb_left;
                if !left.is_null() {
                    let child = $crate::rb_entry!(left, $struct, $field);
                    if (*child).$augmented > max {
                        max = (*child).$augmented;
                    }
                }
                let right = (*node).$field.rb_right;
                if !right.is_null() {
                    let child = $crate::rb_entry!(right, $struct, $field);
                    if (*child).$augmented > max {
                        max = (*child).$augmented;
                    }
                }
                if exit && (*node).$augmented == max {
                    return true;
                }
                (*node).$augmented = max;
                false
            }
        }

        $crate::__rb_impl_callbacks!($name, $struct, $field, $augmented, $name::compute_max);
    };
}
