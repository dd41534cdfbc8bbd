//! Binary-layout verification for the tree types.
//!
//! The node header is shared with C callers, so its size, alignment and
//! field offsets are part of the contract. The assertions here fail the
//! build when a layout drifts; the tests/ directory pins the concrete
//! values at runtime as well.

use static_assertions::{assert_eq_align, assert_eq_size, const_assert_eq};

use thorn_rbtree::{RbNode, RbRoot, RbRootCached};

// The node header is three machine words, pointer-aligned, with the packed
// parent-and-colour word first.
assert_eq_size!(RbNode, [usize; 3]);
assert_eq_align!(RbNode, usize);
const_assert_eq!(core::mem::offset_of!(RbNode, __rb_parent_color), 0);
const_assert_eq!(
    core::mem::offset_of!(RbNode, rb_right),
    core::mem::size_of::<usize>()
);
const_assert_eq!(
    core::mem::offset_of!(RbNode, rb_left),
    2 * core::mem::size_of::<usize>()
);

// The root is a bare pointer; the cached root adds exactly one word.
assert_eq_size!(RbRoot, usize);
assert_eq_size!(RbRootCached, [usize; 2]);
const_assert_eq!(core::mem::offset_of!(RbRootCached, rb_root), 0);
const_assert_eq!(
    core::mem::offset_of!(RbRootCached, rb_leftmost),
    core::mem::size_of::<usize>()
);
