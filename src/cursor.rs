//! Position handles.
//!
//! A [`Cursor`] is the result of resolving a logical position: the leaf that
//! holds the element and the element's offset inside that leaf. Resolving is
//! O(log n); using a cursor afterwards is O(1) as long as the tree has not
//! been mutated since.
//!
//! Every mutation bumps the tree's epoch. A cursor remembers the tree it was
//! resolved against and the epoch at the time, and a tree refuses cursors
//! from an older epoch or from another tree with
//! [`Error::StaleCursor`](crate::Error::StaleCursor) rather than addressing an
//! element that has since moved.

use crate::tree::arena::NONE;
use crate::tree::node::LeafIdx;

/// A resolved position in a [`TreeBuffer`](crate::TreeBuffer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    /// Leaf holding the element, or `NONE` for the end-of-sequence sentinel.
    pub(crate) leaf: LeafIdx,
    /// Offset of the element inside the leaf.
    pub(crate) offset: usize,
    /// Identity of the tree that produced the cursor.
    pub(crate) tree: u64,
    /// Tree epoch at resolution time.
    pub(crate) epoch: u64,
}

impl Cursor {
    pub(crate) fn new(leaf: LeafIdx, offset: usize, tree: u64, epoch: u64) -> Cursor {
        return Cursor {
            leaf,
            offset,
            tree,
            epoch,
        };
    }

    pub(crate) fn end(tree: u64, epoch: u64) -> Cursor {
        return Cursor {
            leaf: NONE,
            offset: 0,
            tree,
            epoch,
        };
    }

    /// True for the end-of-sequence sentinel.
    #[inline]
    pub fn is_end(&self) -> bool {
        return self.leaf == NONE;
    }

    /// Offset of the element inside its leaf (0 for the end sentinel).
    #[inline]
    pub fn offset_in_leaf(&self) -> usize {
        return self.offset;
    }
}
