//! Leaf and inner nodes.
//!
//! Structure:
//! - Leaves hold up to `leaf_capacity` elements in one contiguous buffer and
//!   are chained left to right through `prev`/`next`, across parents
//! - Inner nodes hold an ordered run of up to `fanout` children and cache the
//!   total element count beneath them
//! - Every node records its `offset` from the start of its parent's run, so a
//!   logical position is the sum of offsets along the path to a leaf

use smallvec::SmallVec;

use super::arena::NONE;

/// Index into the leaf arena.
pub(crate) type LeafIdx = u32;
/// Index into the inner arena.
pub(crate) type InnerIdx = u32;

/// A child reference, tagged with the kind of node it points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum NodeRef {
    Leaf(LeafIdx),
    Inner(InnerIdx),
}

pub(crate) type Children = SmallVec<[NodeRef; 16]>;

/// A leaf node: a fixed-capacity run of elements.
#[derive(Clone, Debug)]
pub(crate) struct Leaf<T> {
    /// Live elements; `data.len()` is the leaf's size.
    pub(crate) data: Vec<T>,
    /// Offset from the start of the parent's child run.
    pub(crate) offset: usize,
    pub(crate) parent: InnerIdx,
    pub(crate) prev: LeafIdx,
    pub(crate) next: LeafIdx,
}

impl<T> Leaf<T> {
    pub(crate) fn new(parent: InnerIdx, capacity: usize) -> Leaf<T> {
        return Leaf {
            data: Vec::with_capacity(capacity),
            offset: 0,
            parent,
            prev: NONE,
            next: NONE,
        };
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        return self.data.len();
    }

    /// Room left before the leaf reaches `capacity`.
    #[inline(always)]
    pub(crate) fn room(&self, capacity: usize) -> usize {
        return capacity.saturating_sub(self.data.len());
    }
}

impl<T: Clone> Leaf<T> {
    /// Append as much of `src` as fits, returning how many elements were taken.
    pub(crate) fn fill_from(&mut self, src: &[T], capacity: usize) -> usize {
        let take = src.len().min(self.room(capacity));
        self.data.extend_from_slice(&src[..take]);
        return take;
    }
}

/// An inner node indexing a run of children.
#[derive(Clone, Debug)]
pub(crate) struct Inner {
    pub(crate) children: Children,
    /// Total element count of the subtree.
    pub(crate) size: usize,
    /// Offset from the start of the parent's child run.
    pub(crate) offset: usize,
    pub(crate) parent: InnerIdx,
}

impl Inner {
    pub(crate) fn new(parent: InnerIdx) -> Inner {
        return Inner {
            children: Children::new(),
            size: 0,
            offset: 0,
            parent,
        };
    }

    pub(crate) fn with_children(parent: InnerIdx, children: Children) -> Inner {
        return Inner {
            children,
            size: 0,
            offset: 0,
            parent,
        };
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        return self.children.len();
    }

    /// Position of `child` in this node's run.
    #[inline]
    pub(crate) fn index_of(&self, child: NodeRef) -> usize {
        return self
            .children
            .iter()
            .position(|&c| c == child)
            .unwrap_or_else(|| panic!("{:?} is not a child of this node", child));
    }
}

/// Returns true if the half-open ranges `[a, b)` and `[c, d)` share an element.
#[inline(always)]
pub(crate) fn overlaps(a: usize, b: usize, c: usize, d: usize) -> bool {
    return a < d && c < b;
}
