//! The sequence tree.
//!
//! A B-tree over positions rather than keys: leaves hold runs of elements,
//! inner nodes hold runs of children, and every node caches its size and its
//! offset inside its parent. Looking up a position walks down the offsets;
//! editing a leaf walks back up re-deriving them.
//!
//! Operations:
//! - at / pos: O(log n) - resolve a position to a leaf and back
//! - insert / append: O(log n + k) - may split leaves and inner nodes
//! - remove: O(log n + k) - may borrow, merge and collapse the root
//! - iter: O(1) per element - follows the leaf chain

pub(crate) mod arena;
mod check;
mod dot;
mod insert;
pub(crate) mod node;
mod remove;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::Error;
use crate::error::Result;

use arena::Arena;
use arena::NONE;
use node::Inner;
use node::InnerIdx;
use node::Leaf;
use node::LeafIdx;
use node::NodeRef;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

fn next_tree_id() -> u64 {
    return NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed);
}

/// A position-indexed sequence stored in a balanced tree of fixed-capacity leaves.
pub struct TreeBuffer<T> {
    pub(crate) leaves: Arena<Leaf<T>>,
    pub(crate) inners: Arena<Inner>,
    /// Root inner node, or `NONE` while the tree is empty.
    pub(crate) root: InnerIdx,
    pub(crate) config: Config,
    /// Process-unique identity; cursors from other trees are rejected.
    pub(crate) id: u64,
    /// Mutation counter; cursors from an older epoch are rejected.
    pub(crate) epoch: u64,
}

impl<T> TreeBuffer<T> {
    /// Create an empty tree with page-sized leaves.
    pub fn new() -> TreeBuffer<T> {
        return TreeBuffer::with_config(Config::for_element::<T>());
    }

    pub fn with_config(config: Config) -> TreeBuffer<T> {
        return TreeBuffer {
            leaves: Arena::new(),
            inners: Arena::new(),
            root: NONE,
            config,
            id: next_tree_id(),
            epoch: 0,
        };
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        return &self.config;
    }

    /// Total number of elements.
    #[inline(always)]
    pub fn size(&self) -> usize {
        if self.root == NONE {
            return 0;
        }
        return self.inners[self.root].size;
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.root == NONE;
    }

    /// Number of levels including the leaves; 0 for an empty tree.
    pub fn height(&self) -> usize {
        if self.root == NONE {
            return 0;
        }
        let mut height = 1;
        let mut node = NodeRef::Inner(self.root);
        while let NodeRef::Inner(idx) = node {
            node = self.inners[idx].children[0];
            height += 1;
        }
        return height;
    }

    pub fn leaf_count(&self) -> usize {
        return self.leaves.live();
    }

    pub fn inner_count(&self) -> usize {
        return self.inners.live();
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        tracing::debug!(size = self.size(), "clear");
        self.leaves = Arena::new();
        self.inners = Arena::new();
        self.root = NONE;
        self.finish_mutation();
    }

    /// Resolve a position to a cursor.
    ///
    /// `pos == size()` yields the end sentinel; anything larger is a
    /// [`Error::Range`].
    pub fn at(&self, pos: usize) -> Result<Cursor> {
        let size = self.size();
        if pos > size {
            return Err(Error::Range { pos, size });
        }
        if pos == size {
            return Ok(Cursor::end(self.id, self.epoch));
        }
        let (leaf, offset) = self.find_leaf(pos);
        return Ok(Cursor::new(leaf, offset, self.id, self.epoch));
    }

    /// Cursor at the first element (the end sentinel for an empty tree).
    pub fn begin(&self) -> Cursor {
        if self.root == NONE {
            return Cursor::end(self.id, self.epoch);
        }
        return Cursor::new(self.first_leaf(), 0, self.id, self.epoch);
    }

    pub fn end(&self) -> Cursor {
        return Cursor::end(self.id, self.epoch);
    }

    /// Logical position of a cursor: its in-leaf offset plus the offsets of
    /// the leaf and every ancestor.
    pub fn pos(&self, cursor: &Cursor) -> Result<usize> {
        self.validate(cursor)?;
        if cursor.is_end() {
            return Ok(self.size());
        }
        let leaf = &self.leaves[cursor.leaf];
        let mut pos = leaf.offset + cursor.offset;
        let mut node = leaf.parent;
        while node != NONE {
            let inner = &self.inners[node];
            pos += inner.offset;
            node = inner.parent;
        }
        return Ok(pos);
    }

    pub fn get(&self, pos: usize) -> Option<&T> {
        if pos >= self.size() {
            return None;
        }
        let (leaf, offset) = self.find_leaf(pos);
        return self.leaves[leaf].data.get(offset);
    }

    /// Element under a cursor; `None` for the end sentinel.
    pub fn get_at(&self, cursor: &Cursor) -> Result<Option<&T>> {
        self.validate(cursor)?;
        if cursor.is_end() {
            return Ok(None);
        }
        return Ok(self.leaves[cursor.leaf].data.get(cursor.offset));
    }

    /// Move a cursor `n` elements forward. Landing exactly on `size()` gives
    /// the end sentinel; going further is a [`Error::Range`].
    pub fn advance(&self, cursor: &Cursor, n: usize) -> Result<Cursor> {
        self.validate(cursor)?;
        if n == 0 {
            return Ok(*cursor);
        }
        if !cursor.is_end() {
            let offset = cursor.offset + n;
            if offset < self.leaves[cursor.leaf].len() {
                return Ok(Cursor::new(cursor.leaf, offset, self.id, self.epoch));
            }
        }
        let pos = self.pos(cursor)?;
        let target = pos.checked_add(n).ok_or(Error::Range {
            pos: usize::MAX,
            size: self.size(),
        })?;
        return self.at(target);
    }

    /// Move a cursor `n` elements back. Stepping before the first element is
    /// a [`Error::Range`] carrying the step and the cursor's position.
    pub fn retreat(&self, cursor: &Cursor, n: usize) -> Result<Cursor> {
        self.validate(cursor)?;
        if !cursor.is_end() && cursor.offset >= n {
            return Ok(Cursor::new(cursor.leaf, cursor.offset - n, self.id, self.epoch));
        }
        let pos = self.pos(cursor)?;
        if n > pos {
            return Err(Error::Range { pos: n, size: pos });
        }
        return self.at(pos - n);
    }

    pub(crate) fn validate(&self, cursor: &Cursor) -> Result<()> {
        if cursor.tree != self.id || cursor.epoch != self.epoch {
            return Err(Error::StaleCursor);
        }
        return Ok(());
    }

    /// Descend from the root to the leaf holding `pos`.
    /// Requires `pos < size()`; returns `(leaf, offset_in_leaf)`.
    pub(crate) fn find_leaf(&self, pos: usize) -> (LeafIdx, usize) {
        let mut node = self.root;
        let mut local = pos;
        loop {
            match self.child_containing(node, local) {
                NodeRef::Leaf(idx) => return (idx, local - self.leaves[idx].offset),
                NodeRef::Inner(idx) => {
                    local -= self.inners[idx].offset;
                    node = idx;
                }
            }
        }
    }

    /// Scan a child run for the child whose extent covers `local`.
    fn child_containing(&self, node: InnerIdx, local: usize) -> NodeRef {
        let children = &self.inners[node].children;
        for &child in children.iter() {
            if local < self.offset_of(child) + self.size_of(child) {
                return child;
            }
        }
        // Past the end: only reachable for `local == size`, hand back the tail.
        return children[children.len() - 1];
    }

    pub(crate) fn first_leaf(&self) -> LeafIdx {
        let mut node = NodeRef::Inner(self.root);
        loop {
            match node {
                NodeRef::Leaf(idx) => return idx,
                NodeRef::Inner(idx) => node = self.inners[idx].children[0],
            }
        }
    }

    pub(crate) fn last_leaf(&self) -> LeafIdx {
        let mut node = NodeRef::Inner(self.root);
        loop {
            match node {
                NodeRef::Leaf(idx) => return idx,
                NodeRef::Inner(idx) => {
                    let children = &self.inners[idx].children;
                    node = children[children.len() - 1];
                }
            }
        }
    }

    #[inline]
    pub(crate) fn size_of(&self, node: NodeRef) -> usize {
        return match node {
            NodeRef::Leaf(idx) => self.leaves[idx].len(),
            NodeRef::Inner(idx) => self.inners[idx].size,
        };
    }

    #[inline]
    pub(crate) fn offset_of(&self, node: NodeRef) -> usize {
        return match node {
            NodeRef::Leaf(idx) => self.leaves[idx].offset,
            NodeRef::Inner(idx) => self.inners[idx].offset,
        };
    }

    #[inline]
    pub(crate) fn parent_of(&self, node: NodeRef) -> InnerIdx {
        return match node {
            NodeRef::Leaf(idx) => self.leaves[idx].parent,
            NodeRef::Inner(idx) => self.inners[idx].parent,
        };
    }

    #[inline]
    fn set_offset(&mut self, node: NodeRef, offset: usize) {
        match node {
            NodeRef::Leaf(idx) => self.leaves[idx].offset = offset,
            NodeRef::Inner(idx) => self.inners[idx].offset = offset,
        }
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, node: NodeRef, parent: InnerIdx) {
        match node {
            NodeRef::Leaf(idx) => self.leaves[idx].parent = parent,
            NodeRef::Inner(idx) => self.inners[idx].parent = parent,
        }
    }

    /// Re-derive the child offsets and the cached size of one inner node.
    pub(crate) fn refresh(&mut self, idx: InnerIdx) {
        let mut offset = 0;
        for i in 0..self.inners[idx].len() {
            let child = self.inners[idx].children[i];
            self.set_offset(child, offset);
            offset += self.size_of(child);
        }
        self.inners[idx].size = offset;
    }

    /// Refresh `idx` and every ancestor up to the root.
    pub(crate) fn refresh_upward(&mut self, idx: InnerIdx) {
        let mut node = idx;
        while node != NONE {
            self.refresh(node);
            node = self.inners[node].parent;
        }
    }

    /// Release a node and everything beneath it.
    pub(crate) fn release_subtree(&mut self, node: NodeRef) {
        match node {
            NodeRef::Leaf(idx) => {
                self.leaves.release(idx);
            }
            NodeRef::Inner(idx) => {
                let inner = self.inners.release(idx);
                for child in inner.children {
                    self.release_subtree(child);
                }
            }
        }
    }

    /// Close out a top-level mutation: invalidate outstanding cursors.
    pub(crate) fn finish_mutation(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        #[cfg(feature = "paranoid")]
        self.assert_valid();
    }

    #[cfg(feature = "paranoid")]
    fn assert_valid(&self) {
        if let Err(violation) = self.check() {
            panic!("{}\n{:?}", violation, self);
        }
    }
}

impl<T: Clone> Clone for TreeBuffer<T> {
    /// The copy gets its own identity, so cursors into `self` are refused by it.
    fn clone(&self) -> Self {
        return TreeBuffer {
            leaves: self.leaves.clone(),
            inners: self.inners.clone(),
            root: self.root,
            config: self.config,
            id: next_tree_id(),
            epoch: self.epoch,
        };
    }
}

impl<T> Default for TreeBuffer<T> {
    fn default() -> Self {
        return Self::new();
    }
}

/// Unwrap an inner reference. Siblings of an inner node are always inner
/// nodes because every leaf sits at the same depth.
#[inline]
pub(crate) fn expect_inner(node: NodeRef) -> InnerIdx {
    return match node {
        NodeRef::Inner(idx) => idx,
        NodeRef::Leaf(idx) => panic!("expected an inner node, found leaf#{}", idx),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> TreeBuffer<u8> {
        return TreeBuffer::with_config(Config::new(4, 3));
    }

    #[test]
    fn empty_tree() {
        let tree = small();
        assert_eq!(tree.size(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(tree.at(0).unwrap().is_end());
        assert!(tree.begin().is_end());
        assert_eq!(tree.at(1), Err(Error::Range { pos: 1, size: 0 }));
        assert_eq!(tree.get(0), None);
        tree.check().unwrap();
    }

    #[test]
    fn at_and_pos_agree() {
        let mut tree = small();
        tree.append(b"abcdefghijklmnopqrstuvwxyz");
        tree.check().unwrap();
        assert!(tree.height() > 2);

        for pos in 0..26 {
            let cursor = tree.at(pos).unwrap();
            assert_eq!(tree.pos(&cursor), Ok(pos));
            assert_eq!(tree.get_at(&cursor), Ok(Some(&(b'a' + pos as u8))));
            assert_eq!(tree.get(pos), Some(&(b'a' + pos as u8)));
        }
        let end = tree.at(26).unwrap();
        assert!(end.is_end());
        assert_eq!(tree.pos(&end), Ok(26));
        assert_eq!(tree.get_at(&end), Ok(None));
        assert_eq!(tree.at(27), Err(Error::Range { pos: 27, size: 26 }));
    }

    #[test]
    fn advance_and_retreat() {
        let mut tree = small();
        tree.append(b"0123456789");

        let begin = tree.begin();
        let c = tree.advance(&begin, 1).unwrap();
        assert_eq!(tree.get_at(&c), Ok(Some(&b'1')));
        let c = tree.advance(&c, 6).unwrap();
        assert_eq!(tree.get_at(&c), Ok(Some(&b'7')));
        let end = tree.advance(&c, 3).unwrap();
        assert!(end.is_end());
        assert_eq!(tree.advance(&end, 1), Err(Error::Range { pos: 11, size: 10 }));
        assert_eq!(tree.advance(&end, 0), Ok(end));

        let c = tree.retreat(&end, 1).unwrap();
        assert_eq!(tree.get_at(&c), Ok(Some(&b'9')));
        let c = tree.retreat(&c, 9).unwrap();
        assert_eq!(tree.pos(&c), Ok(0));
        assert_eq!(tree.retreat(&c, 1), Err(Error::Range { pos: 1, size: 0 }));
    }

    #[test]
    fn cursors_go_stale_after_mutation() {
        let mut tree = small();
        tree.append(b"hello");
        let cursor = tree.at(2).unwrap();
        tree.append(b"!");
        assert_eq!(tree.pos(&cursor), Err(Error::StaleCursor));
        assert_eq!(tree.get_at(&cursor), Err(Error::StaleCursor));
        assert_eq!(tree.insert_at(&cursor, b"x"), Err(Error::StaleCursor));
        assert_eq!(tree.to_vec(), b"hello!");
    }

    #[test]
    fn cursors_belong_to_their_tree() {
        let mut a = small();
        a.append(b"0123456789abcdef");
        let mut b = small();
        b.append(b"xy");
        assert_eq!(a.epoch, b.epoch);

        let cursor = a.at(14).unwrap();
        assert_eq!(b.get_at(&cursor), Err(Error::StaleCursor));
        assert_eq!(b.pos(&cursor), Err(Error::StaleCursor));
        assert_eq!(b.advance(&cursor, 1), Err(Error::StaleCursor));
        assert_eq!(b.insert_at(&cursor, b"z"), Err(Error::StaleCursor));
        assert_eq!(b.get_at(&a.end()), Err(Error::StaleCursor));
        assert_eq!(b.to_vec(), b"xy");

        let copy = a.clone();
        assert_eq!(copy.get_at(&cursor), Err(Error::StaleCursor));
        assert_eq!(a.get_at(&cursor), Ok(Some(&b'e')));
    }

    #[test]
    fn clear_releases_everything() {
        let mut tree = small();
        tree.append(b"some text that spans several leaves");
        assert!(tree.leaf_count() > 1);
        tree.clear();
        assert_eq!(tree.size(), 0);
        assert_eq!(tree.leaf_count(), 0);
        assert_eq!(tree.inner_count(), 0);
        tree.check().unwrap();
    }
}
