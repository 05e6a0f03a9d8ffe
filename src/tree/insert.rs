//! Insertion and node splitting.
//!
//! Inserting into the middle of a leaf carries the leaf's tail out, fills the
//! leaf with new data, chains fresh leaves for whatever does not fit, and
//! finally puts the carried tail back: into the last written leaf if there is
//! room, else onto the front of the following leaf, else into one new leaf.
//! New leaves land in the parent of the leaf being edited, so only that
//! parent (and then its ancestors) can overflow.

use super::TreeBuffer;
use super::arena::NONE;
use super::node::Children;
use super::node::Inner;
use super::node::InnerIdx;
use super::node::Leaf;
use super::node::LeafIdx;
use super::node::NodeRef;
use crate::cursor::Cursor;
use crate::error::Error;
use crate::error::Result;

impl<T: Clone> TreeBuffer<T> {
    /// Insert `data` so that its first element lands at `pos`.
    ///
    /// Returns the number of elements inserted. `pos == size()` appends.
    pub fn insert(&mut self, pos: usize, data: &[T]) -> Result<usize> {
        let size = self.size();
        if pos > size {
            return Err(Error::Range { pos, size });
        }
        if data.is_empty() {
            return Ok(0);
        }
        if pos == size {
            return Ok(self.append(data));
        }
        tracing::debug!(pos, len = data.len(), "insert");
        let (leaf, offset) = self.find_leaf(pos);
        self.insert_into_leaf(leaf, offset, data);
        self.finish_mutation();
        return Ok(data.len());
    }

    /// Insert `data` before the element under `cursor`.
    pub fn insert_at(&mut self, cursor: &Cursor, data: &[T]) -> Result<usize> {
        self.validate(cursor)?;
        if data.is_empty() {
            return Ok(0);
        }
        if cursor.is_end() {
            return Ok(self.append(data));
        }
        tracing::debug!(leaf = cursor.leaf, offset = cursor.offset, len = data.len(), "insert at cursor");
        self.insert_into_leaf(cursor.leaf, cursor.offset, data);
        self.finish_mutation();
        return Ok(data.len());
    }

    /// Append `data` to the end of the sequence, returning the number of
    /// elements appended.
    pub fn append(&mut self, data: &[T]) -> usize {
        if data.is_empty() {
            return 0;
        }
        tracing::debug!(len = data.len(), "append");
        let capacity = self.config.leaf_capacity;
        if self.root == NONE {
            self.root = self.inners.alloc(Inner::new(NONE));
            let leaf = self.leaves.alloc(Leaf::new(self.root, capacity));
            self.inners[self.root].children.push(NodeRef::Leaf(leaf));
        }

        let last = self.last_leaf();
        let taken = self.leaves[last].fill_from(data, capacity);
        self.link_leaves_after(last, data[taken..].chunks(capacity).map(<[T]>::to_vec));

        let parent = self.leaves[last].parent;
        self.refresh_upward(parent);
        self.split_overflowing(parent);
        self.finish_mutation();
        return data.len();
    }

    fn insert_into_leaf(&mut self, leaf: LeafIdx, offset: usize, data: &[T]) {
        let capacity = self.config.leaf_capacity;
        let parent = self.leaves[leaf].parent;
        let old_next = self.leaves[leaf].next;

        let mut carry = self.leaves[leaf].data.split_off(offset);
        let taken = self.leaves[leaf].fill_from(data, capacity);

        // Whatever room is left takes back the front of the carry.
        let back = carry.len().min(self.leaves[leaf].room(capacity));
        let mut rest = carry.split_off(back);
        self.leaves[leaf].data.append(&mut carry);

        let mut runs: Vec<Vec<T>> = data[taken..].chunks(capacity).map(<[T]>::to_vec).collect();

        let mut spilled_into = NONE;
        if !rest.is_empty() {
            let room = match runs.last() {
                Some(run) => capacity - run.len(),
                None => self.leaves[leaf].room(capacity),
            };
            if room >= rest.len() {
                match runs.last_mut() {
                    Some(run) => run.append(&mut rest),
                    None => self.leaves[leaf].data.append(&mut rest),
                }
            } else if old_next != NONE && self.leaves[old_next].room(capacity) >= rest.len() {
                let moved = rest.len();
                let next = &mut self.leaves[old_next].data;
                next.append(&mut rest);
                next.rotate_right(moved);
                spilled_into = old_next;
            } else {
                runs.push(rest);
            }
        }
        self.link_leaves_after(leaf, runs);

        self.refresh_upward(parent);
        if spilled_into != NONE {
            let next_parent = self.leaves[spilled_into].parent;
            if next_parent != parent {
                self.refresh_upward(next_parent);
            }
            tracing::trace!(leaf = spilled_into, "carry spilled into next leaf");
        }
        self.split_overflowing(parent);
    }

    /// Chain one fresh leaf per run right after `prev`, both in the leaf
    /// chain and in `prev`'s parent. The new leaves are spliced into the
    /// parent in one step; offsets are left for the caller to refresh.
    fn link_leaves_after<I>(&mut self, prev: LeafIdx, runs: I)
    where
        I: IntoIterator<Item = Vec<T>>,
    {
        let parent = self.leaves[prev].parent;
        let next = self.leaves[prev].next;
        let capacity = self.config.leaf_capacity;

        let mut batch = Children::new();
        let mut last = prev;
        for run in runs {
            let mut leaf = Leaf::new(parent, capacity);
            leaf.data.extend(run);
            leaf.prev = last;
            let idx = self.leaves.alloc(leaf);
            self.leaves[last].next = idx;
            batch.push(NodeRef::Leaf(idx));
            last = idx;
        }
        if batch.is_empty() {
            return;
        }

        self.leaves[last].next = next;
        if next != NONE {
            self.leaves[next].prev = last;
        }
        let count = batch.len();
        let slot = self.inners[parent].index_of(NodeRef::Leaf(prev)) + 1;
        self.inners[parent].children.insert_many(slot, batch);
        tracing::trace!(parent, count, "link leaves");
    }
}

impl<T> TreeBuffer<T> {
    /// Split every overflowing node from `start` up to the root.
    pub(crate) fn split_overflowing(&mut self, start: InnerIdx) {
        let mut node = start;
        while node != NONE {
            if self.inners[node].len() > self.config.fanout {
                self.split_inner(node);
            }
            node = self.inners[node].parent;
        }
    }

    /// Peel the tail of an overflowing node off into new right siblings until
    /// it fits, then splice all of them into the parent at once. Splitting the
    /// root first gives it a fresh parent.
    fn split_inner(&mut self, node: InnerIdx) {
        let fanout = self.config.fanout;

        if self.inners[node].parent == NONE {
            let mut root = Inner::new(NONE);
            root.children.push(NodeRef::Inner(node));
            let new_root = self.inners.alloc(root);
            self.inners[node].parent = new_root;
            self.inners[node].offset = 0;
            self.root = new_root;
            tracing::debug!(old_root = node, new_root, "root pivot");
        }

        let parent = self.inners[node].parent;
        let mut siblings = Children::new();
        while self.inners[node].len() > fanout {
            let count = self.inners[node].len();
            let moving = if count < 2 * fanout { count / 2 } else { fanout };
            let moved: Children = self.inners[node].children.drain(count - moving..).collect();
            let sibling = self.inners.alloc(Inner::with_children(parent, moved));
            for i in 0..self.inners[sibling].len() {
                let child = self.inners[sibling].children[i];
                self.set_parent(child, sibling);
            }
            self.refresh(sibling);
            siblings.push(NodeRef::Inner(sibling));
            tracing::trace!(node, sibling, moved = moving, "split inner");
        }

        // Peeled off the tail, so the first sibling built is the rightmost.
        siblings.reverse();
        let slot = self.inners[parent].index_of(NodeRef::Inner(node)) + 1;
        self.inners[parent].children.insert_many(slot, siblings);
        self.refresh(node);
        self.refresh(parent);
    }
}
