//! Range removal.
//!
//! Removal runs in four passes:
//! 1. note the leaves bordering the range (the leaf holding `from - 1` and the
//!    leaf holding `to`) before anything moves
//! 2. walk the tree dropping fully covered subtrees and trimming the partially
//!    covered leaves at either edge
//! 3. stitch the leaf chain across the gap and coalesce the two border leaves
//!    if their contents fit in one
//! 4. repair underfull inner nodes on the border paths by borrowing from or
//!    merging with a sibling, collapsing single-child roots, until nothing moves

use super::TreeBuffer;
use super::arena::NONE;
use super::expect_inner;
use super::node::Children;
use super::node::InnerIdx;
use super::node::LeafIdx;
use super::node::NodeRef;
use super::node::overlaps;
use crate::cursor::Cursor;
use crate::error::Error;
use crate::error::Result;

/// Leaves just outside a removal range. `NONE` where the range touches the
/// start or end of the sequence.
#[derive(Clone, Copy, Debug)]
struct Border {
    left: LeafIdx,
    right: LeafIdx,
}

impl<T> TreeBuffer<T> {
    /// Remove the elements in `[from, to)`.
    ///
    /// `to < from` is a [`Error::Domain`] error and `to > size()` a
    /// [`Error::Range`] error; in both cases the tree is untouched. An empty
    /// range is a no-op.
    pub fn remove(&mut self, from: usize, to: usize) -> Result<()> {
        if to < from {
            return Err(Error::Domain { from, to });
        }
        let size = self.size();
        if to > size {
            return Err(Error::Range { pos: to, size });
        }
        if from == to {
            return Ok(());
        }
        if from == 0 && to == size {
            self.clear();
            return Ok(());
        }
        tracing::debug!(from, to, "remove");

        let border = Border {
            left: if from > 0 { self.find_leaf(from - 1).0 } else { NONE },
            right: if to < size { self.find_leaf(to).0 } else { NONE },
        };

        let root = self.root;
        self.remove_in(root, from, to);
        if border.left != border.right {
            if border.left != NONE {
                self.leaves[border.left].next = border.right;
            }
            if border.right != NONE {
                self.leaves[border.right].prev = border.left;
            }
        }
        let survivors = self.coalesce(border);
        self.rebalance_after_remove(survivors);
        self.finish_mutation();
        return Ok(());
    }

    /// Remove everything from `from` up to, not including, `to`.
    pub fn remove_between(&mut self, from: &Cursor, to: &Cursor) -> Result<()> {
        let from = self.pos(from)?;
        let to = self.pos(to)?;
        return self.remove(from, to);
    }

    /// Drop `[from, to)` (relative to `node`) from the subtree under `node`.
    /// Children left with nothing in them are released, never kept empty.
    fn remove_in(&mut self, node: InnerIdx, from: usize, to: usize) {
        let children = self.inners[node].children.clone();
        let mut kept = Children::new();
        for child in children {
            let offset = self.offset_of(child);
            let size = self.size_of(child);
            if !overlaps(offset, offset + size, from, to) {
                kept.push(child);
                continue;
            }
            if from <= offset && offset + size <= to {
                self.release_subtree(child);
                continue;
            }
            let lo = from.saturating_sub(offset);
            let hi = (to - offset).min(size);
            match child {
                NodeRef::Leaf(idx) => {
                    self.leaves[idx].data.drain(lo..hi);
                }
                NodeRef::Inner(idx) => self.remove_in(idx, lo, hi),
            }
            kept.push(child);
        }
        self.inners[node].children = kept;
        self.refresh(node);
    }

    /// Fold the right border leaf into the left one when both fit in a single
    /// leaf. Returns the leaves whose ancestor paths may now be underfull.
    fn coalesce(&mut self, border: Border) -> [LeafIdx; 2] {
        let Border { left, right } = border;
        if left == NONE || right == NONE || left == right {
            return [left, right];
        }
        if self.leaves[left].len() + self.leaves[right].len() > self.config.leaf_capacity {
            return [left, right];
        }

        let mut moved = std::mem::take(&mut self.leaves[right].data);
        self.leaves[left].data.append(&mut moved);
        let after = self.leaves[right].next;
        self.leaves[left].next = after;
        if after != NONE {
            self.leaves[after].prev = left;
        }
        self.detach(NodeRef::Leaf(right));
        let parent = self.leaves[left].parent;
        self.refresh_upward(parent);
        tracing::trace!(left, right, "coalesce leaves");

        // The right leaf's old ancestors now lead to whatever followed it.
        return [left, after];
    }

    /// Unhook a node from its parent and release it, detaching any ancestor
    /// that is left without children.
    fn detach(&mut self, node: NodeRef) {
        let parent = self.parent_of(node);
        let slot = self.inners[parent].index_of(node);
        self.inners[parent].children.remove(slot);
        match node {
            NodeRef::Leaf(idx) => {
                self.leaves.release(idx);
            }
            NodeRef::Inner(idx) => {
                self.inners.release(idx);
            }
        }
        if self.inners[parent].children.is_empty() && parent != self.root {
            self.detach(NodeRef::Inner(parent));
        } else {
            self.refresh_upward(parent);
        }
    }

    /// Repair the border paths bottom-up until every non-root inner node has
    /// at least `min_children` children and the root is not a lone inner
    /// node's parent.
    fn rebalance_after_remove(&mut self, survivors: [LeafIdx; 2]) {
        let min = self.config.min_children();
        loop {
            let mut changed = false;
            'paths: for &leaf in survivors.iter() {
                if leaf == NONE {
                    continue;
                }
                let mut node = self.leaves[leaf].parent;
                while node != self.root {
                    if self.inners[node].len() < min && self.fix_underflow(node) {
                        changed = true;
                        break 'paths;
                    }
                    node = self.inners[node].parent;
                }
            }
            if !changed && !self.collapse_root() {
                return;
            }
        }
    }

    /// Borrow from or merge with an adjacent sibling, preferring the left one.
    /// Returns false if the node has no sibling to work with.
    fn fix_underflow(&mut self, node: InnerIdx) -> bool {
        let parent = self.inners[node].parent;
        if self.inners[parent].len() < 2 {
            return false;
        }
        let slot = self.inners[parent].index_of(NodeRef::Inner(node));
        let (l, r) = if slot > 0 { (slot - 1, slot) } else { (slot, slot + 1) };
        let left = expect_inner(self.inners[parent].children[l]);
        let right = expect_inner(self.inners[parent].children[r]);

        let total = self.inners[left].len() + self.inners[right].len();
        if total <= self.config.fanout {
            self.merge_inners(left, right);
            return true;
        }
        let need = self.config.min_children() - self.inners[node].len();
        if node == left {
            self.shift_left(left, right, need);
        } else {
            self.shift_right(left, right, need);
        }
        return true;
    }

    /// Append all of `right`'s children to `left` and drop `right`.
    fn merge_inners(&mut self, left: InnerIdx, right: InnerIdx) {
        let parent = self.inners[left].parent;
        let moved = std::mem::take(&mut self.inners[right].children);
        for &child in moved.iter() {
            self.set_parent(child, left);
        }
        self.inners[left].children.extend(moved);

        let slot = self.inners[parent].index_of(NodeRef::Inner(right));
        self.inners[parent].children.remove(slot);
        self.inners.release(right);
        self.refresh(left);
        self.refresh_upward(parent);
        tracing::trace!(left, right, "merge inner");
    }

    /// Move the first `n` children of `right` onto the end of `left`.
    fn shift_left(&mut self, left: InnerIdx, right: InnerIdx, n: usize) {
        let moved: Children = self.inners[right].children.drain(..n).collect();
        for &child in moved.iter() {
            self.set_parent(child, left);
        }
        self.inners[left].children.extend(moved);
        self.refresh(left);
        self.refresh(right);
        let parent = self.inners[left].parent;
        self.refresh_upward(parent);
        tracing::trace!(from = right, to = left, n, "borrow children");
    }

    /// Move the last `n` children of `left` onto the front of `right`.
    fn shift_right(&mut self, left: InnerIdx, right: InnerIdx, n: usize) {
        let count = self.inners[left].len();
        let moved: Children = self.inners[left].children.drain(count - n..).collect();
        for &child in moved.iter() {
            self.set_parent(child, right);
        }
        self.inners[right].children.insert_many(0, moved);
        self.refresh(left);
        self.refresh(right);
        let parent = self.inners[left].parent;
        self.refresh_upward(parent);
        tracing::trace!(from = left, to = right, n, "borrow children");
    }

    /// Replace a root that has a single inner child by that child, repeatedly.
    fn collapse_root(&mut self) -> bool {
        let mut collapsed = false;
        while self.root != NONE && self.inners[self.root].len() == 1 {
            let NodeRef::Inner(child) = self.inners[self.root].children[0] else {
                break;
            };
            let old = self.root;
            self.inners.release(old);
            self.inners[child].parent = NONE;
            self.inners[child].offset = 0;
            self.root = child;
            collapsed = true;
            tracing::debug!(old_root = old, new_root = child, "root collapse");
        }
        return collapsed;
    }
}

#[cfg(test)]
mod tests {
    use crate::Config;
    use crate::Error;
    use crate::TreeBuffer;

    fn filled(len: usize) -> (TreeBuffer<u8>, Vec<u8>) {
        let mut tree = TreeBuffer::with_config(Config::new(4, 3));
        let model: Vec<u8> = (0..len).map(|i| b'a' + (i % 26) as u8).collect();
        tree.append(&model);
        return (tree, model);
    }

    #[test]
    fn remove_inside_one_leaf() {
        let (mut tree, mut model) = filled(12);
        tree.remove(1, 3).unwrap();
        model.drain(1..3);
        assert_eq!(tree.to_vec(), model);
        tree.check().unwrap();
    }

    #[test]
    fn remove_across_leaves_coalesces() {
        let (mut tree, mut model) = filled(12);
        // "abcd" "efgh" "ijkl" -> "abc" + "l"
        tree.remove(3, 11).unwrap();
        model.drain(3..11);
        assert_eq!(tree.to_vec(), model);
        assert_eq!(tree.leaf_count(), 1);
        tree.check().unwrap();
    }

    #[test]
    fn remove_prefix_and_suffix() {
        let (mut tree, mut model) = filled(100);
        tree.remove(0, 37).unwrap();
        model.drain(0..37);
        tree.check().unwrap();
        tree.remove(40, 63).unwrap();
        model.drain(40..63);
        tree.check().unwrap();
        assert_eq!(tree.to_vec(), model);
    }

    #[test]
    fn deep_tree_shrinks_back() {
        let (mut tree, mut model) = filled(500);
        let tall = tree.height();
        while model.len() > 3 {
            let from = model.len() / 3;
            let to = from + (model.len() / 2).max(1);
            tree.remove(from, to).unwrap();
            model.drain(from..to);
            tree.check().unwrap();
            assert_eq!(tree.to_vec(), model);
        }
        assert!(tree.height() < tall);
    }

    #[test]
    fn remove_everything() {
        let (mut tree, _) = filled(50);
        tree.remove(0, 50).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.leaf_count(), 0);
        assert_eq!(tree.inner_count(), 0);
        tree.check().unwrap();
        tree.append(b"again");
        assert_eq!(tree.to_vec(), b"again");
    }

    #[test]
    fn argument_errors_leave_tree_alone() {
        let (mut tree, model) = filled(28);
        assert_eq!(tree.remove(30, 25), Err(Error::Domain { from: 30, to: 25 }));
        assert_eq!(tree.remove(5, 29), Err(Error::Range { pos: 29, size: 28 }));
        assert_eq!(tree.remove(7, 7), Ok(()));
        assert_eq!(tree.remove(28, 28), Ok(()));
        assert_eq!(tree.to_vec(), model);
    }

    #[test]
    fn remove_between_cursors() {
        let (mut tree, mut model) = filled(40);
        let from = tree.at(10).unwrap();
        let to = tree.at(30).unwrap();
        tree.remove_between(&from, &to).unwrap();
        model.drain(10..30);
        assert_eq!(tree.to_vec(), model);
        assert_eq!(tree.remove_between(&from, &to), Err(Error::StaleCursor));
    }

    #[test]
    fn remove_between_reversed_cursors() {
        let (mut tree, model) = filled(40);
        let from = tree.at(30).unwrap();
        let to = tree.at(10).unwrap();
        assert_eq!(tree.remove_between(&from, &to), Err(Error::Domain { from: 30, to: 10 }));
        assert_eq!(tree.to_vec(), model);
        // A rejected removal leaves cursors usable.
        assert_eq!(tree.pos(&from), Ok(30));
        assert_eq!(tree.remove_between(&to, &from), Ok(()));
        assert_eq!(tree.size(), 20);
    }

    #[test]
    fn cursor_inserts_then_cursor_removes() {
        let (mut tree, mut model) = filled(120);
        assert!(tree.height() >= 4);
        let mut pos = 7;
        for step in 0..20 {
            let at = tree.at(pos).unwrap();
            tree.insert_at(&at, b"XYZ").unwrap();
            model.splice(pos..pos, b"XYZ".iter().copied());

            let from = tree.at(pos / 2).unwrap();
            let to = tree.advance(&from, 5).unwrap();
            tree.remove_between(&from, &to).unwrap();
            model.drain(pos / 2..pos / 2 + 5);

            tree.check().unwrap();
            assert_eq!(tree.to_vec(), model, "step {}", step);
            pos = (pos * 7 + 13) % (model.len() + 1);
        }
    }
}
