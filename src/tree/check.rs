//! Structural self-check.
//!
//! Walks the whole tree from the root and verifies every cached size and
//! offset, the occupancy bounds, parent links, uniform leaf depth, the leaf
//! chain and the arena bookkeeping. Used by the tests after every mutation
//! and by the `paranoid` feature after every top-level operation.

use rustc_hash::FxHashSet;

use super::TreeBuffer;
use super::arena::NONE;
use super::node::InnerIdx;
use super::node::LeafIdx;
use super::node::NodeRef;
use crate::error::InvariantViolation;

type CheckResult = std::result::Result<(), InvariantViolation>;

fn violation(node: NodeRef, message: String) -> InvariantViolation {
    let node = match node {
        NodeRef::Leaf(idx) => format!("leaf#{}", idx),
        NodeRef::Inner(idx) => format!("inner#{}", idx),
    };
    return InvariantViolation { node, message };
}

/// State threaded through the walk.
struct Walk {
    seen: FxHashSet<NodeRef>,
    /// Leaves in traversal order.
    order: Vec<LeafIdx>,
    /// Depth of the first leaf reached; every other leaf must match.
    leaf_depth: Option<usize>,
}

impl<T> TreeBuffer<T> {
    /// Verify every structural invariant, returning the first violation found.
    pub fn check(&self) -> CheckResult {
        if self.root == NONE {
            if self.leaves.live() != 0 || self.inners.live() != 0 {
                return Err(InvariantViolation {
                    node: "tree".into(),
                    message: format!(
                        "empty tree still owns {} leaves and {} inner nodes",
                        self.leaves.live(),
                        self.inners.live()
                    ),
                });
            }
            return Ok(());
        }

        let mut walk = Walk {
            seen: FxHashSet::default(),
            order: Vec::new(),
            leaf_depth: None,
        };
        self.check_inner(self.root, NONE, 0, &mut walk)?;
        let root = &self.inners[self.root];
        if root.offset != 0 {
            return Err(violation(
                NodeRef::Inner(self.root),
                format!("root offset is {}", root.offset),
            ));
        }

        self.check_chain(&walk.order)?;

        let leaves = walk.order.len();
        let inners = walk.seen.len() - leaves;
        if leaves != self.leaves.live() || inners != self.inners.live() {
            return Err(InvariantViolation {
                node: "tree".into(),
                message: format!(
                    "{} leaves and {} inner nodes reachable but {} and {} allocated",
                    leaves,
                    inners,
                    self.leaves.live(),
                    self.inners.live()
                ),
            });
        }
        return Ok(());
    }

    fn check_inner(&self, idx: InnerIdx, parent: InnerIdx, depth: usize, walk: &mut Walk) -> CheckResult {
        let me = NodeRef::Inner(idx);
        let Some(inner) = self.inners.get(idx) else {
            return Err(violation(me, "dangling reference".into()));
        };
        if !walk.seen.insert(me) {
            return Err(violation(me, "reachable twice".into()));
        }
        if inner.parent != parent {
            return Err(violation(
                me,
                format!("parent is {} but reached from {}", inner.parent, parent),
            ));
        }

        let count = inner.len();
        if count == 0 || count > self.config.fanout {
            return Err(violation(
                me,
                format!("{} children, expected 1..={}", count, self.config.fanout),
            ));
        }
        if parent != NONE && count < self.config.min_children() {
            return Err(violation(
                me,
                format!("{} children, below the minimum of {}", count, self.config.min_children()),
            ));
        }

        let mut running = 0;
        for &child in inner.children.iter() {
            match child {
                NodeRef::Leaf(leaf) => self.check_leaf(leaf, idx, depth + 1, walk)?,
                NodeRef::Inner(sub) => self.check_inner(sub, idx, depth + 1, walk)?,
            }
            let offset = self.offset_of(child);
            if offset != running {
                return Err(violation(
                    child,
                    format!("offset is {} but preceding siblings hold {}", offset, running),
                ));
            }
            running += self.size_of(child);
        }
        if inner.size != running {
            return Err(violation(
                me,
                format!("cached size {} but children hold {}", inner.size, running),
            ));
        }
        return Ok(());
    }

    fn check_leaf(&self, idx: LeafIdx, parent: InnerIdx, depth: usize, walk: &mut Walk) -> CheckResult {
        let me = NodeRef::Leaf(idx);
        let Some(leaf) = self.leaves.get(idx) else {
            return Err(violation(me, "dangling reference".into()));
        };
        if !walk.seen.insert(me) {
            return Err(violation(me, "reachable twice".into()));
        }
        if leaf.parent != parent {
            return Err(violation(
                me,
                format!("parent is {} but reached from {}", leaf.parent, parent),
            ));
        }
        if leaf.len() == 0 || leaf.len() > self.config.leaf_capacity {
            return Err(violation(
                me,
                format!("{} elements, expected 1..={}", leaf.len(), self.config.leaf_capacity),
            ));
        }
        let expected = *walk.leaf_depth.get_or_insert(depth);
        if expected != depth {
            return Err(violation(
                me,
                format!("at depth {} but other leaves are at depth {}", depth, expected),
            ));
        }
        walk.order.push(idx);
        return Ok(());
    }

    /// The prev/next links must visit exactly the leaves in traversal order.
    fn check_chain(&self, order: &[LeafIdx]) -> CheckResult {
        for (i, &idx) in order.iter().enumerate() {
            let leaf = &self.leaves[idx];
            let prev = if i > 0 { order[i - 1] } else { NONE };
            let next = order.get(i + 1).copied().unwrap_or(NONE);
            if leaf.prev != prev {
                return Err(violation(
                    NodeRef::Leaf(idx),
                    format!("prev link is {} but traversal order says {}", leaf.prev, prev),
                ));
            }
            if leaf.next != next {
                return Err(violation(
                    NodeRef::Leaf(idx),
                    format!("next link is {} but traversal order says {}", leaf.next, next),
                ));
            }
        }
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use crate::Config;
    use crate::TreeBuffer;

    fn sample() -> TreeBuffer<u8> {
        let mut tree = TreeBuffer::with_config(Config::new(4, 3));
        tree.append(b"the quick brown fox jumps over the lazy dog");
        tree.check().unwrap();
        return tree;
    }

    #[test]
    fn detects_stale_size() {
        let mut tree = sample();
        let root = tree.root;
        tree.inners[root].size += 1;
        let err = tree.check().unwrap_err();
        assert_eq!(err.node, format!("inner#{}", root));
        assert!(err.message.contains("cached size"), "{}", err);
    }

    #[test]
    fn detects_bad_offset() {
        let mut tree = sample();
        let second = tree.leaves[tree.first_leaf()].next;
        tree.leaves[second].offset += 1;
        let err = tree.check().unwrap_err();
        assert_eq!(err.node, format!("leaf#{}", second));
        assert!(err.message.contains("offset"), "{}", err);
    }

    #[test]
    fn detects_broken_chain() {
        let mut tree = sample();
        let first = tree.first_leaf();
        let second = tree.leaves[first].next;
        tree.leaves[second].prev = second;
        let err = tree.check().unwrap_err();
        assert!(err.message.contains("prev link"), "{}", err);
    }

    #[test]
    fn detects_empty_leaf() {
        let mut tree = sample();
        let last = tree.last_leaf();
        tree.leaves[last].data.clear();
        let err = tree.check().unwrap_err();
        assert_eq!(err.node, format!("leaf#{}", last));
    }
}
