//! Reading a tree back out.
//!
//! Iteration follows the leaf chain, so it never touches an inner node after
//! the first descent.

use std::iter::FusedIterator;

use crate::cursor::Cursor;
use crate::error::Error;
use crate::error::Result;
use crate::tree::TreeBuffer;
use crate::tree::arena::NONE;
use crate::tree::node::LeafIdx;

/// Element iterator, created by [`TreeBuffer::iter`] and [`TreeBuffer::iter_at`].
#[derive(Clone)]
pub struct Iter<'a, T> {
    tree: &'a TreeBuffer<T>,
    leaf: LeafIdx,
    offset: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let tree: &'a TreeBuffer<T> = self.tree;
        loop {
            let data = &tree.leaves[self.leaf].data;
            if self.offset < data.len() {
                let item = &data[self.offset];
                self.offset += 1;
                self.remaining -= 1;
                return Some(item);
            }
            self.leaf = tree.leaves[self.leaf].next;
            self.offset = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.remaining, Some(self.remaining));
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Leaf-by-leaf iterator over contiguous slices, created by [`TreeBuffer::chunks`].
#[derive(Clone)]
pub struct Chunks<'a, T> {
    tree: &'a TreeBuffer<T>,
    leaf: LeafIdx,
}

impl<'a, T> Iterator for Chunks<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<&'a [T]> {
        if self.leaf == NONE {
            return None;
        }
        let tree: &'a TreeBuffer<T> = self.tree;
        let leaf = &tree.leaves[self.leaf];
        self.leaf = leaf.next;
        return Some(leaf.data.as_slice());
    }
}

impl<T> FusedIterator for Chunks<'_, T> {}

impl<T> TreeBuffer<T> {
    pub fn iter(&self) -> Iter<'_, T> {
        let leaf = if self.root == NONE { NONE } else { self.first_leaf() };
        return Iter {
            tree: self,
            leaf,
            offset: 0,
            remaining: self.size(),
        };
    }

    /// Iterate from the element under `cursor` to the end.
    pub fn iter_at(&self, cursor: &Cursor) -> Result<Iter<'_, T>> {
        let pos = self.pos(cursor)?;
        return Ok(Iter {
            tree: self,
            leaf: cursor.leaf,
            offset: cursor.offset,
            remaining: self.size() - pos,
        });
    }

    /// The leaves' contents in order, one slice per leaf.
    pub fn chunks(&self) -> Chunks<'_, T> {
        let leaf = if self.root == NONE { NONE } else { self.first_leaf() };
        return Chunks { tree: self, leaf };
    }
}

impl<T: Clone> TreeBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.size());
        for chunk in self.chunks() {
            out.extend_from_slice(chunk);
        }
        return out;
    }

    /// Copy out the elements in `[from, to)`.
    pub fn slice(&self, from: usize, to: usize) -> Result<Vec<T>> {
        if to < from {
            return Err(Error::Domain { from, to });
        }
        let size = self.size();
        if to > size {
            return Err(Error::Range { pos: to, size });
        }
        let start = self.at(from)?;
        return Ok(self.iter_at(&start)?.take(to - from).cloned().collect());
    }
}

impl<'a, T> IntoIterator for &'a TreeBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        return self.iter();
    }
}

impl<T: Clone> From<&[T]> for TreeBuffer<T> {
    fn from(data: &[T]) -> Self {
        let mut tree = TreeBuffer::new();
        tree.append(data);
        return tree;
    }
}

impl<T: Clone> Extend<T> for TreeBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let items: Vec<T> = iter.into_iter().collect();
        self.append(&items);
    }
}

impl<T: Clone> FromIterator<T> for TreeBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = TreeBuffer::new();
        tree.extend(iter);
        return tree;
    }
}

impl<T: PartialEq> PartialEq for TreeBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        return self.size() == other.size() && self.iter().eq(other.iter());
    }
}

impl<T: Eq> Eq for TreeBuffer<T> {}

#[cfg(test)]
mod tests {
    use crate::Config;
    use crate::Error;
    use crate::TreeBuffer;

    fn sample() -> TreeBuffer<u8> {
        let mut tree = TreeBuffer::with_config(Config::new(4, 3));
        tree.append(b"0123456789abcdef");
        return tree;
    }

    #[test]
    fn iter_is_exact() {
        let tree = sample();
        let iter = tree.iter();
        assert_eq!(iter.len(), 16);
        assert_eq!(iter.copied().collect::<Vec<_>>(), b"0123456789abcdef");

        let empty: TreeBuffer<u8> = TreeBuffer::new();
        assert_eq!(empty.iter().next(), None);
        assert_eq!(empty.chunks().count(), 0);
    }

    #[test]
    fn iter_from_cursor() {
        let tree = sample();
        let cursor = tree.at(6).unwrap();
        let rest: Vec<u8> = tree.iter_at(&cursor).unwrap().copied().collect();
        assert_eq!(rest, b"6789abcdef");
        assert_eq!(tree.iter_at(&tree.end()).unwrap().len(), 0);
    }

    #[test]
    fn chunks_follow_leaves() {
        let tree = sample();
        let chunks: Vec<&[u8]> = tree.chunks().collect();
        assert_eq!(chunks, vec![&b"0123"[..], &b"4567"[..], &b"89ab"[..], &b"cdef"[..]]);
    }

    #[test]
    fn slice_bounds() {
        let tree = sample();
        assert_eq!(tree.slice(3, 9), Ok(b"345678".to_vec()));
        assert_eq!(tree.slice(16, 16), Ok(Vec::new()));
        assert_eq!(tree.slice(9, 3), Err(Error::Domain { from: 9, to: 3 }));
        assert_eq!(tree.slice(3, 17), Err(Error::Range { pos: 17, size: 16 }));
    }

    #[test]
    fn collect_and_compare() {
        let tree: TreeBuffer<u32> = (0..1000).collect();
        assert_eq!(tree.size(), 1000);
        assert_eq!(tree.iter().sum::<u32>(), 999 * 1000 / 2);

        let copy = TreeBuffer::from(&tree.to_vec()[..]);
        assert_eq!(copy, tree);
        let mut other = copy.clone();
        other.extend([7u32]);
        assert_ne!(other, tree);
    }
}
