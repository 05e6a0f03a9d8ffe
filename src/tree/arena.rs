//! Slot pool for tree nodes.
//!
//! Nodes refer to each other by `u32` slot index. A released slot goes on the
//! free list and is handed out again by the next `alloc`; indexing a released
//! slot is a bug in the tree and panics.

use std::ops::Index;
use std::ops::IndexMut;

/// Sentinel value for no parent / no sibling / no root.
pub(crate) const NONE: u32 = u32::MAX;

#[derive(Clone, Debug)]
pub(crate) struct Arena<N> {
    slots: Vec<Option<N>>,
    /// Indices of released slots, reused LIFO.
    free: Vec<u32>,
    live: usize,
}

impl<N> Arena<N> {
    pub(crate) fn new() -> Arena<N> {
        return Arena {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        };
    }

    /// Store a node, reusing a released slot if available.
    pub(crate) fn alloc(&mut self, node: N) -> u32 {
        self.live += 1;
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = Some(node);
            return idx;
        }
        let idx = self.slots.len() as u32;
        assert!(idx != NONE, "node arena exhausted");
        self.slots.push(Some(node));
        return idx;
    }

    /// Take a node out of its slot. Each slot is released exactly once.
    pub(crate) fn release(&mut self, idx: u32) -> N {
        let node = self.slots[idx as usize]
            .take()
            .unwrap_or_else(|| panic!("slot {} released twice", idx));
        self.free.push(idx);
        self.live -= 1;
        return node;
    }

    #[inline(always)]
    pub(crate) fn get(&self, idx: u32) -> Option<&N> {
        return self.slots.get(idx as usize)?.as_ref();
    }

    /// Number of occupied slots.
    #[inline(always)]
    pub(crate) fn live(&self) -> usize {
        return self.live;
    }
}

impl<N> Index<u32> for Arena<N> {
    type Output = N;

    #[inline(always)]
    fn index(&self, idx: u32) -> &N {
        return match self.slots.get(idx as usize) {
            Some(Some(node)) => node,
            _ => panic!("dangling node index {}", idx),
        };
    }
}

impl<N> IndexMut<u32> for Arena<N> {
    #[inline(always)]
    fn index_mut(&mut self, idx: u32) -> &mut N {
        return match self.slots.get_mut(idx as usize) {
            Some(Some(node)) => node,
            _ => panic!("dangling node index {}", idx),
        };
    }
}
