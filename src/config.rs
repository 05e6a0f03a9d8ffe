//! Capacity settings for a [`TreeBuffer`](crate::TreeBuffer).
//!
//! Leaves are sized to a page by default, so the element capacity of a leaf
//! depends on the element type. Tests and benchmarks shrink both numbers to
//! force deep trees out of small inputs.

/// Bytes of element storage per leaf when no explicit capacity is given.
pub const DEFAULT_LEAF_BYTES: usize = 4096;

/// Maximum children per inner node when no explicit fanout is given.
pub const DEFAULT_FANOUT: usize = 16;

/// Smallest fanout for which borrow-or-merge rebalancing is well defined.
pub const MIN_FANOUT: usize = 3;

/// Leaf capacity and inner fanout of a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum elements per leaf.
    pub leaf_capacity: usize,
    /// Maximum children per inner node.
    pub fanout: usize,
}

impl Config {
    /// Create a config with explicit capacities.
    ///
    /// # Panics
    ///
    /// Panics if `leaf_capacity` is zero or `fanout` is below [`MIN_FANOUT`].
    pub fn new(leaf_capacity: usize, fanout: usize) -> Config {
        assert!(leaf_capacity >= 1, "leaf capacity must be at least 1");
        assert!(fanout >= MIN_FANOUT, "fanout must be at least {}", MIN_FANOUT);
        return Config { leaf_capacity, fanout };
    }

    /// Page-sized leaves for elements of type `T`.
    pub fn for_element<T>() -> Config {
        let width = std::mem::size_of::<T>().max(1);
        let leaf_capacity = (DEFAULT_LEAF_BYTES / width).max(1);
        return Config::new(leaf_capacity, DEFAULT_FANOUT);
    }

    pub fn with_leaf_capacity(self, leaf_capacity: usize) -> Config {
        return Config::new(leaf_capacity, self.fanout);
    }

    pub fn with_fanout(self, fanout: usize) -> Config {
        return Config::new(self.leaf_capacity, fanout);
    }

    /// Fewest children a non-root inner node may keep after a removal.
    #[inline(always)]
    pub fn min_children(&self) -> usize {
        return (self.fanout + 1) / 2;
    }
}

impl Default for Config {
    fn default() -> Self {
        return Config::for_element::<u8>();
    }
}
