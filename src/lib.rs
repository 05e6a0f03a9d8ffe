//! Treebuffer - a balanced tree of fixed-capacity leaves for editor buffers.
//!
//! A [`TreeBuffer`] stores a sequence of elements (typically bytes) and
//! supports positional insert, positional removal and positional lookup in
//! O(log n), with contiguous leaf storage for fast scanning.
//!
//! # Quick Start
//!
//! ```
//! use treebuffer::TreeBuffer;
//!
//! let mut buf: TreeBuffer<u8> = TreeBuffer::new();
//! buf.append(b"Hello, World!");
//! buf.insert(7, b"there ").unwrap();
//! buf.remove(5, 6).unwrap();
//! assert_eq!(buf.to_string_lossy(), "Hello there World!");
//!
//! let cursor = buf.at(6).unwrap();
//! assert_eq!(buf.get_at(&cursor).unwrap(), Some(&b't'));
//! assert_eq!(buf.pos(&cursor).unwrap(), 6);
//! ```
//!
//! Small capacities make deep trees out of short inputs, which is what the
//! tests do:
//!
//! ```
//! use treebuffer::{Config, TreeBuffer};
//!
//! let mut buf: TreeBuffer<u8> = TreeBuffer::with_config(Config::new(4, 3));
//! buf.append(b"abcdefghijklmnopqrstuvwxyz");
//! assert!(buf.height() > 2);
//! buf.check().unwrap();
//! ```

pub mod config;
pub mod cursor;
pub mod error;
pub mod iter;
mod tree;

pub use config::Config;
pub use cursor::Cursor;
pub use error::Error;
pub use error::InvariantViolation;
pub use error::Result;
pub use iter::Chunks;
pub use iter::Iter;
pub use tree::TreeBuffer;
