//! Errors surfaced by tree operations.

use std::fmt;

/// Error returned when an operation is called with arguments the tree cannot
/// honour. The tree is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A position lies past the end of the sequence.
    Range { pos: usize, size: usize },
    /// A removal range ends before it starts.
    Domain { from: usize, to: usize },
    /// A cursor was resolved before the most recent mutation.
    StaleCursor,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Error::Range { pos, size } => {
                write!(f, "position {} out of range for sequence of size {}", pos, size)
            }
            Error::Domain { from, to } => {
                write!(f, "cannot remove with to < from ({} < {})", to, from)
            }
            Error::StaleCursor => write!(f, "cursor was invalidated by a later mutation"),
        };
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// A broken structural invariant found by [`TreeBuffer::check`](crate::TreeBuffer::check).
///
/// This is a defect in the tree, never a usage error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Diagnostic name of the offending node, e.g. `inner#3` or `leaf#12`.
    pub node: String,
    pub message: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "invariant violated at {}: {}", self.node, self.message);
    }
}

impl std::error::Error for InvariantViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = Error::Range { pos: 10, size: 3 };
        assert_eq!(e.to_string(), "position 10 out of range for sequence of size 3");
        let e = Error::Domain { from: 30, to: 25 };
        assert_eq!(e.to_string(), "cannot remove with to < from (25 < 30)");
        let v = InvariantViolation { node: "leaf#2".into(), message: "empty leaf".into() };
        assert_eq!(v.to_string(), "invariant violated at leaf#2: empty leaf");
    }
}
