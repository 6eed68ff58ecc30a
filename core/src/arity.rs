use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DefinitionError;

/// Cardinality constraint on the tokens one argument may consume.
///
/// # Examples
///
/// ```
/// use command_grammar_core::Arity;
///
/// let arity = Arity::new(1, 3).unwrap();
/// assert!(arity.accepts(2));
/// assert!(!arity.accepts(4));
/// assert!(Arity::ZERO_OR_MORE.is_unbounded());
/// assert!(Arity::new(2, 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arity {
    /// Fewest tokens that satisfy the argument.
    pub minimum: usize,
    /// Most tokens the argument consumes; [`Arity::UNBOUNDED`] for no limit.
    pub maximum: usize,
}

impl Arity {
    /// Marker maximum for arguments without an upper bound.
    pub const UNBOUNDED: usize = usize::MAX;

    pub const ZERO: Arity = Arity {
        minimum: 0,
        maximum: 0,
    };
    pub const ZERO_OR_ONE: Arity = Arity {
        minimum: 0,
        maximum: 1,
    };
    pub const EXACTLY_ONE: Arity = Arity {
        minimum: 1,
        maximum: 1,
    };
    pub const ZERO_OR_MORE: Arity = Arity {
        minimum: 0,
        maximum: Arity::UNBOUNDED,
    };
    pub const ONE_OR_MORE: Arity = Arity {
        minimum: 1,
        maximum: Arity::UNBOUNDED,
    };

    /// Creates an arity, rejecting `minimum > maximum`.
    pub fn new(minimum: usize, maximum: usize) -> Result<Self, DefinitionError> {
        if minimum > maximum {
            return Err(DefinitionError::InvalidArity { minimum, maximum });
        }
        Ok(Self { minimum, maximum })
    }

    /// Returns `true` when the maximum is unbounded.
    pub fn is_unbounded(&self) -> bool {
        self.maximum == Self::UNBOUNDED
    }

    /// Returns `true` when `count` tokens satisfy this arity.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.minimum && count <= self.maximum
    }

    /// Arguments with a maximum above one produce a list of values.
    pub fn is_multiple(&self) -> bool {
        self.maximum > 1
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "{}..", self.minimum)
        } else {
            write!(f, "{}..{}", self.minimum, self.maximum)
        }
    }
}
