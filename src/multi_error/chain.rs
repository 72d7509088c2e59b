use std::error::Error as StdError;
use std::fmt::{self, Display};

use crate::SharedError;

/// A view over the remaining failures of a [`MultiError`](crate::MultiError).
///
/// A chain exposes multiple failures to code that only knows how to follow a single
/// [`source`](std::error::Error::source). The chain renders as its first failure, and its
/// source is a chain over the rest of the failures, ending with `None` after the last one.
///
/// Type matching with [`Chain::is`] and [`Chain::downcast_ref`] only looks at the first
/// failure (and that failure's own sources).
///
/// ```
/// use std::error::Error;
/// use multierror::{Cause, MultiError};
///
/// let err = MultiError::from_iter(["a", "b", "c"]);
/// let Some(Cause::Chain(chain)) = err.cause() else {
///     panic!("expected a chain");
/// };
///
/// let messages: Vec<_> = chain.iter().map(|c| c.to_string()).collect();
/// assert_eq!(messages, ["a", "b", "c"]);
/// assert!(chain.source().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Chain {
    head: SharedError,
    next: Option<Box<Chain>>,
}

impl Chain {
    /// Build a chain from a list of failures. Returns `None` for an empty list
    pub(crate) fn from_slice(errors: &[SharedError]) -> Option<Box<Chain>> {
        errors.iter().rev().fold(None, |next, head| {
            Some(Box::new(Chain {
                head: head.clone(),
                next,
            }))
        })
    }

    /// The failure at the current position of the chain
    pub fn head(&self) -> &SharedError {
        &self.head
    }

    /// The chain over the remaining failures
    pub fn rest(&self) -> Option<&Chain> {
        self.next.as_deref()
    }

    /// Iterate over the chain links, starting with this one
    pub fn iter(&self) -> impl Iterator<Item = &Chain> {
        std::iter::successors(Some(self), |chain| chain.rest())
    }

    /// Return `true` if the first failure, or any of its sources, has type `T`
    pub fn is<T: StdError + 'static>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    /// Find a failure of type `T` in the first failure or its sources
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        let mut current: Option<&(dyn StdError + 'static)> = Some(&*self.head);
        while let Some(err) = current {
            if let Some(found) = err.downcast_ref::<T>() {
                return Some(found);
            }
            current = err.source();
        }
        None
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.head.fmt(f)
    }
}

impl StdError for Chain {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.next.as_deref().map(|chain| chain as &(dyn StdError + 'static))
    }
}

/// Walk the source chain of `err` looking for an error of type `T`.
///
/// Chain links are searched through [`Chain::downcast_ref`], which means every failure in a
/// [`MultiError`](crate::MultiError) is visited, in order.
///
/// ```
/// use std::fmt;
/// use multierror::{find_cause, MultiError, Failure};
///
/// #[derive(Debug)]
/// struct Timeout;
///
/// impl fmt::Display for Timeout {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "timed out")
///     }
/// }
///
/// impl std::error::Error for Timeout {}
///
/// let err = multierror::append(
///     Failure::from("connection refused"),
///     [Failure::new(Timeout)],
/// );
/// assert!(find_cause::<Timeout>(&err).is_some());
/// ```
pub fn find_cause<'a, T: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a T> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(found) = err.downcast_ref::<T>() {
            return Some(found);
        }
        if let Some(found) = err
            .downcast_ref::<Chain>()
            .and_then(|chain| chain.downcast_ref::<T>())
        {
            return Some(found);
        }
        current = err.source();
    }
    None
}
