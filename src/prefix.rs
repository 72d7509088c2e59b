use std::sync::Arc;

use thiserror::Error;

use crate::{Failure, MultiError, SharedError};

#[derive(Debug, Error)]
#[error("{prefix} {inner}")]
/// A failure annotated with a prefix.
///
/// The prefixed failure is a plain failure of its own, it does not report the
/// original failure as its source. The original is still available through
/// [`Prefixed::inner`].
pub struct Prefixed {
    prefix: String,
    inner: SharedError,
}

impl Prefixed {
    pub fn new(prefix: impl Into<String>, inner: SharedError) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The failure before being annotated
    pub fn inner(&self) -> &SharedError {
        &self.inner
    }
}

impl MultiError {
    /// Prefix the message of every failure with `prefix`.
    ///
    /// The number and order of the failures and the formatter do not change.
    pub fn prefix(&mut self, prefix: &str) {
        for err in self.errors_mut() {
            *err = Arc::new(Prefixed::new(prefix, err.clone()));
        }
    }
}

/// Annotate a failure with a prefix.
///
/// - an absent failure stays absent
/// - every element of a composite failure is prefixed, see [`MultiError::prefix`]. A
///   composite that was never created becomes an empty one
/// - a plain failure is replaced by a [`Prefixed`] failure
///
/// The resulting messages are `"<prefix> <original message>"`.
///
/// ```
/// use multierror::{prefix, Failure, MultiError};
///
/// let err = MultiError::from_iter(["not found"]);
/// let Failure::Composite(Some(err)) = prefix(err, "config:") else {
///     panic!("expected a composite failure");
/// };
/// assert_eq!(err.wrapped_errors()[0].to_string(), "config: not found");
/// ```
pub fn prefix<E: Into<Failure>>(err: E, prefix: &str) -> Failure {
    match err.into() {
        Failure::Absent => Failure::Absent,
        Failure::Plain(err) => Failure::Plain(Arc::new(Prefixed::new(prefix, err))),
        Failure::Composite(multi) => {
            let mut multi = multi.unwrap_or_default();
            multi.prefix(prefix);
            Failure::Composite(Some(multi))
        }
    }
}
