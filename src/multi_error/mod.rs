//! The composite error type and its accessors

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::{Arc, OnceLock};

use crate::{Failure, SharedError};

mod chain;
mod format;
mod sort;

pub use chain::*;
pub use format::*;

/// An error collecting zero or more failures.
///
/// Failures are kept in the order they were added. Adding a `MultiError` to another one
/// moves its failures into the parent, so a `MultiError` never contains another
/// `MultiError` as an element.
///
/// A `MultiError` with no failures means that nothing failed. Use
/// [`error_or_none`](MultiError::error_or_none) or [`into_result`](MultiError::into_result)
/// to turn it back into a success value.
///
/// # Rendering
///
/// By default, the error renders using [`list_format`]. A different [`FormatFn`] may be
/// configured per instance with [`with_formatter`](MultiError::with_formatter).
///
/// # Sources
///
/// The [`source`](std::error::Error::source) of a `MultiError` depends on the number of
/// failures:
/// - with no failures, there is no source
/// - with a single failure, the source is that failure
/// - otherwise, the source is a [`Chain`] that visits every failure in order
#[derive(Default)]
pub struct MultiError {
    errors: Vec<SharedError>,
    formatter: Option<FormatFn>,

    /// Cached chain view, built on the first call to `cause` and
    /// reset whenever the list of errors changes
    chain: OnceLock<Option<Box<Chain>>>,
}

/// The result of unwrapping a [`MultiError`]
#[derive(Debug, Clone, Copy)]
pub enum Cause<'a> {
    /// The only failure in the error
    Single(&'a SharedError),

    /// A chain over all the failures
    Chain(&'a Chain),
}

impl MultiError {
    /// Create an empty error
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom formatter to render this error
    ///
    /// ```
    /// use multierror::{MultiError, SharedError};
    ///
    /// let err = MultiError::from_iter(["foo", "bar"]).with_formatter(|errs: &[SharedError]| {
    ///     errs.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
    /// });
    /// assert_eq!(err.to_string(), "foo, bar");
    /// ```
    pub fn with_formatter<F>(self, formatter: F) -> Self
    where
        F: Fn(&[SharedError]) -> String + Send + Sync + 'static,
    {
        let mut err = self;
        err.formatter = Some(Arc::new(formatter));
        err
    }

    /// Replace the formatter of this error. Passing `None` restores
    /// the default formatter
    pub fn set_formatter(&mut self, formatter: Option<FormatFn>) {
        self.formatter = formatter;
    }

    /// The custom formatter for this error, if any
    pub fn formatter(&self) -> Option<&FormatFn> {
        self.formatter.as_ref()
    }

    /// Add a failure to the end of the list.
    ///
    /// Composite failures contribute all their elements, absent failures are ignored.
    pub fn push<F: Into<Failure>>(&mut self, err: F) {
        match err.into() {
            Failure::Absent | Failure::Composite(None) => return,
            Failure::Plain(err) => self.errors.push(err),
            Failure::Composite(Some(multi)) => self.errors.extend(multi.errors),
        }
        self.chain.take();
    }

    /// Render the error using the configured formatter
    pub fn render(&self) -> String {
        match &self.formatter {
            Some(formatter) => formatter(&self.errors),
            None => list_format(&self.errors),
        }
    }

    /// Return the error unless it contains no failures
    pub fn error_or_none(self) -> Option<Self> {
        if self.errors.is_empty() {
            return None;
        }
        Some(self)
    }

    /// Return `Ok(())` if the error contains no failures, or `Err(self)` otherwise
    pub fn into_result(self) -> Result<(), Self> {
        match self.error_or_none() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// The list of failures
    pub fn wrapped_errors(&self) -> &[SharedError] {
        &self.errors
    }

    /// Consume the error, returning the list of failures
    pub fn into_errors(self) -> Vec<SharedError> {
        self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SharedError> {
        self.errors.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Unwrap the error.
    ///
    /// Returns `None` if there are no failures, the failure itself if there
    /// is only one, or a [`Chain`] over every failure otherwise.
    pub fn cause(&self) -> Option<Cause<'_>> {
        match self.errors.as_slice() {
            [] => None,
            [err] => Some(Cause::Single(err)),
            errors => self
                .chain
                .get_or_init(|| Chain::from_slice(errors))
                .as_deref()
                .map(Cause::Chain),
        }
    }

    /// Mutable access to the failures. The list may be reordered or its elements
    /// replaced, but never resized
    pub(crate) fn errors_mut(&mut self) -> &mut [SharedError] {
        self.chain.take();
        &mut self.errors
    }
}

impl Clone for MultiError {
    fn clone(&self) -> Self {
        Self {
            errors: self.errors.clone(),
            formatter: self.formatter.clone(),
            chain: OnceLock::new(),
        }
    }
}

impl fmt::Debug for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiError")
            .field("errors", &self.errors)
            .field("formatter", &self.formatter.as_ref().map(|_| "custom"))
            .finish()
    }
}

impl Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl StdError for MultiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.cause()? {
            Cause::Single(err) => Some(&**err),
            Cause::Chain(chain) => Some(chain),
        }
    }
}

impl<F: Into<Failure>> Extend<F> for MultiError {
    fn extend<I: IntoIterator<Item = F>>(&mut self, iter: I) {
        for err in iter {
            self.push(err);
        }
    }
}

impl<F: Into<Failure>> FromIterator<F> for MultiError {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        let mut err = MultiError::new();
        err.extend(iter);
        err
    }
}

impl<'a> IntoIterator for &'a MultiError {
    type Item = &'a SharedError;
    type IntoIter = std::slice::Iter<'a, SharedError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Accessors for a [`MultiError`] that may have never been created.
///
/// An absent error behaves as an error with no failures.
///
/// ```
/// use multierror::{MultiError, MultiErrorExt};
///
/// let err: Option<MultiError> = None;
/// assert_eq!(err.len(), 0);
/// assert!(err.wrapped_errors().is_empty());
/// assert!(err.error_or_none().is_none());
/// ```
pub trait MultiErrorExt {
    /// Return the error unless it is absent or contains no failures
    fn error_or_none(self) -> Option<MultiError>;

    /// The list of failures, empty if the error is absent
    fn wrapped_errors(&self) -> &[SharedError];

    /// The number of failures, zero if the error is absent
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MultiErrorExt for Option<MultiError> {
    fn error_or_none(self) -> Option<MultiError> {
        self.and_then(MultiError::error_or_none)
    }

    fn wrapped_errors(&self) -> &[SharedError] {
        match self {
            Some(err) => err.wrapped_errors(),
            None => &[],
        }
    }

    fn len(&self) -> usize {
        self.as_ref().map_or(0, MultiError::len)
    }
}
