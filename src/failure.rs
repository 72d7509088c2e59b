use std::error::Error as StdError;
use std::sync::Arc;

use crate::MultiError;

/// An owned, type-erased error. This is the usual currency accepted by
/// the crate API.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A shared, type-erased error. This is how failures are stored inside a
/// [`MultiError`].
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// A value that may be merged into a [`MultiError`] or annotated with a
/// prefix.
///
/// This is a closed set of variants. A failure is either absent, a plain
/// error, or a composite error. `Composite(None)` stands for a composite that
/// was never created, and is treated as an empty one.
///
/// Boxed and shared errors are inspected when converted, so a [`MultiError`]
/// that has been erased into a `dyn Error` is still recognized as a composite.
///
/// ```
/// use multierror::{Failure, MultiError};
///
/// assert!(Failure::from(None::<MultiError>).is_composite());
/// assert!(Failure::from("something failed").is_plain());
/// assert!(Failure::new(MultiError::default()).is_composite());
/// ```
#[derive(Debug, Clone, Default)]
pub enum Failure {
    /// No failure at all
    #[default]
    Absent,

    /// A single failure
    Plain(SharedError),

    /// A composite failure, possibly never initialized
    Composite(Option<MultiError>),
}

impl Failure {
    /// Classify any error value
    pub fn new<E: Into<BoxError>>(err: E) -> Self {
        Self::from(err.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Failure::Absent)
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, Failure::Plain(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Failure::Composite(_))
    }

    /// Return the failure as a shared error, if there is one.
    ///
    /// A composite failure is returned as is, even if it is empty. Use
    /// [`MultiError::error_or_none`] before converting if empty composites
    /// should be treated as success.
    pub fn into_error(self) -> Option<SharedError> {
        match self {
            Failure::Absent => None,
            Failure::Plain(err) => Some(err),
            Failure::Composite(err) => Some(Arc::new(err.unwrap_or_default())),
        }
    }

    /// Return the failure as a result
    pub fn into_result(self) -> Result<(), SharedError> {
        match self.into_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl From<BoxError> for Failure {
    fn from(err: BoxError) -> Self {
        match err.downcast::<MultiError>() {
            Ok(multi) => Failure::Composite(Some(*multi)),
            Err(err) => Failure::Plain(Arc::from(err)),
        }
    }
}

impl From<Option<BoxError>> for Failure {
    fn from(err: Option<BoxError>) -> Self {
        err.map(Failure::from).unwrap_or_default()
    }
}

impl From<SharedError> for Failure {
    fn from(err: SharedError) -> Self {
        // the elements are shared, so a copy of the composite points
        // to the same underlying failures
        if let Some(multi) = err.downcast_ref::<MultiError>() {
            return Failure::Composite(Some(multi.clone()));
        }
        Failure::Plain(err)
    }
}

impl From<Option<SharedError>> for Failure {
    fn from(err: Option<SharedError>) -> Self {
        err.map(Failure::from).unwrap_or_default()
    }
}

impl From<MultiError> for Failure {
    fn from(err: MultiError) -> Self {
        Failure::Composite(Some(err))
    }
}

impl From<Option<MultiError>> for Failure {
    fn from(err: Option<MultiError>) -> Self {
        Failure::Composite(err)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<MultiError>() {
            Ok(multi) => Failure::Composite(Some(multi)),
            Err(err) => Failure::Plain(Arc::from(BoxError::from(err))),
        }
    }
}

impl From<&str> for Failure {
    fn from(msg: &str) -> Self {
        Failure::Plain(Arc::from(BoxError::from(msg)))
    }
}

impl From<String> for Failure {
    fn from(msg: String) -> Self {
        Failure::Plain(Arc::from(BoxError::from(msg)))
    }
}
