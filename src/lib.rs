//! Collect multiple failures into a single error.
//!
//! Some operations can fail in more than one place and it is more useful to report every
//! failure than to stop at the first one. A [`MultiError`] holds any number of failures, in
//! the order they happened, and implements [`std::error::Error`] so it can be returned and
//! propagated like any other error.
//!
//! # Merging failures
//!
//! [`append`] merges failures into a `MultiError`. Merging a `MultiError` into another one
//! moves its failures into the parent, so errors never nest.
//!
//! ```
//! use multierror::{append, MultiError};
//!
//! fn check(name: &str) -> Result<(), String> {
//!     if name.is_empty() {
//!         return Err("name cannot be empty".into());
//!     }
//!     if name.len() > 8 {
//!         return Err(format!("name '{name}' is too long"));
//!     }
//!     Ok(())
//! }
//!
//! let mut err: Option<MultiError> = None;
//! for name in ["", "ok", "much-too-long"] {
//!     if let Err(e) = check(name) {
//!         err = Some(append(err, [e]));
//!     }
//! }
//!
//! let err = err.unwrap();
//! assert_eq!(
//!     err.to_string(),
//!     "2 errors occurred:\n\t* name cannot be empty\n\t* name 'much-too-long' is too long\n\n"
//! );
//! ```
//!
//! A `MultiError` with no failures is not an error. [`MultiError::error_or_none`],
//! [`MultiError::into_result`] and the [`MultiErrorExt`] accessors turn it back into a
//! success value.
//!
//! # Annotating failures
//!
//! [`prefix`] adds context to every failure without changing the structure of the error.
//!
//! # Inspecting failures
//!
//! The [`source`](std::error::Error::source) of a `MultiError` exposes its failures one at a
//! time through a [`Chain`], so code that follows error sources can find any of them. See
//! [`find_cause`].
//!
//! # Concurrent tasks
//!
//! A [`Group`] runs tasks concurrently on the tokio runtime and collects their failures.
//!
//! ```
//! use multierror::Group;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let group = Group::new();
//! group.spawn(async { Err("first task failed") });
//! group.spawn(async { Ok::<_, String>(()) });
//! group.spawn_blocking(|| Err("second task failed"));
//!
//! let err = group.wait().await.unwrap();
//! assert_eq!(err.len(), 2);
//! # }
//! ```

mod append;
mod failure;
mod group;
mod multi_error;
mod prefix;

pub use append::*;
pub use failure::*;
pub use group::*;
pub use multi_error::*;
pub use prefix::*;
