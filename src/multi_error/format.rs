use std::sync::Arc;

use crate::SharedError;

/// A function rendering the list of failures of a [`MultiError`](crate::MultiError)
/// into a human readable message.
pub type FormatFn = Arc<dyn Fn(&[SharedError]) -> String + Send + Sync + 'static>;

/// Default formatter for [`MultiError`](crate::MultiError).
///
/// Renders the number of failures followed by a bullet list of the failure messages, one
/// per line.
///
/// ```
/// use multierror::MultiError;
///
/// let err = MultiError::from_iter(["not found", "permission denied"]);
/// assert_eq!(
///     err.to_string(),
///     "2 errors occurred:\n\t* not found\n\t* permission denied\n\n"
/// );
/// ```
pub fn list_format(errors: &[SharedError]) -> String {
    if let [err] = errors {
        return format!("1 error occurred:\n\t* {err}\n\n");
    }

    let points = errors
        .iter()
        .map(|err| format!("* {err}"))
        .collect::<Vec<_>>()
        .join("\n\t");

    format!("{} errors occurred:\n\t{}\n\n", errors.len(), points)
}
