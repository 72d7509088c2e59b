use crate::{Failure, MultiError};

/// Merge failures into a [`MultiError`].
///
/// If `base` is already a composite, `errs` are added to the end of it. A composite that was
/// never created (`None::<MultiError>`) is treated as an empty one. Otherwise a new
/// [`MultiError`] is created, with `base` as its first failure if there is one.
///
/// Composites in `errs` contribute all their failures in order, and absent values are
/// skipped. The result is never absent; use [`MultiError::error_or_none`] to get back
/// `None` if nothing failed.
///
/// ```
/// use multierror::{append, MultiError};
///
/// let mut result: Option<MultiError> = None;
/// for step in ["fetch", "build", "deploy"] {
///     let outcome = if step == "fetch" {
///         Ok(())
///     } else {
///         Err(format!("{step} failed"))
///     };
///     if let Err(e) = outcome {
///         result = Some(append(result, [e]));
///     }
/// }
///
/// let err = result.unwrap();
/// assert_eq!(err.len(), 2);
/// assert_eq!(err.wrapped_errors()[0].to_string(), "build failed");
/// ```
pub fn append<B, I>(base: B, errs: I) -> MultiError
where
    B: Into<Failure>,
    I: IntoIterator,
    I::Item: Into<Failure>,
{
    let mut merged = match base.into() {
        Failure::Composite(multi) => multi.unwrap_or_default(),
        plain_or_absent => MultiError::from_iter([plain_or_absent]),
    };
    merged.extend(errs);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxError, SharedError};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn messages(err: &MultiError) -> Vec<String> {
        err.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn it_appends_to_an_existing_error() {
        let original = MultiError::from_iter(["foo", "bar"]);
        let err = append(original, ["baz"]);
        assert_eq!(messages(&err), ["foo", "bar", "baz"]);
    }

    #[test]
    fn it_appends_to_a_nil_error() {
        let original: Option<MultiError> = None;
        let err = append(original, ["foo", "bar"]);
        assert_eq!(messages(&err), ["foo", "bar"]);
    }

    #[test]
    fn it_appends_nothing_to_an_absent_base() {
        let err = append(Failure::Absent, Vec::<Failure>::new());
        assert!(err.is_empty());
        assert!(err.error_or_none().is_none());
    }

    #[test]
    fn it_appends_to_a_plain_error() {
        let original: BoxError = "foo".into();
        let err = append(original, ["bar"]);
        assert_eq!(messages(&err), ["foo", "bar"]);
    }

    #[test]
    fn it_skips_absent_values() {
        let err = append(
            None::<BoxError>,
            [Failure::Absent, Failure::from("foo"), Failure::Composite(None)],
        );
        assert_eq!(messages(&err), ["foo"]);
    }

    #[test]
    fn it_flattens_nested_errors() {
        let ab = append(Failure::Absent, ["a", "b"]);
        let err = append(ab, [Failure::from("c")]);
        assert_eq!(messages(&err), ["a", "b", "c"]);

        let nested = MultiError::from_iter(["x", "y"]);
        let err = append(err, [nested]);
        assert_eq!(messages(&err), ["a", "b", "c", "x", "y"]);
        assert!(err
            .iter()
            .all(|e| e.downcast_ref::<MultiError>().is_none()));
    }

    #[test]
    fn it_flattens_composites_given_as_base() {
        let nested: BoxError = Box::new(MultiError::from_iter(["a", "b"]));
        let err = append(nested, ["c"]);
        assert_eq!(messages(&err), ["a", "b", "c"]);
    }

    #[test]
    fn it_preserves_order_and_identity() {
        let a: SharedError = Arc::from(BoxError::from("a"));
        let b: SharedError = Arc::from(BoxError::from("b"));
        let c: SharedError = Arc::from(BoxError::from("c"));

        let err = append(Failure::Absent, [a.clone(), b.clone(), c.clone()]);
        let wrapped = err.wrapped_errors();
        assert_eq!(wrapped.len(), 3);
        assert!(Arc::ptr_eq(&wrapped[0], &a));
        assert!(Arc::ptr_eq(&wrapped[1], &b));
        assert!(Arc::ptr_eq(&wrapped[2], &c));
    }

    #[test]
    fn it_keeps_the_formatter_of_the_base() {
        let original =
            MultiError::new().with_formatter(|errs: &[SharedError]| errs.len().to_string());
        let err = append(original, ["a", "b"]);
        assert_eq!(err.to_string(), "2");
    }
}
