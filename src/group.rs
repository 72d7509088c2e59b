use std::future::Future;
use std::sync::{Arc, PoisonError};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, field, instrument, trace, warn, Span};

use crate::{append, BoxError, Failure, FormatFn, MultiError, MultiErrorExt, SharedError};

/// Runs fallible tasks concurrently and collects their failures into a single
/// [`MultiError`].
///
/// Tasks start running as soon as they are spawned. Calling [`wait`](Group::wait) waits
/// for every spawned task to finish and returns the failures collected so far.
///
/// Failures are added in the order the tasks finish, which depends on scheduling. Callers
/// that need a stable order should sort the result, e.g. with
/// [`MultiError::sort_by_message`].
///
/// A panic inside a task is not caught, it is resumed by [`wait`](Group::wait). There is
/// no cancellation: a task that never finishes makes `wait` block forever.
///
/// Spawning requires a running tokio runtime.
///
/// ```
/// use multierror::{Group, MultiErrorExt};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let group = Group::new();
/// for i in 0..4 {
///     group.spawn(async move {
///         if i % 2 == 0 {
///             return Err(format!("task {i} failed"));
///         }
///         Ok(())
///     });
/// }
///
/// let err = group.wait().await;
/// assert_eq!(err.len(), 2);
/// # }
/// ```
#[derive(Default)]
pub struct Group {
    /// The collected failures. Only modified while holding the lock
    err: Arc<Mutex<Option<MultiError>>>,

    /// Handles of the tasks that have not been waited for yet
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,

    /// Formatter for the resulting error
    formatter: Option<FormatFn>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom formatter for the error returned by [`wait`](Group::wait)
    pub fn with_formatter<F>(self, formatter: F) -> Self
    where
        F: Fn(&[SharedError]) -> String + Send + Sync + 'static,
    {
        let mut group = self;
        group.formatter = Some(Arc::new(formatter));
        group
    }

    /// Run an asynchronous task in the group.
    ///
    /// Any error that can be boxed may be returned by the task, including [`MultiError`],
    /// whose failures are merged individually.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn<F, E>(&self, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let err = Arc::clone(&self.err);
        let handle = tokio::spawn(async move {
            match task.await {
                Ok(()) => trace!("task completed"),
                Err(e) => {
                    let failure = failed(e.into());
                    let mut guard = err.lock().await;
                    collect(&mut guard, failure);
                }
            }
        });
        self.track(handle);
    }

    /// Run a blocking task in the group.
    ///
    /// The task runs on the tokio blocking thread pool.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn_blocking<F, E>(&self, task: F)
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let err = Arc::clone(&self.err);
        let handle = tokio::task::spawn_blocking(move || match task() {
            Ok(()) => trace!("task completed"),
            Err(e) => {
                let failure = failed(e.into());
                let mut guard = err.blocking_lock();
                collect(&mut guard, failure);
            }
        });
        self.track(handle);
    }

    /// Wait for all tasks in the group to finish, and return the collected failures.
    ///
    /// Returns `None` if no task has failed so far. Tasks spawned while waiting are also
    /// waited for.
    ///
    /// This is not cancel safe: if the future is dropped before completion, tasks that
    /// were being waited for keep running but are no longer tracked by the group.
    ///
    /// # Panics
    ///
    /// Resumes the panic of any task that panicked.
    #[instrument(level = "debug", skip_all, fields(failures = field::Empty))]
    pub async fn wait(&self) -> Option<MultiError> {
        loop {
            let handles = std::mem::take(
                &mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner),
            );
            if handles.is_empty() {
                break;
            }

            for handle in handles {
                if let Err(e) = handle.await {
                    if e.is_panic() {
                        std::panic::resume_unwind(e.into_panic());
                    }
                    // tasks are only cancelled when the runtime shuts down
                    warn!("task did not complete: {e}");
                }
            }
        }

        let mut err = self.err.lock().await.clone();
        if let (Some(err), Some(formatter)) = (err.as_mut(), &self.formatter) {
            err.set_formatter(Some(formatter.clone()));
        }
        Span::current().record("failures", err.len());
        err
    }

    fn track(&self, handle: JoinHandle<()>) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }
}

fn failed(err: BoxError) -> Failure {
    debug!("task failed: {err}");
    Failure::from(err)
}

/// Merge a task failure into the collected failures
fn collect(collected: &mut Option<MultiError>, failure: Failure) {
    *collected = Some(append(collected.take(), [failure]));
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use tokio::time::sleep;
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::{prelude::*, EnvFilter};

    fn init() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(false)
                    .with_thread_names(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE),
            )
            .with(EnvFilter::from_default_env())
            .try_init()
            .unwrap_or(());
    }

    fn messages(err: &MultiError) -> HashSet<String> {
        err.iter().map(|e| e.to_string()).collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_group_without_failures() {
        init();
        let group = Group::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            group.spawn(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), BoxError>(())
            });
        }

        let err = group.wait().await;
        assert!(err.is_none());
        assert!(err.error_or_none().is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_group_with_all_failures() {
        init();
        let group = Group::new();
        for i in 0..10 {
            group.spawn(async move {
                sleep(Duration::from_millis(10 - i)).await;
                Err(format!("task {i} failed"))
            });
        }

        let err = group.wait().await.unwrap();
        assert_eq!(err.len(), 10);
        assert_eq!(
            messages(&err),
            (0..10)
                .map(|i| format!("task {i} failed"))
                .collect::<HashSet<_>>()
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_group_with_some_failures() {
        init();
        let group = Group::new();
        for i in 0..10 {
            group.spawn(async move {
                if i % 3 == 0 {
                    return Err(anyhow::anyhow!("task {i} failed"));
                }
                Ok(())
            });
        }

        let err = group.wait().await.error_or_none().unwrap();
        assert_eq!(
            messages(&err),
            HashSet::from([
                "task 0 failed".to_string(),
                "task 3 failed".to_string(),
                "task 6 failed".to_string(),
                "task 9 failed".to_string(),
            ])
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_group_flattens_task_errors() {
        init();
        let group = Group::new();
        group.spawn(async { Err(MultiError::from_iter(["a", "b"])) });
        group.spawn(async { Err("c") });

        let err = group.wait().await.unwrap();
        assert_eq!(err.len(), 3);
        assert!(err
            .iter()
            .all(|e| e.downcast_ref::<MultiError>().is_none()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_group_runs_blocking_tasks() {
        init();
        let group = Group::new();
        for i in 0..4 {
            group.spawn_blocking(move || {
                std::thread::sleep(Duration::from_millis(5));
                if i < 2 {
                    return Err(format!("blocking task {i} failed"));
                }
                Ok(())
            });
        }
        group.spawn(async { Err("async task failed") });

        let err = group.wait().await.unwrap();
        assert_eq!(
            messages(&err),
            HashSet::from([
                "blocking task 0 failed".to_string(),
                "blocking task 1 failed".to_string(),
                "async task failed".to_string(),
            ])
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_group_runs_tasks_concurrently() {
        init();
        let group = Group::new();
        let start = std::time::Instant::now();
        for i in 0..5 {
            group.spawn(async move {
                sleep(Duration::from_millis(100)).await;
                Err(format!("task {i} failed"))
            });
        }

        let err = group.wait().await.unwrap();
        assert_eq!(err.len(), 5);
        assert!(
            start.elapsed().as_millis() < 400,
            "tasks did not run concurrently"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_group_uses_custom_formatter() {
        init();
        let group = Group::new().with_formatter(|errs: &[SharedError]| {
            format!("{} tasks failed", errs.len())
        });
        group.spawn(async { Err("a") });
        group.spawn(async { Err("b") });

        let err = group.wait().await.unwrap();
        assert_eq!(err.to_string(), "2 tasks failed");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_group_can_be_waited_again() {
        init();
        let group = Group::new();
        group.spawn(async { Err("first") });
        assert_eq!(group.wait().await.len(), 1);

        group.spawn(async { Err("second") });
        let err = group.wait().await.unwrap();
        assert_eq!(err.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    #[should_panic(expected = "task exploded")]
    async fn test_group_resumes_task_panics() {
        let group = Group::new();
        group.spawn(async {
            if true {
                panic!("task exploded");
            }
            Ok::<(), BoxError>(())
        });
        group.wait().await;
    }
}
