//! Worker pool that runs blocking calls off the caller's thread.
//!
//! Tasks run on the blocking thread pool of a dedicated tokio runtime whose
//! size is capped at the pool size. Each submission hands back a
//! [`CallFuture`] that can be awaited from any executor or waited on from
//! plain threads.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, ready};
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Runtime};
use tokio::task::{JoinError, JoinHandle};

/// Thread count used when the caller does not size the pool.
pub const DEFAULT_THREAD_POOL_SIZE: usize = 10;

/// Why a submitted call did not produce the delegate's own result.
#[derive(Debug)]
pub enum CallError<E> {
    /// The delegate returned this error; it is passed through untouched.
    Delegate(E),
    /// The pool was shut down before the call was submitted.
    Rejected,
    /// The call was cancelled, or discarded by shutdown, before it started.
    Cancelled,
    /// The call panicked on the worker thread.
    Panicked(String),
}

impl<E> CallError<E> {
    pub fn delegate_error(&self) -> Option<&E> {
        match self {
            CallError::Delegate(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_delegate_error(self) -> Option<E> {
        match self {
            CallError::Delegate(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for CallError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CallError::Delegate(e) => write!(f, "{}", e),
            CallError::Rejected => write!(f, "worker pool has been shut down"),
            CallError::Cancelled => write!(f, "call was cancelled before it started"),
            CallError::Panicked(msg) => write!(f, "call panicked: {}", msg),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for CallError<E> {}

/// Handle to a call running on a [`WorkerPool`].
#[must_use = "dropping a CallFuture detaches the call; its result is lost"]
pub struct CallFuture<T, E> {
    inner: Inner<T, E>,
}

enum Inner<T, E> {
    Spawned(JoinHandle<Result<T, CallError<E>>>),
    Ready(Option<CallError<E>>),
}

// Neither arm is ever pin-projected.
impl<T, E> Unpin for CallFuture<T, E> {}

impl<T, E> CallFuture<T, E> {
    fn spawned(handle: JoinHandle<Result<T, CallError<E>>>) -> Self {
        Self {
            inner: Inner::Spawned(handle),
        }
    }

    fn rejected() -> Self {
        Self {
            inner: Inner::Ready(Some(CallError::Rejected)),
        }
    }

    /// Best-effort cancellation. A call that has not started yet will never
    /// run and resolves to [`CallError::Cancelled`]; a call already running
    /// on a worker is not interrupted.
    pub fn cancel(&self) {
        if let Inner::Spawned(handle) = &self.inner {
            handle.abort();
        }
    }

    /// True once awaiting would return immediately.
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            Inner::Spawned(handle) => handle.is_finished(),
            Inner::Ready(_) => true,
        }
    }

    /// Blocks the current thread until the call completes.
    ///
    /// Must not be called from inside an async context; await the future
    /// there instead.
    pub fn wait(self) -> Result<T, CallError<E>> {
        futures::executor::block_on(self)
    }
}

impl<T, E> Future for CallFuture<T, E> {
    type Output = Result<T, CallError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            Inner::Spawned(handle) => match ready!(Pin::new(handle).poll(cx)) {
                Ok(result) => Poll::Ready(result),
                Err(e) => Poll::Ready(Err(join_error(e))),
            },
            Inner::Ready(error) => match error.take() {
                Some(error) => Poll::Ready(Err(error)),
                None => panic!("CallFuture polled after completion"),
            },
        }
    }
}

impl<T, E> fmt::Debug for CallFuture<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CallFuture")
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn join_error<E>(error: JoinError) -> CallError<E> {
    if error.is_cancelled() {
        return CallError::Cancelled;
    }
    match error.try_into_panic() {
        Ok(payload) => CallError::Panicked(panic_message(payload.as_ref())),
        Err(_) => CallError::Cancelled,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Bookkeeping shared between the pool and its tasks.
#[derive(Default)]
struct Shared {
    discard_queued: AtomicBool,
    outstanding: Mutex<usize>,
    drained: Condvar,
}

impl Shared {
    fn outstanding(&self) -> MutexGuard<'_, usize> {
        self.outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counts one submitted task until it has run or been dropped unrun.
struct Ticket(Arc<Shared>);

impl Ticket {
    fn issue(shared: &Arc<Shared>) -> Self {
        *shared.outstanding() += 1;
        Ticket(Arc::clone(shared))
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let mut outstanding = self.0.outstanding();
        *outstanding = outstanding.saturating_sub(1);
        if *outstanding == 0 {
            self.0.drained.notify_all();
        }
    }
}

/// Fixed-size pool of worker threads.
///
/// Liveness is one-way: once [`shutdown_now`](Self::shutdown_now) or
/// [`shutdown_graceful`](Self::shutdown_graceful) has been called every
/// further submission resolves to [`CallError::Rejected`].
pub struct WorkerPool {
    name: String,
    size: usize,
    runtime: Mutex<Option<Runtime>>,
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Starts a pool with `size` worker threads named `{name}-worker`.
    pub fn new(name: &str, size: usize) -> std::io::Result<Self> {
        if size == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "worker pool size must be at least 1",
            ));
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(size)
            .thread_name(format!("{}-worker", name))
            .build()?;

        tracing::debug!(pool = name, size, "worker pool started");

        Ok(Self {
            name: name.to_string(),
            size,
            runtime: Mutex::new(Some(runtime)),
            shared: Arc::new(Shared::default()),
        })
    }

    /// Pool of [`DEFAULT_THREAD_POOL_SIZE`] threads.
    pub fn with_default_size(name: &str) -> std::io::Result<Self> {
        Self::new(name, DEFAULT_THREAD_POOL_SIZE)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_shutdown(&self) -> bool {
        self.runtime().is_none()
    }

    /// Submitted calls that have neither finished nor been discarded.
    pub fn outstanding(&self) -> usize {
        *self.shared.outstanding()
    }

    /// Schedules `task` on a worker thread and returns immediately.
    pub fn submit<T, E, F>(&self, task: F) -> CallFuture<T, E>
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let guard = self.runtime();
        let Some(runtime) = guard.as_ref() else {
            return CallFuture::rejected();
        };

        let ticket = Ticket::issue(&self.shared);
        let shared = Arc::clone(&self.shared);
        let handle = runtime.spawn_blocking(move || {
            let _ticket = ticket;
            if shared.discard_queued.load(Ordering::Acquire) {
                return Err(CallError::Cancelled);
            }
            task().map_err(CallError::Delegate)
        });

        CallFuture::spawned(handle)
    }

    /// Stops the pool without waiting. Calls that have not started are
    /// discarded and resolve to [`CallError::Cancelled`]; calls already
    /// running are left to finish on their own threads and are not awaited.
    pub fn shutdown_now(&self) {
        let Some(runtime) = self.runtime().take() else {
            return;
        };

        self.shared.discard_queued.store(true, Ordering::Release);
        let outstanding = self.outstanding();
        if outstanding > 0 {
            tracing::warn!(
                pool = %self.name,
                outstanding,
                "worker pool shut down with calls still outstanding"
            );
        } else {
            tracing::debug!(pool = %self.name, "worker pool shut down");
        }
        runtime.shutdown_background();
    }

    /// Stops accepting calls and waits up to `timeout` for queued and
    /// running calls to finish. Returns true if everything finished; any
    /// stragglers are then handled as in [`shutdown_now`](Self::shutdown_now).
    pub fn shutdown_graceful(&self, timeout: Duration) -> bool {
        let Some(runtime) = self.runtime().take() else {
            return self.outstanding() == 0;
        };

        let deadline = Instant::now() + timeout;
        let mut outstanding = self.shared.outstanding();
        while *outstanding > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            outstanding = self
                .shared
                .drained
                .wait_timeout(outstanding, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        let left = *outstanding;
        drop(outstanding);

        if left > 0 {
            self.shared.discard_queued.store(true, Ordering::Release);
            tracing::warn!(pool = %self.name, outstanding = left, "worker pool drain timed out");
        } else {
            tracing::debug!(pool = %self.name, "worker pool drained");
        }
        runtime.shutdown_background();
        left == 0
    }

    fn runtime(&self) -> MutexGuard<'_, Option<Runtime>> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // shutdown_background is the only teardown that is legal from
        // inside an async context.
        if let Some(runtime) = self.runtime().take() {
            runtime.shutdown_background();
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_submit_returns_task_result() {
        let pool = WorkerPool::new("test", 2).unwrap();
        let result = pool.submit(|| Ok::<_, String>(21 * 2)).wait();
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_task_error_passes_through_unchanged() {
        let pool = WorkerPool::new("test", 1).unwrap();
        let result = pool
            .submit(|| Err::<(), _>("throttled".to_string()))
            .wait();

        match result {
            Err(CallError::Delegate(e)) => assert_eq!(e, "throttled"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_future_not_finished_until_task_completes() {
        let pool = WorkerPool::new("test", 1).unwrap();
        let future = pool.submit(|| {
            thread::sleep(Duration::from_millis(50));
            Ok::<_, String>("ResultX")
        });

        assert!(!future.is_finished());
        assert_eq!(future.wait().unwrap(), "ResultX");
    }

    #[test]
    fn test_zero_sized_pool_is_refused() {
        assert!(WorkerPool::new("test", 0).is_err());
    }

    #[test]
    fn test_submit_after_shutdown_is_rejected() {
        let pool = WorkerPool::new("test", 1).unwrap();
        pool.shutdown_now();

        assert!(pool.is_shutdown());
        let future = pool.submit(|| Ok::<_, String>(1));
        assert!(future.is_finished());
        assert!(matches!(future.wait(), Err(CallError::Rejected)));
    }

    #[test]
    fn test_shutdown_now_discards_queued_and_does_not_wait() {
        let pool = WorkerPool::new("test", 1).unwrap();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel::<()>();
        let ran_second = Arc::new(AtomicBool::new(false));

        let first = pool.submit(move || {
            started_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            Ok::<_, String>("first")
        });
        started_rx.recv().unwrap();

        let flag = Arc::clone(&ran_second);
        let second = pool.submit(move || {
            flag.store(true, Ordering::SeqCst);
            Ok::<_, String>("second")
        });

        // Returns while the first call is still blocked.
        pool.shutdown_now();
        release_tx.send(()).unwrap();

        assert_eq!(first.wait().unwrap(), "first");
        assert!(matches!(second.wait(), Err(CallError::Cancelled)));
        assert!(!ran_second.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cancel_prevents_queued_call_from_running() {
        let pool = WorkerPool::new("test", 1).unwrap();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel::<()>();
        let ran = Arc::new(AtomicBool::new(false));

        let blocker = pool.submit(move || {
            started_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            Ok::<_, String>(())
        });
        started_rx.recv().unwrap();

        let flag = Arc::clone(&ran);
        let queued = pool.submit(move || {
            flag.store(true, Ordering::SeqCst);
            Ok::<_, String>(())
        });
        queued.cancel();
        release_tx.send(()).unwrap();

        blocker.wait().unwrap();
        assert!(matches!(queued.wait(), Err(CallError::Cancelled)));
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_panic_is_reported() {
        let pool = WorkerPool::new("test", 1).unwrap();
        let result = pool
            .submit(|| -> Result<(), String> { panic!("delegate blew up") })
            .wait();

        match result {
            Err(CallError::Panicked(msg)) => assert!(msg.contains("delegate blew up")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_concurrent_calls_keep_their_own_results() {
        let pool = WorkerPool::new("test", 4).unwrap();
        let futures: Vec<_> = (0..32u64)
            .map(|i| {
                pool.submit(move || {
                    thread::sleep(Duration::from_millis(i % 5));
                    Ok::<_, String>(i * 10)
                })
            })
            .collect();

        for (i, future) in futures.into_iter().enumerate() {
            assert_eq!(future.wait().unwrap(), i as u64 * 10);
        }
    }

    #[test]
    fn test_pool_never_exceeds_its_size() {
        let pool = WorkerPool::new("test", 2).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let futures: Vec<_> = (0..8)
            .map(|_| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                pool.submit(move || {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(10));
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, String>(())
                })
            })
            .collect();

        for future in futures {
            future.wait().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_graceful_shutdown_drains_queued_calls() {
        let pool = WorkerPool::new("test", 2).unwrap();
        let futures: Vec<_> = (0..4)
            .map(|i| {
                pool.submit(move || {
                    thread::sleep(Duration::from_millis(20));
                    Ok::<_, String>(i as usize)
                })
            })
            .collect();

        assert!(pool.shutdown_graceful(Duration::from_secs(5)));
        assert_eq!(pool.outstanding(), 0);
        for (i, future) in futures.into_iter().enumerate() {
            assert_eq!(future.wait().unwrap(), i);
        }
    }

    #[tokio::test]
    async fn test_future_can_be_awaited_and_pool_dropped_in_async_context() {
        let pool = WorkerPool::new("test", 1).unwrap();
        let value = pool.submit(|| Ok::<_, String>("async")).await.unwrap();
        assert_eq!(value, "async");
        drop(pool);
    }
}
