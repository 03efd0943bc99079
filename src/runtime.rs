//! Runtime abstraction layer for async operations
//!
//! The fleet poller is the only long-running task in the crate. It is
//! spawned through [`AsyncSpawner`] so the hosting application decides which
//! executor runs it: Tokio when the `tokio-runtime` feature is on, a plain
//! background thread otherwise.

use crate::prelude::{Duration, Future, Pin};

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(
        &self,
        future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
    ) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Spawn a future on the global runtime
pub fn spawn<F>(future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    log::trace!("spawning background task");
    runtime().spawn_boxed(Box::pin(future))
}

/// Sleep without blocking the executor
pub async fn async_delay(duration: Duration) {
    #[cfg(feature = "tokio-runtime")]
    {
        ::tokio::time::sleep(duration).await;
    }

    #[cfg(not(feature = "tokio-runtime"))]
    {
        spawners::thread_impl::Delay::new(duration).await;
    }
}

/// Default spawner implementations
pub mod spawners {
    use super::*;

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner. Must be used from inside a Tokio runtime.
        pub struct TokioSpawner;

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(
                &self,
                future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
            ) -> Box<dyn AsyncHandle> {
                let handle = ::tokio::spawn(future);
                Box::new(TokioHandle(handle))
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }

    pub mod thread_impl {
        use super::*;
        use crate::prelude::{Arc, Mutex};
        use crossbeam_channel::{after, bounded, select, Sender};
        use futures::future::{AbortHandle, Abortable};
        use std::sync::{MutexGuard, PoisonError};
        use std::task::{Context, Poll, Waker};
        use std::thread::JoinHandle;

        /// Runs every task to completion on its own OS thread
        pub struct ThreadSpawner;

        impl AsyncSpawner for ThreadSpawner {
            fn spawn_boxed(
                &self,
                future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
            ) -> Box<dyn AsyncHandle> {
                let (abort, registration) = AbortHandle::new_pair();
                let thread = std::thread::spawn(move || {
                    let _ = futures::executor::block_on(Abortable::new(future, registration));
                });
                Box::new(ThreadHandle { thread, abort })
            }
        }

        struct ThreadHandle {
            thread: JoinHandle<()>,
            abort: AbortHandle,
        }

        impl AsyncHandle for ThreadHandle {
            fn is_finished(&self) -> bool {
                self.thread.is_finished()
            }

            // Wakes the task, which then drops its pending future
            fn cancel(&self) {
                self.abort.abort();
            }
        }

        /// Timer for tasks on a [`ThreadSpawner`] thread.
        ///
        /// The wait happens on a helper thread, so the task thread stays free
        /// to notice a cancel. Dropping the delay stops the helper.
        pub struct Delay {
            duration: Duration,
            state: Arc<Mutex<DelayState>>,
            stop: Option<Sender<()>>,
        }

        #[derive(Default)]
        struct DelayState {
            elapsed: bool,
            waker: Option<Waker>,
        }

        fn lock(state: &Mutex<DelayState>) -> MutexGuard<'_, DelayState> {
            state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        impl Delay {
            pub fn new(duration: Duration) -> Self {
                Self {
                    duration,
                    state: Arc::default(),
                    stop: None,
                }
            }
        }

        impl Future for Delay {
            type Output = ();

            fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
                {
                    let mut state = lock(&self.state);
                    if state.elapsed {
                        return Poll::Ready(());
                    }
                    state.waker = Some(cx.waker().clone());
                }

                if self.stop.is_none() {
                    let (stop, stopped) = bounded::<()>(0);
                    let timeout = after(self.duration);
                    let state = Arc::clone(&self.state);
                    std::thread::spawn(move || {
                        select! {
                            recv(timeout) -> _ => {
                                let waker = {
                                    let mut state = lock(&state);
                                    state.elapsed = true;
                                    state.waker.take()
                                };
                                if let Some(waker) = waker {
                                    waker.wake();
                                }
                            }
                            // Disconnected when the delay is dropped
                            recv(stopped) -> _ => {}
                        }
                    });
                    self.stop = Some(stop);
                }
                Poll::Pending
            }
        }
    }
}

/// Global runtime instance
static RUNTIME: std::sync::OnceLock<Box<dyn AsyncSpawner>> = std::sync::OnceLock::new();

/// Initialize the runtime with a specific spawner. Only the first call wins.
pub fn init_runtime(spawner: Box<dyn AsyncSpawner>) {
    if RUNTIME.set(spawner).is_err() {
        log::warn!("runtime already initialised, keeping the existing spawner");
    }
}

/// Get the global runtime spawner
pub fn runtime() -> &'static dyn AsyncSpawner {
    RUNTIME
        .get_or_init(|| {
            #[cfg(feature = "tokio-runtime")]
            {
                Box::new(spawners::tokio_impl::TokioSpawner)
            }

            #[cfg(not(feature = "tokio-runtime"))]
            {
                Box::new(spawners::thread_impl::ThreadSpawner)
            }
        })
        .as_ref()
}
