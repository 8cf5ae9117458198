//! Runtime abstraction layer for async operations
//!
//! The engine itself is synchronous; the only asynchronous piece is the
//! persistence debounce timer. When the host runs a Tokio runtime the timer
//! is a Tokio task. Otherwise [`spawn`] returns `None` and the caller keeps
//! its own timer (see [`crate::input::Debouncer`]).

use std::{future::Future, pin::Pin, sync::OnceLock, time::Duration};

/// Boxed future accepted by spawners
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it, or `None` when no executor
    /// is reachable from the calling thread
    fn spawn_boxed(&self, future: BoxFuture) -> Option<Box<dyn AsyncHandle>>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Convenience function for spawning on the global runtime
pub fn spawn<F>(future: F) -> Option<Box<dyn AsyncHandle>>
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime()?.spawn_boxed(Box::pin(future))
}

/// Default spawner implementations
pub mod spawners {
    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::super::*;
        use ::tokio::{runtime::Handle, task::JoinHandle};

        /// Spawns onto the Tokio runtime the caller is running inside
        pub struct TokioSpawner;

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(&self, future: BoxFuture) -> Option<Box<dyn AsyncHandle>> {
                let handle = Handle::try_current().ok()?;
                Some(Box::new(TokioHandle(handle.spawn(future))))
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
}

/// Sleeps on the Tokio timer when one is available, otherwise blocks the
/// polling thread
pub async fn async_delay(duration: Duration) {
    #[cfg(feature = "tokio-runtime")]
    {
        if ::tokio::runtime::Handle::try_current().is_ok() {
            ::tokio::time::sleep(duration).await;
            return;
        }
    }

    std::thread::sleep(duration);
}

/// Global runtime instance
static RUNTIME: OnceLock<Box<dyn AsyncSpawner>> = OnceLock::new();

/// Initialize the runtime with a specific spawner. Has no effect once a
/// spawner is already in use.
pub fn init_runtime(spawner: Box<dyn AsyncSpawner>) {
    if RUNTIME.set(spawner).is_err() {
        log::debug!("runtime already initialised; keeping existing spawner");
    }
}

/// Get the global runtime spawner. Without the `tokio-runtime` feature there
/// is none until [`init_runtime`] installs one.
pub fn runtime() -> Option<&'static dyn AsyncSpawner> {
    #[cfg(feature = "tokio-runtime")]
    let spawner = RUNTIME.get_or_init(|| Box::new(spawners::tokio_impl::TokioSpawner));

    #[cfg(not(feature = "tokio-runtime"))]
    let spawner = RUNTIME.get()?;

    Some(spawner.as_ref())
}
