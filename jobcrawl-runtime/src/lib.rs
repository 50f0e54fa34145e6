//! Tokio runtime and shutdown plumbing for the crawler binary.
//!
//! Crawling is sequential, so the runtime is single-threaded. A shared
//! [`CancellationToken`] lets Ctrl-C stop the crawl at the next page boundary
//! instead of killing the browser mid-page.
use anyhow::Result;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::warn;

pub use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct CrawlHandle {
    inner: Handle,
    cancel: CancellationToken,
}

pub struct CrawlRuntime {
    runtime: Runtime,
    cancel: CancellationToken,
}

impl CrawlRuntime {
    /// Build a current-thread Tokio runtime with timers and I/O enabled.
    ///
    /// ```
    /// use jobcrawl_runtime::CrawlRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = CrawlRuntime::build("doctest-runtime").expect("runtime builds");
    /// let value = runtime.block_on(async { 2 + 2 });
    /// assert_eq!(value, 4);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn build(thread_name: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .thread_name(thread_name)
            .build()?;
        Ok(Self {
            runtime,
            cancel: CancellationToken::new(),
        })
    }

    /// Obtain a cloned handle for spawning tasks and sharing cancellation.
    ///
    /// ```
    /// use jobcrawl_runtime::CrawlRuntime;
    ///
    /// let runtime = CrawlRuntime::build("handle-example").unwrap();
    /// let handle = runtime.handle();
    /// assert!(!handle.cancellation().is_cancelled());
    /// ```
    pub fn handle(&self) -> CrawlHandle {
        CrawlHandle {
            inner: self.runtime.handle().clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Run a future to completion on the runtime.
    pub fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Cancel outstanding work and shut the runtime down.
    ///
    /// ```
    /// use jobcrawl_runtime::CrawlRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = CrawlRuntime::build("shutdown-example").unwrap();
    /// let token = runtime.handle().cancellation();
    /// runtime.shutdown(Duration::from_millis(5));
    /// assert!(token.is_cancelled());
    /// ```
    pub fn shutdown(self, graceful: std::time::Duration) {
        self.cancel.cancel();
        self.runtime.shutdown_timeout(graceful);
    }
}

impl CrawlHandle {
    /// Spawn a future onto the runtime.
    ///
    /// ```
    /// use jobcrawl_runtime::CrawlRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = CrawlRuntime::build("spawn-doctest").unwrap();
    /// let handle = runtime.handle();
    /// let task = handle.spawn(async { 21 * 2 });
    /// let result = runtime.block_on(async move { task.await.unwrap() });
    /// assert_eq!(result, 42);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn spawn<F, T>(&self, fut: F) -> JoinHandle<T>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.spawn(fut)
    }

    /// Token observed by the crawl loop.
    ///
    /// ```
    /// use jobcrawl_runtime::CrawlRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = CrawlRuntime::build("cancel-example").unwrap();
    /// let cancel = runtime.handle().cancellation();
    /// cancel.cancel();
    /// assert!(cancel.is_cancelled());
    /// runtime.shutdown(Duration::from_millis(5));
    /// ```
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the shared token on the first Ctrl-C.
    ///
    /// The listener task only makes progress while the runtime is driven, i.e.
    /// inside [`CrawlRuntime::block_on`].
    pub fn install_ctrl_c(&self) -> JoinHandle<()> {
        let cancel = self.cancel.clone();
        self.spawn(async move {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        warn!(target: "runtime", error = %e, "ctrl-c listener unavailable");
                        return;
                    }
                    warn!(target: "runtime", "interrupt received; stopping after the current page");
                    cancel.cancel();
                }
                _ = cancel.cancelled() => {}
            }
        })
    }
}
