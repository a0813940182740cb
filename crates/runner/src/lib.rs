//! Process supervisor for the trackme service.
//!
//! Named app processes run concurrently under a shared cancellation token.
//! SIGINT or SIGTERM, or the first process failure, cancels the token; closers
//! then run once, bounded by a timeout.
//!
//! # Example
//!
//! ```no_run
//! use trackme_runner::Runner;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     Runner::new()
//!         .with_named_process("http", |ctx| async move {
//!             ctx.cancelled().await;
//!             Ok(())
//!         })
//!         .with_closer(|| async move { Ok(()) })
//!         .with_closer_timeout(Duration::from_secs(5))
//!         .run()
//!         .await;
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Boxed future produced by an app process
pub type ProcessFuture = Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>>;

/// Type alias for an app process function.
/// Takes a cancellation token and returns a future that resolves to Result<(), anyhow::Error>
pub type AppProcess = Box<dyn FnOnce(CancellationToken) -> ProcessFuture + Send>;

/// Type alias for a closer function.
pub type Closer =
    Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>> + Send>;

struct NamedProcess {
    name: String,
    process: AppProcess,
}

/// Supervises long-running processes and runs closers on the way out
pub struct Runner {
    processes: Vec<NamedProcess>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    cancellation_token: CancellationToken,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Creates a runner with a 10 second closer timeout and nothing registered
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Adds an app process; its name tags every log line the runner emits about it
    pub fn with_named_process<F, Fut>(mut self, name: impl Into<String>, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.processes.push(NamedProcess {
            name: name.into(),
            process: Box::new(|token| Box::pin(process(token))),
        });
        self
    }

    /// Adds an unnamed app process
    pub fn with_app_process<F, Fut>(self, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        let name = format!("process-{}", self.processes.len());
        self.with_named_process(name, process)
    }

    /// Adds a closer. Closers run after every process has stopped, whatever the reason.
    pub fn with_closer<F, Fut>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.closers.push(Box::new(|| Box::pin(closer())));
        self
    }

    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Uses an externally owned token, so callers can trigger shutdown themselves
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Runs until shutdown, then exits the process: 0 on a clean stop, 1 if a process failed
    pub async fn run(self) {
        self.spawn_signal_handlers();

        match self.run_until_stopped().await {
            Ok(()) => {
                info!("application exiting normally");
                std::process::exit(0);
            }
            Err(err) => {
                error!(error = %format!("{:#}", err), "application exiting with error");
                std::process::exit(1);
            }
        }
    }

    /// Runs processes until the token is cancelled or one of them fails, then runs closers
    ///
    /// Returns the first process error, if any.
    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        let token = self.cancellation_token;
        let mut join_set = JoinSet::new();

        for NamedProcess { name, process } in self.processes {
            let process_token = token.clone();
            join_set.spawn(async move {
                info!(process = %name, "starting process");
                let result = process(process_token).await;
                (name, result)
            });
        }

        let mut first_error = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    debug!(process = %name, "process stopped");
                }
                Ok((name, Err(err))) => {
                    if first_error.is_none() {
                        error!(process = %name, error = %format!("{:#}", err), "process failed");
                        first_error = Some(err.context(format!("process {} failed", name)));
                    }
                    token.cancel();
                }
                Err(err) => {
                    error!(error = %err, "process panicked");
                    if first_error.is_none() {
                        first_error = Some(anyhow::anyhow!("process panicked: {}", err));
                    }
                    token.cancel();
                }
            }
        }

        if !self.closers.is_empty() {
            info!(timeout = ?self.closer_timeout, "running closers");

            match tokio::time::timeout(self.closer_timeout, Self::run_closers(self.closers)).await
            {
                Ok(()) => info!("all closers completed"),
                Err(_) => warn!(timeout = ?self.closer_timeout, "closers timed out"),
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn spawn_signal_handlers(&self) {
        let ctrl_c_token = self.cancellation_token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!(signal = "SIGINT", "received shutdown signal");
                    ctrl_c_token.cancel();
                }
                Err(err) => {
                    error!(error = %err, "failed to listen for SIGINT");
                }
            }
        });

        #[cfg(unix)]
        {
            let sigterm_token = self.cancellation_token.clone();
            tokio::spawn(async move {
                use tokio::signal::unix::{signal, SignalKind};
                match signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                        info!(signal = "SIGTERM", "received shutdown signal");
                        sigterm_token.cancel();
                    }
                    Err(err) => {
                        error!(error = %err, "failed to listen for SIGTERM");
                    }
                }
            });
        }
    }

    /// Runs all closers concurrently; a failing closer does not stop the others
    async fn run_closers(closers: Vec<Closer>) {
        let mut closer_set = JoinSet::new();

        for closer in closers {
            closer_set.spawn(async move { closer().await });
        }

        while let Some(result) = closer_set.join_next().await {
            match result {
                Ok(Ok(())) => debug!("closer completed"),
                Ok(Err(err)) => error!(error = %format!("{:#}", err), "closer failed"),
                Err(err) => error!(error = %err, "closer panicked"),
            }
        }
    }
}
