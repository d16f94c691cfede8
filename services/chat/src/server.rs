//! services/chat/src/server.rs
//!
//! The listener lifecycle: serve until interrupted, then give in-flight
//! requests a bounded amount of time to finish.

use crate::error::ApiError;
use axum::Router;
use std::{future::Future, io, net::SocketAddr, time::Duration};
use tokio::{net::TcpListener, sync::watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// The process-wide server state.
///
/// Only an interrupt moves the server to `ShuttingDown`; a listener failure
/// goes straight to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Listening,
    ShuttingDown,
    Stopped,
}

/// Runs the listener and the shutdown watcher side by side.
///
/// The first failure from either side is the result of the run. The listener
/// closing because shutdown was requested is not a failure.
pub struct ServerLifecycle {
    shutdown_timeout: Duration,
    state: watch::Sender<RunState>,
}

impl ServerLifecycle {
    pub fn new(shutdown_timeout: Duration) -> Self {
        let (state, _) = watch::channel(RunState::NotStarted);
        Self {
            shutdown_timeout,
            state,
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Binds `listen_address` and serves `router` until `interrupt` resolves.
    pub async fn run<F>(
        &self,
        listen_address: SocketAddr,
        router: Router,
        interrupt: F,
    ) -> Result<(), ApiError>
    where
        F: Future<Output = ()> + Send,
    {
        self.coordinate(TcpListener::bind(listen_address), router, interrupt)
            .await
    }

    /// Serves `router` on an already bound listener until `interrupt` resolves.
    pub async fn run_with_listener<F>(
        &self,
        listener: TcpListener,
        router: Router,
        interrupt: F,
    ) -> Result<(), ApiError>
    where
        F: Future<Output = ()> + Send,
    {
        self.coordinate(async { Ok(listener) }, router, interrupt)
            .await
    }

    async fn coordinate<B, F>(&self, bind: B, router: Router, interrupt: F) -> Result<(), ApiError>
    where
        B: Future<Output = io::Result<TcpListener>> + Send,
        F: Future<Output = ()> + Send,
    {
        // `shutdown` tells the listener to stop accepting; `drained` fires once
        // it has stopped and every in-flight request has finished.
        let shutdown = CancellationToken::new();
        let drained = CancellationToken::new();

        let serve = async {
            let listener = bind.await?;
            info!("starting server on {}", listener.local_addr()?);
            self.state.send_if_modified(|state| {
                let starting = *state == RunState::NotStarted;
                if starting {
                    *state = RunState::Listening;
                }
                starting
            });

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown.clone().cancelled_owned())
                .await?;
            drained.cancel();
            Ok::<(), ApiError>(())
        };

        let stop = async {
            tokio::select! {
                _ = interrupt => {}
                _ = drained.cancelled() => return Ok(()),
            }
            info!("stopping server");
            self.state.send_replace(RunState::ShuttingDown);
            shutdown.cancel();

            tokio::time::timeout(self.shutdown_timeout, drained.cancelled())
                .await
                .map_err(|_| ApiError::ShutdownTimeout(self.shutdown_timeout))
        };

        let result = tokio::try_join!(serve, stop).map(|_| ());
        self.state.send_replace(RunState::Stopped);
        result
    }
}

/// Resolves on the first Ctrl-C / SIGINT.
pub async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a handler the server can only be stopped externally.
        error!("failed to listen for interrupt: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Serves `router` on `listen_address` until the process is interrupted.
pub async fn run_server(
    listen_address: SocketAddr,
    router: Router,
    shutdown_timeout: Duration,
) -> Result<(), ApiError> {
    ServerLifecycle::new(shutdown_timeout)
        .run(listen_address, router, interrupt_signal())
        .await
}
