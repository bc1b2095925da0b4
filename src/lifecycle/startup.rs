//! Background startup.
//!
//! # Responsibilities
//! - Bind the listener before anything is spawned
//! - Serve on a background task
//! - Report a server that dies during the init window as a startup fault
//! - Hand back a [`ServerHandle`] for deadline-bounded shutdown
//!
//! # Design Decisions
//! - Bind errors come back synchronously, never through the task
//! - After the init window the server is assumed up; later faults surface
//!   from [`ServerHandle::shutdown`]

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::http::server::{bind, ServerError, WebServer};
use crate::lifecycle::Shutdown;

impl WebServer {
    /// Start serving in the background.
    ///
    /// Returns once the listener is bound and the server survived the
    /// configured init window.
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let address = self.config().listener.bind_address.clone();
        let init_timeout = self.config().lifecycle.init_timeout();
        let shutdown_timeout = self.config().lifecycle.shutdown_timeout();

        let listener = bind(&address).await?;
        let local_addr = listener.local_addr().map_err(ServerError::Startup)?;

        let app = self
            .into_router()
            .into_make_service_with_connect_info::<SocketAddr>();

        let shutdown = Shutdown::new();
        let signal = shutdown.signalled();
        let mut task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
        });

        tokio::select! {
            _ = tokio::time::sleep(init_timeout) => {}
            result = &mut task => {
                let err = match result {
                    Ok(Ok(())) => ServerError::Startup(io::Error::other("server exited during startup")),
                    Ok(Err(e)) => ServerError::Startup(e),
                    Err(e) => ServerError::Join(e),
                };
                tracing::error!(address = %address, error = %err, "webserver startup error");
                return Err(err);
            }
        }

        tracing::info!(address = %local_addr, "webserver listening");
        Ok(ServerHandle {
            local_addr,
            shutdown,
            task,
            shutdown_timeout,
        })
    }
}

/// Handle to a server running in the background.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<io::Result<()>>,
    shutdown_timeout: Duration,
}

impl ServerHandle {
    /// The address actually bound, useful when the port was `0`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop accepting, drain in-flight requests and wait up to `deadline`.
    /// Past the deadline the server task is aborted.
    pub async fn shutdown(mut self, deadline: Duration) -> Result<(), ServerError> {
        tracing::info!(deadline = ?deadline, "webserver shutting down");
        self.shutdown.trigger();

        match tokio::time::timeout(deadline, &mut self.task).await {
            Ok(Ok(Ok(()))) => {
                tracing::info!("webserver stopped");
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(ServerError::Serve(e)),
            Ok(Err(e)) => Err(ServerError::Join(e)),
            Err(_) => {
                tracing::warn!(deadline = ?deadline, "Graceful shutdown timed out, aborting");
                self.task.abort();
                Err(ServerError::ShutdownTimeout(deadline))
            }
        }
    }

    /// [`shutdown`](Self::shutdown) with the configured timeout.
    pub async fn stop(self) -> Result<(), ServerError> {
        let deadline = self.shutdown_timeout;
        self.shutdown(deadline).await
    }
}
