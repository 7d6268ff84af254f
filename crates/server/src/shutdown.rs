//! Process-wide shutdown coordination.
//!
//! One [`ShutdownController`] is created at startup. The HTTP server runs on
//! its token; background tasks such as the database probe take child tokens
//! so they stop with it. The pool is closed only after the server returns.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Clone, Default)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller cancelled by the first Ctrl+C or SIGTERM.
    ///
    /// Spawns the listener task, so it must be called inside a runtime.
    pub fn with_signals() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            token.cancel();
        });
        controller
    }

    /// Token cancelled with this controller, or on its own.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel everything. Idempotent.
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            info!("Shutdown requested");
            self.token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Resolve on the first of Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed never fires.
async fn wait_for_signal() {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Ctrl+C handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}
