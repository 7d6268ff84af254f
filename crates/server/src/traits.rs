//! The [`Server`] lifecycle trait and its [`ServerExt`] helpers.

use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// A long-running listener driven by a cancellation token.
#[async_trait]
pub trait Server: Send + Sync + 'static {
    /// Short label used in logs and metrics.
    fn name(&self) -> &str;

    /// Bound address while serving, `None` before bind and after shutdown.
    fn address(&self) -> Option<SocketAddr>;

    fn is_running(&self) -> bool;

    /// Bind, serve until `shutdown` is cancelled, then drain in-flight
    /// requests. Bind failures are returned before anything is served.
    async fn run(&self, shutdown: CancellationToken) -> Result<()>;
}

pub trait ServerExt: Server + Sized {
    /// Run on a background task. Cancel the returned token to stop it.
    fn spawn(self) -> (JoinHandle<Result<()>>, CancellationToken) {
        let token = CancellationToken::new();
        let run_token = token.clone();
        let handle = tokio::spawn(async move { self.run(run_token).await });
        (handle, token)
    }
}

impl<T: Server + Sized> ServerExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Serves nothing; records whether it observed cancellation.
    struct Idle {
        stopped: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Server for Idle {
        fn name(&self) -> &str {
            "idle"
        }

        fn address(&self) -> Option<SocketAddr> {
            None
        }

        fn is_running(&self) -> bool {
            !self.stopped.load(Ordering::SeqCst)
        }

        async fn run(&self, shutdown: CancellationToken) -> Result<()> {
            shutdown.cancelled().await;
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_spawned_server_stops_on_cancel() {
        let stopped = Arc::new(AtomicBool::new(false));
        let (handle, token) = Idle {
            stopped: stopped.clone(),
        }
        .spawn();

        token.cancel();
        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;

        assert!(matches!(joined, Ok(Ok(Ok(())))));
        assert!(stopped.load(Ordering::SeqCst));
    }
}
