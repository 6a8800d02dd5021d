//! Shutdown coordination for the server.

use tokio::sync::broadcast;

/// Fans a single stop signal out to every running server.
///
/// Tests trigger it directly; the binary wires it to Ctrl+C.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. Safe to call more than once.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Trigger on Ctrl+C from a background task.
    pub fn trigger_on_ctrl_c(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                    this.trigger();
                }
                Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
            }
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once the receiver sees a signal or its sender is gone.
pub async fn wait(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let a = tokio::spawn(wait(shutdown.subscribe()));
        let b = tokio::spawn(wait(shutdown.subscribe()));

        shutdown.trigger();
        a.await.unwrap();
        b.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_sender_releases_waiters() {
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        drop(shutdown);
        wait(rx).await;
    }
}
