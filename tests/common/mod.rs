//! Shared utilities for server integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use pathwalk::{Dispatcher, HttpServer, ServerConfig, Shutdown};
use tokio::net::TcpListener;

/// Serve `dispatcher` on an ephemeral local port.
///
/// The server stops when the returned `Shutdown` is triggered or dropped.
pub async fn spawn_server(config: ServerConfig, dispatcher: Dispatcher) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    let server = HttpServer::new(config, Arc::new(dispatcher));

    tokio::spawn(async move {
        let _ = server.run(listener, stop).await;
    });

    (addr, shutdown)
}

/// Client that neither follows redirects nor honours proxy settings.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
