use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::http::connection::Connection;
use crate::server::Handler;

/// Handle to a running server.
///
/// Dropping the handle without calling [`close`](Server::close) also stops
/// the accept loop, but does not wait for it.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    accept_loop: JoinHandle<()>,
}

impl Server {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits until the listener is closed.
    ///
    /// Connections already handed to a handler keep running to completion.
    pub async fn close(self) -> anyhow::Result<()> {
        self.shutdown.send_replace(true);
        self.accept_loop
            .await
            .context("accept loop terminated abnormally")?;
        info!(address = %self.local_addr, "Server closed");
        Ok(())
    }
}

/// Binds `0.0.0.0:<port>` and starts serving `handler`.
pub async fn serve<H: Handler>(port: u16, handler: H) -> anyhow::Result<Server> {
    let cfg = ServerConfig {
        port,
        ..ServerConfig::default()
    };
    serve_config(&cfg, handler).await
}

/// Binds the configured address and starts serving `handler`.
///
/// A bind failure is returned to the caller; nothing is retried.
pub async fn serve_config<H: Handler>(cfg: &ServerConfig, handler: H) -> anyhow::Result<Server> {
    let listener = TcpListener::bind((cfg.host.as_str(), cfg.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", cfg.host, cfg.port))?;
    let local_addr = listener.local_addr()?;
    info!("Listening on {}", local_addr);

    let (shutdown, shutdown_rx) = watch::channel(false);
    let accept_loop = tokio::spawn(accept_loop(
        listener,
        Arc::new(handler),
        shutdown_rx,
        cfg.read_buffer_size,
    ));

    Ok(Server {
        local_addr,
        shutdown,
        accept_loop,
    })
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    mut shutdown: watch::Receiver<bool>,
    read_buffer_size: usize,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let accepted = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            res = listener.accept() => res,
        };

        // Raced with close(): drop the connection instead of serving it.
        if *shutdown.borrow() {
            break;
        }

        let (socket, peer) = match accepted {
            Ok(conn) => conn,
            Err(e) => {
                error!("Accept error: {}", e);
                continue;
            }
        };
        debug!("Accepted connection from {}", peer);

        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, read_buffer_size);
            if let Err(e) = conn.run(handler.as_ref()).await {
                error!("Connection error from {}: {:#}", peer, e);
            }
        });
    }
}
