use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionHandle};
use crate::http::request::Request;

/// Application callback invoked once per completed request.
pub type Handler = Arc<dyn Fn(&mut ConnectionHandle, Request) + Send + Sync>;

pub async fn run(cfg: &Config, handler: Handler) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.server.listen_addr))?;
    info!("Listening on {}", cfg.server.listen_addr);

    serve(listener, cfg, handler).await
}

/// Accepts connections from an already bound listener.
pub async fn serve(listener: TcpListener, cfg: &Config, handler: Handler) -> anyhow::Result<()> {
    let mut next_id: u64 = 0;

    loop {
        let (socket, peer) = listener.accept().await?;
        next_id += 1;
        info!(connection = next_id, "Accepted connection from {}", peer);

        let cfg = cfg.clone();
        let handler = handler.clone();
        let id = next_id;
        tokio::spawn(async move {
            let on_request = move |handle: &mut ConnectionHandle, request: Request| {
                handler(handle, request)
            };
            let mut conn = Connection::new(socket, id, &cfg, on_request);
            if let Err(e) = conn.run().await {
                error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
