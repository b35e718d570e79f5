use std::sync::Arc;

use strand::config::Config;
use strand::http::connection::ConnectionHandle;
use strand::http::request::Request;
use strand::http::response::{ResponseBuilder, StatusCode};
use strand::server;

fn handle(handle: &mut ConnectionHandle, request: Request) {
    tracing::info!(
        method = %request.method,
        path = %request.path,
        body_len = request.body.len(),
        "Handling request"
    );

    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Server", "strand")
        .body(b"Test\n".to_vec())
        .build();
    handle.send(&response);

    if !request.keep_alive() {
        handle.close();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    tokio::select! {
        res = server::run(&cfg, Arc::new(handle)) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
