use tokio::net::TcpListener;
use tracing::{error, info};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::http::connection::Connection;
use crate::proxy::ProxyContext;
use crate::stats::StatsSender;

/// Binds the configured address and serves forever with a fresh cache.
pub async fn run(cfg: &Config, stats: StatsSender) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    stats.started();

    let ctx = ProxyContext::new(ResponseCache::new(), stats, cfg.origin.clone());
    serve(listener, ctx).await
}

/// Accept loop. Each connection gets its own task, the next connection id,
/// and a clone of `ctx`. Accept failures are logged and never stop the loop.
pub async fn serve(listener: TcpListener, ctx: ProxyContext) -> anyhow::Result<()> {
    let mut next_id: u64 = 0;

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
                continue;
            }
        };

        let id = next_id;
        next_id += 1;
        info!(conn = id, "Accepted connection from {}", peer);

        let ctx = ctx.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(id, peer.to_string(), socket, ctx);
            conn.run().await;
        });
    }
}
