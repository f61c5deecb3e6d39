use relaycache::config::Config;
use relaycache::server;
use relaycache::stats::{StatsCollector, StatsSender};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let (stats, events) = StatsSender::channel();
    let collector = StatsCollector::new(events);
    let stats_view = collector.handle();
    tokio::spawn(collector.run());

    tokio::select! {
        res = server::run(&cfg, stats) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            let snapshot = stats_view.snapshot().await;
            tracing::info!(
                active = snapshot.active_connections,
                total = snapshot.total_connections,
                bytes = snapshot.bytes_served,
                "Shutdown signal received"
            );
        }
    }

    Ok(())
}
