use anyhow::{Context, Result};
use leaderboard_proxy::config::{Campaign, Config};
use leaderboard_proxy::logging::{log, log_startup, obj, v_str, Domain, Level};
use leaderboard_proxy::server::{router, AppState};
use leaderboard_proxy::upstream::HttpLeaderboardSource;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let campaign = Campaign::somnia()?;
    let source = HttpLeaderboardSource::new(campaign.upstream_url.clone(), cfg.upstream_timeout)
        .context("building upstream client")?;

    log_startup(
        &cfg.bind_addr.to_string(),
        source.url().as_str(),
        cfg.upstream_timeout.as_millis() as u64,
    );

    let app = router(AppState::new(campaign, source));
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    log(Level::Info, Domain::System, "shutdown", obj(&[("msg", v_str("server stopped"))]));
    Ok(())
}
