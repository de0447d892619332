use anyhow::Context;
use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shopsite::app;
use shopsite::config::Args;
use shopsite::seed;
use shopsite::state::AppState;
use shopsite::throttle::throttle_sweeper;

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse cli arguments
    let args = Args::parse();

    // creating shared state
    let state = Arc::new(AppState::from_args(&args));
    seed::run(&state.store, &args).await?;

    // spawn the background sweeper
    tokio::spawn(throttle_sweeper(state.throttle.clone(), args.sweep_interval()));

    let app = app(state);

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!("Shop back office running on http://{}", addr);
    info!(
        "Throttle: one request per {:?} per client address (entries evicted after {:?} idle)",
        args.throttle_interval(),
        args.throttle_ttl()
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("server error")?;

    Ok(())
}
