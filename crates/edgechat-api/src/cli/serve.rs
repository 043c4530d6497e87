//! `edgechat serve` - run the REST API with a periodic expiry sweep.

use std::time::Duration;

use anyhow::Result;
use console::style;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::http::router::build_router;
use crate::state::AppState;

/// Bind, serve until Ctrl+C or SIGTERM, then stop the sweeper.
pub async fn serve(state: AppState, host: &str, port: u16, sweep_interval_secs: u64) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} edgechat API listening on {}",
        style("⚡").bold(),
        style(format!("http://{addr}")).cyan()
    );
    println!("  {}", style("Press Ctrl+C to stop").dim());

    let cancel = CancellationToken::new();
    let sweeper = (sweep_interval_secs > 0).then(|| {
        tokio::spawn(run_sweeper(
            state.clone(),
            Duration::from_secs(sweep_interval_secs),
            cancel.child_token(),
        ))
    });

    let router = build_router(state.clone());
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            warn!(error = %e, "sweeper task ended abnormally");
        }
    }
    state.db_pool.close().await;

    println!("\n  Server stopped.");
    Ok(())
}

async fn run_sweeper(state: AppState, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => sweep_once(&state).await,
        }
    }
}

/// One pass: stale rate limit windows, then expired rows in both namespaces.
pub async fn sweep_once(state: &AppState) {
    let report = state.resolver.rate_limiter().sweep_expired(None).await;

    let mut purged = 0;
    for store in [&state.rate_store, &state.session_store] {
        match store.purge_expired().await {
            Ok(n) => purged += n,
            Err(e) => warn!(namespace = store.namespace(), error = %e, "expiry purge failed"),
        }
    }

    info!(
        scanned = report.scanned,
        deleted = report.deleted,
        errors = report.errors,
        purged,
        "background sweep finished"
    );
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
