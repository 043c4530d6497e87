//! `edgechat sweep` - one-off cleanup of stale rate limit windows.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Sweep rate limit records (optionally for one client) and purge expired rows.
///
/// # Examples
///
/// ```bash
/// edgechat sweep
/// edgechat sweep --client 203.0.113.7 --json
/// ```
pub async fn sweep(state: &AppState, client: Option<&str>, json: bool) -> Result<()> {
    let report = state.resolver.rate_limiter().sweep_expired(client).await;
    let purged_rate = state.rate_store.purge_expired().await?;
    let purged_sessions = state.session_store.purge_expired().await?;

    if json {
        let out = serde_json::json!({
            "client": client,
            "scanned": report.scanned,
            "deleted": report.deleted,
            "errors": report.errors,
            "purged": {
                "rate_limits": purged_rate,
                "sessions": purged_sessions,
            },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Swept {} rate limit record(s), deleted {}",
        style("✓").green().bold(),
        style(report.scanned).cyan(),
        style(report.deleted).cyan()
    );
    println!(
        "  {} Purged {} expired rate limit row(s) and {} expired session(s)",
        style("✓").green().bold(),
        purged_rate,
        purged_sessions
    );
    if report.errors > 0 {
        println!(
            "  {} {} record(s) could not be processed (see logs)",
            style("!").yellow().bold(),
            report.errors
        );
    }
    println!();
    Ok(())
}
