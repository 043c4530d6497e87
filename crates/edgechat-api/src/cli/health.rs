//! `edgechat health` - probe the configured completion API.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Result, bail};
use console::style;
use serde::Serialize;

use edgechat_core::llm::provider::CompletionProvider;

use crate::state::AppState;

/// Outcome of one probe, printed as-is with `--json`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub provider: String,
    pub model: String,
    pub healthy: bool,
    pub elapsed_ms: u64,
    pub data_dir: PathBuf,
}

/// Send the provider's health probe and time it.
pub async fn probe(state: &AppState) -> HealthReport {
    let provider = state.resolver.provider();
    let start = Instant::now();
    let healthy = provider.health_check().await;

    HealthReport {
        provider: provider.name().to_string(),
        model: state.config.ai.model.clone(),
        healthy,
        elapsed_ms: start.elapsed().as_millis() as u64,
        data_dir: state.data_dir.clone(),
    }
}

pub async fn health(state: &AppState, json: bool) -> Result<()> {
    let report = probe(state).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mark = if report.healthy {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!();
        println!(
            "  {} {} ({}) in {}ms",
            mark,
            style(&report.provider).cyan(),
            report.model,
            report.elapsed_ms
        );
        println!(
            "  {}",
            style(format!("data: {}", report.data_dir.display())).dim()
        );
        println!();
    }

    if !report.healthy {
        bail!("completion API at {} is not healthy", state.config.ai.api_url);
    }
    Ok(())
}
