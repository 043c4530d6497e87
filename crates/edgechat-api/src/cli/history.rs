//! `edgechat history` - print a stored conversation.

use anyhow::{Context, Result};
use console::style;

use edgechat_types::chat::MessageRole;

use crate::state::AppState;

pub async fn show_history(state: &AppState, session_id: &str, json: bool) -> Result<()> {
    let session = state
        .resolver
        .get_chat_history(session_id)
        .await
        .with_context(|| format!("Failed to load session '{session_id}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    let Some(session) = session else {
        println!();
        println!(
            "  {} Session '{}' not found (it may have expired).",
            style("i").blue().bold(),
            style(session_id).cyan()
        );
        println!();
        return Ok(());
    };

    println!();
    println!("  {}", style(&session.title).bold());
    println!(
        "  {}",
        style(format!(
            "{} message(s), created {}, updated {}",
            session.messages.len(),
            session.created_at.format("%Y-%m-%d %H:%M"),
            session.updated_at.format("%Y-%m-%d %H:%M")
        ))
        .dim()
    );
    println!();

    for message in &session.messages {
        let who = match message.role {
            MessageRole::User => style("you").green().bold(),
            MessageRole::Assistant if message.error => style("assistant").red().bold(),
            MessageRole::Assistant => style("assistant").cyan().bold(),
        };
        println!(
            "  {} {}",
            who,
            style(message.timestamp.format("%H:%M:%S")).dim()
        );
        for line in message.content.lines() {
            println!("    {line}");
        }
        println!();
    }

    Ok(())
}
