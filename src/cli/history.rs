use super::context::{parse_identity, CliContext};
use super::register::anchoring_label;
use serde::Serialize;
use storyproof::ledger::{Checkpoint, CheckpointHistory};

#[derive(Serialize)]
struct VersionEntry<'a> {
    version: usize,
    #[serde(flatten)]
    checkpoint: &'a Checkpoint,
}

/// Show an identity's checkpoint history
pub async fn execute(
    identity: String,
    newest_first: bool,
    json: bool,
    config: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let identity = parse_identity(&identity)?;
    let ctx = CliContext::open(config).await?;
    let history = ctx.service.list_history(&identity).await;
    ctx.close().await;
    let history = history?;

    if json {
        println!("{}", render_json(&history, newest_first)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No checkpoints for {}", identity);
        return Ok(());
    }

    println!("📜 {} checkpoint(s) for {}", history.len(), identity);
    println!();
    for (version, checkpoint) in ordered(&history, newest_first) {
        let note = if checkpoint.note.is_empty() {
            "(no note)"
        } else {
            checkpoint.note.as_str()
        };
        println!("  v{}  {}  {}", version, checkpoint.created_at, note);
        println!("      hash: {}", checkpoint.address);
        println!(
            "      {} via {}",
            anchoring_label(checkpoint.anchoring()),
            checkpoint.locator
        );
    }
    Ok(())
}

fn ordered(history: &CheckpointHistory, newest_first: bool) -> Vec<(usize, &Checkpoint)> {
    if newest_first {
        history.newest_first().collect()
    } else {
        history.iter().collect()
    }
}

fn render_json(
    history: &CheckpointHistory,
    newest_first: bool,
) -> Result<String, serde_json::Error> {
    let entries: Vec<VersionEntry> = ordered(history, newest_first)
        .into_iter()
        .map(|(version, checkpoint)| VersionEntry {
            version,
            checkpoint,
        })
        .collect();
    serde_json::to_string_pretty(&entries)
}
