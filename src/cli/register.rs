use super::context::{parse_identity, CliContext};
use std::path::Path;
use storyproof::ledger::{Anchoring, Checkpoint};
use storyproof::service::FileUpload;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Register a file as a new checkpoint
pub async fn execute(
    file: String,
    identity: String,
    note: String,
    mime_type: Option<String>,
    config: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let identity = parse_identity(&identity)?;
    let path = Path::new(&file);
    let bytes = std::fs::read(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.clone());
    let upload = FileUpload::new(
        name,
        mime_type.unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
        bytes,
    );

    let ctx = CliContext::open(config).await?;
    let result = ctx.service.register(upload, &identity, &note).await;
    let history_len = match &result {
        Ok(_) => ctx
            .service
            .list_history(&identity)
            .await
            .map(|h| h.len())
            .unwrap_or(0),
        Err(_) => 0,
    };
    ctx.close().await;
    let checkpoint = result?;

    println!("✅ Registered version {} of {}", history_len, file);
    println!();
    print_checkpoint(&checkpoint);
    Ok(())
}

pub fn print_checkpoint(checkpoint: &Checkpoint) {
    println!("  File hash:   {}", checkpoint.address);
    println!("  Locator:     {}", checkpoint.locator);
    println!("  Commitment:  {}", checkpoint.commitment);
    if let Some(claim_id) = checkpoint.claim_id() {
        println!("  Claim:       {}", claim_id);
    }
    if let Some(tx_hash) = checkpoint.tx_hash() {
        println!("  Transaction: {}", tx_hash);
    }
    println!("  Anchoring:   {}", anchoring_label(checkpoint.anchoring()));
}

pub fn anchoring_label(anchoring: Anchoring) -> &'static str {
    match anchoring {
        Anchoring::OnChain => "on chain",
        Anchoring::ClaimBacked => "claim on chain",
        Anchoring::LocalOnly => "local only",
    }
}
