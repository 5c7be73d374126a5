use super::context::CliContext;
use std::path::Path;
use storyproof::hashing::ContentAddress;

/// Write the stored copy of a registered file to `output`
pub async fn execute(
    hash: String,
    output: String,
    config: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let address =
        ContentAddress::from_hex(&hash).map_err(|e| format!("Invalid hash '{}': {}", hash, e))?;

    let ctx = CliContext::open(config).await?;
    let stored = ctx.service.retrieve_file(&address).await;
    ctx.close().await;

    let stored = stored?.ok_or_else(|| {
        format!(
            "No stored file for {}. It may have been registered on another device.",
            address
        )
    })?;

    let output = Path::new(&output);
    std::fs::write(output, &stored.bytes)
        .map_err(|e| format!("Failed to write '{}': {}", output.display(), e))?;

    println!("✅ Wrote {} ({} bytes) to {}", stored.name, stored.size, output.display());
    Ok(())
}
