use super::context::{parse_identity, CliContext};
use std::io::{self, Write};

/// Remove an identity's local checkpoint history
///
/// Claims and stored file copies are kept.
pub async fn execute(
    identity: String,
    yes: bool,
    config: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let identity = parse_identity(&identity)?;

    if !yes {
        print!(
            "⚠️  This deletes the local checkpoint history for {}. Continue? [y/N] ",
            identity
        );
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Aborted");
            return Ok(());
        }
    }

    let ctx = CliContext::open(config).await?;
    let result = ctx.service.clear_history(&identity).await;
    ctx.close().await;
    result?;

    println!("✅ History cleared for {}", identity);
    Ok(())
}
