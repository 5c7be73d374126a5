use super::context::{parse_identity, CliContext};
use storyproof::service::ClaimedProof;

/// Re-check a stored checkpoint: proof fields and ownership
pub async fn execute(
    identity: String,
    version: usize,
    config: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let identity = parse_identity(&identity)?;
    let ctx = CliContext::open(config).await?;

    let outcome = async {
        let history = ctx.service.list_history(&identity).await?;
        let checkpoint = history
            .version(version)
            .ok_or_else(|| {
                format!(
                    "No version {} for {} ({} checkpoint(s))",
                    version,
                    identity,
                    history.len()
                )
            })?
            .clone();

        let proof = ClaimedProof::from(&checkpoint);
        let proof_ok = ctx
            .service
            .verify_proof(&checkpoint.address, &checkpoint.locator, &proof)
            .await;
        let owner_ok = ctx.service.verify_ownership(&checkpoint, &identity).await;
        Ok::<_, Box<dyn std::error::Error>>((proof_ok, owner_ok))
    }
    .await;
    ctx.close().await;
    let (proof_ok, owner_ok) = outcome?;

    println!("🔍 Version {} for {}", version, identity);
    println!("  Proof:     {}", mark(proof_ok));
    println!("  Ownership: {}", mark(owner_ok));

    if proof_ok && owner_ok {
        Ok(())
    } else {
        Err("Verification failed".into())
    }
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✅ valid"
    } else {
        "❌ invalid"
    }
}
