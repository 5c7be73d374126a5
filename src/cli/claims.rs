use super::context::{parse_identity, CliContext};

/// List an identity's ownership claims
pub async fn execute(identity: String, config: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let identity = parse_identity(&identity)?;
    let ctx = CliContext::open(config).await?;
    let claims = ctx.service.list_claims(&identity).await;
    ctx.close().await;
    let claims = claims?;

    if claims.is_empty() {
        println!("No ownership claims for {}", identity);
        return Ok(());
    }

    println!("📄 {} claim(s) for {}", claims.len(), identity);
    println!();
    for claim in &claims {
        let tier = if claim.proof.is_on_chain() {
            "on chain"
        } else {
            "local"
        };
        println!("  {}  [{}]", claim.claim_id, tier);
        println!("      {} ({})", claim.metadata.name, claim.metadata.description);
        println!("      hash: {}", claim.address);
        println!("      proof: {}", claim.proof.reference());
    }
    Ok(())
}
