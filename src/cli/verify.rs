use std::path::Path;
use storyproof::service::verify_content;

/// Check a file against a claimed hash
///
/// Purely local: the file is hashed and compared, nothing is read from or
/// written to the store.
pub fn execute(file: String, hash: String) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(&file);
    let bytes = std::fs::read(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;

    let result = verify_content(&bytes, &hash);
    if result.matches {
        println!("✅ {} matches", file);
        println!("  Hash: {}", result.computed);
        Ok(())
    } else {
        println!("❌ {} does not match", file);
        println!("  Expected: {}", hash.trim().to_lowercase());
        println!("  Computed: {}", result.computed);
        Err("Hash mismatch".into())
    }
}
