/// Display version information
pub fn execute() {
    println!("storyproof {}", env!("CARGO_PKG_VERSION"));
    println!("Tamper-evident version checkpoints for creative files");
}
