/// Shorten a secret for display: first four characters followed by "…",
/// or "…" alone when the key is too short to reveal a prefix.
pub fn mask_key(key: &str) -> String {
    if key.chars().count() <= 4 {
        "…".to_string()
    } else {
        let prefix: String = key.chars().take(4).collect();
        format!("{}…", prefix)
    }
}


/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
