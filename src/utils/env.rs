/// Get environment variable with WARDEN_ prefix, falling back to unprefixed version
///
/// Checks `WARDEN_{key}` first, then `{key}`.
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("WARDEN_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}
