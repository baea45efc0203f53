//! Secret store trait

/// Read access to secrets such as model API keys
///
/// The key can be a provider name (`"gemini"`), which the store maps to its
/// own naming scheme, or a direct key (`"GEMINI_API_KEY"`).
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a secret by key
    fn get(&self, key: &str) -> Option<String>;

    /// Check if a secret exists
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
