// ID Provider Port (for deterministic testing)

/// ID provider interface (allows deterministic names in tests)
pub trait IdProvider: Send + Sync {
    /// Generate a short unique token, safe for file names
    fn generate_id(&self) -> String;
}

/// UUID v4 provider (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}
