//! Step catalog reader port.
//!
//! The catalog is seeded by migrations and never mutated at runtime, so the
//! port is read-only.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::pipeline::StepCatalog;

/// Reader port for the static pipeline step catalog.
#[async_trait]
pub trait StepCatalogReader: Send + Sync {
    /// Load every step, ordered by `step_order`.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` prefixed with "Could not fetch pipeline steps"
    async fn load_catalog(&self) -> Result<StepCatalog, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_catalog_reader_is_object_safe() {
        fn _accepts_dyn(_reader: &dyn StepCatalogReader) {}
    }
}
