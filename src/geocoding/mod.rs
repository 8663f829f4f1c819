//! Postal code to coordinate lookup.

pub mod zippopotam;

use async_trait::async_trait;

use crate::models::ResolvedLocation;

pub use zippopotam::ZippopotamResolver;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("postal code lookup failed: {0}")]
    LookupFailed(String),
    #[error("lookup result has no usable coordinate")]
    MissingCoordinate,
    #[error("lookup result has no city")]
    MissingCity,
    #[error("lookup result has no region")]
    MissingRegion,
}

/// Forward geocoding for a postal code.
///
/// Implementations make a single attempt; callers own any retry policy.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self, postal_code: &str) -> Result<ResolvedLocation, ResolveError>;
}
