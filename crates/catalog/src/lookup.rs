use crate::error::Result;
use crate::identifier::Identifier;
use crate::models::CatalogRecord;
use async_trait::async_trait;
use std::sync::Arc;

/// Shared handle to whichever lookup implementation was configured.
pub type LookupHandle = Arc<dyn MetadataLookup + Send + Sync>;

/// Resolves product identifiers to catalog metadata.
///
/// The pipeline calls this exactly once per identifier per scan and never
/// concurrently, so implementations don't need to rate limit themselves.
/// Implementations should not retry internally either.
///
/// # Results
/// - `Ok(Some(record))`: the catalog knows the product.
/// - `Ok(None)`: the catalog answered, and it doesn't know the product.
/// - `Err(_)`: the catalog could not be asked (transport, bad response, ...).
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Name of the lookup, used for logging only.
    fn name(&self) -> &str;

    async fn lookup(&self, identifier: &Identifier) -> Result<Option<CatalogRecord>>;
}
