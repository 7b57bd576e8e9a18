//! Catalog side of dlren: product identifiers embedded in file names, the
//! metadata records the remote catalog holds for them, and the
//! [`MetadataLookup`] contract used to fetch those records.

#[cfg(feature = "http")]
mod dlsite;
pub mod error;
mod identifier;
mod lookup;
#[cfg(feature = "mock")]
mod mock;
mod models;

#[cfg(feature = "http")]
pub use crate::dlsite::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, DlsiteLookup};
pub use crate::identifier::{Identifier, PREFIXES};
pub use crate::lookup::{LookupHandle, MetadataLookup};
#[cfg(feature = "mock")]
pub use crate::mock::MockLookup;
pub use crate::models::CatalogRecord;
