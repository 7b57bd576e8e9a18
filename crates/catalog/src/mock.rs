//! In-memory lookup for testing.

use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::lookup::MetadataLookup;
use crate::models::CatalogRecord;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory [`MetadataLookup`] for testing.
///
/// Knows a fixed set of records, can be told to fail for specific
/// identifiers, and remembers every identifier it was asked about (in call
/// order) so tests can assert on sequencing.
///
/// # Examples
///
/// ```
/// use dlren_catalog::{CatalogRecord, MetadataLookup, MockLookup};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let id = "RJ123456".parse().unwrap();
/// let lookup = MockLookup::with_records([CatalogRecord::new(id).with_title("Title")]);
/// let found = lookup.lookup(&"RJ123456".parse().unwrap()).await.unwrap();
/// assert_eq!(found.unwrap().title, "Title");
/// assert!(lookup.lookup(&"RJ000000".parse().unwrap()).await.unwrap().is_none());
/// assert_eq!(lookup.calls().len(), 2);
/// # }
/// ```
#[derive(Default)]
pub struct MockLookup {
    records: HashMap<Identifier, CatalogRecord>,
    failing: HashSet<Identifier>,
    calls: Mutex<Vec<Identifier>>,
}

impl MockLookup {
    pub fn with_records(records: impl IntoIterator<Item = CatalogRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.identifier.clone(), r)).collect(),
            ..Self::default()
        }
    }

    /// Makes every lookup of `identifier` fail with [`ErrorKind::Request`].
    ///
    /// Panics if `identifier` isn't a valid identifier. If test setup is
    /// wrong, then test should not pass.
    pub fn failing(mut self, identifier: &str) -> Self {
        let Ok(identifier) = identifier.parse() else {
            panic!("MockLookup::failing: invalid identifier {identifier}");
        };
        self.failing.insert(identifier);
        self
    }

    /// Identifiers looked up so far, in call order.
    pub fn calls(&self) -> Vec<Identifier> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MetadataLookup for MockLookup {
    fn name(&self) -> &str {
        "mock"
    }

    async fn lookup(&self, identifier: &Identifier) -> Result<Option<CatalogRecord>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(identifier.clone());
        }
        if self.failing.contains(identifier) {
            exn::bail!(ErrorKind::Request(format!("simulated failure for {identifier}")));
        }
        Ok(self.records.get(identifier).cloned())
    }
}
