//! [`MetadataLookup`] backed by the DLsite product-info endpoint.
//!
//! `GET {endpoint}?product_id=RJ123456` answers with a JSON object keyed by
//! the product id:
//!
//! ```json
//! {
//!   "RJ123456": {
//!     "work_name": "Title",
//!     "maker_name": "Circle",
//!     "regist_date": "2021-03-04 00:00:00",
//!     "cvs": [{ "name": "Someone" }]
//!   }
//! }
//! ```
//!
//! Unknown products come back as an empty array (`[]`) rather than a 404.

use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::lookup::MetadataLookup;
use crate::models::CatalogRecord;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use time::Date;
use time::macros::format_description;
use tracing::instrument;

pub const DEFAULT_ENDPOINT: &str = "https://www.dlsite.com/maniax/product/info/ajax";
pub const DEFAULT_USER_AGENT: &str = concat!("dlren/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the DLsite catalog.
///
/// The inner [`Client`] is connection-pooled, so build one of these per
/// process and share it through a [`LookupHandle`](crate::LookupHandle).
#[derive(Clone)]
pub struct DlsiteLookup {
    client: Client,
    endpoint: String,
}

impl DlsiteLookup {
    /// # Errors
    /// Returns [`ErrorKind::Request`] if the HTTP client cannot be built
    /// (e.g. no TLS backend available).
    pub fn new(endpoint: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ErrorKind::Request(e.to_string()))?;
        Ok(Self { client, endpoint: endpoint.into() })
    }

    /// Turns a response body into a record, or `None` when the body says the
    /// catalog doesn't know `identifier`.
    fn parse(identifier: &Identifier, body: &str) -> Result<Option<CatalogRecord>> {
        let root: Value = serde_json::from_str(body).map_err(|e| ErrorKind::Decode(e.to_string()))?;
        // Unknown products are reported as `[]`, not as an object.
        let Some(product) = root.as_object().and_then(|o| o.get(identifier.as_str())) else {
            return Ok(None);
        };
        let info = ProductInfo::deserialize(product).map_err(|e| ErrorKind::Decode(e.to_string()))?;
        Ok(Some(info.into_record(identifier.clone())))
    }
}

#[async_trait]
impl MetadataLookup for DlsiteLookup {
    fn name(&self) -> &str {
        "dlsite"
    }

    #[instrument(skip_all, fields(identifier = %identifier))]
    async fn lookup(&self, identifier: &Identifier) -> Result<Option<CatalogRecord>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("product_id", identifier.as_str())])
            .send()
            .await
            .map_err(|e| ErrorKind::Request(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        let body = response.text().await.map_err(|e| ErrorKind::Request(e.to_string()))?;
        let record = Self::parse(identifier, &body)?;
        tracing::debug!(found = record.is_some(), "catalog lookup complete");
        Ok(record)
    }
}

/// The subset of the product-info payload that naming cares about. Every
/// field is optional; the service is not consistent about including them.
#[derive(Deserialize)]
struct ProductInfo {
    #[serde(default)]
    work_name: Option<String>,
    #[serde(default)]
    maker_name: Option<String>,
    #[serde(default)]
    regist_date: Option<String>,
    #[serde(default)]
    cvs: Option<Vec<CastMember>>,
}

#[derive(Deserialize)]
struct CastMember {
    #[serde(default)]
    name: Option<String>,
}

impl ProductInfo {
    fn into_record(self, identifier: Identifier) -> CatalogRecord {
        let cast = self.cvs.unwrap_or_default().into_iter().filter_map(|cv| cv.name);
        CatalogRecord::new(identifier)
            .with_title(self.work_name.unwrap_or_default())
            .with_publisher(self.maker_name.unwrap_or_default())
            .with_release_date(self.regist_date.as_deref().and_then(parse_date))
            .with_voice_cast(cast)
    }
}

/// Parses the date part of `"YYYY-MM-DD hh:mm:ss"`. The time is ignored.
fn parse_date(value: &str) -> Option<Date> {
    let date = value.trim().get(..10)?;
    Date::parse(date, format_description!("[year]-[month]-[day]")).ok()
}
