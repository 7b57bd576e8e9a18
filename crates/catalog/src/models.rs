use crate::identifier::Identifier;
use time::Date;

/// Metadata the catalog holds for one product.
///
/// Produced by a [`MetadataLookup`](crate::MetadataLookup) and consumed
/// read-only by the renaming pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    /// Identifier the record was looked up with
    pub identifier: Identifier,
    /// Product title (may be empty if the catalog omitted it)
    pub title: String,
    /// Publisher, i.e. the circle that released the product
    pub publisher: String,
    /// Release date, if the catalog provided a parseable one
    pub release_date: Option<Date>,
    /// Voice cast, in catalog order
    pub voice_cast: Vec<String>,
}

impl CatalogRecord {
    /// An otherwise empty record for `identifier`.
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            title: String::new(),
            publisher: String::new(),
            release_date: None,
            voice_cast: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    pub fn with_release_date(mut self, date: impl Into<Option<Date>>) -> Self {
        self.release_date = date.into();
        self
    }

    pub fn with_voice_cast(mut self, cast: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.voice_cast = cast.into_iter().map(Into::into).collect();
        self
    }
}
