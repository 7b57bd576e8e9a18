//! Candidate entries: one file or folder that carries a product identifier.

use derive_more::Display;
use dlren_catalog::{CatalogRecord, Identifier};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// What kind of entry is being renamed; decides how it is moved.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    #[display("folder")]
    Folder,
    #[display("zip")]
    Zip,
    #[display("rar")]
    Rar,
}

impl EntryKind {
    /// Archive kind for a file name, matched on its extension ignoring case.
    pub fn of_archive(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("zip") {
            Some(Self::Zip)
        } else if extension.eq_ignore_ascii_case("rar") {
            Some(Self::Rar)
        } else {
            None
        }
    }

    pub fn is_archive(self) -> bool {
        !matches!(self, Self::Folder)
    }
}

/// Where an entry stands in the pipeline.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Not looked up yet.
    #[display("pending")]
    Pending,
    /// The lookup failed or found nothing.
    #[display("failed")]
    Failed,
    /// Looked up, but the template rendered an empty name.
    #[display("unnamed")]
    Unnamed,
    #[display("ready")]
    Ready,
}

/// A file or folder whose name contains a product identifier.
///
/// Created by the scan stage and resolved exactly once by the enrich stage,
/// which either attaches a catalog record and a rendered name, or a failure.
/// Never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    original_path: PathBuf,
    original_name: String,
    kind: EntryKind,
    identifier: Identifier,
    metadata: Option<CatalogRecord>,
    rendered_name: Option<String>,
    failure: Option<String>,
}

impl CandidateEntry {
    /// A pending entry for `path`, if its base name (the file stem for
    /// archives, the directory name for folders) contains an identifier.
    pub fn from_path(path: impl Into<PathBuf>, kind: EntryKind) -> Option<Self> {
        let original_path = path.into();
        let name = match kind {
            EntryKind::Folder => original_path.file_name(),
            EntryKind::Zip | EntryKind::Rar => original_path.file_stem(),
        };
        let original_name = name?.to_string_lossy().into_owned();
        let identifier = Identifier::extract(&original_name)?;
        Some(Self {
            original_path,
            original_name,
            kind,
            identifier,
            metadata: None,
            rendered_name: None,
            failure: None,
        })
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn metadata(&self) -> Option<&CatalogRecord> {
        self.metadata.as_ref()
    }

    pub fn rendered_name(&self) -> Option<&str> {
        self.rendered_name.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn status(&self) -> EntryStatus {
        match (&self.failure, &self.rendered_name) {
            (Some(_), _) => EntryStatus::Failed,
            (None, None) => EntryStatus::Pending,
            (None, Some(name)) if name.is_empty() => EntryStatus::Unnamed,
            (None, Some(_)) => EntryStatus::Ready,
        }
    }

    /// Attach the catalog record and the name rendered from it.
    pub(crate) fn resolve(&mut self, record: CatalogRecord, rendered_name: String) {
        self.metadata = Some(record);
        self.rendered_name = Some(rendered_name);
        self.failure = None;
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.metadata = None;
        self.rendered_name = None;
        self.failure = Some(reason.into());
    }

    /// New file or folder name: the rendered name, plus the original
    /// extension (case preserved) for archives.
    ///
    /// `None` unless the entry is [`Ready`](EntryStatus::Ready).
    pub fn destination_name(&self) -> Option<OsString> {
        if self.status() != EntryStatus::Ready {
            return None;
        }
        let mut name = OsString::from(self.rendered_name.as_deref()?);
        if self.kind.is_archive()
            && let Some(extension) = self.original_path.extension()
        {
            name.push(".");
            name.push(extension);
        }
        Some(name)
    }
}
