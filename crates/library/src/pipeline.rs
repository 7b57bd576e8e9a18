//! Sequencing of the scan, enrich and rename stages.

use crate::enrich::enrich;
use crate::entry::CandidateEntry;
use crate::error::{ErrorKind, Result};
use crate::events::{Event, Reporter};
use crate::rename::{Summary, rename_all};
use crate::scan::scan;
use crate::template::NameTemplate;
use dlren_catalog::LookupHandle;
use dlren_storage::BackendHandle;
use exn::ResultExt;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Everything the stages need, bundled together.
///
/// The stages are exposed one by one so the caller can sit between
/// [`enrich`](Self::enrich) and [`rename`](Self::rename) (to preview the new
/// names and ask for confirmation); [`run`](Self::run) chains all three.
///
/// # Examples
///
/// ```no_run
/// use dlren_catalog::LookupHandle;
/// use dlren_library::{NameTemplate, Pipeline, Reporter};
/// use dlren_storage::backend::LocalBackend;
/// use std::{path::Path, sync::Arc};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(lookup: LookupHandle) -> dlren_library::error::Result<()> {
/// let pipeline = Pipeline::new(
///     Arc::new(LocalBackend::new("local")),
///     lookup,
///     NameTemplate::default(),
///     Reporter::silent(),
///     CancellationToken::new(),
/// );
/// let summary = pipeline.run(Path::new("/downloads"), false, |entries| !entries.is_empty()).await?;
/// println!("{} renamed", summary.renamed);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    backend: BackendHandle,
    lookup: LookupHandle,
    template: NameTemplate,
    reporter: Reporter,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(
        backend: BackendHandle,
        lookup: LookupHandle,
        template: NameTemplate,
        reporter: Reporter,
        cancel: CancellationToken,
    ) -> Self {
        Self { backend, lookup, template, reporter, cancel }
    }

    /// Token that stops the pipeline before its next item.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Finds the candidate entries below `root`.
    pub async fn scan(&self, root: &Path, recursive: bool) -> Result<Vec<CandidateEntry>> {
        self.reporter.send(Event::Started { root: root.to_path_buf(), recursive });
        self.reporter.log(format!("scanning {}", root.display()));
        let entries = scan(&self.backend, root, recursive).await.or_raise(|| ErrorKind::Scan)?;
        self.reporter.log(format!("found {} entries", entries.len()));
        self.reporter.send(Event::Discovered(entries.clone()));
        Ok(entries)
    }

    /// Looks up every entry and renders its new name.
    pub async fn enrich(&self, entries: Vec<CandidateEntry>) -> Vec<CandidateEntry> {
        let entries = enrich(entries, &self.lookup, &self.template, &self.reporter, &self.cancel).await;
        self.reporter.send(Event::Enriched(entries.clone()));
        entries
    }

    /// Moves every ready entry to its new name.
    pub async fn rename(&self, entries: Vec<CandidateEntry>) -> Summary {
        let summary = rename_all(&self.backend, entries, &self.reporter, &self.cancel).await;
        self.finish(summary)
    }

    /// Ends the batch without renaming anything, e.g. when the user
    /// declined or the batch was cancelled during lookups. The summary still
    /// counts the failed lookups.
    pub fn abandon(&self, entries: &[CandidateEntry]) -> Summary {
        let cancelled = self.cancel.is_cancelled();
        if !cancelled {
            self.reporter.log("nothing renamed");
        }
        self.finish(Summary { failed: count_failed(entries), cancelled, ..Summary::default() })
    }

    /// Scans, enriches, then renames unless `confirm` (shown the enriched
    /// entries) declines, or the batch was cancelled during lookups.
    pub async fn run<F>(&self, root: &Path, recursive: bool, confirm: F) -> Result<Summary>
    where
        F: FnOnce(&[CandidateEntry]) -> bool,
    {
        let entries = self.scan(root, recursive).await?;
        let entries = self.enrich(entries).await;
        if self.cancel.is_cancelled() || !confirm(&entries) {
            return Ok(self.abandon(&entries));
        }
        Ok(self.rename(entries).await)
    }

    fn finish(&self, summary: Summary) -> Summary {
        self.reporter.send(Event::Summary(summary.clone()));
        summary
    }
}

fn count_failed(entries: &[CandidateEntry]) -> usize {
    entries.iter().filter(|e| e.failure().is_some()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryStatus;
    use crate::events::Stage;
    use crate::rename::Outcome;
    use dlren_catalog::{CatalogRecord, Identifier, MockLookup};
    use dlren_storage::StorageBackend;
    use dlren_storage::backend::MockBackend;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn record(id: &str, title: &str, publisher: &str) -> CatalogRecord {
        CatalogRecord::new(id.parse::<Identifier>().unwrap()).with_title(title).with_publisher(publisher)
    }

    struct Fixture {
        pipeline: Pipeline,
        backend: Arc<MockBackend>,
        lookup: Arc<MockLookup>,
        events: UnboundedReceiver<Event>,
    }

    fn fixture(backend: MockBackend, lookup: MockLookup) -> Fixture {
        let backend = Arc::new(backend);
        let lookup = Arc::new(lookup);
        let (reporter, events) = Reporter::channel();
        let pipeline =
            Pipeline::new(backend.clone(), lookup.clone(), NameTemplate::default(), reporter, CancellationToken::new());
        Fixture { pipeline, backend, lookup, events }
    }

    fn drain(events: &mut UnboundedReceiver<Event>) -> Vec<Event> {
        let mut drained = Vec::new();
        while let Ok(event) = events.try_recv() {
            drained.push(event);
        }
        drained
    }

    #[tokio::test]
    async fn test_lookup_failure_is_isolated() {
        let mut fx = fixture(
            MockBackend::with_files(["/lib/RJ000001.zip", "/lib/RJ000002.zip", "/lib/RJ000003.zip"]),
            MockLookup::with_records([record("RJ000001", "One", "A"), record("RJ000003", "Three", "C")])
                .failing("RJ000002"),
        );

        let summary = fx.pipeline.run(Path::new("/lib"), false, |_| true).await.unwrap();

        assert_eq!((summary.renamed, summary.skipped, summary.failed), (2, 0, 1));
        assert!(!summary.cancelled);
        assert_eq!(
            fx.backend.paths().await,
            vec![
                PathBuf::from("/lib"),
                PathBuf::from("/lib/RJ000002.zip"),
                PathBuf::from("/lib/[RJ000001] [A] One.zip"),
                PathBuf::from("/lib/[RJ000003] [C] Three.zip"),
            ]
        );
        assert_eq!(
            fx.lookup.calls().iter().map(Identifier::as_str).collect::<Vec<_>>(),
            vec!["RJ000001", "RJ000002", "RJ000003"]
        );

        let events = drain(&mut fx.events);
        assert!(matches!(events.first(), Some(Event::Started { recursive: false, .. })));
        assert!(matches!(events.last(), Some(Event::Summary(s)) if *s == summary));
        let renamed: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::Renamed(outcome) => Some(outcome.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(renamed, summary.log);
        let progress = events.iter().filter(|e| matches!(e, Event::Progress { stage: Stage::Rename, .. })).count();
        assert_eq!(progress, 2);
    }

    #[tokio::test]
    async fn test_declined_confirmation_renames_nothing() {
        let fx = fixture(
            MockBackend::with_files(["/lib/RJ000001.zip"]),
            MockLookup::with_records([record("RJ000001", "One", "A")]),
        );
        let mut seen = Vec::new();

        let summary = fx
            .pipeline
            .run(Path::new("/lib"), false, |entries| {
                seen = entries.iter().map(CandidateEntry::status).collect();
                false
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![EntryStatus::Ready]);
        assert_eq!(summary, Summary::default());
        assert!(fx.backend.exists(Path::new("/lib/RJ000001.zip")).await.unwrap());
    }

    #[tokio::test]
    async fn test_cancelled_during_lookups_renames_nothing() {
        let fx = fixture(
            MockBackend::with_files(["/lib/RJ000001.zip", "/lib/RJ000002.zip"]),
            MockLookup::with_records([record("RJ000001", "One", "A"), record("RJ000002", "Two", "B")]),
        );
        let entries = fx.pipeline.scan(Path::new("/lib"), false).await.unwrap();
        fx.pipeline.cancel_token().cancel();

        let entries = fx.pipeline.enrich(entries).await;
        assert!(entries.iter().all(|e| e.status() == EntryStatus::Pending));
        let summary = fx.pipeline.rename(entries).await;

        assert!(summary.log.is_empty());
        assert_eq!(summary.renamed, 0);
        assert!(fx.lookup.calls().is_empty());
        assert_eq!(fx.backend.paths().await.len(), 3);
    }

    #[tokio::test]
    async fn test_run_when_cancelled() {
        let fx = fixture(
            MockBackend::with_files(["/lib/RJ000001.zip"]),
            MockLookup::with_records([record("RJ000001", "One", "A")]),
        );
        fx.pipeline.cancel_token().cancel();

        let summary = fx.pipeline.run(Path::new("/lib"), false, |_| panic!("should not ask")).await.unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.renamed, 0);
    }

    #[tokio::test]
    async fn test_scan_failure_is_fatal() {
        let fx = fixture(MockBackend::default(), MockLookup::default());
        let err = fx.pipeline.run(Path::new("/missing"), false, |_| true).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Scan));
    }

    #[tokio::test]
    async fn test_nested_folder_keeps_discovery_order() {
        // Parent folders are found before their children, so the parent is
        // renamed first and the child's recorded path no longer exists.
        let mut fx = fixture(
            MockBackend::default().with_dirs(["/lib/RJ000001/RJ000002"]),
            MockLookup::with_records([record("RJ000001", "Outer", "A"), record("RJ000002", "Inner", "B")]),
        );

        let summary = fx.pipeline.run(Path::new("/lib"), true, |_| true).await.unwrap();

        assert_eq!((summary.renamed, summary.failed), (1, 1));
        assert!(matches!(&summary.log[1], Outcome::Failed { path, .. } if path == Path::new("/lib/RJ000001/RJ000002")));
        assert!(fx.backend.exists(Path::new("/lib/[RJ000001] [A] Outer/RJ000002")).await.unwrap());
        assert!(!drain(&mut fx.events).is_empty());
    }
}
