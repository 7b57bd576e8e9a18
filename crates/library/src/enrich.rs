//! Catalog lookups for scanned entries.

use crate::entry::CandidateEntry;
use crate::events::{Reporter, Stage};
use crate::template::NameTemplate;
use dlren_catalog::LookupHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Looks up every entry's identifier, one at a time and in order, and
/// renders the new name of each entry that was found.
///
/// A lookup that fails or finds nothing marks that entry as failed; the
/// remaining entries are still looked up. Each identifier is tried once.
///
/// Cancellation is checked before each lookup. Entries not reached by then
/// are handed back [`Pending`](crate::EntryStatus::Pending).
#[instrument(skip_all, fields(lookup = lookup.name(), total = entries.len()))]
pub async fn enrich(
    mut entries: Vec<CandidateEntry>,
    lookup: &LookupHandle,
    template: &NameTemplate,
    reporter: &Reporter,
    cancel: &CancellationToken,
) -> Vec<CandidateEntry> {
    let total = entries.len();
    for (done, entry) in entries.iter_mut().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(done, total, "lookups cancelled");
            reporter.log(format!("cancelled after {done} of {total} lookups"));
            break;
        }
        let identifier = entry.identifier().clone();
        tracing::debug!(%identifier, "looking up");
        match lookup.lookup(&identifier).await {
            Ok(Some(record)) => {
                let name = template.render(&record);
                if name.is_empty() {
                    tracing::warn!(%identifier, "template rendered an empty name");
                }
                entry.resolve(record, name);
            },
            Ok(None) => {
                tracing::warn!(%identifier, "not found in catalog");
                entry.fail(format!("{identifier} not found in catalog"));
            },
            Err(e) => {
                tracing::warn!(%identifier, retryable = e.is_retryable(), error = ?e, "lookup failed");
                entry.fail(format!("lookup of {identifier} failed: {}", &*e));
            },
        }
        if let Some(failure) = entry.failure() {
            reporter.log(format!("error: {failure}"));
        }
        reporter.progress(Stage::Enrich, done + 1, total);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKind, EntryStatus};
    use crate::events::Event;
    use dlren_catalog::{CatalogRecord, Identifier, MockLookup};
    use std::sync::Arc;

    fn entry(path: &str) -> CandidateEntry {
        CandidateEntry::from_path(path, EntryKind::Zip).unwrap()
    }

    async fn enrich_one(lookup: &LookupHandle, template: &NameTemplate, cancel: &CancellationToken) -> CandidateEntry {
        let entries = enrich(vec![entry("/lib/RJ000001.zip")], lookup, template, &Reporter::silent(), cancel).await;
        entries.into_iter().next().unwrap()
    }

    fn record(id: &str, title: &str) -> CatalogRecord {
        CatalogRecord::new(id.parse::<Identifier>().unwrap()).with_title(title).with_publisher("Circle")
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_lookups() {
        let mock = Arc::new(
            MockLookup::with_records([record("RJ000001", "One"), record("RJ000003", "Three")]).failing("RJ000002"),
        );
        let lookup: LookupHandle = mock.clone();
        let entries = vec![entry("/lib/RJ000001.zip"), entry("/lib/RJ000002.zip"), entry("/lib/RJ000003.zip")];
        let (reporter, mut rx) = Reporter::channel();

        let entries = enrich(entries, &lookup, &NameTemplate::default(), &reporter, &CancellationToken::new()).await;

        assert_eq!(
            entries.iter().map(CandidateEntry::status).collect::<Vec<_>>(),
            vec![EntryStatus::Ready, EntryStatus::Failed, EntryStatus::Ready]
        );
        assert_eq!(entries[0].rendered_name(), Some("[RJ000001] [Circle] One"));
        assert!(entries[1].failure().unwrap().contains("RJ000002"));
        assert!(entries[1].metadata().is_none());
        assert_eq!(entries[2].rendered_name(), Some("[RJ000003] [Circle] Three"));
        assert_eq!(mock.calls().len(), 3);

        let mut progress = Vec::new();
        let mut logs = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                Event::Progress { stage: Stage::Enrich, done, total } => progress.push((done, total)),
                Event::Log(_) => logs += 1,
                _ => {},
            }
        }
        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(logs, 1);
    }

    #[tokio::test]
    async fn test_not_found() {
        let lookup: LookupHandle = Arc::new(MockLookup::default());
        let entry = enrich_one(&lookup, &NameTemplate::default(), &CancellationToken::new()).await;
        assert_eq!(entry.status(), EntryStatus::Failed);
        assert!(entry.failure().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_empty_name_is_unnamed() {
        let lookup: LookupHandle = Arc::new(MockLookup::with_records([record("RJ000001", "")]));
        let template: NameTemplate = "{title}".parse().unwrap();
        let entry = enrich_one(&lookup, &template, &CancellationToken::new()).await;
        assert_eq!(entry.status(), EntryStatus::Unnamed);
        assert!(entry.metadata().is_some());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let mock = Arc::new(MockLookup::with_records([record("RJ000001", "One")]));
        let lookup: LookupHandle = mock.clone();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let entry = enrich_one(&lookup, &NameTemplate::default(), &cancel).await;
        assert_eq!(entry.status(), EntryStatus::Pending);
        assert!(mock.calls().is_empty());
    }
}
