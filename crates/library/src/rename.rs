//! Moving entries to their rendered names.
//!
//! Nothing is ever overwritten: an occupied destination is a skip, not a
//! failure. Failures are per entry and never stop the batch.

use crate::entry::{CandidateEntry, EntryKind, EntryStatus};
use crate::events::{Event, Reporter, Stage};
use derive_more::Display;
use dlren_storage::{BackendHandle, validate_name};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Why an entry was left where it is.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry already has its rendered name.
    #[display("already named")]
    AlreadyNamed,
    /// Something else occupies the destination.
    #[display("destination exists")]
    DestinationExists,
}

/// What happened to one entry in the rename stage.
///
/// The [`Display`](std::fmt::Display) form is the line written to the running
/// log.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Outcome {
    #[display("success: {} -> {}", from.display(), to.display())]
    Renamed { from: PathBuf, to: PathBuf },
    #[display("skip: {} -> {} ({reason})", path.display(), destination.display())]
    Skipped { path: PathBuf, destination: PathBuf, reason: SkipReason },
    #[display("failure: {}: {reason}", path.display())]
    Failed { path: PathBuf, reason: String },
}

/// Totals for one batch.
///
/// `failed` also counts entries whose lookup failed; those never reach the
/// rename stage, so they have no entry in `log`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub renamed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// One outcome per entry the rename stage processed, in order.
    pub log: Vec<Outcome>,
    /// The batch was cancelled before every entry was processed.
    pub cancelled: bool,
}

impl Summary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Renamed { .. } => self.renamed += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
        self.log.push(outcome);
    }
}

/// Moves every [`Ready`](EntryStatus::Ready) entry to its destination, one at
/// a time and in order.
///
/// Entries that failed their lookup are counted as failures; entries that
/// are still pending or rendered an empty name are left alone.
///
/// Cancellation is checked before each move; a move in progress always
/// completes.
#[instrument(skip_all, fields(backend = backend.name(), total = entries.len()))]
pub async fn rename_all(
    backend: &BackendHandle,
    entries: Vec<CandidateEntry>,
    reporter: &Reporter,
    cancel: &CancellationToken,
) -> Summary {
    let mut summary = Summary {
        failed: entries.iter().filter(|e| e.status() == EntryStatus::Failed).count(),
        ..Summary::default()
    };
    let ready: Vec<_> = entries.into_iter().filter(|e| e.status() == EntryStatus::Ready).collect();
    let total = ready.len();

    for (done, entry) in ready.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(done, total, "renaming cancelled");
            reporter.log(format!("cancelled after {done} of {total} renames"));
            summary.cancelled = true;
            break;
        }
        let outcome = rename_entry(backend, entry).await;
        match &outcome {
            Outcome::Renamed { .. } => tracing::info!("{outcome}"),
            Outcome::Skipped { .. } => tracing::debug!("{outcome}"),
            Outcome::Failed { .. } => tracing::warn!("{outcome}"),
        }
        reporter.log(outcome.to_string());
        reporter.send(Event::Renamed(outcome.clone()));
        summary.record(outcome);
        reporter.progress(Stage::Rename, done + 1, total);
    }

    tracing::info!(
        renamed = summary.renamed,
        skipped = summary.skipped,
        failed = summary.failed,
        cancelled = summary.cancelled,
        "rename complete"
    );
    summary
}

async fn rename_entry(backend: &BackendHandle, entry: &CandidateEntry) -> Outcome {
    let path = entry.original_path();
    let failed = |reason: String| Outcome::Failed { path: path.to_path_buf(), reason };

    let Some(name) = entry.destination_name() else {
        return failed("entry has no new name".to_string());
    };
    let name = match validate_name(&name) {
        Ok(name) => name,
        Err(e) => return failed((*e).to_string()),
    };
    let Some(parent) = path.parent() else {
        return failed("entry has no parent directory".to_string());
    };
    let destination = parent.join(name);

    if destination == path {
        return Outcome::Skipped { path: path.to_path_buf(), destination, reason: SkipReason::AlreadyNamed };
    }
    match backend.exists(&destination).await {
        Ok(false) => {},
        Ok(true) => {
            return Outcome::Skipped { path: path.to_path_buf(), destination, reason: SkipReason::DestinationExists };
        },
        Err(e) => return failed((*e).to_string()),
    }

    let moved = match entry.kind() {
        EntryKind::Folder => backend.rename_dir(path, &destination).await,
        EntryKind::Zip | EntryKind::Rar => backend.rename_file(path, &destination).await,
    };
    match moved {
        Ok(()) => Outcome::Renamed { from: path.to_path_buf(), to: destination },
        Err(e) => failed((*e).to_string()),
    }
}
