//! Progress reporting.
//!
//! The pipeline runs on its own task and tells whoever is watching what it
//! is doing by sending [`Event`]s down an unbounded channel. Sending never
//! blocks and never fails the pipeline: if nobody is listening, events are
//! dropped.

use crate::entry::CandidateEntry;
use crate::rename::{Outcome, Summary};
use derive_more::Display;
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// The stage a [`Progress`](Event::Progress) event belongs to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    #[display("scan")]
    Scan,
    #[display("lookup")]
    Enrich,
    #[display("rename")]
    Rename,
}

/// Events emitted by the pipeline, in this order:
///
/// 1. [`Started`](Self::Started), once per scan.
/// 2. [`Discovered`](Self::Discovered), once the scan is complete.
/// 3. [`Progress`](Self::Progress) and [`Log`](Self::Log) while entries are
///    looked up, then [`Enriched`](Self::Enriched).
/// 4. [`Progress`](Self::Progress) and [`Renamed`](Self::Renamed) while
///    entries are moved, then [`Summary`](Self::Summary).
#[derive(Debug, Clone)]
pub enum Event {
    /// Scanning of `root` has begun.
    Started { root: PathBuf, recursive: bool },
    /// Every candidate entry found below the root, in processing order.
    Discovered(Vec<CandidateEntry>),
    /// `done` of `total` items of `stage` have been processed.
    Progress { stage: Stage, done: usize, total: usize },
    /// A human-readable line for the running log.
    Log(String),
    /// All entries have been looked up (or the lookups were cancelled).
    Enriched(Vec<CandidateEntry>),
    /// One entry went through the rename stage.
    Renamed(Outcome),
    /// The batch is finished, whether or not anything was renamed.
    Summary(Summary),
}

/// Sending half of the event channel.
///
/// Cheap to clone. A [`Reporter::silent`] reporter discards everything.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    tx: Option<UnboundedSender<Event>>,
}

impl Reporter {
    pub fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A reporter along with the receiver its events arrive on.
    pub fn channel() -> (Self, UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn send(&self, event: Event) {
        if let Some(tx) = &self.tx {
            // Nobody listening is fine.
            let _ = tx.send(event);
        }
    }

    pub fn log(&self, line: impl Into<String>) {
        self.send(Event::Log(line.into()));
    }

    pub fn progress(&self, stage: Stage, done: usize, total: usize) {
        self.send(Event::Progress { stage, done, total });
    }
}
