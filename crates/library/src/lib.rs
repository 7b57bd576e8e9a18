//! The renaming pipeline: discover candidate entries below a directory, look
//! up each entry's catalog record, render a new name from a template, then
//! move entries to their new names without ever overwriting anything.
//!
//! Each stage is usable on its own ([`scan()`], [`enrich()`], [`rename_all()`]);
//! [`Pipeline`] sequences them and leaves confirmation to the caller.

pub mod enrich;
pub mod entry;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod rename;
pub mod scan;
mod template;

pub use crate::enrich::enrich;
pub use crate::entry::{CandidateEntry, EntryKind, EntryStatus};
pub use crate::events::{Event, Reporter, Stage};
pub use crate::pipeline::Pipeline;
pub use crate::rename::{Outcome, SkipReason, Summary, rename_all};
pub use crate::scan::scan;
pub use crate::template::{DEFAULT_TEMPLATE, NameTemplate, Placeholder, sanitize};
