//! snapsort - a CLI tool for organizing image collections
//!
//! This library organizes image files from a source tree into a target tree
//! with support for:
//! - Capture-date resolution from EXIF metadata with plausibility filtering
//! - File system timestamp and current-time fallbacks
//! - Date/name/size sort criteria with a token-based structure template
//! - Deterministic filename collision resolution
//! - Dry-run planning and copy or move semantics
//! - Lifecycle and progress events over a channel

pub mod cli;
pub mod config;
pub mod date;
pub mod error;
pub mod events;
pub mod plan;
pub mod sorter;
pub mod template;

pub use cli::Cli;
pub use config::{Config, SortCriterion};
pub use date::{DateSource, ResolvedDate};
pub use error::{Error, Result};
pub use events::{EventChannel, EventReceiver, EventSender, SortEvent, SortSummary};
pub use plan::PlannedDestination;
pub use sorter::{CancelFlag, FileOutcome, OutcomeStatus, Sorter};
