#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Report verification for trust-receive
//!
//! The [`VerificationEngine`] decides, for each inbound [`tr_types::FileReport`],
//! whether it is the first sighting of a resource version, a repeat of a known
//! one, or a conflicting claim. Conflicts are counted in [`ConflictMetrics`]
//! and forwarded to an [`AlertSink`].

pub mod alert;
mod engine;
pub mod metrics;

pub use alert::{AlertSink, CommandAlerter, LogAlerter, NoopAlerter};
pub use engine::{EngineBuilder, VerificationEngine};
pub use metrics::{ConflictLabels, ConflictMetrics, CONFLICT_METRIC_NAME};
