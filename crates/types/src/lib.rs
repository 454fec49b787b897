#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for trust-receive
//!
//! This crate provides the data carried through a verification: the inbound
//! report, the terminal outcome, and the record describing a conflict.

pub mod reports;

pub use reports::{ConflictRecord, FileReport, VerifyOutcome};
