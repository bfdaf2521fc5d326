//! slate-core library.
//!
//! The course-plan state engine: a pool of courses, an ordered set of
//! semesters holding course ids, multi-select bulk operations, derived
//! credit aggregates, and a debounced synchronizer that writes full
//! snapshots to a SQLite store.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` at store and session boundaries; typed
//!   `thiserror` errors for validation and config. Rejected mutations are
//!   [`outcome::Outcome::Unchanged`], not errors.
//! - **Logging**: `tracing` macros with structured fields.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod outcome;
pub mod plan;
pub mod session;
pub mod snapshot;
pub mod sync;

pub use session::Session;
