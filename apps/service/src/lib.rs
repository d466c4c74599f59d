//! Connectivity monitoring core.
//!
//! Probes one endpoint on a fixed cadence and records only the transitions
//! between healthy and failing in a SQLite-backed store.

pub mod config;
pub mod database;
pub mod monitoring;
pub mod pool;
