//! Homeserver usage-statistics reports: decoding, classification and sparse
//! persistence.

pub mod classify;
pub mod columns;
pub mod config;
pub mod error;
pub mod field;
pub mod ingest;
pub mod report;
pub mod sparse;
pub mod store;
