#![forbid(unsafe_code)]

//! Core domain model and record management for the Biblio catalog manager.
//!
//! This crate provides:
//! - Domain types (books, loan events, statistics, the catalog)
//! - Catalog operations (add, remove, search, lend, return)
//! - Persistence of the catalog file
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{LoanOutcome, ReturnOutcome};
pub use config::Config;
pub use storage::DEFAULT_CATALOG_FILE;
