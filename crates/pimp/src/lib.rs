//! `pimp` - the P.I.M.P Business Repository
//!
//! This library provides a business directory and review website: listings
//! grouped by category, consumer reviews with owner responses, an
//! accreditation program, a claim-your-business workflow and an owner
//! dashboard. Pages are rendered on the server from a `SQLite` store; a small
//! JSON API backs the client-side enhancements.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod pagination;
pub mod storage;
pub mod validation;
pub mod web;
pub mod wizard;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::{Storage, StorageStats};
pub use web::{create_router, AppState};
