//! # irods-core
//!
//! Core types shared by iRODS administration clients.
//!
//! ## Modules
//!
//! - [`error`] - Error type and status code mapping
//! - [`admin`] - The fixed-shape general admin request record
//! - [`query`] - Catalog query (GenQuery) string builder and result rows

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod admin;
pub mod error;
pub mod query;

// Re-export commonly used types
pub use admin::{AdminAction, AdminTarget, GeneralAdminInput};
pub use error::{Error, Result};
pub use query::{GenQuery, Row};
