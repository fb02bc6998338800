//! User and group administration for iRODS.
//!
//! This crate shapes administration intents into general admin calls and catalog queries and
//! forwards them over a caller-supplied [`Connection`]. Transport, query execution and password
//! obfuscation are external collaborators reached through traits.

#![deny(missing_docs)]

mod client;
mod config;
mod connection;
mod group;
mod password;
mod user;

pub use client::UserAdministrator;
pub use config::{AdminConfig, DEFAULT_OPERATION_TIMEOUT_SECS};
pub use connection::{Connection, PasswordObfuscator};
pub use group::Group;
pub use password::{pad_password, MAX_PASSWORD_LEN};
pub use user::{User, UserType, ZoneType};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = irods_core::Result<T>;
