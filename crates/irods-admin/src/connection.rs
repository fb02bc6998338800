//! Collaborator traits implemented by the transport and credential layers.

use crate::Result;
use async_trait::async_trait;
use irods_core::{GeneralAdminInput, Row};
use secrecy::SecretString;

/// Authenticated session to an iRODS server.
///
/// The administrator borrows the connection for each call and never retries, pools or closes it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connection: Send {
    /// Issues a general admin call and returns the server status (0 on success).
    async fn general_admin(&mut self, input: &GeneralAdminInput) -> i32;

    /// Runs a catalog query and returns every row it produced.
    async fn query(&mut self, gql: &str) -> Result<Vec<Row>>;
}

/// Password obfuscation utility shared with the server.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordObfuscator: Send + Sync {
    /// Retrieves the key used for obfuscation, normally the stored session password.
    fn obfuscation_key(&self) -> Result<SecretString>;

    /// Obfuscates the padded plaintext with `key`.
    fn encode_by_key(&self, plain_text: &SecretString, key: &SecretString) -> String;
}
