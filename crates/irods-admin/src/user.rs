//! iRODS user representation and type mappings.

use irods_core::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog type string reserved for groups.
pub(crate) const GROUP_TYPE: &str = "rodsgroup";

/// Kind of account a user holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Regular user.
    Rodsuser,
    /// Administrator.
    Rodsadmin,
}

impl UserType {
    /// Catalog representation of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rodsuser => "rodsuser",
            Self::Rodsadmin => "rodsadmin",
        }
    }
}

impl FromStr for UserType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rodsuser" => Ok(Self::Rodsuser),
            "rodsadmin" => Ok(Self::Rodsadmin),
            _ => Err(Error::UserManagement("undefined user type".to_string())),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a new user belongs to the local zone or a federated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    /// The zone the connection is attached to.
    Local,
    /// A federated zone.
    Remote,
}

impl ZoneType {
    /// Text representation of the zone type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl FromStr for ZoneType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            _ => Err(Error::UserManagement("undefined zone type".to_string())),
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An iRODS user identified by name and zone.
///
/// An empty zone stands for the local zone and is resolved against the connection when needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// User name without zone qualification.
    pub name: String,
    /// Zone name, empty for the local zone.
    #[serde(default)]
    pub zone: String,
}

impl User {
    /// Creates a user in the local zone.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone: String::new(),
        }
    }

    /// Creates a user in the given zone.
    #[must_use]
    pub fn in_zone(name: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
        }
    }

    /// Returns true if the zone is left for the connection to resolve.
    #[must_use]
    pub fn has_local_zone(&self) -> bool {
        self.zone.is_empty()
    }

    /// Returns the zone-qualified name relative to `local_zone`.
    ///
    /// Users of the local zone keep their plain name; users of any other zone become
    /// `name#zone`.
    #[must_use]
    pub fn unique_name_in(&self, local_zone: &str) -> String {
        if self.zone.is_empty() || self.zone == local_zone {
            self.name.clone()
        } else {
            format!("{}#{}", self.name, self.zone)
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
