//! General admin request record.
//!
//! The remote admin service accepts six positional string arguments. The first two select the
//! verb and the entity kind; the meaning of the remaining four depends on the call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verb carried in `arg0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdminAction {
    /// Create an entity.
    #[serde(rename = "add")]
    Add,
    /// Remove an entity.
    #[serde(rename = "rm")]
    Remove,
    /// Change an attribute of an entity.
    #[serde(rename = "modify")]
    Modify,
}

impl AdminAction {
    /// Wire representation of the verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "rm",
            Self::Modify => "modify",
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity kind carried in `arg1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminTarget {
    /// Users, and groups when they are created or removed.
    User,
    /// Group membership changes.
    Group,
}

impl AdminTarget {
    /// Wire representation of the entity kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for AdminTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-shape argument record for a general admin call.
///
/// Unset positional arguments are sent as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralAdminInput {
    action: AdminAction,
    target: AdminTarget,
    args: [String; 4],
}

impl GeneralAdminInput {
    /// Creates a request with the verb and entity kind set and every other slot empty.
    #[must_use]
    pub fn new(action: AdminAction, target: AdminTarget) -> Self {
        Self {
            action,
            target,
            args: Default::default(),
        }
    }

    /// Sets `arg2`, usually the name of the entity being acted on.
    #[must_use]
    pub fn arg2(mut self, value: impl Into<String>) -> Self {
        self.args[0] = value.into();
        self
    }

    /// Sets `arg3`.
    #[must_use]
    pub fn arg3(mut self, value: impl Into<String>) -> Self {
        self.args[1] = value.into();
        self
    }

    /// Sets `arg4`.
    #[must_use]
    pub fn arg4(mut self, value: impl Into<String>) -> Self {
        self.args[2] = value.into();
        self
    }

    /// Sets `arg5`.
    #[must_use]
    pub fn arg5(mut self, value: impl Into<String>) -> Self {
        self.args[3] = value.into();
        self
    }

    /// Returns the verb.
    #[must_use]
    pub const fn action(&self) -> AdminAction {
        self.action
    }

    /// Returns the entity kind.
    #[must_use]
    pub const fn target(&self) -> AdminTarget {
        self.target
    }

    /// Returns the primary identifier (`arg2`).
    #[must_use]
    pub fn primary(&self) -> &str {
        &self.args[0]
    }

    /// Returns all six slots in wire order.
    #[must_use]
    pub fn args(&self) -> [&str; 6] {
        [
            self.action.as_str(),
            self.target.as_str(),
            &self.args[0],
            &self.args[1],
            &self.args[2],
            &self.args[3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_slots_are_empty() {
        let input = GeneralAdminInput::new(AdminAction::Remove, AdminTarget::User).arg2("alice");
        assert_eq!(input.args(), ["rm", "user", "alice", "", "", ""]);
        assert_eq!(input.primary(), "alice");
    }

    #[test]
    fn all_slots_in_wire_order() {
        let input = GeneralAdminInput::new(AdminAction::Modify, AdminTarget::Group)
            .arg2("researchers")
            .arg3("add")
            .arg4("alice")
            .arg5("tempZone");

        assert_eq!(input.action(), AdminAction::Modify);
        assert_eq!(input.target(), AdminTarget::Group);
        assert_eq!(
            input.args(),
            ["modify", "group", "researchers", "add", "alice", "tempZone"]
        );
    }

    #[test]
    fn action_serializes_as_wire_verb() {
        assert_eq!(serde_json::to_string(&AdminAction::Remove).unwrap(), "\"rm\"");
        assert_eq!(serde_json::to_string(&AdminTarget::Group).unwrap(), "\"group\"");
        assert_eq!(AdminAction::Modify.to_string(), "modify");
    }
}
