//! Convenience builder for catalog (GenQuery) strings and the rows they return.
//!
//! The query language has no escape syntax for string literals, so values containing a single
//! quote are rejected instead of being embedded.

use crate::error::{Error, Result};
use std::ops::Index;

/// Catalog column names used by the administration queries.
pub mod columns {
    /// Name of a user or group.
    pub const USER_NAME: &str = "USER_NAME";
    /// Zone a user belongs to.
    pub const USER_ZONE: &str = "USER_ZONE";
    /// Type of a user (`rodsuser`, `rodsadmin`, `rodsgroup`).
    pub const USER_TYPE: &str = "USER_TYPE";
    /// Catalog id of a user.
    pub const USER_ID: &str = "USER_ID";
    /// Authentication name (e.g. a certificate DN) bound to a user.
    pub const USER_DN: &str = "USER_DN";
    /// Name of a group the row's user belongs to.
    pub const USER_GROUP_NAME: &str = "USER_GROUP_NAME";
    /// Catalog id of a group the row's user belongs to.
    pub const USER_GROUP_ID: &str = "USER_GROUP_ID";
    /// Name of a zone.
    pub const ZONE_NAME: &str = "ZONE_NAME";
    /// Type of a zone (`local`, `remote`).
    pub const ZONE_TYPE: &str = "ZONE_TYPE";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Equal,
    NotEqual,
}

impl Comparison {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Condition {
    column: &'static str,
    comparison: Comparison,
    value: String,
}

/// Builder for a `select ... where ...` catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenQuery {
    columns: Vec<&'static str>,
    conditions: Vec<Condition>,
}

impl GenQuery {
    /// Starts a query selecting the given columns, in order.
    #[must_use]
    pub fn select(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
            conditions: Vec::new(),
        }
    }

    /// Adds a `column = 'value'` restriction.
    #[must_use]
    pub fn where_eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.conditions.push(Condition {
            column,
            comparison: Comparison::Equal,
            value: value.into(),
        });
        self
    }

    /// Adds a `column != 'value'` restriction.
    #[must_use]
    pub fn where_ne(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.conditions.push(Condition {
            column,
            comparison: Comparison::NotEqual,
            value: value.into(),
        });
        self
    }

    /// Renders the query string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when no column is selected or a restriction value
    /// contains a single quote.
    pub fn build(&self) -> Result<String> {
        if self.columns.is_empty() {
            return Err(Error::InvalidRequest(
                "query must select at least one column".to_string(),
            ));
        }

        let mut gql = format!("select {}", self.columns.join(", "));
        for (i, condition) in self.conditions.iter().enumerate() {
            if condition.value.contains('\'') {
                return Err(Error::InvalidRequest(format!(
                    "value for {} cannot contain a single quote",
                    condition.column
                )));
            }

            gql.push_str(if i == 0 { " where " } else { " and " });
            gql.push_str(condition.column);
            gql.push(' ');
            gql.push_str(condition.comparison.as_str());
            gql.push_str(" '");
            gql.push_str(&condition.value);
            gql.push('\'');
        }

        Ok(gql)
    }
}

/// One result row, columns in the order they were selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(Vec<String>);

impl Row {
    /// Creates a row from column values.
    #[must_use]
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// Returns the value at `index` if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Returns the value at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] when the row has fewer columns than expected.
    pub fn column(&self, index: usize) -> Result<&str> {
        self.get(index).ok_or_else(|| {
            Error::Query(format!(
                "row has {} column(s), expected at least {}",
                self.0.len(),
                index + 1
            ))
        })
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the row, returning the column values.
    #[must_use]
    pub fn into_values(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for Row {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[&str; N]> for Row {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|value| (*value).to_string()).collect())
    }
}

impl Index<usize> for Row {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
