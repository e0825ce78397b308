//! Row filtering on a state column.

use std::collections::BTreeSet;

use crate::schema::CommonColumns;

/// Column inspected by the default filter.
pub const DEFAULT_STATE_COLUMN: &str = "state";

/// Values retained by the default filter.
pub const DEFAULT_ACCEPTED_STATES: [&str; 2] = ["successful", "failed"];

/// Keeps rows whose state column holds one of the accepted values.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFilter {
    column: String,
    accepted: BTreeSet<String>,
    enabled: bool,
}

/// How a filter applies to a particular set of common columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPlan {
    /// Filter on the value at this position of each row.
    Apply { index: usize },
    /// The state column is not among the common columns; rows pass through.
    MissingColumn,
    /// Filtering was switched off.
    Disabled,
}

impl Default for StateFilter {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_COLUMN, DEFAULT_ACCEPTED_STATES)
    }
}

impl StateFilter {
    pub fn new<I, S>(column: impl Into<String>, accepted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            accepted: accepted.into_iter().map(Into::into).collect(),
            enabled: true,
        }
    }

    /// A filter that keeps every row.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn accepted(&self) -> impl Iterator<Item = &str> {
        self.accepted.iter().map(String::as_str)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.accepted.contains(value)
    }

    pub fn plan(&self, common: &CommonColumns) -> FilterPlan {
        if !self.enabled {
            return FilterPlan::Disabled;
        }
        match common.position(&self.column) {
            Some(index) => FilterPlan::Apply { index },
            None => FilterPlan::MissingColumn,
        }
    }
}
