//! Query validation errors

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use super::condition::ConditionField;

/// A single rule broken by a query or page request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// `start_date` was never set.
    #[error("start_date is required")]
    MissingStartDate,

    /// `end_date` was never set.
    #[error("end_date is required")]
    MissingEndDate,

    /// `max_count` outside `1..=100`.
    #[error("max_count must be between 1 and 100, got {value}")]
    MaxCountOutOfRange {
        /// The rejected value.
        value: u32,
    },

    /// `start_date` after `end_date`.
    #[error("start_date {start} is after end_date {end}")]
    InvertedDateRange {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// `end_date` lies too far after `start_date`.
    #[error("end_date is {days} days after start_date, at most {max} are allowed")]
    WindowTooLong {
        /// Days between start and end.
        days: i64,
        /// Allowed maximum.
        max: i64,
    },

    /// No group of the predicate carries a clause.
    #[error("query needs at least one condition")]
    EmptyPredicate,

    /// A clause has no values.
    #[error("condition on {field} has no values")]
    EmptyValues {
        /// Field of the clause.
        field: ConditionField,
    },

    /// A clause value does not fit its field.
    #[error("invalid {field} value {value:?}: {reason}")]
    InvalidValue {
        /// Field of the clause.
        field: ConditionField,
        /// Rendered offending value.
        value: String,
        /// Expected shape.
        reason: &'static str,
    },

    /// A user endpoint request without a username.
    #[error("username must not be empty")]
    MissingUsername,

    /// An identifier that must be positive.
    #[error("{name} must be a positive integer, got {value}")]
    NonPositiveId {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: i64,
    },
}

/// Every violation found while building a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub(crate) const fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// All violations, in the order they were found.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns true if `violation` was reported.
    #[must_use]
    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid request: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

pub(crate) fn finish(violations: Vec<Violation>) -> Result<(), ValidationError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(violations))
    }
}
