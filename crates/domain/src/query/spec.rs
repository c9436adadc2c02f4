//! Video search query specification and its builder.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::condition::{Condition, Predicate};
use super::error::{ValidationError, Violation};
use super::request::{ApiRequest, PageRequest, check_max_count};
use crate::page::{Cursor, SearchId};

/// Longest allowed distance between `start_date` and `end_date`, in days.
pub const MAX_WINDOW_DAYS: i64 = 30;

const fn is_false(value: &bool) -> bool {
    !*value
}

/// A validated video search request.
///
/// Immutable once built. Pagination derives new specs through
/// [`QuerySpec::next_page`]; the date window and predicate never change
/// across pages of one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    #[serde(rename = "query")]
    predicate: Predicate,
    #[serde(with = "super::date_format")]
    start_date: NaiveDate,
    #[serde(with = "super::date_format")]
    end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    search_id: Option<SearchId>,
    #[serde(default, skip_serializing_if = "is_false")]
    is_random: bool,
}

impl QuerySpec {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> QuerySpecBuilder {
        QuerySpecBuilder::default()
    }

    /// Lower bound of the creation date window.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Upper bound of the creation date window, inclusive.
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Filter sent as the `query` member.
    #[must_use]
    pub const fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Requested page size, `None` for the server default.
    #[must_use]
    pub const fn max_count(&self) -> Option<u32> {
        self.max_count
    }

    /// Continuation cursor.
    #[must_use]
    pub const fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Search session.
    #[must_use]
    pub const fn search_id(&self) -> Option<&SearchId> {
        self.search_id.as_ref()
    }

    /// Whether results come back in random order.
    #[must_use]
    pub const fn is_random(&self) -> bool {
        self.is_random
    }

    /// Spec for the next page: same window and predicate, new continuation.
    #[must_use]
    pub fn next_page(&self, cursor: Cursor, search_id: Option<SearchId>) -> Self {
        Self {
            cursor: Some(cursor),
            search_id,
            ..self.clone()
        }
    }

    /// Same predicate narrowed to a single day, with continuation cleared.
    #[must_use]
    pub fn for_day(&self, day: NaiveDate) -> Self {
        Self {
            start_date: day,
            end_date: day,
            cursor: None,
            search_id: None,
            ..self.clone()
        }
    }

    /// Builder pre-filled with this spec, for copy-then-modify.
    #[must_use]
    pub fn to_builder(&self) -> QuerySpecBuilder {
        QuerySpecBuilder {
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
            predicate: self.predicate.clone(),
            max_count: self.max_count,
            cursor: self.cursor.clone(),
            search_id: self.search_id.clone(),
            is_random: self.is_random,
        }
    }
}

impl ApiRequest for QuerySpec {
    fn validate(&self) -> Result<(), ValidationError> {
        self.to_builder().build().map(drop)
    }
}

impl PageRequest for QuerySpec {
    fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    fn next_page(&self, cursor: Cursor, search_id: Option<SearchId>) -> Self {
        Self::next_page(self, cursor, search_id)
    }
}

/// Order-independent builder for [`QuerySpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpecBuilder {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    predicate: Predicate,
    max_count: Option<u32>,
    cursor: Option<Cursor>,
    search_id: Option<SearchId>,
    is_random: bool,
}

impl QuerySpecBuilder {
    /// Sets the lower bound of the date window.
    #[must_use]
    pub const fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Sets the inclusive upper bound of the date window.
    #[must_use]
    pub const fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn max_count(mut self, count: u32) -> Self {
        self.max_count = Some(count);
        self
    }

    /// Adds a clause that must hold.
    #[must_use]
    pub fn and(mut self, condition: Condition) -> Self {
        self.predicate.and.push(condition);
        self
    }

    /// Adds a clause of which at least one must hold.
    #[must_use]
    pub fn or(mut self, condition: Condition) -> Self {
        self.predicate.or.push(condition);
        self
    }

    /// Adds a clause that must not hold.
    #[must_use]
    pub fn not(mut self, condition: Condition) -> Self {
        self.predicate.not.push(condition);
        self
    }

    /// Resumes from a cursor.
    #[must_use]
    pub fn cursor(mut self, cursor: impl Into<Cursor>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Resumes a search session.
    #[must_use]
    pub fn search_id(mut self, search_id: impl Into<SearchId>) -> Self {
        self.search_id = Some(search_id.into());
        self
    }

    /// Requests results in random order.
    #[must_use]
    pub const fn is_random(mut self, random: bool) -> Self {
        self.is_random = random;
        self
    }

    /// Validates and freezes the spec.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every violation found.
    pub fn build(self) -> Result<QuerySpec, ValidationError> {
        let mut violations = Vec::new();

        let dates = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            (start, end) => {
                if start.is_none() {
                    violations.push(Violation::MissingStartDate);
                }
                if end.is_none() {
                    violations.push(Violation::MissingEndDate);
                }
                None
            }
        };
        violations.extend(check_max_count(self.max_count));
        if let Some((start, end)) = dates {
            if start > end {
                violations.push(Violation::InvertedDateRange { start, end });
            } else {
                let days = (end - start).num_days();
                if days > MAX_WINDOW_DAYS {
                    violations.push(Violation::WindowTooLong {
                        days,
                        max: MAX_WINDOW_DAYS,
                    });
                }
            }
        }
        if self.predicate.is_empty() {
            violations.push(Violation::EmptyPredicate);
        }
        violations.extend(self.predicate.conditions().flat_map(Condition::violations));

        // Missing dates always leave a violation behind.
        match dates {
            Some((start_date, end_date)) if violations.is_empty() => Ok(QuerySpec {
                predicate: self.predicate,
                start_date,
                end_date,
                max_count: self.max_count,
                cursor: self.cursor,
                search_id: self.search_id,
                is_random: self.is_random,
            }),
            _ => Err(ValidationError::new(violations)),
        }
    }
}
