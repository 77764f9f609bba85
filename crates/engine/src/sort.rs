//! Sorting of the filtered row view.
//!
//! Values order within their type; across types the rank is
//! Numbers < Dates < Text < Bool < Records < Blank (missing or null).
//! Blanks always sort last in ascending order so a mixed column still
//! gives a total order.

use std::cmp::Ordering;

use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::value::{Record, Value};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Current sort state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: String,
    pub direction: SortDirection,
}

impl SortState {
    /// Next state for a sort request on `field`.
    ///
    /// Same field with no explicit direction flips the direction; any other
    /// request uses the given direction, or ascending.
    pub fn next(current: Option<&SortState>, field: &str, direction: Option<SortDirection>) -> Self {
        let direction = match (current, direction) {
            (_, Some(d)) => d,
            (Some(state), None) if state.field == field => state.direction.toggled(),
            _ => SortDirection::Asc,
        };
        SortState {
            field: field.to_string(),
            direction,
        }
    }
}

/// Typed key for ordering one value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    Number(OrderedFloat<f64>),
    Date(NaiveDate),
    Text(&'a str),
    Bool(bool),
    Record,
    Blank,
}

impl<'a> SortKey<'a> {
    pub fn from_value(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => SortKey::Blank,
            Some(Value::Number(n)) => SortKey::Number(OrderedFloat(*n)),
            Some(Value::Date(d)) => SortKey::Date(*d),
            Some(Value::Text(s)) => SortKey::Text(s),
            Some(Value::Bool(b)) => SortKey::Bool(*b),
            Some(Value::Map(_)) => SortKey::Record,
        }
    }
}

/// Compare two records by the value at `field`.
pub fn compare_records(a: &Record, b: &Record, field: &str) -> Ordering {
    SortKey::from_value(a.get_path(field)).cmp(&SortKey::from_value(b.get_path(field)))
}

/// Stable in-place sort of a row view (indices into `records`).
///
/// Descending order inverts the comparison rather than reversing the
/// result, so ties keep their current relative order in both directions.
pub fn sort_rows(rows: &mut [usize], records: &[Record], state: &SortState) {
    rows.sort_by(|&a, &b| {
        let ordering = compare_records(&records[a], &records[b], &state.field);
        match state.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

// =============================================================================
// Tests
// =============================================================================
