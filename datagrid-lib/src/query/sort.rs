//! Sort clause types.

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Fields;
use crate::model::Value;

/// Sort direction for ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Returns the other direction.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    /// Applies this direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("asc"),
            Direction::Desc => f.write_str("desc"),
        }
    }
}

/// A single sort key.
///
/// A `Vec<SortClause>` is ordered: the first clause is the primary key, the
/// next one breaks its ties, and so on.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::SortClause;
///
/// let sorts = vec![SortClause::desc("name"), SortClause::asc("id")];
/// assert_eq!(sorts[0].field_name, "name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortClause {
    /// Column the rows are ordered by.
    pub field_name: String,
    /// Ordering direction.
    pub direction: Direction,
}

impl SortClause {
    /// Creates a clause on a field.
    pub fn new(field_name: impl Into<String>, direction: Direction) -> Self {
        Self {
            field_name: field_name.into(),
            direction,
        }
    }

    /// Creates an ascending clause on a field.
    pub fn asc(field_name: impl Into<String>) -> Self {
        Self::new(field_name, Direction::Asc)
    }

    /// Creates a descending clause on a field.
    pub fn desc(field_name: impl Into<String>) -> Self {
        Self::new(field_name, Direction::Desc)
    }

    /// Compares two rows by this clause alone.
    pub fn compare<R: Fields>(&self, a: &R, b: &R) -> Ordering {
        let left = a.field(&self.field_name).unwrap_or(Value::Null);
        let right = b.field(&self.field_name).unwrap_or(Value::Null);
        self.direction.apply(left.cmp(&right))
    }
}

/// Compares two rows by an ordered list of clauses.
pub(crate) fn compare_rows<R: Fields>(sorts: &[SortClause], a: &R, b: &R) -> Ordering {
    sorts
        .iter()
        .map(|clause| clause.compare(a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}
