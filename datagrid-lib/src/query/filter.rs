//! Filter clause types.

use serde::Deserialize;
use serde::Serialize;

use crate::model::Fields;
use crate::model::Value;

/// A single filter condition on one field.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Record;
/// use datagrid_lib::query::FilterClause;
///
/// let row = Record::new().set("name", "User0012");
///
/// assert!(FilterClause::range("name", "User0003", "User0030").matches(&row));
/// assert!(!FilterClause::eq("name", "User0013").matches(&row));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum FilterClause {
    /// Inclusive bounds: `value_from <= field <= value_to`.
    Range {
        field_name: String,
        value_from: Value,
        value_to: Value,
    },
    /// Equality: `field == value`.
    Simple { field_name: String, value: Value },
}

impl FilterClause {
    /// Creates an equality clause.
    pub fn eq(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterClause::Simple {
            field_name: field_name.into(),
            value: value.into(),
        }
    }

    /// Creates an inclusive range clause.
    pub fn range(
        field_name: impl Into<String>,
        value_from: impl Into<Value>,
        value_to: impl Into<Value>,
    ) -> Self {
        FilterClause::Range {
            field_name: field_name.into(),
            value_from: value_from.into(),
            value_to: value_to.into(),
        }
    }

    /// Returns the field this clause tests.
    pub fn field_name(&self) -> &str {
        match self {
            FilterClause::Simple { field_name, .. } | FilterClause::Range { field_name, .. } => {
                field_name
            }
        }
    }

    /// Tests a row against this clause. A missing field compares as null.
    pub fn matches<R: Fields>(&self, row: &R) -> bool {
        let actual = row.field(self.field_name()).unwrap_or(Value::Null);
        match self {
            FilterClause::Simple { value, .. } => actual == *value,
            FilterClause::Range {
                value_from,
                value_to,
                ..
            } => *value_from <= actual && actual <= *value_to,
        }
    }
}

/// How a list of filter clauses combines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// A row passes when it satisfies any clause.
    #[default]
    Any,
    /// A row passes only when it satisfies every clause.
    All,
}

impl FilterMode {
    /// Tests a row against a clause list. An empty list lets every row through.
    pub fn matches<R: Fields>(self, filters: &[FilterClause], row: &R) -> bool {
        if filters.is_empty() {
            return true;
        }
        match self {
            FilterMode::Any => filters.iter().any(|f| f.matches(row)),
            FilterMode::All => filters.iter().all(|f| f.matches(row)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn row(id: i64, team: &str) -> Record {
        Record::new().set("id", id).set("team", team)
    }

    #[test]
    fn test_range_is_inclusive() {
        let clause = FilterClause::range("id", 3, 5);
        assert!(clause.matches(&row(3, "red")));
        assert!(clause.matches(&row(5, "red")));
        assert!(!clause.matches(&row(6, "red")));
    }

    #[test]
    fn test_missing_field_is_null() {
        assert!(FilterClause::eq("owner", Value::Null).matches(&row(1, "red")));
        assert!(!FilterClause::eq("owner", "ann").matches(&row(1, "red")));
    }

    #[test]
    fn test_any_and_all_modes() {
        let filters = vec![FilterClause::eq("team", "red"), FilterClause::range("id", 10, 20)];
        let red_low = row(1, "red");
        let red_mid = row(15, "red");
        let blue_mid = row(15, "blue");
        let blue_low = row(1, "blue");

        assert!(FilterMode::Any.matches(&filters, &red_low));
        assert!(FilterMode::Any.matches(&filters, &blue_mid));
        assert!(!FilterMode::Any.matches(&filters, &blue_low));

        assert!(FilterMode::All.matches(&filters, &red_mid));
        assert!(!FilterMode::All.matches(&filters, &red_low));

        assert!(FilterMode::Any.matches(&[], &blue_low));
        assert!(FilterMode::All.matches(&[], &blue_low));
    }

    #[test]
    fn test_wire_format() {
        let clause: FilterClause = serde_json::from_value(serde_json::json!({
            "fieldName": "name",
            "valueFrom": "User0003",
            "valueTo": "User0030"
        }))
        .unwrap();
        assert_eq!(clause, FilterClause::range("name", "User0003", "User0030"));

        let clause: FilterClause =
            serde_json::from_value(serde_json::json!({ "fieldName": "id", "value": 4 })).unwrap();
        assert_eq!(clause, FilterClause::eq("id", 4));
    }
}
