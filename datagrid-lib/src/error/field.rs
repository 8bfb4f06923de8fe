//! Record field access errors

/// Error returned by the typed getters on [`Record`](crate::model::Record).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The row has no value under this field name.
    #[error("Row has no field '{0}'")]
    Missing(String),

    /// The field holds a value of another kind.
    #[error("Field '{field}' holds {actual}, not {expected}")]
    WrongKind {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}
