//! Sort registration error types

/// Invalid sortable column registrations.
///
/// Only reported in debug builds; release builds ignore the registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortError {
    /// A column with the same id is already registered.
    #[error("Cannot have two sortable columns with the same id ({0})")]
    DuplicateId(String),

    /// The column id is empty.
    #[error("Sortable column must have an id")]
    MissingId,
}
