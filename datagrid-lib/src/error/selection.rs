//! Row selection error types

use crate::selection::SelectionMode;

/// Rejected selection updates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Keys were supplied while selection is disabled.
    #[error("Selection is disabled")]
    Disabled,

    /// More keys were supplied than the mode allows.
    #[error("{count} keys supplied to a {mode:?} selection")]
    TooManyKeys {
        /// The selection mode in effect.
        mode: SelectionMode,
        /// Number of distinct keys supplied.
        count: usize,
    },
}
