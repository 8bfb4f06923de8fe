//! Error types

mod config;
mod endpoint;
mod field;
mod selection;
mod sort;

pub use config::*;
pub use endpoint::*;
pub use field::*;
pub use selection::*;
pub use sort::*;

/// Top-level error type for the data-grid engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The endpoint failed or returned an invalid page.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// The engine was configured or wired incorrectly.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A sortable column registration was rejected.
    #[error(transparent)]
    Sort(#[from] SortError),

    /// A selection update was rejected.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// A record field could not be read.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The data source was disconnected while the request was pending.
    #[error("Data source disconnected")]
    Disconnected,
}
