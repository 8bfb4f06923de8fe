//! Configuration and wiring error types

/// Programmer errors raised while configuring or wiring the engine.
///
/// These surface immediately to the caller; nothing is retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A geometry dimension is out of range (negative, NaN, or a zero row height).
    #[error("Invalid {name}: {value}")]
    InvalidDimension {
        /// Name of the offending setting.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The buffer multiplier is negative or not finite.
    #[error("Invalid buffer multiplier: {0}")]
    InvalidBufferMultiplier(f64),

    /// The data source has not been connected yet.
    #[error("Data source is not connected")]
    NotConnected,

    /// The data source was disconnected and cannot be reused.
    #[error("Data source is closed")]
    Closed,

    /// The scroll strategy has no viewport attached.
    #[error("No viewport attached to the scroll strategy")]
    ViewportNotAttached,
}
