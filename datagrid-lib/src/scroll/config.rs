//! Scroll geometry configuration

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

/// Geometry of a fixed-row table.
///
/// All dimensions share the viewport's unit (usually logical pixels).
///
/// # Example
///
/// ```
/// use datagrid_lib::scroll::ScrollConfig;
///
/// let config = ScrollConfig::default()
///     .with_row_height(20.0)
///     .with_header_height(0.0)
///     .with_footer_height(0.0);
/// assert!(config.validate().is_ok());
/// assert!(config.with_row_height(0.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollConfig {
    /// Height of every row. Must be positive.
    ///
    /// Default: 48
    pub row_height: f64,

    /// Height of the table header.
    ///
    /// Default: 56
    pub header_height: f64,

    /// Height of the table footer.
    ///
    /// Default: 48
    pub footer_height: f64,

    /// Rows rendered beyond each edge of the visible area, as a multiple of
    /// the visible row count.
    ///
    /// Default: 0.7
    pub buffer_multiplier: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            row_height: 48.0,
            header_height: 56.0,
            footer_height: 48.0,
            buffer_multiplier: 0.7,
        }
    }
}

impl ScrollConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row height.
    pub fn with_row_height(mut self, height: f64) -> Self {
        self.row_height = height;
        self
    }

    /// Sets the header height.
    pub fn with_header_height(mut self, height: f64) -> Self {
        self.header_height = height;
        self
    }

    /// Sets the footer height.
    pub fn with_footer_height(mut self, height: f64) -> Self {
        self.footer_height = height;
        self
    }

    /// Sets the buffer multiplier.
    pub fn with_buffer_multiplier(mut self, multiplier: f64) -> Self {
        self.buffer_multiplier = multiplier;
        self
    }

    /// Checks that the geometry is usable.
    ///
    /// The row height must be positive and finite; header and footer heights
    /// and the buffer multiplier must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(ConfigError::InvalidDimension {
                name: "row height",
                value: self.row_height,
            });
        }
        for (name, value) in [
            ("header height", self.header_height),
            ("footer height", self.footer_height),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidDimension { name, value });
            }
        }
        if !(self.buffer_multiplier.is_finite() && self.buffer_multiplier >= 0.0) {
            return Err(ConfigError::InvalidBufferMultiplier(self.buffer_multiplier));
        }
        Ok(())
    }
}
