//! Data source configuration

use std::time::Duration;

/// Tuning knobs for a [`WindowedDataSource`](super::WindowedDataSource).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datagrid_lib::source::DataSourceConfig;
///
/// let config = DataSourceConfig::default()
///     .with_request_timeout(Duration::from_secs(10))
///     .with_refetch_on_change(true);
/// ```
#[derive(Debug, Clone)]
pub struct DataSourceConfig {
    /// Upper bound for a single endpoint call.
    ///
    /// Default: none (a call that never settles keeps the source loading)
    pub request_timeout: Option<Duration>,

    /// Re-request the last range right after a sort or filter change instead
    /// of waiting for the next range from the scroller.
    ///
    /// Default: `false`
    pub refetch_on_change: bool,

    /// Capacity of the fetch failure broadcast. Slow observers lose the
    /// oldest failures first.
    ///
    /// Default: 16
    pub failure_capacity: usize,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            request_timeout: None,
            refetch_on_change: false,
            failure_capacity: 16,
        }
    }
}

impl DataSourceConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-call timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Enables or disables eager refetching after sort/filter changes.
    pub fn with_refetch_on_change(mut self, enabled: bool) -> Self {
        self.refetch_on_change = enabled;
        self
    }

    /// Sets the failure broadcast capacity (at least 1).
    pub fn with_failure_capacity(mut self, capacity: usize) -> Self {
        self.failure_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let config = DataSourceConfig::new()
            .with_request_timeout(Duration::from_millis(250))
            .with_refetch_on_change(true)
            .with_failure_capacity(4);
        assert_eq!(config.request_timeout, Some(Duration::from_millis(250)));
        assert!(config.refetch_on_change);
        assert_eq!(config.failure_capacity, 4);

        assert_eq!(DataSourceConfig::new().with_failure_capacity(0).failure_capacity, 1);
    }
}
