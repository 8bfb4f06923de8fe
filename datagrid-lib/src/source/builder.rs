//! Typestate builder for the windowed data source

use std::sync::Arc;

use super::DataSourceConfig;
use super::TrackBy;
use super::WindowedDataSource;
use crate::endpoint::Endpoint;
use crate::model::Value;
use crate::query::FilterClause;
use crate::query::SortClause;

/// Marker type for missing required builder fields.
#[derive(Debug)]
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`WindowedDataSource`].
///
/// Uses the typestate pattern so a source cannot be built without an
/// endpoint.
///
/// # Required Fields
///
/// - `endpoint` - An [`Endpoint`] implementation
///
/// # Example
///
/// ```
/// use datagrid_lib::endpoint::MemoryEndpoint;
/// use datagrid_lib::model::Record;
/// use datagrid_lib::query::SortClause;
/// use datagrid_lib::source::WindowedDataSource;
///
/// let source = WindowedDataSource::<Record>::builder()
///     .endpoint(MemoryEndpoint::new(Vec::new()))
///     .sorts(vec![SortClause::asc("name")])
///     .track_by(|_, row: &Record| row.get("id").cloned().unwrap_or_default())
///     .build();
/// ```
pub struct DataSourceBuilder<T, E> {
    endpoint: E,
    track_by: Option<TrackBy<T>>,
    config: DataSourceConfig,
    sorts: Vec<SortClause>,
    filters: Vec<FilterClause>,
}

impl<T> DataSourceBuilder<T, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            endpoint: Missing,
            track_by: None,
            config: DataSourceConfig::default(),
            sorts: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Sets the endpoint rows are fetched from.
    pub fn endpoint<P>(self, endpoint: P) -> DataSourceBuilder<T, Set<Arc<dyn Endpoint<T>>>>
    where
        P: Endpoint<T> + 'static,
    {
        self.shared_endpoint(Arc::new(endpoint))
    }

    /// Sets an endpoint that is already shared elsewhere.
    pub fn shared_endpoint(
        self,
        endpoint: Arc<dyn Endpoint<T>>,
    ) -> DataSourceBuilder<T, Set<Arc<dyn Endpoint<T>>>> {
        DataSourceBuilder {
            endpoint: Set(endpoint),
            track_by: self.track_by,
            config: self.config,
            sorts: self.sorts,
            filters: self.filters,
        }
    }
}

impl<T> Default for DataSourceBuilder<T, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> DataSourceBuilder<T, E> {
    /// Sets the row identity used by `index_of_row`.
    ///
    /// Defaults to plain equality on the row.
    pub fn track_by<F>(mut self, track_by: F) -> Self
    where
        F: Fn(usize, &T) -> Value + Send + Sync + 'static,
    {
        self.track_by = Some(Arc::new(track_by));
        self
    }

    /// Sets the data source configuration.
    pub fn config(mut self, config: DataSourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the sort clauses in effect before the first request.
    pub fn sorts(mut self, sorts: Vec<SortClause>) -> Self {
        self.sorts = sorts;
        self
    }

    /// Sets the filter clauses in effect before the first request.
    pub fn filters(mut self, filters: Vec<FilterClause>) -> Self {
        self.filters = filters;
        self
    }
}

impl<T> DataSourceBuilder<T, Set<Arc<dyn Endpoint<T>>>>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Builds the [`WindowedDataSource`].
    ///
    /// Only available once an endpoint has been set.
    pub fn build(self) -> WindowedDataSource<T> {
        WindowedDataSource::from_parts(
            self.endpoint.0,
            self.track_by,
            self.config,
            self.sorts,
            self.filters,
        )
    }
}
