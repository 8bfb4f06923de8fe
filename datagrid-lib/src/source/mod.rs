//! The windowed data source.
//!
//! [`WindowedDataSource`] sits between a scroller that reports which rows are
//! visible and an [`Endpoint`] that can fetch any window of a sorted, filtered
//! row set. Every requested range is answered twice: first with a placeholder
//! window built from the previously loaded rows, then with the rows the
//! endpoint returns. Only the newest range request is live; older responses
//! are dropped on arrival.
//!
//! # Example
//!
//! ```no_run
//! use datagrid_lib::endpoint::MemoryEndpoint;
//! use datagrid_lib::model::Record;
//! use datagrid_lib::query::RowRange;
//! use datagrid_lib::source::WindowedDataSource;
//!
//! # async fn run() -> Result<(), datagrid_lib::error::Error> {
//! let rows = (0..80).map(|i| Record::new().set("id", i)).collect();
//! let source = WindowedDataSource::builder()
//!     .endpoint(MemoryEndpoint::new(rows))
//!     .build();
//!
//! let mut render = source.connect()?;
//! source.request_range(RowRange::new(40, 10))?;
//! render.changed().await.ok();
//! println!("{} rows", render.borrow().len());
//!
//! source.disconnect();
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod placeholder;
mod state;

pub use builder::*;
pub use config::*;
pub use placeholder::*;
pub use state::Phase;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use futures::Stream;
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use self::state::RangeOutcome;
use self::state::SourceState;
use crate::endpoint::Endpoint;
use crate::error::ConfigError;
use crate::error::EndpointError;
use crate::error::Error;
use crate::model::Value;
use crate::query::DatastoreSizes;
use crate::query::FilterClause;
use crate::query::Page;
use crate::query::RowRange;
use crate::query::SortClause;

/// Row identity function: `(index, row) -> key`.
///
/// Should depend on the row content, not on the index alone, so a row can be
/// found again after re-sorting.
pub type TrackBy<T> = Arc<dyn Fn(usize, &T) -> Value + Send + Sync>;

/// Which request a [`FetchFailure`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// A row window request.
    Rows(RowRange),
    /// A size probe after a sort, filter or store change.
    SizeProbe,
}

/// A failed endpoint call, delivered to [`WindowedDataSource::failures`].
#[derive(Debug, Clone)]
pub struct FetchFailure {
    /// The request that failed.
    pub request: FetchKind,
    /// What the endpoint (or the timeout) reported.
    pub error: EndpointError,
}

/// A data source that renders a window of a remote row set.
///
/// This type is cheap to clone (uses `Arc` internally); clones share the
/// connection and all observers. Range fetches run as tokio tasks, so the
/// source must be used from within a tokio runtime.
pub struct WindowedDataSource<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for WindowedDataSource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T> {
    endpoint: Arc<dyn Endpoint<T>>,
    track_by: Option<TrackBy<T>>,
    config: DataSourceConfig,
    // Lock order: state, then loading.
    state: Mutex<SourceState<T>>,
    loading: Mutex<Option<watch::Sender<bool>>>,
    render: watch::Sender<Window<T>>,
    sizes: watch::Sender<Option<DatastoreSizes>>,
    failures: broadcast::Sender<FetchFailure>,
    lifecycle: Mutex<Lifecycle>,
}

#[derive(Default)]
struct Lifecycle {
    connection: Option<CancellationToken>,
    scroller: Option<CancellationToken>,
    closed: bool,
}

impl Lifecycle {
    fn connection(&self) -> Result<&CancellationToken, ConfigError> {
        if self.closed {
            return Err(ConfigError::Closed);
        }
        self.connection.as_ref().ok_or(ConfigError::NotConnected)
    }
}

fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> WindowedDataSource<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a new builder for constructing a data source.
    pub fn builder() -> DataSourceBuilder<T, Missing> {
        DataSourceBuilder::new()
    }

    pub(crate) fn from_parts(
        endpoint: Arc<dyn Endpoint<T>>,
        track_by: Option<TrackBy<T>>,
        config: DataSourceConfig,
        sorts: Vec<SortClause>,
        filters: Vec<FilterClause>,
    ) -> Self {
        let (failures, _) = broadcast::channel(config.failure_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                endpoint,
                track_by,
                config,
                state: Mutex::new(SourceState::new(sorts, filters)),
                loading: Mutex::new(Some(watch::Sender::new(false))),
                render: watch::Sender::new(Window::default()),
                sizes: watch::Sender::new(None),
                failures,
                lifecycle: Mutex::new(Lifecycle::default()),
            }),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Opens the connection and returns the render stream.
    ///
    /// The receiver always holds the latest window. Connecting twice returns
    /// another receiver for the same connection. A disconnected source cannot
    /// be reconnected.
    pub fn connect(&self) -> Result<watch::Receiver<Window<T>>, Error> {
        let mut lifecycle = lock(&self.inner.lifecycle);
        if lifecycle.closed {
            return Err(ConfigError::Closed.into());
        }
        if lifecycle.connection.is_none() {
            lifecycle.connection = Some(CancellationToken::new());
            log::debug!("[source] Connected");
        }
        Ok(self.inner.render.subscribe())
    }

    /// Cancels all pending work and completes the loading stream.
    ///
    /// Pending fetches, size probes and the scroller subscription are
    /// dropped; responses still in flight are never applied. Safe to call
    /// more than once.
    pub fn disconnect(&self) {
        let connection = {
            let mut lifecycle = lock(&self.inner.lifecycle);
            if lifecycle.closed {
                return;
            }
            lifecycle.closed = true;
            lifecycle.scroller = None;
            lifecycle.connection.take()
        };
        if let Some(token) = connection {
            token.cancel();
        }

        let mut state = lock(&self.inner.state);
        state.abandon_pending();
        if let Some(loading) = lock(&self.inner.loading).take() {
            loading.send_if_modified(|current| std::mem::replace(current, false));
        }
        log::debug!("[source] Disconnected");
    }

    /// Returns `true` between `connect` and `disconnect`.
    pub fn is_connected(&self) -> bool {
        lock(&self.inner.lifecycle).connection().is_ok()
    }

    /// Wires a stream of visible ranges to this source.
    ///
    /// Each emitted range goes through [`request_range`](Self::request_range).
    /// A previously attached stream is torn down first, so ranges are never
    /// delivered from two scrollers.
    pub fn attach_scroller<S>(&self, ranges: S) -> Result<(), Error>
    where
        S: Stream<Item = RowRange> + Send + 'static,
    {
        let subscription = {
            let mut lifecycle = lock(&self.inner.lifecycle);
            let subscription = lifecycle.connection()?.child_token();
            if let Some(previous) = lifecycle.scroller.replace(subscription.clone()) {
                previous.cancel();
                log::debug!("[source] Replaced scroller");
            }
            subscription
        };

        let source = self.clone();
        tokio::spawn(async move {
            let mut ranges = Box::pin(ranges);
            loop {
                let range = tokio::select! {
                    biased;
                    _ = subscription.cancelled() => break,
                    next = ranges.next() => match next {
                        Some(range) => range,
                        None => break,
                    },
                };
                if subscription.is_cancelled() || source.request_range(range).is_err() {
                    break;
                }
            }
        });
        Ok(())
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Requests a window of rows.
    ///
    /// Publishes a placeholder window and sets loading before returning; the
    /// endpoint call runs in the background and its page replaces the
    /// placeholder unless a newer range was requested in the meantime.
    pub fn request_range(&self, range: RowRange) -> Result<(), Error> {
        let token = lock(&self.inner.lifecycle).connection()?.clone();

        let (generation, range, sorts, filters) = {
            let mut state = lock(&self.inner.state);
            let ticket = state.begin_range(range);
            self.inner.render.send_replace(ticket.placeholder);
            self.inner.publish_loading(state.is_loading());
            (ticket.generation, ticket.range, ticket.sorts, ticket.filters)
        };
        log::debug!(
            "[source] Requesting rows {}..{} (generation {})",
            range.start_row_index,
            range.end(),
            generation
        );

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = inner.call(range, &sorts, &filters) => result,
            };
            inner.settle_range(generation, range, result);
        });
        Ok(())
    }

    /// Replaces the sort clauses and probes the store size under them.
    ///
    /// Returns the sizes reported by the probe. Rows are refetched on the
    /// next range request, or right away with
    /// [`DataSourceConfig::refetch_on_change`].
    pub async fn set_sorts(&self, sorts: Vec<SortClause>) -> Result<DatastoreSizes, Error> {
        lock(&self.inner.lifecycle).connection()?;
        lock(&self.inner.state).sorts = sorts;
        self.after_query_change().await
    }

    /// Replaces the filter clauses and probes the store size under them.
    pub async fn set_filters(&self, filters: Vec<FilterClause>) -> Result<DatastoreSizes, Error> {
        lock(&self.inner.lifecycle).connection()?;
        lock(&self.inner.state).filters = filters;
        self.after_query_change().await
    }

    async fn after_query_change(&self) -> Result<DatastoreSizes, Error> {
        if self.inner.config.refetch_on_change {
            let requested = lock(&self.inner.state).requested;
            if let Some(range) = requested {
                self.request_range(range)?;
            }
        }
        self.reload_size_of_store().await
    }

    /// Asks the endpoint for the store counts under the current clauses.
    ///
    /// Publishes the sizes if they changed and this is still the newest
    /// probe. The probe runs as its own task, so dropping the returned future
    /// does not leave it half-applied.
    pub async fn reload_size_of_store(&self) -> Result<DatastoreSizes, Error> {
        let token = lock(&self.inner.lifecycle).connection()?.clone();
        let ticket = lock(&self.inner.state).begin_probe();

        let inner = Arc::clone(&self.inner);
        let probe = tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return Err(Error::Disconnected),
                result = inner.call(RowRange::probe(), &ticket.sorts, &ticket.filters) => result,
            };
            inner.settle_probe(ticket.generation, result)
        });
        probe.await.unwrap_or(Err(Error::Disconnected))
    }

    /// Finds the 0-based position of `row` in the fully sorted and filtered
    /// row set.
    ///
    /// Uses the current clauses unless `sorts` or `filters` are given. Rows
    /// are matched by the track-by key when one is configured, by equality
    /// otherwise.
    pub async fn index_of_row(
        &self,
        row: &T,
        sorts: Option<Vec<SortClause>>,
        filters: Option<Vec<FilterClause>>,
    ) -> Result<Option<usize>, Error> {
        let token = lock(&self.inner.lifecycle).connection()?.clone();
        let (sorts, filters) = {
            let state = lock(&self.inner.state);
            (
                sorts.unwrap_or_else(|| state.sorts.clone()),
                filters.unwrap_or_else(|| state.filters.clone()),
            )
        };

        let lookup = async {
            let sizes = self.inner.call(RowRange::probe(), &sorts, &filters).await?.sizes();
            let all = RowRange::new(0, sizes.total_filtered_elements);
            let page = self.inner.call(all, &sorts, &filters).await?;
            let position = page
                .content()
                .iter()
                .enumerate()
                .position(|(index, candidate)| self.inner.same_row(index, candidate, row));
            Ok::<_, EndpointError>(position)
        };

        tokio::select! {
            _ = token.cancelled() => Err(Error::Disconnected),
            position = lookup => Ok(position?),
        }
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Subscribes to rendered windows. The latest window is replayed.
    pub fn render(&self) -> watch::Receiver<Window<T>> {
        self.inner.render.subscribe()
    }

    /// Subscribes to the loading flag.
    ///
    /// The stream completes (`changed()` fails) once the source is
    /// disconnected.
    pub fn loading(&self) -> watch::Receiver<bool> {
        match lock(&self.inner.loading).as_ref() {
            Some(sender) => sender.subscribe(),
            None => watch::channel(false).1,
        }
    }

    /// Subscribes to store size changes. `None` until the first response.
    pub fn sizes(&self) -> watch::Receiver<Option<DatastoreSizes>> {
        self.inner.sizes.subscribe()
    }

    /// Subscribes to failed endpoint calls.
    pub fn failures(&self) -> broadcast::Receiver<FetchFailure> {
        self.inner.failures.subscribe()
    }

    /// Returns the current sort clauses.
    pub fn sorts(&self) -> Vec<SortClause> {
        lock(&self.inner.state).sorts.clone()
    }

    /// Returns the current filter clauses.
    pub fn filters(&self) -> Vec<FilterClause> {
        lock(&self.inner.state).filters.clone()
    }

    /// Returns the last known filtered row count.
    pub fn filtered_size(&self) -> usize {
        lock(&self.inner.state).filtered_size
    }

    /// Returns what the source is currently waiting for.
    pub fn phase(&self) -> Phase {
        lock(&self.inner.state).phase()
    }
}

impl<T> Inner<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Calls the endpoint, applying the timeout and validating the page.
    async fn call(
        &self,
        range: RowRange,
        sorts: &[SortClause],
        filters: &[FilterClause],
    ) -> Result<Page<T>, EndpointError> {
        let fetch = self.endpoint.fetch(range, sorts, filters);
        let page = match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| EndpointError::Timeout(limit))??,
            None => fetch.await?,
        };
        page.validate(range)?;
        Ok(page)
    }

    fn settle_range(
        &self,
        generation: u64,
        range: RowRange,
        result: Result<Page<T>, EndpointError>,
    ) {
        let mut state = lock(&self.state);
        match state.finish_range(generation, range, result) {
            RangeOutcome::Stale => {
                log::debug!("[source] Discarding stale response (generation {generation})");
            }
            RangeOutcome::Loaded { window, sizes } => {
                self.render.send_replace(window);
                self.publish_sizes(sizes);
            }
            RangeOutcome::Failed(error) => {
                log::warn!(
                    "[source] Fetching rows {}..{} failed: {}",
                    range.start_row_index,
                    range.end(),
                    error
                );
                let _ = self.failures.send(FetchFailure {
                    request: FetchKind::Rows(range),
                    error,
                });
            }
        }
        self.publish_loading(state.is_loading());
    }

    fn settle_probe(
        &self,
        generation: u64,
        result: Result<Page<T>, EndpointError>,
    ) -> Result<DatastoreSizes, Error> {
        let mut state = lock(&self.state);
        match result {
            Ok(page) => {
                let sizes = page.sizes();
                match state.finish_probe(generation, Some(sizes)) {
                    Some(current) => self.publish_sizes(current),
                    None => log::debug!("[source] Discarding stale size probe"),
                }
                Ok(sizes)
            }
            Err(error) => {
                if state.is_current_probe(generation) {
                    log::warn!("[source] Size probe failed: {error}");
                    let _ = self.failures.send(FetchFailure {
                        request: FetchKind::SizeProbe,
                        error: error.clone(),
                    });
                } else {
                    log::debug!("[source] Discarding stale size probe failure: {error}");
                }
                state.finish_probe(generation, None);
                Err(error.into())
            }
        }
    }

    fn publish_sizes(&self, sizes: DatastoreSizes) {
        self.sizes.send_if_modified(|current| {
            if *current == Some(sizes) {
                return false;
            }
            *current = Some(sizes);
            true
        });
    }

    fn publish_loading(&self, loading: bool) {
        if let Some(sender) = lock(&self.loading).as_ref() {
            sender.send_if_modified(|current| std::mem::replace(current, loading) != loading);
        }
    }

    fn same_row(&self, index: usize, candidate: &T, row: &T) -> bool {
        match &self.track_by {
            Some(track_by) => track_by(index, candidate) == track_by(index, row),
            None => candidate == row,
        }
    }
}
