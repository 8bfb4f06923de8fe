//! The data provider contract.
//!
//! The windowed data source never owns rows; it asks an [`Endpoint`] for a
//! window under the current sort and filter clauses and renders whatever
//! comes back. Applications implement the trait over their own store (an
//! HTTP API, a database query, ...) or wrap an async closure with
//! [`endpoint_fn`]. [`MemoryEndpoint`] serves rows held in memory.

mod memory;

pub use memory::*;

use std::future::Future;

use async_trait::async_trait;

use crate::error::EndpointError;
use crate::query::FilterClause;
use crate::query::Page;
use crate::query::RowRange;
use crate::query::SortClause;

/// An asynchronous, sortable and filterable row provider.
///
/// Implementations must:
/// - Tolerate overlapping calls (a new window may be requested before the
///   previous one settles)
/// - Leave the inputs untouched
/// - Return at most `range.number_of_rows` rows, fewer at the end of the data
/// - Answer a zero-row range with the store counts only
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use datagrid_lib::endpoint::Endpoint;
///
/// struct UsersApi { http: reqwest::Client }
///
/// #[async_trait]
/// impl Endpoint<User> for UsersApi {
///     async fn fetch(
///         &self,
///         range: RowRange,
///         sorts: &[SortClause],
///         filters: &[FilterClause],
///     ) -> Result<Page<User>, EndpointError> {
///         let body = serde_json::json!({ "range": range, "sorts": sorts, "filters": filters });
///         let response = self.http.post("/users/window").json(&body).send().await
///             .map_err(|e| EndpointError::with_source("request failed", e))?;
///         response.json().await.map_err(|e| EndpointError::with_source("bad page", e))
///     }
/// }
/// ```
#[async_trait]
pub trait Endpoint<T>: Send + Sync {
    /// Fetches the rows in `range` after applying `filters` and `sorts`.
    async fn fetch(
        &self,
        range: RowRange,
        sorts: &[SortClause],
        filters: &[FilterClause],
    ) -> Result<Page<T>, EndpointError>;
}

/// An [`Endpoint`] backed by an async closure. Created by [`endpoint_fn`].
pub struct FnEndpoint<F> {
    fetch: F,
}

impl<F> std::fmt::Debug for FnEndpoint<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEndpoint").finish_non_exhaustive()
    }
}

/// Wraps an async closure as an [`Endpoint`].
///
/// The closure receives owned copies of the clauses so the returned future
/// can outlive the call.
///
/// # Example
///
/// ```
/// use datagrid_lib::endpoint::endpoint_fn;
/// use datagrid_lib::query::Page;
///
/// let endpoint = endpoint_fn(|range, _sorts, _filters| async move {
///     let rows: Vec<usize> = (range.start_row_index..range.end().min(80)).collect();
///     Ok(Page::new(range.start_row_index, rows).with_totals(80, 80))
/// });
/// # let _ = endpoint;
/// ```
pub fn endpoint_fn<T, F, Fut>(fetch: F) -> FnEndpoint<F>
where
    F: Fn(RowRange, Vec<SortClause>, Vec<FilterClause>) -> Fut,
    Fut: Future<Output = Result<Page<T>, EndpointError>>,
{
    FnEndpoint { fetch }
}

#[async_trait]
impl<T, F, Fut> Endpoint<T> for FnEndpoint<F>
where
    T: Send + 'static,
    F: Fn(RowRange, Vec<SortClause>, Vec<FilterClause>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, EndpointError>> + Send + 'static,
{
    async fn fetch(
        &self,
        range: RowRange,
        sorts: &[SortClause],
        filters: &[FilterClause],
    ) -> Result<Page<T>, EndpointError> {
        (self.fetch)(range, sorts.to_vec(), filters.to_vec()).await
    }
}
