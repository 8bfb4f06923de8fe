//! In-memory endpoint backed by a shared row vector

use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use super::Endpoint;
use crate::error::EndpointError;
use crate::model::Fields;
use crate::query::FilterClause;
use crate::query::FilterMode;
use crate::query::Page;
use crate::query::RowRange;
use crate::query::SortClause;
use crate::query::compare_rows;

/// An endpoint serving rows held in memory.
///
/// Every fetch filters the full row set, sorts it with a stable multi-key
/// sort, and slices out the requested window. Clones share the same rows, so
/// a clone kept by the application can insert or remove rows while the data
/// source keeps fetching from another.
///
/// # Example
///
/// ```
/// use datagrid_lib::endpoint::MemoryEndpoint;
/// use datagrid_lib::model::Record;
/// use datagrid_lib::query::{RowRange, SortClause};
///
/// let rows = (0..80).map(|i| Record::new().set("id", i).set("name", format!("User{i:04}")));
/// let endpoint = MemoryEndpoint::new(rows.collect());
///
/// let page = endpoint.query(RowRange::new(0, 2), &[SortClause::desc("id")], &[]).unwrap();
/// assert_eq!(page.content()[0].get_int("id").unwrap(), Some(79));
/// assert_eq!(page.total_elements(), 80);
/// ```
#[derive(Debug)]
pub struct MemoryEndpoint<T> {
    rows: Arc<RwLock<Vec<T>>>,
    filter_mode: FilterMode,
    latency: Option<Duration>,
}

impl<T> Clone for MemoryEndpoint<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            filter_mode: self.filter_mode,
            latency: self.latency,
        }
    }
}

impl<T: Fields + Clone> MemoryEndpoint<T> {
    /// Creates an endpoint over `rows`, combining filters with [`FilterMode::Any`].
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
            filter_mode: FilterMode::default(),
            latency: None,
        }
    }

    /// Sets how multiple filter clauses combine.
    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    /// Delays every fetch, simulating a remote store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the filter combination mode.
    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    /// Returns the number of rows in the store.
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a row to the store.
    pub fn insert(&self, row: T) {
        if let Ok(mut rows) = self.rows.write() {
            rows.push(row);
        }
    }

    /// Removes every row matching `predicate`, returning how many were removed.
    pub fn remove_where(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let Ok(mut rows) = self.rows.write() else {
            return 0;
        };
        let before = rows.len();
        rows.retain(|row| !predicate(row));
        before - rows.len()
    }

    /// Evaluates a request synchronously.
    pub fn query(
        &self,
        range: RowRange,
        sorts: &[SortClause],
        filters: &[FilterClause],
    ) -> Result<Page<T>, EndpointError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| EndpointError::failed("row store lock poisoned"))?;

        let mut matching: Vec<&T> = rows
            .iter()
            .filter(|row| self.filter_mode.matches(filters, *row))
            .collect();
        if !sorts.is_empty() {
            matching.sort_by(|a, b| compare_rows(sorts, *a, *b));
        }

        let start = range.start_row_index.min(matching.len());
        let end = range.end().min(matching.len());
        let content = matching[start..end].iter().map(|row| (*row).clone()).collect();

        Ok(Page::new(range.start_row_index, content).with_totals(rows.len(), matching.len()))
    }
}

#[async_trait]
impl<T> Endpoint<T> for MemoryEndpoint<T>
where
    T: Fields + Clone + Send + Sync + 'static,
{
    async fn fetch(
        &self,
        range: RowRange,
        sorts: &[SortClause],
        filters: &[FilterClause],
    ) -> Result<Page<T>, EndpointError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.query(range, sorts, filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use crate::model::Value;

    fn users() -> MemoryEndpoint<Record> {
        MemoryEndpoint::new(
            (0..80)
                .map(|i| Record::new().set("id", i).set("name", format!("User{i:04}")))
                .collect(),
        )
    }

    fn names(page: &Page<Record>) -> Vec<String> {
        page.content()
            .iter()
            .map(|row| row.get_string("name").unwrap().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_single_row_window() {
        let page = users().query(RowRange::new(55, 1), &[], &[]).unwrap();
        assert_eq!(
            page.content(),
            &[Record::new().set("id", 55).set("name", "User0055")]
        );
        assert_eq!(page.total_elements(), 80);
        assert_eq!(page.total_filtered_elements(), 80);
    }

    #[test]
    fn test_range_filter_window() {
        let filters = [FilterClause::range("name", "User0003", "User0030")];
        let page = users().query(RowRange::new(20, 3), &[], &filters).unwrap();
        assert_eq!(names(&page), ["User0023", "User0024", "User0025"]);
        assert_eq!(page.total_filtered_elements(), 28);
        assert_eq!(page.total_elements(), 80);
    }

    #[test]
    fn test_tail_window_is_short() {
        let page = users().query(RowRange::new(78, 5), &[], &[]).unwrap();
        assert_eq!(page.returned_elements(), 2);
        assert!(page.validate(RowRange::new(78, 5)).is_ok());

        let past_end = users().query(RowRange::new(200, 5), &[], &[]).unwrap();
        assert!(past_end.is_empty());
        assert_eq!(past_end.start_row_index(), 200);
    }

    #[test]
    fn test_probe_returns_counts_only() {
        let filters = [FilterClause::eq("id", 4), FilterClause::eq("id", 9)];
        let page = users().query(RowRange::probe(), &[], &filters).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_filtered_elements(), 2);
    }

    #[test]
    fn test_all_mode_intersects_clauses() {
        let endpoint = users().with_filter_mode(FilterMode::All);
        let filters = [
            FilterClause::range("id", 10, 40),
            FilterClause::range("name", "User0035", "User0079"),
        ];
        let page = endpoint.query(RowRange::new(0, 80), &[], &filters).unwrap();
        assert_eq!(page.total_filtered_elements(), 6);
        assert_eq!(page.content()[0].get("id"), Some(&Value::from(35)));
    }

    #[test]
    fn test_multi_key_sort_is_stable() {
        let endpoint = MemoryEndpoint::new(vec![
            Record::new().set("team", "b").set("name", "x"),
            Record::new().set("team", "a").set("name", "y"),
            Record::new().set("team", "b").set("name", "w"),
            Record::new().set("team", "a").set("name", "z"),
        ]);
        let page = endpoint
            .query(RowRange::new(0, 4), &[SortClause::asc("team")], &[])
            .unwrap();
        assert_eq!(names(&page), ["y", "z", "x", "w"]);

        let sorts = [SortClause::desc("team"), SortClause::asc("name")];
        let page = endpoint.query(RowRange::new(0, 4), &sorts, &[]).unwrap();
        assert_eq!(names(&page), ["w", "x", "y", "z"]);
    }

    #[test]
    fn test_store_mutation_is_shared_by_clones() {
        let endpoint = users();
        let handle = endpoint.clone();
        handle.insert(Record::new().set("id", 80).set("name", "User0080"));
        assert_eq!(endpoint.len(), 81);

        let removed = handle.remove_where(|row| row.get_int("id").ok().flatten() < Some(10));
        assert_eq!(removed, 10);
        assert_eq!(endpoint.len(), 71);
    }
}
