//! Page type for windowed query results.

use serde::Deserialize;
use serde::Serialize;

use super::RowRange;
use crate::error::EndpointError;

/// Total and filtered row counts of the backing store.
///
/// Published independently of row content so scroll geometry can follow a
/// sort or filter change before any rows arrive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatastoreSizes {
    /// Number of rows in the store.
    pub total_elements: usize,
    /// Number of rows passing the current filters.
    pub total_filtered_elements: usize,
}

/// A window of rows returned by an endpoint, with store counts.
///
/// `returned_elements` always equals `content.len()` for pages built with
/// [`Page::new`]; pages decoded from the wire are checked with
/// [`Page::validate`] before the data source uses them.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::Page;
///
/// let page = Page::new(55, vec!["User0055"]).with_totals(80, 80);
///
/// assert_eq!(page.returned_elements(), 1);
/// assert_eq!(page.sizes().total_filtered_elements, 80);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    content: Vec<T>,
    start_row_index: usize,
    returned_elements: usize,
    total_elements: usize,
    total_filtered_elements: usize,
}

impl<T> Page<T> {
    /// Creates a page holding `content` starting at `start_row_index`.
    ///
    /// Totals default to the content length; set them with [`Page::with_totals`].
    pub fn new(start_row_index: usize, content: Vec<T>) -> Self {
        let len = content.len();
        Self {
            content,
            start_row_index,
            returned_elements: len,
            total_elements: len,
            total_filtered_elements: len,
        }
    }

    /// Creates an empty page answering a size probe.
    pub fn sizes_only(total_elements: usize, total_filtered_elements: usize) -> Self {
        Self::new(0, Vec::new()).with_totals(total_elements, total_filtered_elements)
    }

    /// Sets the total and filtered counts of the store.
    pub fn with_totals(mut self, total_elements: usize, total_filtered_elements: usize) -> Self {
        self.total_elements = total_elements;
        self.total_filtered_elements = total_filtered_elements;
        self
    }

    /// Returns a reference to the rows in this page.
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Consumes the page and returns the rows.
    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Index of the first row in this page.
    pub fn start_row_index(&self) -> usize {
        self.start_row_index
    }

    /// Number of rows in this page.
    pub fn returned_elements(&self) -> usize {
        self.returned_elements
    }

    /// Number of rows in the store.
    pub fn total_elements(&self) -> usize {
        self.total_elements
    }

    /// Number of rows passing the filters the page was fetched with.
    pub fn total_filtered_elements(&self) -> usize {
        self.total_filtered_elements
    }

    /// Projects the store counts.
    pub fn sizes(&self) -> DatastoreSizes {
        DatastoreSizes {
            total_elements: self.total_elements,
            total_filtered_elements: self.total_filtered_elements,
        }
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Checks the page invariants against the request it answers.
    pub fn validate(&self, requested: RowRange) -> Result<(), EndpointError> {
        if self.returned_elements != self.content.len() {
            return Err(EndpointError::invalid_page(format!(
                "returnedElements is {} but content holds {} rows",
                self.returned_elements,
                self.content.len()
            )));
        }
        if self.returned_elements > requested.number_of_rows {
            return Err(EndpointError::invalid_page(format!(
                "{} rows returned for a request of {}",
                self.returned_elements, requested.number_of_rows
            )));
        }
        if self.total_filtered_elements > self.total_elements {
            return Err(EndpointError::invalid_page(format!(
                "totalFilteredElements {} exceeds totalElements {}",
                self.total_filtered_elements, self.total_elements
            )));
        }
        Ok(())
    }
}
