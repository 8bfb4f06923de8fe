//! Row window types.

use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

/// A contiguous window of rows requested from an endpoint.
///
/// `number_of_rows == 0` is a valid "just give me counts" probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRange {
    /// Index of the first requested row.
    pub start_row_index: usize,
    /// Number of rows requested.
    pub number_of_rows: usize,
}

impl RowRange {
    /// Creates a window of `number_of_rows` rows starting at `start_row_index`.
    pub fn new(start_row_index: usize, number_of_rows: usize) -> Self {
        Self {
            start_row_index,
            number_of_rows,
        }
    }

    /// A zero-row request used only to learn the store sizes.
    pub fn probe() -> Self {
        Self::new(0, 0)
    }

    /// Returns `true` if this request carries no rows.
    pub fn is_probe(&self) -> bool {
        self.number_of_rows == 0
    }

    /// Index one past the last requested row.
    pub fn end(&self) -> usize {
        self.start_row_index.saturating_add(self.number_of_rows)
    }

    /// Returns `true` if `index` falls inside the window.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_row_index && index < self.end()
    }
}

impl From<Range<usize>> for RowRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end.saturating_sub(range.start))
    }
}

impl From<RowRange> for Range<usize> {
    fn from(range: RowRange) -> Self {
        range.start_row_index..range.end()
    }
}

/// Page-number addressing for paginated tables.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::{Pagination, RowRange};
///
/// let page = Pagination::new(2, 25);
/// assert_eq!(page.range(), RowRange::new(50, 25));
/// assert_eq!(page.page_count(80), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Zero-based page number.
    pub page_index: usize,
    /// Rows per page.
    pub page_size: usize,
}

impl Pagination {
    /// Creates a pagination position.
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// The row window covered by this page.
    pub fn range(&self) -> RowRange {
        RowRange::new(self.page_index.saturating_mul(self.page_size), self.page_size)
    }

    /// Number of pages needed for `total` rows. Zero page size yields zero pages.
    pub fn page_count(&self, total: usize) -> usize {
        if self.page_size == 0 {
            0
        } else {
            total.div_ceil(self.page_size)
        }
    }

    /// Returns the page that contains row `index`.
    pub fn containing(index: usize, page_size: usize) -> Self {
        let page_index = index.checked_div(page_size).unwrap_or(0);
        Self::new(page_index, page_size)
    }
}
