//! Request and response contracts exchanged with an endpoint.
//!
//! # Shared Types
//!
//! - [`RowRange`] - A contiguous window of rows to fetch (zero rows is a size probe)
//! - [`Pagination`] - Page-number addressing mapped onto row ranges
//! - [`SortClause`] - One `(field, direction)` sort key; order gives precedence
//! - [`FilterClause`] - Equality or inclusive-range condition on one field
//! - [`Page`] - A window of rows plus total and filtered counts
//! - [`DatastoreSizes`] - The counts alone, published separately from content

mod filter;
mod page;
mod range;
mod sort;

pub use filter::FilterClause;
pub use filter::FilterMode;
pub use page::DatastoreSizes;
pub use page::Page;
pub use range::Pagination;
pub use range::RowRange;
pub use sort::Direction;
pub use sort::SortClause;
pub(crate) use sort::compare_rows;
