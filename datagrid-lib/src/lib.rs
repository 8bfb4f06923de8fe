//! Headless data-grid windowing engine
//!
//! Renders a window of a large, remotely sorted and filtered row set without
//! loading all of it: a [`source::WindowedDataSource`] fetches the rows a
//! [`scroll::FixedRowScrollStrategy`] says are visible, and a
//! [`multisort::MultiSort`] tracks which columns the rows are ordered by.

pub mod endpoint;
pub mod error;
pub mod model;
pub mod multisort;
pub mod query;
pub mod scroll;
pub mod selection;
pub mod source;

pub use source::WindowedDataSource;
