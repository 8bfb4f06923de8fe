//! The data source state machine.
//!
//! All transitions are synchronous; the async shell in `mod.rs` only moves
//! tickets between `begin_*` and `finish_*` across the endpoint call.

use super::placeholder::Window;
use super::placeholder::placeholder_window;
use crate::error::EndpointError;
use crate::query::DatastoreSizes;
use crate::query::FilterClause;
use crate::query::Page;
use crate::query::RowRange;
use crate::query::SortClause;

/// What the data source is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing in flight.
    Idle,
    /// The latest row window is being fetched.
    AwaitingRangeFetch,
    /// A size probe is in flight.
    AwaitingSizeProbe,
    /// Both a row window and a size probe are in flight.
    AwaitingBoth,
}

/// Everything needed to issue one row fetch.
#[derive(Debug)]
pub(crate) struct RangeTicket<T> {
    pub generation: u64,
    pub range: RowRange,
    pub sorts: Vec<SortClause>,
    pub filters: Vec<FilterClause>,
    pub placeholder: Window<T>,
}

/// Everything needed to issue one size probe.
#[derive(Debug)]
pub(crate) struct ProbeTicket {
    pub generation: u64,
    pub sorts: Vec<SortClause>,
    pub filters: Vec<FilterClause>,
}

/// Result of applying a row fetch response.
#[derive(Debug)]
pub(crate) enum RangeOutcome<T> {
    /// A newer request was issued since; the response is ignored.
    Stale,
    /// The response became the rendered window.
    Loaded {
        window: Window<T>,
        sizes: DatastoreSizes,
    },
    /// The current request failed; cached content is untouched.
    Failed(EndpointError),
}

#[derive(Debug)]
pub(crate) struct SourceState<T> {
    pub sorts: Vec<SortClause>,
    pub filters: Vec<FilterClause>,
    pub last_range: RowRange,
    pub last_content: Vec<T>,
    pub filtered_size: usize,
    /// Most recent range handed to `begin_range`.
    pub requested: Option<RowRange>,
    range_generation: u64,
    probe_generation: u64,
    range_pending: bool,
    probes_pending: usize,
}

impl<T: Clone> SourceState<T> {
    pub fn new(sorts: Vec<SortClause>, filters: Vec<FilterClause>) -> Self {
        Self {
            sorts,
            filters,
            last_range: RowRange::default(),
            last_content: Vec::new(),
            filtered_size: 0,
            requested: None,
            range_generation: 0,
            probe_generation: 0,
            range_pending: false,
            probes_pending: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.range_pending, self.probes_pending > 0) {
            (false, false) => Phase::Idle,
            (true, false) => Phase::AwaitingRangeFetch,
            (false, true) => Phase::AwaitingSizeProbe,
            (true, true) => Phase::AwaitingBoth,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.range_pending
    }

    /// Starts a row fetch, superseding any fetch still in flight.
    pub fn begin_range(&mut self, range: RowRange) -> RangeTicket<T> {
        self.range_generation += 1;
        self.range_pending = true;
        self.requested = Some(range);
        RangeTicket {
            generation: self.range_generation,
            range,
            sorts: self.sorts.clone(),
            filters: self.filters.clone(),
            placeholder: placeholder_window(
                range,
                self.last_range,
                &self.last_content,
                self.filtered_size,
            ),
        }
    }

    pub fn finish_range(
        &mut self,
        generation: u64,
        range: RowRange,
        result: Result<Page<T>, EndpointError>,
    ) -> RangeOutcome<T> {
        if generation != self.range_generation {
            return RangeOutcome::Stale;
        }
        self.range_pending = false;

        match result {
            Ok(page) => {
                let sizes = page.sizes();
                let content = page.into_content();
                self.last_range = range;
                self.last_content = content.clone();
                self.filtered_size = sizes.total_filtered_elements;
                RangeOutcome::Loaded {
                    window: Window::loaded(range, content),
                    sizes,
                }
            }
            Err(error) => RangeOutcome::Failed(error),
        }
    }

    pub fn begin_probe(&mut self) -> ProbeTicket {
        self.probe_generation += 1;
        self.probes_pending += 1;
        ProbeTicket {
            generation: self.probe_generation,
            sorts: self.sorts.clone(),
            filters: self.filters.clone(),
        }
    }

    /// Returns `true` if no probe was started after this one.
    pub fn is_current_probe(&self, generation: u64) -> bool {
        generation == self.probe_generation
    }

    /// Settles a probe. Returns the sizes to publish, or `None` if the probe
    /// failed or a newer probe was started in the meantime.
    pub fn finish_probe(
        &mut self,
        generation: u64,
        sizes: Option<DatastoreSizes>,
    ) -> Option<DatastoreSizes> {
        self.probes_pending = self.probes_pending.saturating_sub(1);
        if !self.is_current_probe(generation) {
            return None;
        }
        let sizes = sizes?;
        self.filtered_size = sizes.total_filtered_elements;
        Some(sizes)
    }

    /// Invalidates everything in flight.
    pub fn abandon_pending(&mut self) {
        self.range_generation += 1;
        self.probe_generation += 1;
        self.range_pending = false;
        self.probes_pending = 0;
    }
}
