//! Fixed-row virtual scrolling.
//!
//! [`FixedRowScrollStrategy`] maps a viewport's scroll position to the range
//! of rows that should be rendered, including a buffer of off-screen rows on
//! both sides. It knows nothing about where rows come from; feed its
//! [`row_ranges`](FixedRowScrollStrategy::row_ranges) into
//! [`WindowedDataSource::attach_scroller`](crate::source::WindowedDataSource::attach_scroller)
//! and its data length from the source's filtered size.

mod config;
mod viewport;

pub use config::*;
pub use viewport::*;

use std::ops::Range;

use futures::Stream;
use tokio::sync::watch;

use crate::error::ConfigError;
use crate::query::RowRange;

/// Scroll distance, in rows, that moves the rendered window.
///
/// Smaller movements only update the scrolled index, so smooth or inertial
/// scrolling does not re-request rows on every frame.
pub const ROW_SENSITIVITY: f64 = 1.0;

/// Virtual scroll strategy for tables whose rows all share one height.
///
/// # Example
///
/// ```ignore
/// let mut strategy = FixedRowScrollStrategy::new(ScrollConfig::default())?;
/// strategy.attach(my_viewport);
/// source.attach_scroller(strategy.row_ranges())?;
///
/// // On every scroll event from the host:
/// strategy.on_content_scrolled();
/// ```
#[derive(Debug)]
pub struct FixedRowScrollStrategy<V> {
    config: ScrollConfig,
    viewport: Option<V>,
    data_length: usize,
    rendered_offset: f64,
    rendered_range: Range<usize>,
    scrolled_index: watch::Sender<usize>,
    visible_rows: watch::Sender<usize>,
    rendered: watch::Sender<RowRange>,
    sticky_offset: watch::Sender<f64>,
}

impl<V: Viewport> FixedRowScrollStrategy<V> {
    /// Creates a detached strategy.
    pub fn new(config: ScrollConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            viewport: None,
            data_length: 0,
            rendered_offset: 0.0,
            rendered_range: 0..0,
            scrolled_index: watch::Sender::new(0),
            visible_rows: watch::Sender::new(0),
            rendered: watch::Sender::new(RowRange::default()),
            sticky_offset: watch::Sender::new(0.0),
        })
    }

    /// Returns the current geometry.
    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Replaces the geometry and recomputes the layout.
    pub fn set_config(&mut self, config: ScrollConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.on_data_length_changed();
        Ok(())
    }

    /// Attaches a viewport, replacing any previous one.
    pub fn attach(&mut self, viewport: V) -> Option<V> {
        let previous = self.viewport.replace(viewport);
        self.on_data_length_changed();
        previous
    }

    /// Detaches and returns the viewport.
    pub fn detach(&mut self) -> Option<V> {
        self.viewport.take()
    }

    pub fn viewport(&self) -> Option<&V> {
        self.viewport.as_ref()
    }

    pub fn viewport_mut(&mut self) -> Option<&mut V> {
        self.viewport.as_mut()
    }

    /// Returns the number of rows being scrolled over.
    pub fn data_length(&self) -> usize {
        self.data_length
    }

    /// Sets the number of rows, usually the source's filtered size.
    pub fn set_data_length(&mut self, length: usize) {
        if self.data_length != length {
            self.data_length = length;
            self.on_data_length_changed();
        }
    }

    /// Resizes the scrollable content to the data length.
    ///
    /// If the viewport now shows space past the end of the content, it is
    /// scrolled back so the last row sits at the bottom.
    pub fn on_data_length_changed(&mut self) {
        let Some(viewport) = self.viewport.as_mut() else {
            return;
        };
        let content_size = self.data_length as f64 * self.config.row_height
            + self.config.header_height
            + self.config.footer_height;
        viewport.set_total_content_size(content_size);

        let viewport_size = viewport.viewport_size();
        let offset = viewport.scroll_offset();
        if offset + viewport_size > content_size {
            let clamped = (content_size - viewport_size).max(0.0);
            if clamped != offset {
                viewport.scroll_to_offset(clamped, ScrollBehavior::Instant);
            }
        }
        self.update_content();
    }

    /// Call when the viewport scrolled.
    pub fn on_content_scrolled(&mut self) {
        self.update_content();
    }

    /// Call when the viewport changed size.
    pub fn on_viewport_resized(&mut self) {
        self.update_content();
    }

    /// Scrolls so that row `index` is near the top of the viewport.
    ///
    /// The target leaves the previous row peeking in above it:
    /// `(index - 1) * row_height + header_height`, never below zero.
    pub fn scroll_to_index(
        &mut self,
        index: usize,
        behavior: ScrollBehavior,
    ) -> Result<(), ConfigError> {
        let viewport = self
            .viewport
            .as_mut()
            .ok_or(ConfigError::ViewportNotAttached)?;
        let target =
            ((index as f64 - 1.0) * self.config.row_height + self.config.header_height).max(0.0);
        viewport.scroll_to_offset(target, behavior);
        self.update_content();
        Ok(())
    }

    /// Returns the rows currently rendered. The end may exceed the data
    /// length; the data source answers with fewer rows there.
    pub fn rendered_range(&self) -> Range<usize> {
        self.rendered_range.clone()
    }

    /// Returns the offset of the first rendered row.
    pub fn rendered_offset(&self) -> f64 {
        self.rendered_offset
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Index of the first visible row, emitted when it changes.
    pub fn scrolled_index(&self) -> watch::Receiver<usize> {
        self.scrolled_index.subscribe()
    }

    /// Number of rows that fit in the viewport, emitted when it changes.
    pub fn visible_rows(&self) -> watch::Receiver<usize> {
        self.visible_rows.subscribe()
    }

    /// Rendered range, emitted when it changes.
    pub fn rendered_ranges(&self) -> watch::Receiver<RowRange> {
        self.rendered.subscribe()
    }

    /// Rendered content offset, emitted each time the rendered window moves.
    /// Sticky headers and footers reposition from it.
    pub fn sticky_offset(&self) -> watch::Receiver<f64> {
        self.sticky_offset.subscribe()
    }

    /// Streams the rendered range, starting with the current one.
    ///
    /// Ends when the strategy is dropped.
    pub fn row_ranges(&self) -> impl Stream<Item = RowRange> + Send + 'static {
        let mut ranges = self.rendered.subscribe();
        async_stream::stream! {
            loop {
                let range = *ranges.borrow_and_update();
                yield range;
                if ranges.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    fn update_content(&mut self) {
        let Some(viewport) = self.viewport.as_mut() else {
            return;
        };
        let ScrollConfig {
            row_height,
            header_height,
            footer_height,
            buffer_multiplier,
        } = self.config;

        let scroll_offset = viewport.scroll_offset();
        let usable = (viewport.viewport_size() - header_height - footer_height).max(0.0);
        let items_displayed = (usable / row_height).ceil() as usize;
        let buffer_items = (items_displayed as f64 * buffer_multiplier).ceil() as usize;
        let span = items_displayed + 2 * buffer_items;

        let start = (self.rendered_offset / row_height).floor() as usize;
        let buffer_offset = self.rendered_offset + buffer_items as f64 * row_height;
        let rows_scrolled = (scroll_offset - buffer_offset) / row_height;

        publish(
            &self.scrolled_index,
            (scroll_offset.max(0.0) / row_height).floor() as usize,
        );
        publish(&self.visible_rows, items_displayed);

        // At the top the leading rows are visible and buffered at once, so
        // scrolling back up there never moves the window.
        if rows_scrolled.abs() < ROW_SENSITIVITY
            || (self.rendered_offset == 0.0 && rows_scrolled < 0.0)
        {
            let range = start..start + span;
            viewport.set_rendered_content_offset(self.rendered_offset);
            viewport.set_rendered_range(range.clone());
            publish(&self.rendered, RowRange::from(range.clone()));
            self.rendered_range = range;
            return;
        }

        let rows_to_move = rows_scrolled.signum() * rows_scrolled.abs().floor();
        let adjusted_offset = (self.rendered_offset + rows_to_move * row_height).max(0.0);
        let adjusted_start = (start as f64 + rows_to_move).max(0.0) as usize;
        let range = adjusted_start..adjusted_start + span;

        self.rendered_offset = adjusted_offset;
        viewport.set_rendered_content_offset(adjusted_offset);
        viewport.set_rendered_range(range.clone());
        publish(&self.rendered, RowRange::from(range.clone()));
        self.rendered_range = range;
        self.sticky_offset.send_replace(adjusted_offset);
    }
}

fn publish<T: PartialEq>(sender: &watch::Sender<T>, value: T) {
    sender.send_if_modified(|current| {
        if *current == value {
            return false;
        }
        *current = value;
        true
    });
}
