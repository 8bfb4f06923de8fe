//! The viewport seam between the scroll strategy and a host widget

use std::ops::Range;

/// How the viewport should move to a new scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Jump straight to the target.
    #[default]
    Instant,
    /// Animate to the target, if the host supports it.
    Smooth,
}

/// A scrollable area showing a slice of the rows.
///
/// Implemented by the host UI. The strategy reads the scroll position and
/// size from it and tells it which rows to render and where.
pub trait Viewport {
    /// Current scroll position from the top of the content.
    fn scroll_offset(&self) -> f64;

    /// Visible height of the viewport, header and footer included.
    fn viewport_size(&self) -> f64;

    /// Sets the height of the whole scrollable content.
    fn set_total_content_size(&mut self, size: f64);

    /// Sets the row indices that should be rendered.
    fn set_rendered_range(&mut self, range: Range<usize>);

    /// Sets how far from the top the rendered rows start.
    fn set_rendered_content_offset(&mut self, offset: f64);

    /// Moves the viewport to `offset`.
    fn scroll_to_offset(&mut self, offset: f64, behavior: ScrollBehavior);
}
