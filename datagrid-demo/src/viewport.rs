//! A headless viewport driven by the demo script.

use std::ops::Range;

use datagrid_lib::scroll::ScrollBehavior;
use datagrid_lib::scroll::Viewport;

/// Records what a real scroll container would be told to do.
#[derive(Debug, Default)]
pub struct ScriptedViewport {
    offset: f64,
    size: f64,
    content_size: f64,
    rendered: Range<usize>,
    rendered_offset: f64,
}

impl ScriptedViewport {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Scrolls by `delta`, staying inside the content.
    pub fn scroll_by(&mut self, delta: f64) {
        let max = (self.content_size - self.size).max(0.0);
        self.offset = (self.offset + delta).clamp(0.0, max);
    }

    /// One-line description of the current scroll state.
    pub fn summary(&self) -> String {
        format!(
            "offset {}/{} px, rows {:?} drawn at {} px",
            self.offset, self.content_size, self.rendered, self.rendered_offset
        )
    }
}

impl Viewport for ScriptedViewport {
    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn viewport_size(&self) -> f64 {
        self.size
    }

    fn set_total_content_size(&mut self, size: f64) {
        self.content_size = size;
    }

    fn set_rendered_range(&mut self, range: Range<usize>) {
        if range != self.rendered {
            log::trace!("[viewport] Rendering rows {range:?}");
        }
        self.rendered = range;
    }

    fn set_rendered_content_offset(&mut self, offset: f64) {
        self.rendered_offset = offset;
    }

    fn scroll_to_offset(&mut self, offset: f64, behavior: ScrollBehavior) {
        log::debug!("[viewport] Scrolling to {offset} ({behavior:?})");
        self.offset = offset;
    }
}
