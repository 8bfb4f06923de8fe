//! Rendered windows and the optimistic placeholder computation.

use crate::query::RowRange;

/// One rendered row slot.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSlot<T> {
    /// Real content for this position.
    Loaded(T),
    /// No value yet; render an empty or loading row, never drop it.
    Pending,
}

impl<T> RowSlot<T> {
    /// Returns `true` if the slot is still waiting for content.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns the loaded row, if any.
    pub fn as_loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(row) => Some(row),
            Self::Pending => None,
        }
    }
}

/// The rows published for a requested range.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<T> {
    /// The range this window answers.
    pub range: RowRange,
    /// Row slots, at most `range.number_of_rows` of them.
    pub rows: Vec<RowSlot<T>>,
    /// `true` while the rows are a placeholder computed from cached content.
    pub preliminary: bool,
}

impl<T> Window<T> {
    /// A final window holding real rows.
    pub fn loaded(range: RowRange, rows: Vec<T>) -> Self {
        Self {
            range,
            rows: rows.into_iter().map(RowSlot::Loaded).collect(),
            preliminary: false,
        }
    }

    /// Number of slots in the window.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the window has no slots.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the loaded rows, skipping pending slots.
    pub fn loaded_rows(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().filter_map(RowSlot::as_loaded)
    }
}

impl<T> Default for Window<T> {
    fn default() -> Self {
        Self {
            range: RowRange::default(),
            rows: Vec::new(),
            preliminary: false,
        }
    }
}

/// Computes the placeholder window shown while `range` is being fetched.
///
/// Reuses whatever part of `last_content` (fetched for `last_range`) overlaps
/// the new range and fills the remaining positions with [`RowSlot::Pending`].
/// When moving forward, positions past `filtered_size` are not padded. When
/// moving backward, the gap before the cached rows is padded first.
pub fn placeholder_window<T: Clone>(
    range: RowRange,
    last_range: RowRange,
    last_content: &[T],
    filtered_size: usize,
) -> Window<T> {
    let wanted = range.number_of_rows;
    let mut rows = Vec::with_capacity(wanted);

    if wanted > 0 {
        if range.start_row_index >= last_range.start_row_index {
            let offset = range.start_row_index - last_range.start_row_index;
            let usable = last_content.len().saturating_sub(offset).min(wanted);
            if usable > 0 {
                rows.extend(
                    last_content[offset..offset + usable]
                        .iter()
                        .cloned()
                        .map(RowSlot::Loaded),
                );
            }
            let excess = range.end().saturating_sub(filtered_size);
            let padding = wanted.saturating_sub(usable).saturating_sub(excess);
            rows.extend(std::iter::repeat_with(|| RowSlot::Pending).take(padding));
        } else {
            let offset = last_range.start_row_index - range.start_row_index;
            let leading = offset.min(wanted);
            rows.extend(std::iter::repeat_with(|| RowSlot::Pending).take(leading));
            let room = wanted - leading;
            rows.extend(last_content.iter().take(room).cloned().map(RowSlot::Loaded));
        }
    }

    Window {
        range,
        rows,
        preliminary: true,
    }
}
