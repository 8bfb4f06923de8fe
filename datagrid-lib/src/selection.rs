//! Row selection state.
//!
//! Rows are selected by key (usually the track-by value) rather than by
//! position, so a selection survives scrolling, re-sorting and refetching.

use std::collections::BTreeSet;

use crate::error::SelectionError;

/// Selection mode for a grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// No selection allowed
    #[default]
    None,
    /// Single row selection
    Single,
    /// Any number of rows
    Multi,
}

/// Key-based row selection.
///
/// # Example
///
/// ```
/// use datagrid_lib::selection::{RowSelection, SelectionMode};
///
/// let mut selection = RowSelection::new(SelectionMode::Single);
/// selection.select(55).unwrap();
/// selection.select(12).unwrap();
/// assert_eq!(selection.selected(), vec![12]);
///
/// assert!(selection.set_selected([1, 2]).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RowSelection<K> {
    mode: SelectionMode,
    selected: BTreeSet<K>,
}

impl<K: Ord + Clone> RowSelection<K> {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: BTreeSet::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Changes the mode, failing if the current keys don't fit the new one.
    pub fn set_mode(&mut self, mode: SelectionMode) -> Result<(), SelectionError> {
        check(mode, self.selected.len())?;
        self.mode = mode;
        Ok(())
    }

    /// Get all selected keys in key order.
    pub fn selected(&self) -> Vec<K> {
        self.selected.iter().cloned().collect()
    }

    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selects a row. In single mode the previous row is deselected.
    pub fn select(&mut self, key: K) -> Result<(), SelectionError> {
        match self.mode {
            SelectionMode::None => return Err(SelectionError::Disabled),
            SelectionMode::Single => self.selected.clear(),
            SelectionMode::Multi => {}
        }
        self.selected.insert(key);
        Ok(())
    }

    /// Deselects a row, returning `true` if it was selected.
    pub fn deselect(&mut self, key: &K) -> bool {
        self.selected.remove(key)
    }

    /// Flips a row's selection. Returns whether it is now selected.
    pub fn toggle(&mut self, key: K) -> Result<bool, SelectionError> {
        if self.selected.remove(&key) {
            return Ok(false);
        }
        self.select(key)?;
        Ok(true)
    }

    /// Deselects everything, returning the keys that were selected.
    pub fn clear(&mut self) -> Vec<K> {
        std::mem::take(&mut self.selected).into_iter().collect()
    }

    /// Replaces the selection with `keys`.
    ///
    /// Fails without touching the selection if the distinct keys don't fit
    /// the mode: any key while disabled, or several in single mode.
    pub fn set_selected(&mut self, keys: impl IntoIterator<Item = K>) -> Result<(), SelectionError> {
        let keys: BTreeSet<K> = keys.into_iter().collect();
        check(self.mode, keys.len())?;
        self.selected = keys;
        Ok(())
    }
}

fn check(mode: SelectionMode, count: usize) -> Result<(), SelectionError> {
    match mode {
        SelectionMode::None if count > 0 => Err(SelectionError::Disabled),
        SelectionMode::Single if count > 1 => Err(SelectionError::TooManyKeys { mode, count }),
        _ => Ok(()),
    }
}
