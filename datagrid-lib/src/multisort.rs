//! Multi-column sort state.
//!
//! Column headers register with a [`MultiSort`] and call
//! [`toggle`](MultiSort::toggle) when clicked. Each toggle moves that column
//! through its direction cycle while the other sorted columns keep their
//! place, so the clause list reads as "sort by the first clicked column, then
//! the next".

use std::collections::HashMap;

use tokio::sync::watch;

use crate::error::SortError;
use crate::query::Direction;
use crate::query::SortClause;

/// A sortable column registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortableColumn {
    /// Column id, used as the clause field name.
    pub id: String,
    /// First direction of the cycle. Falls back to the tracker default.
    pub start: Option<Direction>,
    /// Skip the unsorted state in the cycle. Falls back to the tracker default.
    pub disable_clear: Option<bool>,
}

impl SortableColumn {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: None,
            disable_clear: None,
        }
    }

    pub fn with_start(mut self, start: Direction) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_disable_clear(mut self, disable_clear: bool) -> Self {
        self.disable_clear = Some(disable_clear);
        self
    }
}

/// Ordered multi-column sort tracker.
///
/// Holds at most one clause per column. Every change is published to
/// [`subscribe`](Self::subscribe) receivers as a full snapshot.
///
/// # Example
///
/// ```
/// use datagrid_lib::multisort::{MultiSort, SortableColumn};
/// use datagrid_lib::query::{Direction, SortClause};
///
/// let mut sort = MultiSort::new();
/// sort.register(SortableColumn::new("name")).unwrap();
/// sort.register(SortableColumn::new("id").with_start(Direction::Desc)).unwrap();
///
/// sort.toggle("name");
/// sort.toggle("id");
/// assert_eq!(sort.clauses(), [SortClause::asc("name"), SortClause::desc("id")]);
/// assert_eq!(sort.position("id"), Some(2));
///
/// sort.toggle("name");
/// assert_eq!(sort.clauses(), [SortClause::desc("name"), SortClause::desc("id")]);
///
/// sort.toggle("name");
/// assert_eq!(sort.clauses(), [SortClause::desc("id")]);
/// ```
#[derive(Debug)]
pub struct MultiSort {
    start: Direction,
    disable_clear: bool,
    columns: HashMap<String, SortableColumn>,
    clauses: Vec<SortClause>,
    changes: watch::Sender<Vec<SortClause>>,
}

impl Default for MultiSort {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiSort {
    /// Creates a tracker starting columns ascending, with clearing enabled.
    pub fn new() -> Self {
        Self {
            start: Direction::Asc,
            disable_clear: false,
            columns: HashMap::new(),
            clauses: Vec::new(),
            changes: watch::Sender::new(Vec::new()),
        }
    }

    /// Sets the default first direction for columns that don't set one.
    pub fn with_start(mut self, start: Direction) -> Self {
        self.start = start;
        self
    }

    /// Sets the default for skipping the unsorted state.
    pub fn with_disable_clear(mut self, disable_clear: bool) -> Self {
        self.disable_clear = disable_clear;
        self
    }

    /// Registers a sortable column.
    ///
    /// An empty or already registered id is a wiring mistake: debug builds
    /// return the error, release builds log it and ignore the registration.
    pub fn register(&mut self, column: SortableColumn) -> Result<(), SortError> {
        let problem = if column.id.is_empty() {
            Some(SortError::MissingId)
        } else if self.columns.contains_key(&column.id) {
            Some(SortError::DuplicateId(column.id.clone()))
        } else {
            None
        };

        if let Some(error) = problem {
            if cfg!(debug_assertions) {
                return Err(error);
            }
            log::warn!("[sort] Ignoring column registration: {error}");
            return Ok(());
        }

        self.columns.insert(column.id.clone(), column);
        Ok(())
    }

    /// Removes a column registration. Its clause, if any, stays in place.
    pub fn deregister(&mut self, id: &str) -> Option<SortableColumn> {
        self.columns.remove(id)
    }

    /// Returns `true` if a column with this id is registered.
    pub fn is_registered(&self, id: &str) -> bool {
        self.columns.contains_key(id)
    }

    /// Advances a column to the next state of its cycle.
    ///
    /// The cycle is `start -> opposite -> unsorted`, or just
    /// `start -> opposite` when clearing is disabled. An unsorted column is
    /// appended at the end of the clause list. Returns the new direction.
    pub fn toggle(&mut self, id: &str) -> Option<Direction> {
        let position = self.clauses.iter().position(|c| c.field_name == id);
        let current = position.map(|index| self.clauses[index].direction);
        let next = self.next_direction(id, current);

        match (position, next) {
            (Some(index), Some(direction)) => self.clauses[index].direction = direction,
            (Some(index), None) => {
                self.clauses.remove(index);
            }
            (None, Some(direction)) => self.clauses.push(SortClause::new(id, direction)),
            (None, None) => {}
        }

        log::debug!("[sort] Toggled {id}: {current:?} -> {next:?}");
        self.emit();
        next
    }

    /// Replaces every clause at once.
    ///
    /// Later clauses on a field that already appeared are dropped.
    pub fn set_all(&mut self, clauses: Vec<SortClause>) {
        let mut unique: Vec<SortClause> = Vec::with_capacity(clauses.len());
        for clause in clauses {
            if !unique.iter().any(|c| c.field_name == clause.field_name) {
                unique.push(clause);
            }
        }
        self.clauses = unique;
        self.emit();
    }

    /// Returns the direction a column is sorted in, if any.
    pub fn direction(&self, id: &str) -> Option<Direction> {
        self.clauses
            .iter()
            .find(|c| c.field_name == id)
            .map(|c| c.direction)
    }

    /// Returns the 1-based precedence of a column, if it is sorted.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.clauses
            .iter()
            .position(|c| c.field_name == id)
            .map(|index| index + 1)
    }

    /// Returns the clauses in precedence order.
    pub fn clauses(&self) -> &[SortClause] {
        &self.clauses
    }

    /// Subscribes to clause snapshots. The current clauses are replayed.
    pub fn subscribe(&self) -> watch::Receiver<Vec<SortClause>> {
        self.changes.subscribe()
    }

    fn next_direction(&self, id: &str, current: Option<Direction>) -> Option<Direction> {
        let column = self.columns.get(id);
        let start = column.and_then(|c| c.start).unwrap_or(self.start);
        let disable_clear = column
            .and_then(|c| c.disable_clear)
            .unwrap_or(self.disable_clear);

        match current {
            None => Some(start),
            Some(direction) if direction == start => Some(start.reverse()),
            Some(_) if disable_clear => Some(start),
            Some(_) => None,
        }
    }

    fn emit(&self) {
        self.changes.send_replace(self.clauses.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cycle() {
        let mut sort = MultiSort::new();
        sort.register(SortableColumn::new("name")).unwrap();

        assert_eq!(sort.toggle("name"), Some(Direction::Asc));
        assert_eq!(sort.toggle("name"), Some(Direction::Desc));
        assert_eq!(sort.toggle("name"), None);
        assert!(sort.clauses().is_empty());
        assert_eq!(sort.toggle("name"), Some(Direction::Asc));
    }

    #[test]
    fn test_descending_start_cycle() {
        let mut sort = MultiSort::new();
        sort.register(SortableColumn::new("id").with_start(Direction::Desc))
            .unwrap();

        assert_eq!(sort.toggle("id"), Some(Direction::Desc));
        assert_eq!(sort.toggle("id"), Some(Direction::Asc));
        assert_eq!(sort.toggle("id"), None);
    }

    #[test]
    fn test_disable_clear_cycle() {
        let mut sort = MultiSort::new().with_disable_clear(true);
        sort.register(SortableColumn::new("name")).unwrap();
        sort.register(SortableColumn::new("id").with_disable_clear(false))
            .unwrap();

        let cycle: Vec<_> = (0..4).map(|_| sort.toggle("name")).collect();
        assert_eq!(
            cycle,
            [
                Some(Direction::Asc),
                Some(Direction::Desc),
                Some(Direction::Asc),
                Some(Direction::Desc)
            ]
        );
        assert_eq!(sort.clauses(), [SortClause::desc("name")]);

        sort.toggle("id");
        sort.toggle("id");
        assert_eq!(sort.toggle("id"), None);
    }

    #[test]
    fn test_clearing_keeps_other_clause_order() {
        let mut sort = MultiSort::new();
        for id in ["a", "b", "c"] {
            sort.register(SortableColumn::new(id)).unwrap();
            sort.toggle(id);
        }

        sort.toggle("a");
        assert_eq!(
            sort.clauses(),
            [SortClause::desc("a"), SortClause::asc("b"), SortClause::asc("c")]
        );

        sort.toggle("b");
        assert_eq!(
            sort.clauses(),
            [SortClause::desc("a"), SortClause::desc("b"), SortClause::asc("c")]
        );
        sort.toggle("b");
        assert_eq!(sort.clauses(), [SortClause::desc("a"), SortClause::asc("c")]);
        assert_eq!(sort.position("c"), Some(2));
        assert_eq!(sort.position("b"), None);

        sort.toggle("b");
        assert_eq!(sort.position("b"), Some(3));
        assert_eq!(sort.direction("b"), Some(Direction::Asc));
    }

    #[test]
    fn test_retoggling_keeps_precedence() {
        let mut sort = MultiSort::new();
        sort.register(SortableColumn::new("a")).unwrap();
        sort.register(SortableColumn::new("b")).unwrap();

        sort.toggle("a");
        sort.toggle("b");
        sort.toggle("a");
        assert_eq!(sort.clauses(), [SortClause::desc("a"), SortClause::asc("b")]);
        assert_eq!(sort.position("a"), Some(1));
    }

    #[test]
    fn test_set_all_keeps_first_clause_per_field() {
        let mut sort = MultiSort::new();
        sort.set_all(vec![
            SortClause::desc("name"),
            SortClause::asc("id"),
            SortClause::asc("name"),
        ]);
        assert_eq!(sort.clauses(), [SortClause::desc("name"), SortClause::asc("id")]);

        // The cycle continues from the bulk-set direction.
        assert_eq!(sort.toggle("name"), None);
    }

    #[test]
    fn test_every_change_is_published() {
        let mut sort = MultiSort::new();
        let mut changes = sort.subscribe();
        assert!(changes.borrow_and_update().is_empty());

        sort.toggle("name");
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), [SortClause::asc("name")]);

        sort.set_all(vec![SortClause::asc("name")]);
        assert!(changes.has_changed().unwrap());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_invalid_registrations_fail_in_debug() {
        let mut sort = MultiSort::new();
        sort.register(SortableColumn::new("name")).unwrap();

        assert_eq!(
            sort.register(SortableColumn::new("name")),
            Err(SortError::DuplicateId("name".to_string()))
        );
        assert_eq!(sort.register(SortableColumn::new("")), Err(SortError::MissingId));
    }

    #[test]
    fn test_deregister() {
        let mut sort = MultiSort::new();
        sort.register(SortableColumn::new("name")).unwrap();
        sort.toggle("name");

        assert!(sort.deregister("name").is_some());
        assert!(!sort.is_registered("name"));
        assert_eq!(sort.direction("name"), Some(Direction::Asc));
        assert!(sort.register(SortableColumn::new("name")).is_ok());
    }
}
