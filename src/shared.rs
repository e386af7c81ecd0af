use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::{spec::PathSpec, table::RoutingTable};

/// A routing table behind an atomically swapped snapshot.
///
/// Readers call [`snapshot`](Self::snapshot) and match against an immutable
/// [`RoutingTable`] without taking any lock; writers publish a rebuilt copy
/// of the table. Nothing inside a published table is ever mutated in place,
/// so readers always observe a fully sorted, consistent view.
///
/// Mutations are copy-on-write and intended for a single-writer discipline
/// (startup plus occasional reconfiguration). Concurrent writers do not
/// corrupt the table, but the last published snapshot wins.
///
/// # Examples
/// ```
/// use route_table::{PathSpec, RoutingTable, SharedRoutingTable};
///
/// let mut table = RoutingTable::new();
/// table.insert(PathSpec::new("/")?, "default");
/// let shared = SharedRoutingTable::new(table);
///
/// let snapshot = shared.snapshot();
/// assert_eq!(*snapshot.best_match("/any").unwrap().resource(), "default");
///
/// // a lookup started before the write keeps its snapshot
/// shared.insert(PathSpec::new("/any")?, "exact");
/// assert_eq!(*snapshot.best_match("/any").unwrap().resource(), "default");
/// assert_eq!(*shared.snapshot().best_match("/any").unwrap().resource(), "exact");
/// # Ok::<_, route_table::MalformedSpec>(())
/// ```
#[derive(Debug)]
pub struct SharedRoutingTable<T> {
    snap: ArcSwap<RoutingTable<T>>,
}

impl<T> SharedRoutingTable<T> {
    /// Wraps `table` as the initial snapshot.
    pub fn new(table: RoutingTable<T>) -> Self {
        SharedRoutingTable {
            snap: ArcSwap::from_pointee(table),
        }
    }

    /// Returns the current snapshot.
    ///
    /// The returned table is immutable and unaffected by later writes; hold
    /// it for the duration of one lookup (or several, if a consistent view
    /// across lookups is wanted).
    pub fn snapshot(&self) -> Arc<RoutingTable<T>> {
        self.snap.load_full()
    }
}

impl<T: Clone> SharedRoutingTable<T> {
    /// Registers `resource` under `spec` and publishes a new snapshot.
    ///
    /// Same replacement semantics as [`RoutingTable::insert`].
    pub fn insert(&self, spec: PathSpec, resource: T) -> Option<T> {
        let mut next = RoutingTable::clone(&self.snap.load());
        let replaced = next.insert(spec, resource);
        self.snap.store(Arc::new(next));
        replaced
    }

    /// Unregisters the mapping with exactly `declaration` and publishes a new
    /// snapshot.
    pub fn remove(&self, declaration: &str) -> Option<T> {
        let mut next = RoutingTable::clone(&self.snap.load());
        let removed = next.remove(declaration);
        self.snap.store(Arc::new(next));
        removed
    }
}

impl<T> Default for SharedRoutingTable<T> {
    fn default() -> Self {
        SharedRoutingTable::new(RoutingTable::default())
    }
}
