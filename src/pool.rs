use alloc::string::{String, ToString};
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
type QueueMap<V> = HashMap<String, Vec<V>>;
#[cfg(not(feature = "std"))]
type QueueMap<V> = BTreeMap<String, Vec<V>>;

/// A view instance that can be pooled and rebound by reuse identifier.
///
/// All instances sharing a reuse identifier are expected to be
/// interchangeable once reconfigured by the data source.
pub trait ReusableView {
    /// The identifier grouping interchangeable instances of this view's kind.
    ///
    /// Must be stable for the lifetime of the view.
    fn reuse_identifier(&self) -> &str;

    /// Called right before the view is handed back to its reuse queue, after
    /// it has been detached from any index-path binding.
    fn prepare_for_reuse(&mut self) {}
}

/// Reuse queues of detached view instances, keyed by reuse identifier.
///
/// Each queue is a stack, so dequeuing hands out the most recently returned
/// instance first. Queues persist across data reloads; they are torn down
/// only with the owning [`crate::Table`].
#[derive(Clone, Debug)]
pub struct ReusePool<V> {
    queues: QueueMap<V>,
}

impl<V> Default for ReusePool<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ReusePool<V> {
    pub fn new() -> Self {
        Self {
            queues: QueueMap::new(),
        }
    }

    /// Removes and returns a pooled instance for `reuse_identifier`.
    ///
    /// `None` means the queue is empty and the caller should construct a new
    /// view; that is the expected steady-state cost of populating the pool,
    /// not an error.
    pub fn dequeue(&mut self, reuse_identifier: &str) -> Option<V> {
        self.queues.get_mut(reuse_identifier)?.pop()
    }

    /// Number of pooled instances for `reuse_identifier`.
    pub fn len(&self, reuse_identifier: &str) -> usize {
        self.queues.get(reuse_identifier).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.queues.values().all(Vec::is_empty)
    }

    /// Total pooled instances across all identifiers.
    pub fn pooled_count(&self) -> usize {
        self.queues.values().map(Vec::len).sum()
    }

    /// Drops every pooled instance.
    pub fn clear(&mut self) {
        self.queues.clear();
    }
}

impl<V: ReusableView> ReusePool<V> {
    /// Returns a detached view to its identifier's queue.
    ///
    /// The caller must have removed the view from any index-path binding
    /// first; `prepare_for_reuse` runs before the view becomes available
    /// again.
    pub fn recycle(&mut self, mut view: V) {
        let identifier = view.reuse_identifier().to_string();
        view.prepare_for_reuse();
        self.queues.entry(identifier).or_default().push(view);
    }
}
