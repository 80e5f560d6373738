use alloc::string::String;

/// Errors surfaced by geometry and recycling operations.
///
/// All of these are local contract violations: the failing operation is a
/// no-op and never corrupts sibling sections' geometry. An empty reuse queue
/// is *not* an error; [`crate::ReusePool::dequeue`] reports it as `None`,
/// since constructing a new view on a pool miss is the expected steady-state
/// cost of populating the pool.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Malformed geometry input, e.g. a negative or non-finite height.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A (section, row) pair outside the current bounds.
    #[error("index path out of bounds: section {section}, row {row}")]
    InvalidIndexPath { section: usize, row: usize },

    /// A section index outside the current bounds.
    #[error("section index out of bounds: {section}")]
    InvalidSection { section: usize },

    /// A query that needs at least one row was made on a zero-row section.
    #[error("section {section} has no rows")]
    EmptySection { section: usize },
}
