use crate::{IndexPath, ReusePool};

/// Row height assumed when a delegate does not override
/// [`TableDelegate::height_for_row`].
pub const DEFAULT_ROW_HEIGHT: f64 = 42.0;

/// Supplies the table's contents: section/row counts and configured row
/// views.
///
/// The optional-protocol idiom of the surrounding UI world maps to default
/// trait methods here: implement only what you need, the defaults supply the
/// rest.
pub trait TableDataSource<V> {
    fn number_of_rows_in_section(&mut self, section: usize) -> usize;

    /// Returns a view configured for the row at `path`.
    ///
    /// Dequeue from `pool` by reuse identifier and reconfigure on a hit;
    /// construct a new view on a miss. The engine binds the returned view to
    /// `path` until the row leaves the visible range.
    fn cell_for_row(&mut self, pool: &mut ReusePool<V>, path: IndexPath) -> V;

    fn number_of_sections(&mut self) -> usize {
        1
    }
}

/// Supplies per-row and per-section geometry plus header/footer views.
///
/// Every method has a default, so `&mut ()` is a valid delegate: 42-point
/// rows, no headers, no footers.
pub trait TableDelegate<V> {
    fn height_for_row(&mut self, _path: IndexPath) -> f64 {
        DEFAULT_ROW_HEIGHT
    }

    fn height_for_header_in_section(&mut self, _section: usize) -> f64 {
        0.0
    }

    fn view_for_header_in_section(
        &mut self,
        _pool: &mut ReusePool<V>,
        _section: usize,
    ) -> Option<V> {
        None
    }

    fn height_for_footer_in_section(&mut self, _section: usize) -> f64 {
        0.0
    }

    fn view_for_footer_in_section(
        &mut self,
        _pool: &mut ReusePool<V>,
        _section: usize,
    ) -> Option<V> {
        None
    }
}

/// The all-defaults delegate.
impl<V> TableDelegate<V> for () {}
