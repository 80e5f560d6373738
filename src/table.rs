use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::section::SectionGeometry;
use crate::{
    IndexPath, Rect, Region, ReusableView, ReusePool, ScrollPosition, TableDataSource,
    TableDelegate, TableError, Viewport, VisibleRange,
};

#[cfg(not(feature = "std"))]
type RegionMap<V> = alloc::collections::BTreeMap<Region, V>;
#[cfg(feature = "std")]
type RegionMap<V> = std::collections::HashMap<Region, V>;

/// A callback fired when the table's geometry, scroll state, or visible set
/// changes. Coalesced by [`Table::batch_update`].
pub type OnChangeCallback<V> = Arc<dyn Fn(&Table<V>) + Send + Sync>;

/// The table layout and recycling engine.
///
/// This type is headless: it owns geometry (one [`SectionGeometry`] per
/// section), the reuse queues, and the visible-region → view bindings, but no
/// scrolling surface. The presentation host drives it:
/// - report viewport size and scroll offset ([`Table::set_viewport`],
///   [`Table::set_scroll_offset`], [`Table::apply_scroll_frame`])
/// - call [`Table::reload_data`] when the dataset changes and
///   [`Table::layout_visible`] after scroll/viewport updates
/// - render the bound views via [`Table::for_each_visible_region`]
///
/// All mapping and search operations are synchronous and run in
/// O(log sections + log rows); visible-set maintenance is O(visible regions)
/// per call. The data source and delegate are only ever invoked from within
/// `reload_data`/`layout_visible`, and they receive a disjoint borrow of the
/// reuse pool, so a callback cannot re-enter the engine.
pub struct Table<V> {
    sections: Vec<SectionGeometry>,
    pool: ReusePool<V>,
    visible: RegionMap<V>,
    viewport: Viewport,
    scroll_offset: f64,
    overscan: usize,
    on_change: Option<OnChangeCallback<V>>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Table<V> {
    /// Creates an empty table. The sections array stays empty until the
    /// first [`Table::reload_data`].
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            pool: ReusePool::new(),
            visible: RegionMap::new(),
            viewport: Viewport::default(),
            scroll_offset: 0.0,
            overscan: 0,
            on_change: None,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    pub fn sections(&self) -> &[SectionGeometry] {
        &self.sections
    }

    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn number_of_rows_in_section(&self, section: usize) -> Option<usize> {
        self.sections.get(section).map(SectionGeometry::number_of_rows)
    }

    /// Total row count, flattened across all sections.
    pub fn number_of_rows(&self) -> usize {
        self.sections
            .last()
            .map(|s| s.global_index_of_first_row() + s.number_of_rows())
            .unwrap_or(0)
    }

    /// Height of the whole content: every section's header, rows, and footer.
    pub fn total_height(&self) -> f64 {
        self.sections
            .last()
            .map(|s| s.y_offset() + s.total_height())
            .unwrap_or(0.0)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        self.notify();
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: f64) {
        if self.scroll_offset == offset {
            return;
        }
        self.scroll_offset = offset;
        self.notify();
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: f64) {
        let clamped = self.clamp_scroll_offset(offset);
        self.set_scroll_offset(clamped);
    }

    /// Applies a viewport + scroll update from the host in a single coalesced
    /// change notification.
    pub fn apply_scroll_frame(&mut self, viewport: Viewport, scroll_offset: f64) {
        self.batch_update(|t| {
            t.set_viewport(viewport);
            t.set_scroll_offset_clamped(scroll_offset);
        });
    }

    /// Rows kept bound beyond each viewport edge by
    /// [`Table::layout_visible`], so small scrolls reconfigure nothing.
    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.overscan = overscan;
        self.notify();
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&Table<V>) + Send + Sync + 'static>,
    ) {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self.notify();
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.on_change {
            cb(self);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    pub fn max_scroll_offset(&self) -> f64 {
        (self.total_height() - self.viewport.height).max(0.0)
    }

    pub fn clamp_scroll_offset(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_scroll_offset())
    }

    /// Flattened index of the row at `path`.
    pub fn global_row_index(&self, path: IndexPath) -> Result<usize, TableError> {
        let s = self
            .sections
            .get(path.section)
            .ok_or(TableError::InvalidIndexPath {
                section: path.section,
                row: path.row,
            })?;
        if path.row >= s.number_of_rows() {
            return Err(TableError::InvalidIndexPath {
                section: path.section,
                row: path.row,
            });
        }
        Ok(s.global_index_of_first_row() + path.row)
    }

    /// Inverse of [`Table::global_row_index`]; `None` past the last row.
    pub fn index_path_for_global_index(&self, global: usize) -> Option<IndexPath> {
        let si = self
            .sections
            .partition_point(|s| s.global_index_of_first_row() <= global);
        // Ties from zero-row sections share a first-row index; the last
        // section starting at or before `global` is the one that holds it.
        let si = si.checked_sub(1)?;
        let s = &self.sections[si];
        let row = global - s.global_index_of_first_row();
        (row < s.number_of_rows()).then(|| IndexPath::new(si, row))
    }

    pub fn global_index_of_last_row_in_section(
        &self,
        section: usize,
    ) -> Result<usize, TableError> {
        let s = self
            .sections
            .get(section)
            .ok_or(TableError::InvalidSection { section })?;
        s.global_index_of_last_row()
            .ok_or(TableError::EmptySection { section })
    }

    /// Maps a content offset to the row whose vertical range contains it.
    ///
    /// Offsets before the content clamp to the first row, offsets past the
    /// content clamp to the last row; offsets landing in a header, footer, or
    /// zero-row section resolve to the nearest row in global-row order.
    /// `None` only when the table has no rows at all.
    pub fn index_path_at_offset(&self, y: f64) -> Option<IndexPath> {
        let total_rows = self.number_of_rows();
        if total_rows == 0 {
            return None;
        }
        if y >= self.total_height() {
            return self.index_path_for_global_index(total_rows - 1);
        }
        let y = y.max(0.0);

        let si = self
            .sections
            .partition_point(|s| s.y_offset() + s.total_height() <= y);
        let si = si.min(self.sections.len() - 1);
        let s = &self.sections[si];

        let local = y - s.y_offset() - s.header_height();
        if local >= 0.0 {
            if let Some(row) = s.row_at_local_offset(local) {
                return Some(IndexPath::new(si, row));
            }
        }
        let global = if local < 0.0 || s.number_of_rows() == 0 {
            // Header band or an empty section: first row at or after it.
            s.global_index_of_first_row()
        } else {
            // Footer band: first row of a later section.
            s.global_index_of_first_row() + s.number_of_rows()
        };
        self.index_path_for_global_index(global.min(total_rows - 1))
    }

    /// Precise variant of the offset search: reports the header, row, or
    /// footer band containing `y`, without clamping. `None` outside the
    /// content or in a stretch no region covers.
    pub fn region_at_offset(&self, y: f64) -> Option<Region> {
        if y < 0.0 || y >= self.total_height() {
            return None;
        }
        let si = self
            .sections
            .partition_point(|s| s.y_offset() + s.total_height() <= y);
        let s = self.sections.get(si)?;

        let local = y - s.y_offset();
        if local < s.header_height() {
            return Some(Region::Header(si));
        }
        let in_rows = local - s.header_height();
        if let Some(row) = s.row_at_local_offset(in_rows) {
            return Some(Region::Row(IndexPath::new(si, row)));
        }
        if in_rows >= s.rows_height() && s.footer_height() > 0.0 {
            return Some(Region::Footer(si));
        }
        None
    }

    /// The row's frame in content coordinates: full content width, top below
    /// the section header and all prior rows.
    pub fn rect_for_row(&self, path: IndexPath) -> Result<Rect, TableError> {
        self.row_rect(path).ok_or(TableError::InvalidIndexPath {
            section: path.section,
            row: path.row,
        })
    }

    pub fn rect_for_header(&self, section: usize) -> Result<Rect, TableError> {
        let s = self
            .sections
            .get(section)
            .ok_or(TableError::InvalidSection { section })?;
        Ok(Rect {
            x: 0.0,
            y: s.y_offset(),
            width: self.viewport.width,
            height: s.header_height(),
        })
    }

    pub fn rect_for_footer(&self, section: usize) -> Result<Rect, TableError> {
        let s = self
            .sections
            .get(section)
            .ok_or(TableError::InvalidSection { section })?;
        Ok(Rect {
            x: 0.0,
            y: s.y_offset() + s.total_height() - s.footer_height(),
            width: self.viewport.width,
            height: s.footer_height(),
        })
    }

    /// The whole section band: header through footer.
    pub fn rect_for_section(&self, section: usize) -> Result<Rect, TableError> {
        let s = self
            .sections
            .get(section)
            .ok_or(TableError::InvalidSection { section })?;
        Ok(Rect {
            x: 0.0,
            y: s.y_offset(),
            width: self.viewport.width,
            height: s.total_height(),
        })
    }

    pub fn rect_for_region(&self, region: Region) -> Result<Rect, TableError> {
        match region {
            Region::Header(section) => self.rect_for_header(section),
            Region::Row(path) => self.rect_for_row(path),
            Region::Footer(section) => self.rect_for_footer(section),
        }
    }

    /// The inclusive row span intersecting the viewport band
    /// `[scroll_offset, scroll_offset + viewport.height)`.
    ///
    /// `None` when no row intersects it (empty table, zero viewport, or a
    /// viewport entirely inside header/footer bands or past the content).
    pub fn visible_range(&self) -> Option<VisibleRange> {
        if self.viewport.height <= 0.0 {
            return None;
        }
        let top = self.scroll_offset;
        let bottom = top + self.viewport.height;

        let mut first = self.index_path_at_offset(top)?;
        // The clamped search may land on the last row even when `top` is past
        // it; the window is half-open, so step off rows that end at or above
        // `top`.
        if self.row_rect(first)?.bottom() <= top {
            first = self.next_path(first)?;
        }

        let mut last = self.index_path_at_offset(bottom)?;
        // Same at the bottom edge: a row starting at or below `bottom` is out.
        if self.row_rect(last)?.y >= bottom {
            last = self.prev_path(last)?;
        }

        (first <= last).then_some(VisibleRange { first, last })
    }

    pub fn is_row_visible(&self, path: IndexPath) -> bool {
        self.visible.contains_key(&Region::Row(path))
    }

    /// The view currently bound to a row, while it is visible.
    pub fn cell_at(&self, path: IndexPath) -> Option<&V> {
        self.visible.get(&Region::Row(path))
    }

    pub fn cell_at_mut(&mut self, path: IndexPath) -> Option<&mut V> {
        self.visible.get_mut(&Region::Row(path))
    }

    pub fn view_for_region(&self, region: Region) -> Option<&V> {
        self.visible.get(&region)
    }

    pub fn view_for_region_mut(&mut self, region: Region) -> Option<&mut V> {
        self.visible.get_mut(&region)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Calls `f` for every bound region with its content-space rect.
    ///
    /// Iteration order is unspecified; hosts position views by rect.
    pub fn for_each_visible_region(&self, mut f: impl FnMut(Region, Rect, &V)) {
        for (&region, view) in self.visible.iter() {
            if let Ok(rect) = self.rect_for_region(region) {
                f(region, rect, view);
            }
        }
    }

    /// Removes and returns a pooled view for `reuse_identifier`, if any.
    ///
    /// `None` is the expected pool-miss signal: construct a new view.
    pub fn dequeue_reusable_cell(&mut self, reuse_identifier: &str) -> Option<V> {
        self.pool.dequeue(reuse_identifier)
    }

    pub fn pool(&self) -> &ReusePool<V> {
        &self.pool
    }

    /// Computes the offset that puts the row where `position` asks, clamped
    /// to the valid scroll range, without applying it. Hosts that animate
    /// scrolling drive their own tween toward this value.
    pub fn scroll_to_row_offset(
        &self,
        path: IndexPath,
        position: ScrollPosition,
    ) -> Result<f64, TableError> {
        let rect = self.rect_for_row(path)?;
        let view = self.viewport.height;
        let target = match position {
            ScrollPosition::Top => rect.y,
            ScrollPosition::Middle => rect.y + rect.height / 2.0 - view / 2.0,
            ScrollPosition::Bottom => rect.bottom() - view,
            ScrollPosition::None => {
                let top = self.scroll_offset;
                if rect.y >= top && rect.bottom() <= top + view {
                    top
                } else if rect.y < top {
                    rect.y
                } else {
                    rect.bottom() - view
                }
            }
        };
        Ok(self.clamp_scroll_offset(target))
    }

    /// Scrolls so the row sits where `position` asks, clamped to the content.
    ///
    /// Returns the applied offset. The host re-binds views afterwards via
    /// [`Table::layout_visible`].
    pub fn scroll_to_row(
        &mut self,
        path: IndexPath,
        position: ScrollPosition,
    ) -> Result<f64, TableError> {
        let offset = self.scroll_to_row_offset(path, position)?;
        ttrace!(
            section = path.section,
            row = path.row,
            offset,
            "scroll_to_row"
        );
        self.set_scroll_offset(offset);
        Ok(offset)
    }

    fn row_rect(&self, path: IndexPath) -> Option<Rect> {
        let s = self.sections.get(path.section)?;
        let height = s.row_height(path.row)?;
        let top = s.row_top(path.row)?;
        Some(Rect {
            x: 0.0,
            y: s.y_offset() + s.header_height() + top,
            width: self.viewport.width,
            height,
        })
    }

    fn next_path(&self, path: IndexPath) -> Option<IndexPath> {
        let global = self.global_row_index(path).ok()?;
        self.index_path_for_global_index(global + 1)
    }

    fn prev_path(&self, path: IndexPath) -> Option<IndexPath> {
        let global = self.global_row_index(path).ok()?;
        self.index_path_for_global_index(global.checked_sub(1)?)
    }

    /// Regions that should be bound for the current viewport: visible rows
    /// widened by `overscan`, plus headers/footers intersecting the viewport.
    fn desired_regions(&self) -> Vec<Region> {
        let mut out = Vec::new();
        if self.viewport.height <= 0.0 {
            return out;
        }
        let top = self.scroll_offset;
        let bottom = top + self.viewport.height;

        let si_start = self
            .sections
            .partition_point(|s| s.y_offset() + s.total_height() <= top);
        let si_end = self.sections.partition_point(|s| s.y_offset() < bottom);
        for si in si_start..si_end {
            if let Ok(rect) = self.rect_for_header(si) {
                if rect.intersects_band(top, bottom) {
                    out.push(Region::Header(si));
                }
            }
            if let Ok(rect) = self.rect_for_footer(si) {
                if rect.intersects_band(top, bottom) {
                    out.push(Region::Footer(si));
                }
            }
        }

        if let Some(range) = self.visible_range() {
            let first = self.global_row_index(range.first).ok();
            let last = self.global_row_index(range.last).ok();
            if let (Some(first), Some(last)) = (first, last) {
                let first = first.saturating_sub(self.overscan);
                let last = last
                    .saturating_add(self.overscan)
                    .min(self.number_of_rows().saturating_sub(1));
                for global in first..=last {
                    if let Some(path) = self.index_path_for_global_index(global) {
                        out.push(Region::Row(path));
                    }
                }
            }
        }
        out
    }

    /// Replaces one section's row heights and re-places every later section
    /// in a single left-to-right pass; those are the only sections whose
    /// `y_offset`/`global_index_of_first_row` a mid-table change can move.
    ///
    /// Bindings are reconciled on the next [`Table::layout_visible`].
    pub fn set_row_heights_for_section(
        &mut self,
        section: usize,
        heights: Vec<f64>,
    ) -> Result<(), TableError> {
        let record = self
            .sections
            .get_mut(section)
            .ok_or(TableError::InvalidSection { section })?;
        record.set_row_heights(heights)?;
        place_sections(&mut self.sections, section + 1);
        self.notify();
        Ok(())
    }

    pub fn set_header_height_for_section(
        &mut self,
        section: usize,
        height: f64,
    ) -> Result<(), TableError> {
        let record = self
            .sections
            .get_mut(section)
            .ok_or(TableError::InvalidSection { section })?;
        record.set_header_height(height)?;
        place_sections(&mut self.sections, section + 1);
        self.notify();
        Ok(())
    }

    pub fn set_footer_height_for_section(
        &mut self,
        section: usize,
        height: f64,
    ) -> Result<(), TableError> {
        let record = self
            .sections
            .get_mut(section)
            .ok_or(TableError::InvalidSection { section })?;
        record.set_footer_height(height)?;
        place_sections(&mut self.sections, section + 1);
        self.notify();
        Ok(())
    }
}

impl<V: ReusableView> Table<V> {
    /// Rebuilds every section's geometry from the data source and delegate,
    /// then rebinds the visible set.
    ///
    /// This is the only operation that may invalidate previously returned
    /// rects and index paths. All previously bound views go back to their
    /// reuse queues before rebinding, so every visible row is reconfigured
    /// through the data source against the new data. On a malformed height
    /// from the delegate the reload fails with
    /// [`TableError::InvalidArgument`] and the previous geometry, bindings,
    /// and scroll state stay untouched.
    pub fn reload_data(
        &mut self,
        source: &mut impl TableDataSource<V>,
        delegate: &mut impl TableDelegate<V>,
    ) -> Result<(), TableError> {
        let section_count = source.number_of_sections();
        let mut next: Vec<SectionGeometry> = Vec::with_capacity(section_count);
        for section in 0..section_count {
            let rows = source.number_of_rows_in_section(section);
            let mut heights = Vec::with_capacity(rows);
            for row in 0..rows {
                heights.push(delegate.height_for_row(IndexPath::new(section, row)));
            }
            let mut record = SectionGeometry::new();
            record.set_row_heights(heights)?;
            record.set_header_height(delegate.height_for_header_in_section(section))?;
            record.set_footer_height(delegate.height_for_footer_in_section(section))?;
            next.push(record);
        }
        place_sections(&mut next, 0);

        self.sections = next;
        tdebug!(
            sections = self.sections.len(),
            rows = self.number_of_rows(),
            total_height = self.total_height(),
            "reload_data"
        );
        self.batch_update(|t| {
            t.set_scroll_offset_clamped(t.scroll_offset);
            t.recycle_all_visible();
            t.layout_visible(source, delegate);
        });
        Ok(())
    }

    /// Reconciles the visible set with the current geometry and viewport.
    ///
    /// Views for departed regions return to the reuse pool; arriving rows are
    /// configured through `source.cell_for_row`, arriving headers/footers
    /// through the delegate. Regions that stay visible keep their bound view
    /// untouched.
    pub fn layout_visible(
        &mut self,
        source: &mut impl TableDataSource<V>,
        delegate: &mut impl TableDelegate<V>,
    ) {
        let desired = self.desired_regions();

        // Departed views go back to the pool before arrivals are configured,
        // so arriving rows can reuse them within the same pass.
        let mut keep = RegionMap::new();
        for region in &desired {
            if let Some(view) = self.visible.remove(region) {
                keep.insert(*region, view);
            }
        }
        self.recycle_all_visible();
        self.visible = keep;

        for region in desired {
            if self.visible.contains_key(&region) {
                continue;
            }
            let view = match region {
                Region::Row(path) => Some(source.cell_for_row(&mut self.pool, path)),
                Region::Header(section) => {
                    delegate.view_for_header_in_section(&mut self.pool, section)
                }
                Region::Footer(section) => {
                    delegate.view_for_footer_in_section(&mut self.pool, section)
                }
            };
            if let Some(view) = view {
                self.visible.insert(region, view);
            }
        }
        ttrace!(
            visible = self.visible.len(),
            pooled = self.pool.pooled_count(),
            "layout_visible"
        );
        self.notify();
    }

    fn recycle_all_visible(&mut self) {
        for (_, view) in core::mem::take(&mut self.visible) {
            self.pool.recycle(view);
        }
    }
}

impl<V> core::fmt::Debug for Table<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Table")
            .field("sections", &self.sections.len())
            .field("rows", &self.number_of_rows())
            .field("visible", &self.visible.len())
            .field("viewport", &self.viewport)
            .field("scroll_offset", &self.scroll_offset)
            .field("overscan", &self.overscan)
            .finish_non_exhaustive()
    }
}

/// One left-to-right placement pass from `start`: each section's `y_offset`
/// and `global_index_of_first_row` follow from its predecessor's.
fn place_sections(sections: &mut [SectionGeometry], start: usize) {
    let (mut y, mut global) = match start.checked_sub(1).and_then(|i| sections.get(i)) {
        Some(prev) => (
            prev.y_offset() + prev.total_height(),
            prev.global_index_of_first_row() + prev.number_of_rows(),
        ),
        None => (0.0, 0),
    };
    for s in sections.iter_mut().skip(start) {
        s.place(y, global);
        y += s.total_height();
        global += s.number_of_rows();
    }
}
