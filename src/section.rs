use alloc::format;
use alloc::vec::Vec;

use crate::TableError;

/// Per-section vertical geometry: row heights, derived totals, and the
/// section's placement within the whole content.
///
/// A record owns its row-height array exclusively. The array, the derived row
/// count, and the in-section prefix sums only ever change together through
/// [`SectionGeometry::set_row_heights`], so no length/array desync is
/// observable. `total_height` is derived from the same data and is therefore
/// consistent after every mutation.
///
/// The cross-section fields (`y_offset`, `global_index_of_first_row`) are
/// written by the owning [`crate::Table`] in a single left-to-right placement
/// pass; a record never reads or writes its siblings.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionGeometry {
    global_index_of_first_row: usize,
    y_offset: f64,
    header_height: f64,
    footer_height: f64,
    row_heights: Vec<f64>,
    /// Prefix sums over `row_heights`, length `rows + 1`. `row_offsets[i]` is
    /// the top of row `i` relative to the end of the header band;
    /// `row_offsets[rows]` is the rows' combined height.
    row_offsets: Vec<f64>,
}

impl Default for SectionGeometry {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionGeometry {
    pub fn new() -> Self {
        Self {
            global_index_of_first_row: 0,
            y_offset: 0.0,
            header_height: 0.0,
            footer_height: 0.0,
            row_heights: Vec::new(),
            row_offsets: alloc::vec![0.0],
        }
    }

    /// Replaces the row-height array, the derived row count, and the prefix
    /// sums in one atomic step.
    ///
    /// Fails with [`TableError::InvalidArgument`] if any height is negative
    /// or non-finite, in which case the record is left unchanged. Later
    /// sections' `y_offset`/`global_index_of_first_row` are the caller's to
    /// recompute, since a row-count change here cascades.
    pub fn set_row_heights(&mut self, heights: Vec<f64>) -> Result<(), TableError> {
        validate_heights(&heights)?;

        let mut offsets = Vec::with_capacity(heights.len() + 1);
        let mut top = 0.0f64;
        offsets.push(top);
        for &h in &heights {
            top += h;
            offsets.push(top);
        }

        self.row_heights = heights;
        self.row_offsets = offsets;
        Ok(())
    }

    pub fn set_header_height(&mut self, height: f64) -> Result<(), TableError> {
        validate_band_height("header", height)?;
        self.header_height = height;
        Ok(())
    }

    pub fn set_footer_height(&mut self, height: f64) -> Result<(), TableError> {
        validate_band_height("footer", height)?;
        self.footer_height = height;
        Ok(())
    }

    pub fn number_of_rows(&self) -> usize {
        self.row_heights.len()
    }

    pub fn row_heights(&self) -> &[f64] {
        &self.row_heights
    }

    pub fn header_height(&self) -> f64 {
        self.header_height
    }

    pub fn footer_height(&self) -> f64 {
        self.footer_height
    }

    /// Combined height of the row band (no header/footer).
    pub fn rows_height(&self) -> f64 {
        self.row_offsets.last().copied().unwrap_or(0.0)
    }

    /// `header_height + Σ row_heights + footer_height`.
    pub fn total_height(&self) -> f64 {
        self.header_height + self.rows_height() + self.footer_height
    }

    /// Vertical position of the section's top edge within the whole content.
    pub fn y_offset(&self) -> f64 {
        self.y_offset
    }

    /// Flattened index (across all sections) of this section's first row.
    ///
    /// For a zero-row section this equals the global index of the *next*
    /// section's first row.
    pub fn global_index_of_first_row(&self) -> usize {
        self.global_index_of_first_row
    }

    /// Flattened index of this section's last row; `None` when the section
    /// has zero rows.
    pub fn global_index_of_last_row(&self) -> Option<usize> {
        match self.row_heights.len() {
            0 => None,
            n => Some(self.global_index_of_first_row + n - 1),
        }
    }

    /// Top of `row` relative to the end of the header band.
    pub fn row_top(&self, row: usize) -> Option<f64> {
        (row < self.row_heights.len()).then(|| self.row_offsets[row])
    }

    pub fn row_height(&self, row: usize) -> Option<f64> {
        self.row_heights.get(row).copied()
    }

    /// Maps an offset within the row band (relative to the end of the header)
    /// to the row whose `[top, top + height)` range contains it.
    ///
    /// Binary search over the prefix sums; zero-height rows span no offsets
    /// and are skipped. `None` when the offset falls outside the row band.
    pub fn row_at_local_offset(&self, local_y: f64) -> Option<usize> {
        if local_y < 0.0 {
            return None;
        }
        let rows = self.row_heights.len();
        // First row whose bottom edge lies beyond local_y.
        let row = self.row_offsets[1..].partition_point(|&end| end <= local_y);
        (row < rows).then_some(row)
    }

    /// Written by the engine's placement pass.
    pub(crate) fn place(&mut self, y_offset: f64, global_index_of_first_row: usize) {
        self.y_offset = y_offset;
        self.global_index_of_first_row = global_index_of_first_row;
    }
}

fn validate_heights(heights: &[f64]) -> Result<(), TableError> {
    for (index, &h) in heights.iter().enumerate() {
        if !h.is_finite() || h < 0.0 {
            return Err(TableError::InvalidArgument(format!(
                "row height at index {index} must be finite and non-negative, got {h}"
            )));
        }
    }
    Ok(())
}

fn validate_band_height(band: &str, height: f64) -> Result<(), TableError> {
    if !height.is_finite() || height < 0.0 {
        return Err(TableError::InvalidArgument(format!(
            "{band} height must be finite and non-negative, got {height}"
        )));
    }
    Ok(())
}
