use super::{BarcodeMetadata, BoundingBox, Codeword, DetectionResultColumn, RowIndicatorColumn};
use crate::decoder::tables::MAX_CODEWORDS_IN_BARCODE;
use tracing::trace;

const ADJUST_ROW_NUMBER_SKIP: usize = 2;

/// All columns of one decode attempt.
///
/// Barcode column 0 is the left row indicator, `column_count + 1` the right
/// one, and `1..=column_count` the data columns.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    metadata: BarcodeMetadata,
    bounding_box: BoundingBox,
    left: Option<RowIndicatorColumn>,
    right: Option<RowIndicatorColumn>,
    data: Vec<Option<DetectionResultColumn>>,
}

impl DetectionResult {
    pub fn new(metadata: BarcodeMetadata, bounding_box: BoundingBox) -> Self {
        Self {
            metadata,
            bounding_box,
            left: None,
            right: None,
            data: vec![None; metadata.column_count()],
        }
    }

    pub fn metadata(&self) -> &BarcodeMetadata {
        &self.metadata
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn set_bounding_box(&mut self, bounding_box: BoundingBox) {
        self.bounding_box = bounding_box;
    }

    pub fn column_count(&self) -> usize {
        self.metadata.column_count()
    }

    pub fn row_count(&self) -> usize {
        self.metadata.row_count()
    }

    pub fn ec_level(&self) -> u32 {
        self.metadata.error_correction_level()
    }

    pub fn set_row_indicator(&mut self, column: Option<RowIndicatorColumn>, is_left: bool) {
        if is_left {
            self.left = column;
        } else {
            self.right = column;
        }
    }

    pub fn row_indicator(&self, is_left: bool) -> Option<&RowIndicatorColumn> {
        if is_left { self.left.as_ref() } else { self.right.as_ref() }
    }

    pub fn row_indicator_mut(&mut self, is_left: bool) -> Option<&mut RowIndicatorColumn> {
        if is_left { self.left.as_mut() } else { self.right.as_mut() }
    }

    pub fn set_data_column(&mut self, barcode_column: usize, column: DetectionResultColumn) {
        if let Some(slot) = barcode_column
            .checked_sub(1)
            .and_then(|index| self.data.get_mut(index))
        {
            *slot = Some(column);
        }
    }

    /// Column at `barcode_column`, row indicators included
    pub fn column(&self, barcode_column: usize) -> Option<&DetectionResultColumn> {
        if barcode_column == 0 {
            self.left.as_ref().map(|c| c.column())
        } else if barcode_column == self.column_count() + 1 {
            self.right.as_ref().map(|c| c.column())
        } else {
            self.data.get(barcode_column - 1).and_then(|c| c.as_ref())
        }
    }

    fn column_mut(&mut self, barcode_column: usize) -> Option<&mut DetectionResultColumn> {
        if barcode_column == 0 {
            self.left.as_deref_mut()
        } else if barcode_column == self.column_count() + 1 {
            self.right.as_deref_mut()
        } else {
            self.data.get_mut(barcode_column - 1).and_then(|c| c.as_mut())
        }
    }

    fn cell(&self, barcode_column: usize, codewords_row: usize) -> Option<Codeword> {
        self.column(barcode_column)
            .and_then(|c| c.codewords().get(codewords_row).copied().flatten())
    }

    fn set_cell(&mut self, barcode_column: usize, codewords_row: usize, codeword: Option<Codeword>) {
        if let Some(slot) = self
            .column_mut(barcode_column)
            .and_then(|c| c.codewords_mut().get_mut(codewords_row))
        {
            *slot = codeword;
        }
    }

    fn rows(&self) -> usize {
        self.bounding_box.max_y().saturating_sub(self.bounding_box.min_y()) + 1
    }

    /// Resolve row numbers of every column.
    ///
    /// Row indicators are settled first; data codewords then take row numbers
    /// from the indicators and from already-resolved neighbours, repeating
    /// while that keeps resolving more codewords.
    pub fn adjust_row_numbers(&mut self) {
        let metadata = self.metadata;
        for is_left in [true, false] {
            if let Some(column) = self.row_indicator_mut(is_left) {
                column.adjust_complete_indicator_column_row_numbers(&metadata);
            }
        }

        let mut unadjusted = MAX_CODEWORDS_IN_BARCODE;
        loop {
            let previous = unadjusted;
            unadjusted = self.adjust_row_numbers_and_get_count();
            trace!(unadjusted, "data codewords without a row number");
            if unadjusted == 0 || unadjusted >= previous {
                break;
            }
        }
    }

    fn adjust_row_numbers_and_get_count(&mut self) -> usize {
        let unadjusted = self.adjust_row_numbers_by_row();
        if unadjusted == 0 {
            return 0;
        }
        for barcode_column in 1..=self.column_count() {
            for codewords_row in 0..self.rows() {
                if let Some(codeword) = self.cell(barcode_column, codewords_row) {
                    if !codeword.has_valid_row_number() {
                        self.adjust_from_neighbours(barcode_column, codewords_row, codeword);
                    }
                }
            }
        }
        unadjusted
    }

    fn adjust_row_numbers_by_row(&mut self) -> usize {
        self.adjust_row_numbers_from_both_row_indicators();
        self.adjust_row_numbers_from_row_indicator(true)
            + self.adjust_row_numbers_from_row_indicator(false)
    }

    fn adjust_row_numbers_from_both_row_indicators(&mut self) {
        let right_column = self.column_count() + 1;
        if self.left.is_none() || self.right.is_none() {
            return;
        }
        for codewords_row in 0..self.rows() {
            let (Some(left), Some(right)) = (
                self.cell(0, codewords_row),
                self.cell(right_column, codewords_row),
            ) else {
                continue;
            };
            let Some(row_number) = left.row_number() else {
                continue;
            };
            if right.row_number() != Some(row_number) {
                continue;
            }
            for barcode_column in 1..=self.column_count() {
                if let Some(codeword) = self.cell(barcode_column, codewords_row) {
                    let codeword = codeword.with_row_number(Some(row_number));
                    let kept = codeword.has_valid_row_number().then_some(codeword);
                    self.set_cell(barcode_column, codewords_row, kept);
                }
            }
        }
    }

    /// Walk each row inward from one indicator, stopping after
    /// `ADJUST_ROW_NUMBER_SKIP` consecutive codewords that cannot take the
    /// indicator's row number.
    fn adjust_row_numbers_from_row_indicator(&mut self, is_left: bool) -> usize {
        let indicator_column = if is_left { 0 } else { self.column_count() + 1 };
        if self.row_indicator(is_left).is_none() {
            return 0;
        }
        let columns: Vec<usize> = if is_left {
            (1..=self.column_count()).collect()
        } else {
            (1..=self.column_count() + 1).rev().collect()
        };

        let mut unadjusted = 0;
        for codewords_row in 0..self.rows() {
            let Some(row_number) = self
                .cell(indicator_column, codewords_row)
                .and_then(|c| c.row_number())
            else {
                continue;
            };
            let mut invalid_row_counts = 0;
            for &barcode_column in &columns {
                if invalid_row_counts >= ADJUST_ROW_NUMBER_SKIP {
                    break;
                }
                let Some(codeword) = self.cell(barcode_column, codewords_row) else {
                    continue;
                };
                let mut codeword = codeword;
                if !codeword.has_valid_row_number() {
                    if codeword.is_valid_row_number(row_number) {
                        codeword = codeword.with_row_number(Some(row_number));
                        self.set_cell(barcode_column, codewords_row, Some(codeword));
                        invalid_row_counts = 0;
                    } else {
                        invalid_row_counts += 1;
                    }
                }
                if !codeword.has_valid_row_number() {
                    unadjusted += 1;
                }
            }
        }
        unadjusted
    }

    /// Borrow the row number of a resolved codeword with the same bucket in
    /// the surrounding 5x3 neighbourhood.
    fn adjust_from_neighbours(&mut self, barcode_column: usize, codewords_row: usize, codeword: Codeword) {
        let previous_column = barcode_column - 1;
        let next_column = if self.column(barcode_column + 1).is_some() {
            barcode_column + 1
        } else {
            previous_column
        };
        let row = codewords_row as i64;
        let candidates = [
            (barcode_column, row - 1),
            (barcode_column, row + 1),
            (previous_column, row),
            (next_column, row),
            (previous_column, row - 1),
            (next_column, row - 1),
            (previous_column, row + 1),
            (next_column, row + 1),
            (barcode_column, row - 2),
            (barcode_column, row + 2),
            (previous_column, row - 2),
            (next_column, row - 2),
            (previous_column, row + 2),
            (next_column, row + 2),
        ];
        for (column, other_row) in candidates {
            if other_row < 0 {
                continue;
            }
            let Some(other) = self.cell(column, other_row as usize) else {
                continue;
            };
            if other.has_valid_row_number() && other.bucket() == codeword.bucket() {
                self.set_cell(
                    barcode_column,
                    codewords_row,
                    Some(codeword.with_row_number(other.row_number())),
                );
                return;
            }
        }
    }
}
