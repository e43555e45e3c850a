use super::{BarcodeMetadata, BarcodeValue, BoundingBox, DetectionResultColumn};
use crate::decoder::tables::{MAX_ROWS_IN_BARCODE, MIN_ROWS_IN_BARCODE};
use std::ops::{Deref, DerefMut};
use tracing::{debug, trace};

/// Left or right row indicator column.
///
/// Row indicator codewords encode their own barcode row plus one of three
/// metadata fragments, rotated so that the left and right columns carry
/// different fragments on the same row.
#[derive(Debug, Clone)]
pub struct RowIndicatorColumn {
    column: DetectionResultColumn,
    is_left: bool,
}

impl Deref for RowIndicatorColumn {
    type Target = DetectionResultColumn;

    fn deref(&self) -> &Self::Target {
        &self.column
    }
}

impl DerefMut for RowIndicatorColumn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.column
    }
}

/// Metadata fragment carried by a row indicator codeword
enum Fragment {
    RowCountUpper(usize),
    EcLevelAndRowCountLower(u32, usize),
    ColumnCount(usize),
}

impl RowIndicatorColumn {
    pub fn new(bounding_box: BoundingBox, is_left: bool) -> Self {
        Self {
            column: DetectionResultColumn::new(bounding_box),
            is_left,
        }
    }

    /// Treat a column scanned like any other as this side's indicator
    pub fn from_column(column: DetectionResultColumn, is_left: bool) -> Self {
        Self { column, is_left }
    }

    pub fn is_left(&self) -> bool {
        self.is_left
    }

    pub fn column(&self) -> &DetectionResultColumn {
        &self.column
    }

    fn fragment(&self, row_number: usize, value: u32) -> Fragment {
        let indicator = value % 30;
        let selector = if self.is_left { row_number } else { row_number + 2 };
        match selector % 3 {
            0 => Fragment::RowCountUpper(indicator as usize * 3 + 1),
            1 => Fragment::EcLevelAndRowCountLower(indicator / 3, (indicator % 3) as usize),
            _ => Fragment::ColumnCount(indicator as usize + 1),
        }
    }

    /// First and last slot between this side's top and bottom corners
    fn corner_rows(&self) -> (usize, usize) {
        let bbox = self.column.bounding_box();
        let (top, bottom) = if self.is_left {
            (bbox.top_left(), bbox.bottom_left())
        } else {
            (bbox.top_right(), bbox.bottom_right())
        };
        let first = top.row().saturating_sub(bbox.min_y());
        let last = bottom
            .row()
            .saturating_sub(bbox.min_y())
            .min(self.column.codewords().len());
        (first, last)
    }

    fn set_row_numbers(&mut self) {
        for slot in self.column.codewords_mut().iter_mut() {
            if let Some(codeword) = *slot {
                *slot = Some(codeword.as_row_indicator());
            }
        }
    }

    /// Vote on the symbol metadata, then drop codewords that contradict it.
    ///
    /// Fails when a fragment received no votes or is tied between several
    /// values, or when the row count is out of range.
    pub fn barcode_metadata(&mut self) -> Option<BarcodeMetadata> {
        self.set_row_numbers();

        let mut column_count = BarcodeValue::new();
        let mut row_count_upper = BarcodeValue::new();
        let mut row_count_lower = BarcodeValue::new();
        let mut ec_level = BarcodeValue::new();

        for codeword in self.column.codewords().iter().flatten() {
            let Some(row) = codeword.row_number() else {
                continue;
            };
            match self.fragment(row, codeword.value()) {
                Fragment::RowCountUpper(upper) => row_count_upper.set_value(upper as u32),
                Fragment::EcLevelAndRowCountLower(level, lower) => {
                    ec_level.set_value(level);
                    row_count_lower.set_value(lower as u32);
                }
                Fragment::ColumnCount(columns) => column_count.set_value(columns as u32),
            }
        }

        let single = |cell: &BarcodeValue| match cell.value().as_slice() {
            [value] => Some(*value),
            _ => None,
        };
        let (Some(columns), Some(upper), Some(lower), Some(level)) = (
            single(&column_count),
            single(&row_count_upper),
            single(&row_count_lower),
            single(&ec_level),
        ) else {
            debug!(
                is_left = self.is_left,
                columns = ?column_count.value(),
                upper = ?row_count_upper.value(),
                lower = ?row_count_lower.value(),
                level = ?ec_level.value(),
                "row indicator metadata has no single winner"
            );
            return None;
        };

        let rows = (upper + lower) as usize;
        if columns < 1 || !(MIN_ROWS_IN_BARCODE..=MAX_ROWS_IN_BARCODE).contains(&rows) {
            debug!(columns, rows, "row indicator metadata out of range");
            return None;
        }

        let metadata = BarcodeMetadata::new(columns as usize, upper as usize, lower as usize, level);
        self.remove_incorrect_codewords(&metadata);
        trace!(is_left = self.is_left, ?metadata, "row indicator metadata");
        Some(metadata)
    }

    fn remove_incorrect_codewords(&mut self, metadata: &BarcodeMetadata) {
        for index in 0..self.column.codewords().len() {
            let Some(codeword) = self.column.codewords()[index] else {
                continue;
            };
            let Some(row) = codeword.row_number() else {
                continue;
            };
            let consistent = row <= metadata.row_count()
                && match self.fragment(row, codeword.value()) {
                    Fragment::RowCountUpper(upper) => upper == metadata.row_count_upper_part(),
                    Fragment::EcLevelAndRowCountLower(level, lower) => {
                        level == metadata.error_correction_level()
                            && lower == metadata.row_count_lower_part()
                    }
                    Fragment::ColumnCount(columns) => columns == metadata.column_count(),
                };
            if !consistent {
                self.column.codewords_mut()[index] = None;
            }
        }
    }

    /// Assign row numbers and discard codewords whose row number jumps in a
    /// way a top-to-bottom scan cannot produce.
    pub fn adjust_complete_indicator_column_row_numbers(&mut self, metadata: &BarcodeMetadata) {
        self.set_row_numbers();
        self.remove_incorrect_codewords(metadata);
        let (first_row, last_row) = self.corner_rows();

        let mut barcode_row: i64 = -1;
        let mut max_row_height: i64 = 1;
        let mut current_row_height: i64 = 0;
        for codewords_row in first_row..last_row {
            let Some(codeword) = self.column.codewords()[codewords_row] else {
                continue;
            };
            let Some(row_number) = codeword.row_number() else {
                continue;
            };
            let row_number = row_number as i64;
            let row_difference = row_number - barcode_row;

            if row_difference == 0 {
                current_row_height += 1;
            } else if row_difference == 1 {
                max_row_height = max_row_height.max(current_row_height);
                current_row_height = 1;
                barcode_row = row_number;
            } else if row_difference < 0
                || row_number >= metadata.row_count() as i64
                || row_difference > codewords_row as i64
            {
                self.column.codewords_mut()[codewords_row] = None;
            } else {
                let checked_rows = if max_row_height > 2 {
                    (max_row_height - 2) * row_difference
                } else {
                    row_difference
                };
                let mut close_previous_codeword_found = checked_rows >= codewords_row as i64;
                let mut i = 1;
                while i <= checked_rows && !close_previous_codeword_found {
                    // checked_rows < codewords_row here, so the index stays in range
                    close_previous_codeword_found =
                        self.column.codewords()[codewords_row - i as usize].is_some();
                    i += 1;
                }
                if close_previous_codeword_found {
                    self.column.codewords_mut()[codewords_row] = None;
                } else {
                    barcode_row = row_number;
                    current_row_height = 1;
                }
            }
        }
    }

    /// Assign row numbers without discarding regressions; returns the
    /// average image rows per barcode row between the corners, rounded.
    fn adjust_incomplete_indicator_column_row_numbers(&mut self, metadata: &BarcodeMetadata) -> usize {
        let (first_row, last_row) = self.corner_rows();
        let average_row_height = (last_row - first_row) as f32 / metadata.row_count() as f32;
        let mut barcode_row: i64 = -1;
        for codewords_row in first_row..last_row {
            let Some(codeword) = self.column.codewords()[codewords_row] else {
                continue;
            };
            let codeword = codeword.as_row_indicator();
            self.column.codewords_mut()[codewords_row] = Some(codeword);
            let row_number = codeword.row_indicator_row_number() as i64;
            let row_difference = row_number - barcode_row;
            if row_difference == 0 {
                continue;
            } else if row_difference == 1 {
                barcode_row = row_number;
            } else if row_number >= metadata.row_count() as i64 {
                self.column.codewords_mut()[codewords_row] = None;
            } else {
                barcode_row = row_number;
            }
        }
        (average_row_height + 0.5) as usize
    }

    /// Number of image rows seen for each barcode row
    pub fn row_heights(&mut self) -> Option<Vec<usize>> {
        let metadata = self.barcode_metadata()?;
        let average_row_height = self.adjust_incomplete_indicator_column_row_numbers(&metadata);
        trace!(average_row_height, is_left = self.is_left, "indicator row heights");
        let mut heights = vec![0usize; metadata.row_count()];
        for codeword in self.column.codewords().iter().flatten() {
            if let Some(row) = codeword.row_number() {
                if let Some(height) = heights.get_mut(row) {
                    *height += 1;
                }
            }
        }
        Some(heights)
    }
}
