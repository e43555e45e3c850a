/// Symbol-wide parameters encoded in the row indicator columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarcodeMetadata {
    column_count: usize,
    error_correction_level: u32,
    row_count_upper_part: usize,
    row_count_lower_part: usize,
}

impl BarcodeMetadata {
    pub fn new(
        column_count: usize,
        row_count_upper_part: usize,
        row_count_lower_part: usize,
        error_correction_level: u32,
    ) -> Self {
        Self {
            column_count,
            error_correction_level,
            row_count_upper_part,
            row_count_lower_part,
        }
    }

    /// Data columns, row indicators excluded
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn error_correction_level(&self) -> u32 {
        self.error_correction_level
    }

    /// Error correction codewords, `2^(level+1)`
    pub fn ec_codewords(&self) -> usize {
        1usize << (self.error_correction_level + 1)
    }

    pub fn row_count(&self) -> usize {
        self.row_count_upper_part + self.row_count_lower_part
    }

    pub fn row_count_upper_part(&self) -> usize {
        self.row_count_upper_part
    }

    pub fn row_count_lower_part(&self) -> usize {
        self.row_count_lower_part
    }
}
