/// One codeword read on a single pixel row.
///
/// `bucket` is the cluster number (0, 3 or 6) of the bar pattern; it fixes
/// the barcode row modulo 3. The row number stays `None` until it is
/// resolved, and resolving produces a new value rather than mutating shared
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codeword {
    start_x: usize,
    end_x: usize,
    bucket: u32,
    value: u32,
    row_number: Option<usize>,
}

impl Codeword {
    pub fn new(start_x: usize, end_x: usize, bucket: u32, value: u32) -> Self {
        Self {
            start_x,
            end_x,
            bucket,
            value,
            row_number: None,
        }
    }

    pub fn start_x(&self) -> usize {
        self.start_x
    }

    pub fn end_x(&self) -> usize {
        self.end_x
    }

    /// Pixel span of the codeword
    pub fn width(&self) -> usize {
        self.end_x.saturating_sub(self.start_x)
    }

    pub fn bucket(&self) -> u32 {
        self.bucket
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn row_number(&self) -> Option<usize> {
        self.row_number
    }

    /// The resolved row number agrees with the bucket
    pub fn has_valid_row_number(&self) -> bool {
        self.row_number
            .is_some_and(|row| self.is_valid_row_number(row))
    }

    /// `row` is compatible with this codeword's cluster
    pub fn is_valid_row_number(&self, row: usize) -> bool {
        self.bucket as usize == (row % 3) * 3
    }

    /// Same codeword placed on `row_number`
    pub fn with_row_number(self, row_number: Option<usize>) -> Self {
        Self { row_number, ..self }
    }

    /// Row number encoded by a row indicator codeword
    pub fn row_indicator_row_number(&self) -> usize {
        (self.value / 30) as usize * 3 + (self.bucket / 3) as usize
    }

    /// Same codeword with its row number taken from its row indicator value
    pub fn as_row_indicator(self) -> Self {
        let row = self.row_indicator_row_number();
        self.with_row_number(Some(row))
    }
}
