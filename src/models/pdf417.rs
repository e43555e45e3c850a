use super::Point;

/// Corner points handed over by an upstream symbol locator.
///
/// The left pair marks the first pixel column of the left row indicator
/// (immediately right of the start pattern), the right pair marks the first
/// pixel column of the stop pattern. A side is either fully present or fully
/// absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SymbolCorners {
    /// Top of the left row indicator column
    pub top_left: Option<Point>,
    /// Bottom of the left row indicator column
    pub bottom_left: Option<Point>,
    /// Top of the stop pattern
    pub top_right: Option<Point>,
    /// Bottom of the stop pattern
    pub bottom_right: Option<Point>,
}

impl SymbolCorners {
    /// All four corners known
    pub fn new(top_left: Point, bottom_left: Point, top_right: Point, bottom_right: Point) -> Self {
        Self {
            top_left: Some(top_left),
            bottom_left: Some(bottom_left),
            top_right: Some(top_right),
            bottom_right: Some(bottom_right),
        }
    }

    /// Only the left (start pattern) side is known
    pub fn left_only(top_left: Point, bottom_left: Point) -> Self {
        Self {
            top_left: Some(top_left),
            bottom_left: Some(bottom_left),
            ..Self::default()
        }
    }

    /// Only the right (stop pattern) side is known
    pub fn right_only(top_right: Point, bottom_right: Point) -> Self {
        Self {
            top_right: Some(top_right),
            bottom_right: Some(bottom_right),
            ..Self::default()
        }
    }

    /// Iterate over the corners that are present
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        [
            self.top_left,
            self.bottom_left,
            self.top_right,
            self.bottom_right,
        ]
        .into_iter()
        .flatten()
    }
}

/// Macro PDF417 control block contents
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MacroMetadata {
    /// Position of this symbol in the macro sequence
    pub segment_index: u32,
    /// File identifier shared by every symbol of the sequence
    pub file_id: String,
    /// Total number of segments (optional field 1)
    pub segment_count: Option<u32>,
    /// File name (optional field 0)
    pub file_name: Option<String>,
    /// Seconds since the Unix epoch (optional field 2)
    pub timestamp: Option<u64>,
    /// Sender (optional field 3)
    pub sender: Option<String>,
    /// Addressee (optional field 4)
    pub addressee: Option<String>,
    /// File size in bytes (optional field 5)
    pub file_size: Option<u64>,
    /// CRC-16 of the whole file (optional field 6)
    pub checksum: Option<u32>,
    /// A terminator codeword marked this as the final segment
    pub is_last_segment: bool,
    /// Raw optional field codewords, terminator excluded
    pub optional_data: Option<Vec<u32>>,
}

/// A successfully decoded PDF417 symbol
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderResult {
    /// Decoded payload text
    pub text: String,
    /// Corrected data codewords, symbol length descriptor included
    pub codewords: Vec<u32>,
    /// Error correction level (0-8)
    pub ec_level: u32,
    /// Number of non-erasure errors fixed by error correction
    pub errors_corrected: usize,
    /// Number of erased (unread) codewords
    pub erasures: usize,
    /// Macro PDF417 metadata when the symbol carries a control block
    pub macro_metadata: Option<MacroMetadata>,
    /// Final bounding box corners (top-left, bottom-left, top-right, bottom-right)
    pub position: [Point; 4],
}
