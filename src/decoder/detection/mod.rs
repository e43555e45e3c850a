//! Per-attempt bookkeeping: bounding box, codewords found on each pixel row,
//! row indicator metadata votes and row number resolution.

mod barcode_value;
mod bounding_box;
mod codeword;
mod column;
mod metadata;
mod result;
mod row_indicator;

pub use barcode_value::BarcodeValue;
pub use bounding_box::BoundingBox;
pub use codeword::Codeword;
pub use column::DetectionResultColumn;
pub use metadata::BarcodeMetadata;
pub use result::DetectionResult;
pub use row_indicator::RowIndicatorColumn;
