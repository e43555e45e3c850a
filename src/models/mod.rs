pub mod matrix;
pub mod pdf417;
pub mod point;

pub use matrix::BitMatrix;
pub use pdf417::{DecoderResult, MacroMetadata, SymbolCorners};
pub use point::Point;
