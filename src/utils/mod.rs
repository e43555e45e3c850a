//! Image preprocessing ahead of decoding
//!
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Binarization (Otsu's method and fixed threshold) into a `BitMatrix`

pub mod binarization;
pub mod grayscale;
