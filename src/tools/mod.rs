use crate::models::{BitMatrix, Point, SymbolCorners};
use crate::utils::binarization::{otsu_binarize, threshold_binarize};
use crate::utils::grayscale::rgb_to_grayscale_parallel;
use std::num::ParseIntError;
use std::path::Path;
use thiserror::Error;

/// Load an image and binarize it, Otsu's method unless `threshold` is given.
pub fn load_bitmatrix<P: AsRef<Path>>(
    path: P,
    threshold: Option<u8>,
) -> Result<BitMatrix, image::ImageError> {
    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let gray = rgb_to_grayscale_parallel(rgb.as_raw(), width, height);
    Ok(match threshold {
        Some(threshold) => threshold_binarize(&gray, width, height, threshold),
        None => otsu_binarize(&gray, width, height),
    })
}

/// Malformed `--corners` argument
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CornerSpecError {
    /// Not exactly four `;`-separated entries
    #[error("expected 4 corners separated by ';', found {0}")]
    Count(usize),
    /// An entry is neither `x,y` nor `-`
    #[error("corner {0:?} is not an x,y pair")]
    Point(String),
    /// Only one corner of a side was given
    #[error("each side needs both of its corners or neither")]
    HalfSide,
}

fn parse_point(entry: &str) -> Result<Option<Point>, CornerSpecError> {
    let entry = entry.trim();
    if entry == "-" {
        return Ok(None);
    }
    let invalid = || CornerSpecError::Point(entry.to_string());
    let (x, y) = entry.split_once(',').ok_or_else(invalid)?;
    let x: f32 = x.trim().parse().map_err(|_| invalid())?;
    let y: f32 = y.trim().parse().map_err(|_| invalid())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(invalid());
    }
    Ok(Some(Point::new(x, y)))
}

/// Parse `"x,y;x,y;x,y;x,y"` in top-left, bottom-left, top-right,
/// bottom-right order. `-` leaves a corner out.
pub fn parse_corners(input: &str) -> Result<SymbolCorners, CornerSpecError> {
    let entries: Vec<&str> = input.split(';').collect();
    if entries.len() != 4 {
        return Err(CornerSpecError::Count(entries.len()));
    }
    let corners = SymbolCorners {
        top_left: parse_point(entries[0])?,
        bottom_left: parse_point(entries[1])?,
        top_right: parse_point(entries[2])?,
        bottom_right: parse_point(entries[3])?,
    };
    if corners.top_left.is_some() != corners.bottom_left.is_some()
        || corners.top_right.is_some() != corners.bottom_right.is_some()
    {
        return Err(CornerSpecError::HalfSide);
    }
    Ok(corners)
}

/// Parse a comma separated codeword list such as `"5,453,178,121,239"`
pub fn parse_codewords(list: &str) -> Result<Vec<u32>, ParseIntError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// Summary statistics for a binary matrix.
#[derive(Debug, Clone, Copy)]
pub struct BinaryStats {
    /// Count of dark pixels.
    pub dark_pixels: usize,
    /// Total pixels in the matrix.
    pub total_pixels: usize,
    /// Ratio of dark pixels to total pixels.
    pub dark_ratio: f64,
}

/// Compute dark pixel stats for a binary matrix.
pub fn binary_stats(binary: &BitMatrix) -> BinaryStats {
    let dark = binary.count_dark();
    let total = binary.width() * binary.height();
    let ratio = if total == 0 {
        0.0
    } else {
        dark as f64 / total as f64
    };
    BinaryStats {
        dark_pixels: dark,
        total_pixels: total,
        dark_ratio: ratio,
    }
}
