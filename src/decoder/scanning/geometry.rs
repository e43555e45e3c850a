//! Pixel-level codeword detection along a single image row.

use crate::decoder::codeword_decoder::CodewordDecoder;
use crate::decoder::config;
use crate::decoder::detection::{
    BoundingBox, Codeword, DetectionResult, DetectionResultColumn, RowIndicatorColumn,
};
use crate::decoder::tables::{self, BARS_IN_MODULE};
use crate::models::{BitMatrix, Point, SymbolCorners};

fn pixel(image: &BitMatrix, x: i64, y: usize) -> bool {
    x >= 0 && image.get(x as usize, y)
}

/// Scan up, then down, from the corner and collect one indicator codeword
/// per image row, following the codeword edge as it drifts.
pub(super) fn row_indicator_column(
    image: &BitMatrix,
    bounding_box: &BoundingBox,
    start_point: Point,
    left_to_right: bool,
    min_codeword_width: usize,
    max_codeword_width: usize,
) -> RowIndicatorColumn {
    let mut column = RowIndicatorColumn::new(*bounding_box, left_to_right);
    let min_y = bounding_box.min_y() as i64;
    let max_y = bounding_box.max_y() as i64;
    for increment in [1i64, -1] {
        let mut start_column = start_point.column() as i64;
        let mut image_row = start_point.row() as i64;
        while (min_y..=max_y).contains(&image_row) {
            if let Some(codeword) = detect_codeword(
                image,
                0,
                image.width(),
                left_to_right,
                start_column,
                image_row as usize,
                min_codeword_width,
                max_codeword_width,
            ) {
                column.set_codeword(image_row as usize, codeword);
                start_column = if left_to_right {
                    codeword.start_x()
                } else {
                    codeword.end_x()
                } as i64;
            }
            image_row += increment;
        }
    }
    column
}

fn is_valid_barcode_column(result: &DetectionResult, barcode_column: i64) -> bool {
    barcode_column >= 0 && barcode_column <= result.column_count() as i64 + 1
}

/// Where to start reading `barcode_column` on `image_row`.
///
/// Preference: the neighbour already read on this row, the nearest codeword
/// of this column, the nearest codeword of the neighbour, then any codeword
/// further back extrapolated by its width. The box edge is the last resort.
pub(super) fn start_column(
    result: &DetectionResult,
    current: &DetectionResultColumn,
    barcode_column: usize,
    image_row: usize,
    left_to_right: bool,
) -> i64 {
    let offset: i64 = if left_to_right { 1 } else { -1 };
    let leading_edge = |codeword: Codeword| {
        if left_to_right {
            codeword.end_x() as i64
        } else {
            codeword.start_x() as i64
        }
    };

    let neighbour_index = barcode_column as i64 - offset;
    let neighbour = if is_valid_barcode_column(result, neighbour_index) {
        result.column(neighbour_index as usize)
    } else {
        None
    };

    if let Some(codeword) = neighbour.and_then(|c| c.codeword(image_row)) {
        return leading_edge(codeword);
    }
    if let Some(codeword) = current.codeword_nearby(image_row) {
        return if left_to_right {
            codeword.start_x() as i64
        } else {
            codeword.end_x() as i64
        };
    }
    if let Some(codeword) = neighbour.and_then(|c| c.codeword_nearby(image_row)) {
        return leading_edge(codeword);
    }

    let mut skipped_columns = 0i64;
    let mut index = barcode_column as i64;
    while is_valid_barcode_column(result, index - offset) {
        index -= offset;
        let first = result
            .column(index as usize)
            .and_then(|c| c.codewords().iter().flatten().next().copied());
        if let Some(codeword) = first {
            return leading_edge(codeword) + offset * skipped_columns * codeword.width() as i64;
        }
        skipped_columns += 1;
    }

    if left_to_right {
        result.bounding_box().min_x() as i64
    } else {
        result.bounding_box().max_x() as i64
    }
}

/// Read one codeword starting at `start_column`.
///
/// Right-to-left reads start on the last space pixel of the codeword and
/// report that pixel as the end column.
#[allow(clippy::too_many_arguments)]
pub(super) fn detect_codeword(
    image: &BitMatrix,
    min_column: usize,
    max_column: usize,
    left_to_right: bool,
    start_column: i64,
    image_row: usize,
    min_codeword_width: usize,
    max_codeword_width: usize,
) -> Option<Codeword> {
    let min_column = min_column as i64;
    let max_column = max_column as i64;
    let start_column = adjust_codeword_start_column(
        image,
        min_column,
        max_column,
        left_to_right,
        start_column,
        image_row,
    );
    let mut module_bit_count = module_bit_count(
        image,
        min_column,
        max_column,
        left_to_right,
        start_column,
        image_row,
    )?;
    let codeword_bit_count: u32 = module_bit_count.iter().sum();

    let (start_x, end_x) = if left_to_right {
        (start_column, start_column + codeword_bit_count as i64)
    } else {
        module_bit_count.reverse();
        (start_column - codeword_bit_count as i64, start_column)
    };
    if start_x < 0 {
        return None;
    }
    if !check_codeword_skew(
        codeword_bit_count as usize,
        min_codeword_width,
        max_codeword_width,
    ) {
        return None;
    }

    let pattern = CodewordDecoder::decoded_value(&module_bit_count)?;
    let value = tables::codeword_value(pattern)?;
    let bucket = tables::cluster_number(&tables::pattern_bit_counts(pattern));
    Some(Codeword::new(start_x as usize, end_x as usize, bucket, value))
}

/// Count the eight alternating runs from `start_column`
fn module_bit_count(
    image: &BitMatrix,
    min_column: i64,
    max_column: i64,
    left_to_right: bool,
    start_column: i64,
    image_row: usize,
) -> Option<[u32; BARS_IN_MODULE]> {
    let mut image_column = start_column;
    let mut counts = [0u32; BARS_IN_MODULE];
    let mut module_number = 0usize;
    let increment = if left_to_right { 1 } else { -1 };
    let mut previous_pixel = left_to_right;
    let in_range = |column: i64| {
        if left_to_right {
            column < max_column
        } else {
            column >= min_column
        }
    };

    while in_range(image_column) && module_number < BARS_IN_MODULE {
        if pixel(image, image_column, image_row) == previous_pixel {
            counts[module_number] += 1;
            image_column += increment;
        } else {
            module_number += 1;
            previous_pixel = !previous_pixel;
        }
    }

    let boundary = if left_to_right { max_column } else { min_column - 1 };
    let truncated_last = image_column == boundary && module_number == BARS_IN_MODULE - 1;
    (module_number == BARS_IN_MODULE || truncated_last).then_some(counts)
}

/// Step back over stray pixels of the wrong colour before the nominal start,
/// then forward onto the first pixel of the codeword. Gives up on a drift
/// larger than the skew tolerance.
fn adjust_codeword_start_column(
    image: &BitMatrix,
    min_column: i64,
    max_column: i64,
    left_to_right: bool,
    codeword_start_column: i64,
    image_row: usize,
) -> i64 {
    let skew = config::codeword_skew() as i64;
    let mut corrected = codeword_start_column;
    let mut increment: i64 = if left_to_right { -1 } else { 1 };
    let mut dark = left_to_right;
    for _ in 0..2 {
        while (if dark {
            corrected >= min_column
        } else {
            corrected < max_column
        }) && pixel(image, corrected, image_row) == dark
        {
            if (codeword_start_column - corrected).abs() > skew {
                return codeword_start_column;
            }
            corrected += increment;
        }
        increment = -increment;
        dark = !dark;
    }
    corrected
}

fn check_codeword_skew(codeword_size: usize, min_codeword_width: usize, max_codeword_width: usize) -> bool {
    let skew = config::codeword_skew();
    min_codeword_width.saturating_sub(skew) <= codeword_size
        && codeword_size <= max_codeword_width + skew
}

/// Width of the eight runs starting at `x`, alternating from `first_dark`
fn run_span(image: &BitMatrix, mut x: i64, y: usize, step: i64, first_dark: bool) -> Option<usize> {
    let mut width = 0usize;
    for run in 0..BARS_IN_MODULE {
        let dark = first_dark == (run % 2 == 0);
        let mut length = 0usize;
        while x >= 0 && (x as usize) < image.width() && image.get(x as usize, y) == dark {
            length += 1;
            x += step;
        }
        if length == 0 {
            return None;
        }
        width += length;
    }
    Some(width)
}

/// Pixel width of one codeword, measured on the guard pattern next to the
/// corners.
///
/// The start pattern left of the left corners and the first eight elements
/// of the stop pattern right of the right corners both span 17 modules,
/// exactly one codeword. The row halfway between top and bottom is used.
pub fn estimate_codeword_width(image: &BitMatrix, corners: &SymbolCorners) -> Option<usize> {
    let middle = |top: Point, bottom: Point| {
        let x = ((top.x + bottom.x) / 2.0) as i64;
        let y = ((top.y + bottom.y) / 2.0).max(0.0) as usize;
        (x, y)
    };
    if let (Some(top), Some(bottom)) = (corners.top_left, corners.bottom_left) {
        let (x, y) = middle(top, bottom);
        // the start pattern ends with a space
        if let Some(width) = run_span(image, x - 1, y, -1, false) {
            return Some(width);
        }
    }
    if let (Some(top), Some(bottom)) = (corners.top_right, corners.bottom_right) {
        let (x, y) = middle(top, bottom);
        return run_span(image, x, y, 1, true);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULE: usize = 2;
    const QUIET: usize = 8;

    /// Draw 17-bit patterns side by side on one row, most significant bit
    /// first, closed by a stop-pattern bar
    fn draw_row(patterns: &[u32]) -> BitMatrix {
        let end = QUIET + patterns.len() * 17 * MODULE;
        let mut image = BitMatrix::new(end + 8 * MODULE + QUIET, 1);
        for (i, &pattern) in patterns.iter().enumerate() {
            for bit in 0..17 {
                if (pattern >> (16 - bit)) & 1 == 1 {
                    let x = QUIET + (i * 17 + bit) * MODULE;
                    image.set_region(x, 0, MODULE, 1, true);
                }
            }
        }
        image.set_region(end, 0, 8 * MODULE, 1, true);
        image
    }

    #[test]
    fn test_reads_standard_symbol_characters() {
        // (pattern, cluster, value) from the ISO/IEC 15438 character table
        let expected = [
            (0x1d5c0, 0, 0),
            (0x1eaf0, 0, 1),
            (0x1f57c, 0, 2),
            (0x1f560, 3, 0),
            (0x1abe0, 6, 0),
        ];
        let patterns: Vec<u32> = expected.iter().map(|&(p, _, _)| p).collect();
        let image = draw_row(&patterns);
        let width = 17 * MODULE;

        for (i, &(_, cluster, value)) in expected.iter().enumerate() {
            let start = (QUIET + i * width) as i64;
            let codeword = detect_codeword(&image, 0, image.width(), true, start, 0, width, width)
                .unwrap_or_else(|| panic!("codeword {i} not read"));
            assert_eq!((codeword.bucket(), codeword.value()), (cluster, value), "codeword {i}");
            assert_eq!(codeword.start_x(), start as usize);
            assert_eq!(codeword.end_x(), start as usize + width);
        }
    }

    #[test]
    fn test_rejects_codeword_outside_width_range() {
        let image = draw_row(&[0x1d5c0]);
        assert!(detect_codeword(&image, 0, image.width(), true, QUIET as i64, 0, 60, 80).is_none());
    }
}
