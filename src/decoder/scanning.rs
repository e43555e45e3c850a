//! Scanning decoder: turns a binarized image plus the corners of a located
//! symbol into decoded text.
//!
//! The pipeline reads both row indicator columns, votes on the symbol
//! metadata, walks every data column row by row, assembles a vote matrix and
//! hands the flattened codewords to error correction and the bitstream
//! parser.

mod geometry;
mod matrix_decode;

pub use geometry::estimate_codeword_width;

use crate::decoder::detection::{
    BarcodeMetadata, BoundingBox, DetectionResult, DetectionResultColumn, RowIndicatorColumn,
};
use crate::decoder::error::DecodeError;
use crate::decoder::reed_solomon::{ErrorCorrector, ReedSolomonDecoder};
use crate::models::{BitMatrix, DecoderResult, SymbolCorners};
use tracing::debug;

/// Decodes one PDF417 symbol from a binary image
pub struct ScanningDecoder;

impl ScanningDecoder {
    /// Decode the symbol framed by `corners`.
    ///
    /// `min_codeword_width` and `max_codeword_width` are the expected pixel
    /// width range of one codeword; the range widens as codewords are found.
    pub fn decode(
        image: &BitMatrix,
        corners: &SymbolCorners,
        min_codeword_width: usize,
        max_codeword_width: usize,
    ) -> Result<DecoderResult, DecodeError> {
        Self::decode_with(
            image,
            corners,
            min_codeword_width,
            max_codeword_width,
            &ReedSolomonDecoder::new(),
        )
    }

    /// Same as [`ScanningDecoder::decode`] with a caller-chosen error corrector
    pub fn decode_with<C: ErrorCorrector + ?Sized>(
        image: &BitMatrix,
        corners: &SymbolCorners,
        mut min_codeword_width: usize,
        mut max_codeword_width: usize,
        corrector: &C,
    ) -> Result<DecoderResult, DecodeError> {
        if image.is_empty() {
            return Err(DecodeError::InvalidImage("empty image"));
        }
        if let Some(bad) = corners.points().find(|p| !p.is_finite()) {
            return Err(DecodeError::NonFiniteCorner(bad.x, bad.y));
        }
        let initial_box = BoundingBox::create(
            image.width(),
            image.height(),
            corners.top_left,
            corners.bottom_left,
            corners.top_right,
            corners.bottom_right,
        )
        .ok_or(DecodeError::InvalidCorners)?;

        let mut bounding_box = initial_box;
        let mut first_pass = true;
        let (left, right, mut detection_result) = loop {
            let mut left = corners.top_left.map(|start| {
                geometry::row_indicator_column(
                    image,
                    &bounding_box,
                    start,
                    true,
                    min_codeword_width,
                    max_codeword_width,
                )
            });
            let mut right = corners.top_right.map(|start| {
                geometry::row_indicator_column(
                    image,
                    &bounding_box,
                    start,
                    false,
                    min_codeword_width,
                    max_codeword_width,
                )
            });
            let result = Self::merge(&mut left, &mut right, &bounding_box)
                .ok_or(DecodeError::NoMetadata)?;

            let result_box = *result.bounding_box();
            if first_pass
                && (result_box.min_y() < bounding_box.min_y()
                    || result_box.max_y() > bounding_box.max_y())
            {
                debug!(
                    min_y = result_box.min_y(),
                    max_y = result_box.max_y(),
                    "row indicators extend past the corners, rescanning"
                );
                bounding_box = result_box;
                first_pass = false;
                continue;
            }
            break (left, right, result);
        };

        detection_result.set_bounding_box(bounding_box);
        let max_barcode_column = detection_result.column_count() + 1;
        let left_to_right = left.is_some();
        detection_result.set_row_indicator(left, true);
        detection_result.set_row_indicator(right, false);

        for step in 1..=max_barcode_column {
            let barcode_column = if left_to_right {
                step
            } else {
                max_barcode_column - step
            };
            if detection_result.column(barcode_column).is_some() {
                continue;
            }

            let mut column = DetectionResultColumn::new(bounding_box);
            let mut previous_start_column: Option<i64> = None;
            for image_row in bounding_box.min_y()..=bounding_box.max_y() {
                let mut start_column = geometry::start_column(
                    &detection_result,
                    &column,
                    barcode_column,
                    image_row,
                    left_to_right,
                );
                if start_column < 0 || start_column > bounding_box.max_x() as i64 {
                    match previous_start_column {
                        Some(previous) => start_column = previous,
                        None => continue,
                    }
                }
                if let Some(codeword) = geometry::detect_codeword(
                    image,
                    bounding_box.min_x(),
                    bounding_box.max_x(),
                    left_to_right,
                    start_column,
                    image_row,
                    min_codeword_width,
                    max_codeword_width,
                ) {
                    column.set_codeword(image_row, codeword);
                    previous_start_column = Some(start_column);
                    min_codeword_width = min_codeword_width.min(codeword.width());
                    max_codeword_width = max_codeword_width.max(codeword.width());
                }
            }
            debug!(
                barcode_column,
                detected = column.detected_count(),
                "scanned column"
            );

            if barcode_column == 0 || barcode_column == max_barcode_column {
                let is_left = barcode_column == 0;
                detection_result
                    .set_row_indicator(Some(RowIndicatorColumn::from_column(column, is_left)), is_left);
            } else {
                detection_result.set_data_column(barcode_column, column);
            }
        }

        matrix_decode::decode_detection_result(&mut detection_result, corrector)
    }

    /// Combine the row indicator columns into a detection result
    fn merge(
        left: &mut Option<RowIndicatorColumn>,
        right: &mut Option<RowIndicatorColumn>,
        fallback_box: &BoundingBox,
    ) -> Option<DetectionResult> {
        if left.is_none() && right.is_none() {
            return None;
        }
        let metadata = Self::barcode_metadata(left.as_mut(), right.as_mut())?;
        let bounding_box = BoundingBox::merge(
            Self::adjust_bounding_box(left.as_mut()),
            Self::adjust_bounding_box(right.as_mut()),
        )
        .unwrap_or(*fallback_box);
        Some(DetectionResult::new(metadata, bounding_box))
    }

    fn barcode_metadata(
        left: Option<&mut RowIndicatorColumn>,
        right: Option<&mut RowIndicatorColumn>,
    ) -> Option<BarcodeMetadata> {
        let Some(left_metadata) = left.and_then(|column| column.barcode_metadata()) else {
            return right.and_then(|column| column.barcode_metadata());
        };
        let Some(right_metadata) = right.and_then(|column| column.barcode_metadata()) else {
            return Some(left_metadata);
        };
        if left_metadata.column_count() != right_metadata.column_count()
            && left_metadata.error_correction_level() != right_metadata.error_correction_level()
            && left_metadata.row_count() != right_metadata.row_count()
        {
            debug!(?left_metadata, ?right_metadata, "row indicators disagree on every field");
            return None;
        }
        Some(left_metadata)
    }

    /// Grow the indicator's box by the rows its row heights say were missed
    /// above the first and below the last detected codeword.
    fn adjust_bounding_box(column: Option<&mut RowIndicatorColumn>) -> Option<BoundingBox> {
        let column = column?;
        let row_heights = column.row_heights()?;
        let max_row_height = row_heights.iter().copied().max()?;

        let mut missing_start_rows = 0usize;
        for &height in &row_heights {
            missing_start_rows += max_row_height - height;
            if height > 0 {
                break;
            }
        }
        let codewords = column.codewords();
        for slot in codewords.iter() {
            if missing_start_rows == 0 || slot.is_some() {
                break;
            }
            missing_start_rows -= 1;
        }

        let mut missing_end_rows = 0usize;
        for &height in row_heights.iter().rev() {
            missing_end_rows += max_row_height - height;
            if height > 0 {
                break;
            }
        }
        for slot in codewords.iter().rev() {
            if missing_end_rows == 0 || slot.is_some() {
                break;
            }
            missing_end_rows -= 1;
        }

        Some(column.bounding_box().add_missing_rows(
            missing_start_rows,
            missing_end_rows,
            column.is_left(),
        ))
    }
}

#[cfg(test)]
mod tests;
