//! RustPDF417 - PDF417 barcode decoding in pure Rust
//!
//! Takes a binarized image plus the corners of a located symbol and returns
//! the decoded text, error correction statistics and any Macro PDF417
//! metadata. Locating the symbol in the first place is up to the caller.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// PDF417 decoding modules (codeword detection, error correction, compaction modes)
pub mod decoder;
/// Core data structures (BitMatrix, Point, SymbolCorners, DecoderResult)
pub mod models;
/// Image loading and argument parsing shared by the command line tool
pub mod tools;
/// Utility functions (grayscale, binarization)
pub mod utils;

/// Symbol renderer used by tests and benchmarks
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use decoder::error::{DecodeError, FailureKind};
pub use models::{BitMatrix, DecoderResult, MacroMetadata, Point, SymbolCorners};

use decoder::scanning::{ScanningDecoder, estimate_codeword_width};
use rayon::prelude::*;
use tracing::debug;

/// Decode the PDF417 symbol framed by `corners`
///
/// # Arguments
/// * `image` - Binarized image, `true` = dark
/// * `corners` - Inner corners of the symbol; either side may be absent
/// * `min_codeword_width` - Smallest expected codeword width in pixels
/// * `max_codeword_width` - Largest expected codeword width in pixels
///
/// # Returns
/// The decoded symbol, or the reason it could not be read
pub fn decode(
    image: &BitMatrix,
    corners: &SymbolCorners,
    min_codeword_width: usize,
    max_codeword_width: usize,
) -> Result<DecoderResult, DecodeError> {
    ScanningDecoder::decode(image, corners, min_codeword_width, max_codeword_width)
}

/// One independent decode request for [`decode_batch`]
#[derive(Debug, Clone, Copy)]
pub struct ScanJob<'a> {
    /// Binarized image holding the symbol
    pub image: &'a BitMatrix,
    /// Inner corners of the symbol
    pub corners: SymbolCorners,
    /// Smallest expected codeword width in pixels
    pub min_codeword_width: usize,
    /// Largest expected codeword width in pixels
    pub max_codeword_width: usize,
}

/// Decode several symbols in parallel
///
/// Results come back in the order of `jobs`. Jobs share nothing, so each one
/// runs on whichever rayon worker picks it up.
pub fn decode_batch(jobs: &[ScanJob<'_>]) -> Vec<Result<DecoderResult, DecodeError>> {
    jobs.par_iter()
        .map(|job| {
            decode(
                job.image,
                &job.corners,
                job.min_codeword_width,
                job.max_codeword_width,
            )
        })
        .collect()
}

/// Reusable decoder with per-call options
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    codeword_width: Option<(usize, usize)>,
}

impl Decoder {
    /// Create a decoder that measures the codeword width from the image
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed codeword width range instead of measuring it
    pub fn with_codeword_width(mut self, min: usize, max: usize) -> Self {
        self.codeword_width = Some((min.min(max), min.max(max)));
        self
    }

    /// Decode the symbol framed by `corners`
    pub fn decode(
        &self,
        image: &BitMatrix,
        corners: &SymbolCorners,
    ) -> Result<DecoderResult, DecodeError> {
        let (min, max) = match self.codeword_width {
            Some(range) => range,
            None => {
                let width = estimate_codeword_width(image, corners)
                    .ok_or(DecodeError::CodewordWidth)?;
                debug!(width, "measured codeword width");
                (width, width)
            }
        };
        decode(image, corners, min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{encode_text, render_codewords};

    #[test]
    fn test_decode_empty() {
        let image = BitMatrix::new(0, 0);
        let corners = SymbolCorners::left_only(Point::new(1.0, 1.0), Point::new(1.0, 9.0));
        let err = decode(&image, &corners, 34, 34).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidInput);
    }

    #[test]
    fn test_decoder_measures_width() {
        let rendered = render_codewords(&encode_text("Measured"), 3, 1, 3, 8);
        let result = Decoder::new()
            .decode(&rendered.image, &rendered.corners)
            .unwrap();
        assert_eq!(result.text, "Measured");
    }

    #[test]
    fn test_decoder_without_guard_pattern() {
        let rendered = render_codewords(&encode_text("Measured"), 3, 1, 3, 8);
        let blank = BitMatrix::new(rendered.image.width(), rendered.image.height());
        assert_eq!(
            Decoder::new().decode(&blank, &rendered.corners).unwrap_err(),
            DecodeError::CodewordWidth
        );
    }

    #[test]
    fn test_decode_batch_keeps_order() {
        let first = render_codewords(&encode_text("first"), 2, 0, 2, 4);
        let second = render_codewords(&encode_text("second symbol"), 3, 1, 2, 4);
        let blank = BitMatrix::new(40, 40);
        let jobs = [
            ScanJob {
                image: &first.image,
                corners: first.corners,
                min_codeword_width: first.codeword_width,
                max_codeword_width: first.codeword_width,
            },
            ScanJob {
                image: &blank,
                corners: first.corners,
                min_codeword_width: first.codeword_width,
                max_codeword_width: first.codeword_width,
            },
            ScanJob {
                image: &second.image,
                corners: second.corners,
                min_codeword_width: second.codeword_width,
                max_codeword_width: second.codeword_width,
            },
        ];

        let results = decode_batch(&jobs);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().text, "first");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().text, "second symbol");
    }
}
