//! Grayscale to [`BitMatrix`] conversion; `true` marks a dark pixel.

use crate::models::BitMatrix;

/// Binarize with a threshold chosen by Otsu's method
pub fn otsu_binarize(gray: &[u8], width: usize, height: usize) -> BitMatrix {
    threshold_binarize(gray, width, height, otsu_threshold(gray))
}

/// Pixels strictly below `threshold` become dark
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> BitMatrix {
    let mut binary = BitMatrix::new(width, height);
    if width == 0 {
        return binary;
    }
    for (y, row) in gray.chunks(width).take(height).enumerate() {
        for (x, &value) in row.iter().enumerate() {
            if value < threshold {
                binary.set(x, y, true);
            }
        }
    }
    binary
}

/// Threshold maximising the between-class variance.
///
/// Class one holds intensities below the threshold. A single-valued image
/// has no split and yields 128.
pub fn otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }
    let total = gray.len() as f64;
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut below_count = 0u64;
    let mut below_sum = 0f64;
    let mut best_variance = 0f64;
    let mut best_threshold = 128u8;
    for threshold in 1..256usize {
        let count = histogram[threshold - 1];
        below_count += count;
        below_sum += (threshold - 1) as f64 * count as f64;
        let above_count = gray.len() as u64 - below_count;
        if below_count == 0 || above_count == 0 {
            continue;
        }
        let mean_below = below_sum / below_count as f64;
        let mean_above = (total_sum - below_sum) / above_count as f64;
        let weight_below = below_count as f64 / total;
        let weight_above = above_count as f64 / total;
        let variance = weight_below * weight_above * (mean_below - mean_above).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_threshold = threshold as u8;
        }
    }
    best_threshold
}
