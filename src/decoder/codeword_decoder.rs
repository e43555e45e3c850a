//! Run-length counts to codeword patterns.

use super::tables::{
    BARS_IN_MODULE, MODULES_IN_CODEWORD, codeword_value, ratio_table, symbol_patterns,
};

/// Maps the eight measured bar/space widths of a codeword to a table pattern
pub struct CodewordDecoder;

impl CodewordDecoder {
    /// Decode measured run lengths into a module pattern present in the table.
    ///
    /// Sampling at module centres is tried first; when the sampled pattern is
    /// unknown the pattern with the nearest module ratios wins.
    pub fn decoded_value(module_bit_count: &[u32; BARS_IN_MODULE]) -> Option<u32> {
        Self::sample_bit_counts(module_bit_count)
            .and_then(|sampled| Self::exact_value(&sampled))
            .or_else(|| Self::closest_value(module_bit_count))
    }

    /// Resample arbitrary run widths onto 17 evenly spaced modules
    fn sample_bit_counts(module_bit_count: &[u32; BARS_IN_MODULE]) -> Option<[u32; BARS_IN_MODULE]> {
        let bit_count_sum: u32 = module_bit_count.iter().sum();
        if bit_count_sum == 0 {
            return None;
        }
        let total = bit_count_sum as f32;
        let modules = MODULES_IN_CODEWORD as f32;
        let mut result = [0u32; BARS_IN_MODULE];
        let mut bit_count_index = 0usize;
        let mut sum_previous_bits = 0u32;
        for i in 0..MODULES_IN_CODEWORD {
            let sample_index = total / (2.0 * modules) + (i as f32 * total) / modules;
            if (sum_previous_bits + module_bit_count[bit_count_index]) as f32 <= sample_index {
                sum_previous_bits += module_bit_count[bit_count_index];
                bit_count_index += 1;
                if bit_count_index >= BARS_IN_MODULE {
                    return None;
                }
            }
            result[bit_count_index] += 1;
        }
        Some(result)
    }

    fn exact_value(bit_counts: &[u32; BARS_IN_MODULE]) -> Option<u32> {
        let mut pattern = 0u32;
        for (i, &count) in bit_counts.iter().enumerate() {
            for _ in 0..count {
                pattern = (pattern << 1) | u32::from(i % 2 == 0);
            }
        }
        codeword_value(pattern).map(|_| pattern)
    }

    fn closest_value(module_bit_count: &[u32; BARS_IN_MODULE]) -> Option<u32> {
        let bit_count_sum: u32 = module_bit_count.iter().sum();
        if bit_count_sum == 0 {
            return None;
        }
        let mut ratios = [0f32; BARS_IN_MODULE];
        for (r, &c) in ratios.iter_mut().zip(module_bit_count.iter()) {
            *r = c as f32 / bit_count_sum as f32;
        }

        let mut best_error = f32::MAX;
        let mut best_match = None;
        for (row, pattern) in ratio_table().iter().zip(symbol_patterns()) {
            let mut error = 0f32;
            for (expected, measured) in row.iter().zip(ratios.iter()) {
                let diff = expected - measured;
                error += diff * diff;
                if error >= best_error {
                    break;
                }
            }
            if error < best_error {
                best_error = error;
                best_match = Some(pattern);
            }
        }
        best_match
    }
}
