//! Symbol encoder and renderer used by tests and benchmarks.
//!
//! Produces clean, axis-aligned PDF417 images together with the inner
//! corner points an upstream locator would report.

use crate::decoder::reed_solomon::Gf929;
use crate::decoder::tables::{
    MAX_ROWS_IN_BARCODE, MIN_ROWS_IN_BARCODE, START_PATTERN, STOP_PATTERN, codeword_pattern,
    pattern_bit_counts,
};
use crate::models::{BitMatrix, Point, SymbolCorners};

const MIXED_CHARS: &[u8] = b"0123456789&\r\t,:#-.$/+%*=^";
const PUNCT_CHARS: &[u8] = b";<>@[\\]_`~!\r\t,:\n-.$/\"|*()?{}'";

const LL: u32 = 27;
const ML: u32 = 28;
const AL: u32 = 28;
const PS: u32 = 29;
const SPACE: u32 = 26;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Submode {
    Alpha,
    Lower,
    Mixed,
}

fn table_index(table: &[u8], ch: char) -> Option<usize> {
    table.iter().position(|&c| c as char == ch)
}

/// Text compaction codewords (no leading latch, streams start in text mode).
///
/// Characters outside the text alphabets are carried with a shift to byte
/// (913) and decode as ISO-8859-1, so only code points below 256 survive.
pub fn encode_text(text: &str) -> Vec<u32> {
    let mut codewords = Vec::new();
    let mut values: Vec<u32> = Vec::new();
    let mut submode = Submode::Alpha;

    let flush = |values: &mut Vec<u32>, codewords: &mut Vec<u32>| {
        if values.len() % 2 == 1 {
            values.push(PS);
        }
        codewords.extend(values.chunks(2).map(|pair| pair[0] * 30 + pair[1]));
        values.clear();
    };

    for ch in text.chars() {
        let byte = ch as u32;
        if ch == ' ' {
            values.push(SPACE);
        } else if ch.is_ascii_uppercase() {
            match submode {
                Submode::Alpha => {}
                Submode::Lower => values.extend([ML, AL]),
                Submode::Mixed => values.push(AL),
            }
            submode = Submode::Alpha;
            values.push(byte - 'A' as u32);
        } else if ch.is_ascii_lowercase() {
            if submode != Submode::Lower {
                values.push(LL);
            }
            submode = Submode::Lower;
            values.push(byte - 'a' as u32);
        } else if let Some(index) = table_index(MIXED_CHARS, ch) {
            if submode != Submode::Mixed {
                values.push(ML);
            }
            submode = Submode::Mixed;
            values.push(index as u32);
        } else if let Some(index) = table_index(PUNCT_CHARS, ch) {
            values.extend([PS, index as u32]);
        } else {
            flush(&mut values, &mut codewords);
            let mut buffer = [0u8; 4];
            let bytes: Vec<u8> = if byte < 256 {
                vec![byte as u8]
            } else {
                ch.encode_utf8(&mut buffer).bytes().collect()
            };
            for b in bytes {
                codewords.extend([913, b as u32]);
            }
        }
    }
    flush(&mut values, &mut codewords);
    codewords
}

/// Numeric compaction: 902 latch, then groups of up to 44 digits
pub fn encode_numeric(digits: &str) -> Vec<u32> {
    let mut codewords = vec![902];
    let digits: Vec<u32> = digits
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| (b - b'0') as u32)
        .collect();
    for group in digits.chunks(44) {
        let mut decimal = vec![1u32];
        decimal.extend_from_slice(group);
        let mut base900 = Vec::new();
        while decimal.iter().any(|&d| d != 0) {
            let mut remainder = 0u32;
            for d in decimal.iter_mut() {
                let value = remainder * 10 + *d;
                *d = value / 900;
                remainder = value % 900;
            }
            base900.push(remainder);
        }
        codewords.extend(base900.iter().rev());
    }
    codewords
}

/// Byte compaction: 924 when the length is a multiple of six, else 901
pub fn encode_bytes(bytes: &[u8]) -> Vec<u32> {
    let mut codewords = vec![if bytes.len() % 6 == 0 { 924 } else { 901 }];
    let mut chunks = bytes.chunks_exact(6);
    for chunk in chunks.by_ref() {
        let mut value = chunk.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
        let mut group = [0u32; 5];
        for slot in group.iter_mut().rev() {
            *slot = (value % 900) as u32;
            value /= 900;
        }
        codewords.extend(group);
    }
    codewords.extend(chunks.remainder().iter().map(|&b| b as u32));
    codewords
}

/// Error correction codewords for `data`, generator roots `3^1..=3^num_ec`
pub fn rs_encode(data: &[u32], num_ec: usize) -> Vec<u32> {
    // generator coefficients, highest degree first
    let mut generator = vec![1u32];
    for i in 1..=num_ec {
        let root = Gf929::exp(i);
        let mut next = vec![0u32; generator.len() + 1];
        for (j, &c) in generator.iter().enumerate() {
            next[j] = Gf929::add(next[j], c);
            next[j + 1] = Gf929::sub(next[j + 1], Gf929::mul(c, root));
        }
        generator = next;
    }

    let mut remainder = vec![0u32; num_ec];
    for &d in data {
        let factor = Gf929::add(d, remainder[0]);
        remainder.rotate_left(1);
        remainder[num_ec - 1] = 0;
        for (r, &g) in remainder.iter_mut().zip(&generator[1..]) {
            *r = Gf929::sub(*r, Gf929::mul(factor, g));
        }
    }
    remainder.iter().map(|&r| Gf929::negate(r)).collect()
}

/// Full codeword sequence of a symbol
#[derive(Debug, Clone)]
pub struct EncodedSymbol {
    /// Length descriptor, data, padding and error correction, row-major
    pub codewords: Vec<u32>,
    /// Row count
    pub rows: usize,
    /// Data columns per row
    pub columns: usize,
    /// Error correction level (0-8)
    pub ec_level: u32,
}

/// Lay out `data` in a symbol `columns` wide, padding with 900 and adding
/// `2^(ec_level+1)` error correction codewords.
///
/// Panics when the payload does not fit in 90 rows.
pub fn encode_symbol(data: &[u32], columns: usize, ec_level: u32) -> EncodedSymbol {
    assert!((1..=30).contains(&columns), "1..=30 data columns");
    let num_ec = 1usize << (ec_level + 1);
    let needed = 1 + data.len() + num_ec;
    let rows = needed.div_ceil(columns).max(MIN_ROWS_IN_BARCODE);
    assert!(rows <= MAX_ROWS_IN_BARCODE, "payload too large for {columns} columns");

    let data_len = rows * columns - num_ec;
    let mut codewords = Vec::with_capacity(rows * columns);
    codewords.push(data_len as u32);
    codewords.extend_from_slice(data);
    codewords.resize(data_len, 900);
    let ec = rs_encode(&codewords, num_ec);
    codewords.extend(ec);

    EncodedSymbol {
        codewords,
        rows,
        columns,
        ec_level,
    }
}

/// Left row indicator value for `row`
pub fn left_row_indicator(row: usize, rows: usize, columns: usize, ec_level: u32) -> u32 {
    let fragment = match row % 3 {
        0 => (rows - 1) / 3,
        1 => ec_level as usize * 3 + (rows - 1) % 3,
        _ => columns - 1,
    };
    ((row / 3) * 30 + fragment) as u32
}

/// Right row indicator value for `row`
pub fn right_row_indicator(row: usize, rows: usize, columns: usize, ec_level: u32) -> u32 {
    let fragment = match row % 3 {
        0 => columns - 1,
        1 => (rows - 1) / 3,
        _ => ec_level as usize * 3 + (rows - 1) % 3,
    };
    ((row / 3) * 30 + fragment) as u32
}

/// Rendered symbol plus what a locator would report
#[derive(Debug, Clone)]
pub struct RenderedSymbol {
    /// Binary image, `true` = dark
    pub image: BitMatrix,
    /// Inner corners: left row indicator and stop pattern edges
    pub corners: SymbolCorners,
    /// Pixel width of one codeword
    pub codeword_width: usize,
    /// Codewords that were drawn
    pub symbol: EncodedSymbol,
}

impl RenderedSymbol {
    /// Pixel rectangle of a data codeword, `(left, top, width, height)`
    pub fn codeword_rect(&self, row: usize, column: usize) -> (usize, usize, usize, usize) {
        let (Some(top_left), Some(bottom_left)) = (self.corners.top_left, self.corners.bottom_left)
        else {
            return (0, 0, 0, 0);
        };
        let row_height = (bottom_left.row() + 1 - top_left.row()) / self.symbol.rows;
        (
            top_left.column() + (column + 1) * self.codeword_width,
            top_left.row() + row * row_height,
            self.codeword_width,
            row_height,
        )
    }
}

/// Draw `symbol` with `module_width` pixels per module and `row_height`
/// pixels per row, inside a quiet zone.
pub fn render_symbol(symbol: &EncodedSymbol, module_width: usize, row_height: usize) -> RenderedSymbol {
    let quiet_x = 4 * module_width;
    let quiet_y = 2 * row_height;
    let modules = 17 * (symbol.columns + 3) + 18;
    let width = 2 * quiet_x + modules * module_width;
    let height = 2 * quiet_y + symbol.rows * row_height;
    let mut image = BitMatrix::new(width, height);

    for row in 0..symbol.rows {
        let top = quiet_y + row * row_height;
        let cluster = ((row % 3) * 3) as u32;
        let mut x = quiet_x;
        let mut draw = |widths: &[u32], x: &mut usize| {
            for (i, &w) in widths.iter().enumerate() {
                let w = w as usize * module_width;
                if i % 2 == 0 {
                    image.set_region(*x, top, w, row_height, true);
                }
                *x += w;
            }
        };

        draw(&START_PATTERN, &mut x);
        let mut values = Vec::with_capacity(symbol.columns + 2);
        values.push(left_row_indicator(row, symbol.rows, symbol.columns, symbol.ec_level));
        values.extend_from_slice(&symbol.codewords[row * symbol.columns..(row + 1) * symbol.columns]);
        values.push(right_row_indicator(row, symbol.rows, symbol.columns, symbol.ec_level));
        for value in values {
            let pattern = codeword_pattern(cluster, value).unwrap_or(0);
            draw(&pattern_bit_counts(pattern), &mut x);
        }
        draw(&STOP_PATTERN, &mut x);
    }

    let left_x = (quiet_x + 17 * module_width) as f32;
    let right_x = (quiet_x + 17 * (symbol.columns + 3) * module_width) as f32;
    let top_y = quiet_y as f32;
    let bottom_y = (quiet_y + symbol.rows * row_height - 1) as f32;
    RenderedSymbol {
        image,
        corners: SymbolCorners::new(
            Point::new(left_x, top_y),
            Point::new(left_x, bottom_y),
            Point::new(right_x, top_y),
            Point::new(right_x, bottom_y),
        ),
        codeword_width: 17 * module_width,
        symbol: symbol.clone(),
    }
}

/// Encode and render in one step
pub fn render_codewords(
    data: &[u32],
    columns: usize,
    ec_level: u32,
    module_width: usize,
    row_height: usize,
) -> RenderedSymbol {
    render_symbol(&encode_symbol(data, columns, ec_level), module_width, row_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::reed_solomon::{ErrorCorrector, ReedSolomonDecoder};

    #[test]
    fn test_rs_encode_has_zero_syndromes() {
        let symbol = encode_symbol(&encode_text("PDF417"), 3, 2);
        let mut received = symbol.codewords.clone();
        let errors = ReedSolomonDecoder::new().correct(&mut received, 8, &[]).unwrap();
        assert_eq!(errors, 0);
        assert_eq!(received, symbol.codewords);
    }

    #[test]
    fn test_symbol_layout() {
        let symbol = encode_symbol(&[1, 2, 3], 2, 0);
        // 1 + 3 + 2 codewords fit three rows of two
        assert_eq!(symbol.rows, 3);
        assert_eq!(symbol.codewords.len(), 6);
        assert_eq!(symbol.codewords[0], 4);
    }

    #[test]
    fn test_text_encoding() {
        // "Ab1" = A, LL b, ML 1 (+ PS pad)
        assert_eq!(encode_text("Ab1"), vec![LL, 30 + ML, 30 + PS]);
    }

    #[test]
    fn test_render_dimensions() {
        let rendered = render_codewords(&encode_text("HI"), 2, 0, 2, 6);
        let modules = 17 * 5 + 18;
        assert_eq!(rendered.image.width(), 16 + modules * 2);
        assert_eq!(rendered.image.height(), 24 + 3 * 6);
        assert_eq!(rendered.codeword_width, 34);
        // the start pattern opens with an eight module bar
        assert!(rendered.image.get(8, 12));
        assert!(rendered.image.get(8 + 15, 12));
        assert!(!rendered.image.get(8 + 16, 12));
    }
}
