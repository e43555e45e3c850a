//! Convert interleaved RGB(A) pixels to 8-bit luminance
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8

use rayon::prelude::*;

const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    y.min(255) as u8
}

fn convert(pixels: &[u8], channels: usize, width: usize, height: usize) -> Vec<u8> {
    pixels
        .chunks_exact(channels)
        .take(width * height)
        .map(|p| luma(p[0], p[1], p[2]))
        .collect()
}

/// Convert an RGB image to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert(rgb, 3, width, height)
}

/// Convert an RGBA image to grayscale (alpha is ignored)
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert(rgba, 4, width, height)
}

/// Convert RGB to grayscale, one image row per rayon task
pub fn rgb_to_grayscale_parallel(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }
    gray.par_chunks_mut(width)
        .zip(rgb.par_chunks(width * 3))
        .for_each(|(row, source)| {
            for (out, p) in row.iter_mut().zip(source.chunks_exact(3)) {
                *out = luma(p[0], p[1], p[2]);
            }
        });
    gray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primaries() {
        let rgb = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let gray = rgb_to_grayscale(&rgb, 4, 1);
        assert_eq!(gray, vec![75, 149, 28, 254]);
    }

    #[test]
    fn test_rgba_ignores_alpha() {
        let rgba = [10, 20, 30, 0, 10, 20, 30, 255];
        let gray = rgba_to_grayscale(&rgba, 2, 1);
        assert_eq!(gray[0], gray[1]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (width, height) = (37, 23);
        let rgb: Vec<u8> = (0..width * height * 3).map(|i| (i * 7 % 256) as u8).collect();
        assert_eq!(
            rgb_to_grayscale_parallel(&rgb, width, height),
            rgb_to_grayscale(&rgb, width, height)
        );
    }
}
