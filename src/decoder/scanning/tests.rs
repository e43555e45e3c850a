use super::*;
use crate::decoder::error::FailureKind;
use crate::models::Point;
use crate::test_utils::{encode_symbol, encode_text, render_codewords, render_symbol};

fn decode_rendered(image: &BitMatrix, corners: &SymbolCorners, width: usize) -> Result<DecoderResult, DecodeError> {
    ScanningDecoder::decode(image, corners, width, width)
}

#[test]
fn test_decode_with_all_corners() {
    let rendered = render_codewords(&encode_text("Hello PDF417 World"), 4, 2, 2, 6);
    let result = decode_rendered(&rendered.image, &rendered.corners, rendered.codeword_width).unwrap();
    assert_eq!(result.text, "Hello PDF417 World");
    assert_eq!(result.ec_level, 2);
    assert_eq!(result.errors_corrected, 0);
    assert_eq!(result.erasures, 0);
    assert!(result.macro_metadata.is_none());
    let expected_data = rendered.symbol.codewords[0] as usize;
    assert_eq!(result.codewords, rendered.symbol.codewords[..expected_data].to_vec());
    assert_eq!(Some(result.position[0]), rendered.corners.top_left);
    assert_eq!(Some(result.position[3]), rendered.corners.bottom_right);
}

#[test]
fn test_decode_from_left_corners_only() {
    let rendered = render_codewords(&encode_text("LEFT SIDE ONLY"), 3, 1, 2, 5);
    let corners = SymbolCorners {
        top_right: None,
        bottom_right: None,
        ..rendered.corners
    };
    let result = decode_rendered(&rendered.image, &corners, rendered.codeword_width).unwrap();
    assert_eq!(result.text, "LEFT SIDE ONLY");
}

#[test]
fn test_decode_from_right_corners_only() {
    let rendered = render_codewords(&encode_text("right side only"), 3, 1, 2, 5);
    let corners = SymbolCorners {
        top_left: None,
        bottom_left: None,
        ..rendered.corners
    };
    let result = decode_rendered(&rendered.image, &corners, rendered.codeword_width).unwrap();
    assert_eq!(result.text, "right side only");
}

#[test]
fn test_blotted_codeword_becomes_erasure() {
    let mut rendered = render_codewords(&encode_text("ERASURE TEST"), 4, 2, 2, 6);
    // ink over one codeword; a white gap would also swallow the trailing
    // space of its left neighbour
    let (left, top, width, height) = rendered.codeword_rect(1, 2);
    rendered.image.set_region(left, top, width, height, true);

    let result = decode_rendered(&rendered.image, &rendered.corners, rendered.codeword_width).unwrap();
    assert_eq!(result.text, "ERASURE TEST");
    assert_eq!(result.erasures, 1);
    assert_eq!(result.errors_corrected, 0);
}

#[test]
fn test_misprinted_codeword_is_corrected() {
    let mut symbol = encode_symbol(&encode_text("SUBSTITUTION"), 3, 2);
    // a data codeword printed with the wrong value, error correction untouched
    symbol.codewords[4] = (symbol.codewords[4] + 17) % 900;
    let rendered = render_symbol(&symbol, 2, 6);

    let result = decode_rendered(&rendered.image, &rendered.corners, rendered.codeword_width).unwrap();
    assert_eq!(result.text, "SUBSTITUTION");
    assert_eq!(result.errors_corrected, 1);
    assert_eq!(result.erasures, 0);
}

#[test]
fn test_corners_inside_the_symbol_trigger_rescan() {
    let rendered = render_codewords(&encode_text("THE QUICK BROWN FOX JUMPS"), 2, 1, 2, 4);
    assert!(rendered.symbol.rows >= 6);
    let corners = rendered.corners;
    let shift = |p: Option<Point>| p.map(|p| Point::new(p.x, p.y + 4.0));
    let inner = SymbolCorners {
        top_left: shift(corners.top_left),
        top_right: shift(corners.top_right),
        ..corners
    };

    let result = decode_rendered(&rendered.image, &inner, rendered.codeword_width).unwrap();
    assert_eq!(result.text, "THE QUICK BROWN FOX JUMPS");
    assert_eq!(result.position[0].y, corners.top_left.map_or(0.0, |p| p.y));
}

#[test]
fn test_estimate_codeword_width() {
    let rendered = render_codewords(&encode_text("WIDTH"), 2, 0, 3, 6);
    assert_eq!(
        estimate_codeword_width(&rendered.image, &rendered.corners),
        Some(rendered.codeword_width)
    );
    let right_only = SymbolCorners {
        top_left: None,
        bottom_left: None,
        ..rendered.corners
    };
    assert_eq!(
        estimate_codeword_width(&rendered.image, &right_only),
        Some(rendered.codeword_width)
    );
    let blank = BitMatrix::new(rendered.image.width(), rendered.image.height());
    assert_eq!(estimate_codeword_width(&blank, &rendered.corners), None);
}

#[test]
fn test_blank_image_has_no_metadata() {
    let rendered = render_codewords(&encode_text("X"), 2, 0, 2, 4);
    let blank = BitMatrix::new(rendered.image.width(), rendered.image.height());
    let err = decode_rendered(&blank, &rendered.corners, rendered.codeword_width).unwrap_err();
    assert_eq!(err, DecodeError::NoMetadata);
    assert_eq!(err.kind(), FailureKind::Consistency);
}

#[test]
fn test_rejects_bad_input() {
    let image = BitMatrix::new(100, 50);
    let half = SymbolCorners {
        top_left: Some(Point::new(10.0, 10.0)),
        ..SymbolCorners::default()
    };
    assert_eq!(
        ScanningDecoder::decode(&image, &half, 34, 34).unwrap_err(),
        DecodeError::InvalidCorners
    );

    let nan = SymbolCorners::left_only(Point::new(f32::NAN, 1.0), Point::new(10.0, 40.0));
    let err = ScanningDecoder::decode(&image, &nan, 34, 34).unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidInput);

    let empty = BitMatrix::new(0, 0);
    let corners = SymbolCorners::left_only(Point::new(10.0, 1.0), Point::new(10.0, 40.0));
    assert_eq!(
        ScanningDecoder::decode(&empty, &corners, 34, 34).unwrap_err(),
        DecodeError::InvalidImage("empty image")
    );
}

#[test]
fn test_inverted_corners_are_rejected() {
    let image = BitMatrix::new(200, 100);
    let upside_down = SymbolCorners::left_only(Point::new(10.0, 50.0), Point::new(10.0, 10.0));
    assert_eq!(
        ScanningDecoder::decode(&image, &upside_down, 34, 34).unwrap_err(),
        DecodeError::InvalidCorners
    );
    let upside_down = SymbolCorners::right_only(Point::new(150.0, 80.0), Point::new(150.0, 20.0));
    assert_eq!(
        ScanningDecoder::decode(&image, &upside_down, 34, 34).unwrap_err(),
        DecodeError::InvalidCorners
    );
}

#[test]
fn test_corners_beyond_image_are_clamped() {
    let image = BitMatrix::new(200, 100);
    let tall = SymbolCorners::left_only(Point::new(10.0, 10.0), Point::new(10.0, 1.0e7));
    let err = ScanningDecoder::decode(&image, &tall, 34, 34).unwrap_err();
    assert_eq!(err, DecodeError::NoMetadata);

    let below = SymbolCorners::right_only(Point::new(500.0, 300.0), Point::new(500.0, 900.0));
    assert!(ScanningDecoder::decode(&image, &below, 34, 34).is_err());
}
