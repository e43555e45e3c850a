//! End-to-end decoding of rendered PDF417 symbols
//!
//! Each test encodes a payload, draws it with the test renderer and runs the
//! full pipeline: codeword scanning, row indicator metadata, error
//! correction and compaction mode decoding. Damage is applied directly to
//! the rendered bitmap.

use proptest::prelude::*;
use rust_pdf417::test_utils::{
    RenderedSymbol, encode_bytes, encode_numeric, encode_symbol, encode_text, render_codewords,
    render_symbol,
};
use rust_pdf417::{
    BitMatrix, DecodeError, Decoder, DecoderResult, FailureKind, ScanJob, SymbolCorners, decode,
    decode_batch,
};

const SENTENCE: &str = "Round trip across layouts: 42 items!";

fn decode_rendered(rendered: &RenderedSymbol) -> Result<DecoderResult, DecodeError> {
    decode(
        &rendered.image,
        &rendered.corners,
        rendered.codeword_width,
        rendered.codeword_width,
    )
}

fn blot(rendered: &mut RenderedSymbol, row: usize, column: usize) {
    let (left, top, width, height) = rendered.codeword_rect(row, column);
    rendered.image.set_region(left, top, width, height, true);
}

/// Insert 900 padding ahead of `control` so the macro block ends the data.
fn pad_before(data: &[u32], control: &[u32], columns: usize, ec_level: u32) -> Vec<u32> {
    let num_ec = 1usize << (ec_level + 1);
    let used = 1 + data.len() + control.len() + num_ec;
    let rows = used.div_ceil(columns).max(3);
    let mut payload = data.to_vec();
    payload.resize(data.len() + rows * columns - used, 900);
    payload.extend_from_slice(control);
    payload
}

#[test]
fn test_text_across_layouts() {
    // (columns, ec level, module width, row height)
    for (columns, ec_level, module_width, row_height) in
        [(1, 0, 2, 3), (3, 2, 2, 4), (5, 4, 1, 3), (8, 1, 3, 5), (2, 6, 2, 2)]
    {
        let rendered = render_codewords(
            &encode_text(SENTENCE),
            columns,
            ec_level,
            module_width,
            row_height,
        );
        let result = decode_rendered(&rendered).unwrap_or_else(|err| {
            panic!("{columns} columns, level {ec_level}, module {module_width}: {err}")
        });
        assert_eq!(result.text, SENTENCE);
        assert_eq!(result.ec_level, ec_level);
        assert_eq!(result.errors_corrected, 0);
        assert_eq!(result.erasures, 0);
        assert!(result.macro_metadata.is_none());
    }
}

#[test]
fn test_numeric_payload() {
    let digits = "31415926535897932384626433832795028841971693993751058209749445923";
    let rendered = render_codewords(&encode_numeric(digits), 4, 2, 2, 4);
    assert_eq!(decode_rendered(&rendered).unwrap().text, digits);
}

#[test]
fn test_byte_payloads() {
    // multiple of six (924) and ragged (901)
    let payloads: [&[u8]; 2] = [
        &[0x41, 0xe9, 0x00, 0xff, 0x10, 0x80, 0x7f, 0x20, 0xc3, 0x01, 0x02, 0x03],
        &[0x50, 0xfe, 0xff, 0x00, 0x09, 0xa0, 0x31],
    ];
    for bytes in payloads {
        let rendered = render_codewords(&encode_bytes(bytes), 3, 2, 2, 4);
        let expected: String = bytes.iter().map(|&b| b as char).collect();
        assert_eq!(decode_rendered(&rendered).unwrap().text, expected);
    }
}

#[test]
fn test_mixed_modes() {
    let mut data = encode_text("Invoice ");
    data.extend(encode_numeric("000123456789"));
    data.push(900);
    data.extend(encode_text("paid"));
    data.extend(encode_bytes(b"\xa9 2024"));

    let rendered = render_codewords(&data, 5, 3, 2, 4);
    assert_eq!(
        decode_rendered(&rendered).unwrap().text,
        "Invoice 000123456789paid\u{a9} 2024"
    );
}

#[test]
fn test_utf8_eci() {
    let text = "\u{20ac} \u{fc}n\u{ef}c\u{f6}d\u{e9}";
    let mut data = vec![927, 26];
    data.extend(encode_bytes(text.as_bytes()));

    let rendered = render_codewords(&data, 4, 2, 2, 4);
    assert_eq!(decode_rendered(&rendered).unwrap().text, text);
}

#[test]
fn test_right_side_only_with_measured_width() {
    let rendered = render_codewords(&encode_text("Right Only 123"), 4, 1, 3, 6);
    let corners = SymbolCorners {
        top_left: None,
        bottom_left: None,
        ..rendered.corners
    };
    let result = Decoder::new().decode(&rendered.image, &corners).unwrap();
    assert_eq!(result.text, "Right Only 123");
}

#[test]
fn test_blotted_codewords_are_erasures() {
    let mut rendered = render_codewords(&encode_text(SENTENCE), 4, 3, 2, 5);
    for (row, column) in [(0, 1), (2, 3), (4, 0)] {
        blot(&mut rendered, row, column);
    }

    let result = decode_rendered(&rendered).unwrap();
    assert_eq!(result.text, SENTENCE);
    assert_eq!(result.erasures, 3);
    assert_eq!(result.errors_corrected, 0);
}

#[test]
fn test_misprinted_codewords_are_corrected() {
    let mut symbol = encode_symbol(&encode_text(SENTENCE), 4, 2);
    let original = symbol.codewords.clone();
    symbol.codewords[3] = (symbol.codewords[3] + 5) % 900;
    symbol.codewords[7] = (symbol.codewords[7] + 300) % 900;

    let result = decode_rendered(&render_symbol(&symbol, 2, 4)).unwrap();
    assert_eq!(result.text, SENTENCE);
    assert_eq!(result.errors_corrected, 2);
    assert_eq!(result.erasures, 0);
    assert_eq!(result.codewords, original[..original[0] as usize]);
}

#[test]
fn test_damage_beyond_capacity() {
    let mut rendered = render_codewords(&encode_text(SENTENCE), 4, 1, 2, 5);
    for row in 0..rendered.symbol.rows {
        blot(&mut rendered, row, 1);
    }

    let err = decode_rendered(&rendered).unwrap_err();
    assert!(matches!(err, DecodeError::TooManyErasures { .. }), "{err}");
    assert_eq!(err.kind(), FailureKind::Capacity);
}

#[test]
fn test_macro_segment() {
    let (columns, ec_level) = (4, 2);
    let segment_index = 3u32;
    let mut control = vec![
        928,
        (100_000 + segment_index) / 900,
        (100_000 + segment_index) % 900,
    ];
    control.extend(encode_text("FILE42"));
    control.extend([923, 0]);
    control.extend(encode_text("report.txt"));
    control.extend([923, 1]);
    control.extend(&encode_numeric("5")[1..]);
    control.extend([923, 2]);
    control.extend(&encode_numeric("1700000000")[1..]);
    control.push(922);

    let payload = pad_before(&encode_text("Chunk one of three"), &control, columns, ec_level);
    let rendered = render_codewords(&payload, columns, ec_level, 2, 4);
    let result = decode_rendered(&rendered).unwrap();

    assert_eq!(result.text, "Chunk one of three");
    let metadata = result.macro_metadata.expect("macro metadata");
    assert_eq!(metadata.segment_index, segment_index);
    assert_eq!(metadata.file_id, "FILE42");
    assert_eq!(metadata.file_name.as_deref(), Some("report.txt"));
    assert_eq!(metadata.segment_count, Some(5));
    assert_eq!(metadata.timestamp, Some(1_700_000_000));
    assert!(metadata.is_last_segment);
    assert_eq!(metadata.optional_data.as_ref().map(|data| data[0]), Some(0));
}

#[test]
fn test_batch_matches_sequential() {
    let rendered = [
        render_codewords(&encode_text("alpha"), 2, 0, 2, 4),
        render_codewords(&encode_numeric("9876543210"), 3, 1, 2, 3),
        render_codewords(&encode_text("gamma ray"), 4, 2, 1, 4),
    ];
    let blank = BitMatrix::new(64, 64);
    let mut jobs: Vec<ScanJob<'_>> = rendered
        .iter()
        .map(|r| ScanJob {
            image: &r.image,
            corners: r.corners,
            min_codeword_width: r.codeword_width,
            max_codeword_width: r.codeword_width,
        })
        .collect();
    let template = jobs[0];
    jobs.push(ScanJob {
        image: &blank,
        ..template
    });

    let sequential: Vec<_> = jobs
        .iter()
        .map(|job| {
            decode(
                job.image,
                &job.corners,
                job.min_codeword_width,
                job.max_codeword_width,
            )
        })
        .collect();
    let batch = decode_batch(&jobs);

    assert_eq!(batch, sequential);
    assert_eq!(batch[1].as_ref().unwrap().text, "9876543210");
    assert!(batch[3].is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_text_roundtrip(
        text in "[A-Za-z0-9 ,.:!?]{1,40}",
        columns in 1usize..=6,
        ec_level in 0u32..=3,
    ) {
        let rendered = render_codewords(&encode_text(&text), columns, ec_level, 2, 3);
        let result = decode_rendered(&rendered).unwrap();
        prop_assert_eq!(result.text, text);
    }
}
