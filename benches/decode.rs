use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_pdf417::decoder::bitstream::BitstreamParser;
use rust_pdf417::decoder::reed_solomon::{ErrorCorrector, ReedSolomonDecoder};
use rust_pdf417::test_utils::{encode_symbol, encode_text, render_codewords};
use rust_pdf417::{ScanJob, decode, decode_batch};

const TEXT: &str = "PDF417 benchmark payload 0123456789 with Mixed case text";

fn bench_decode_clean(c: &mut Criterion) {
    let rendered = render_codewords(&encode_text(TEXT), 6, 3, 2, 6);
    let width = rendered.codeword_width;
    c.bench_function("decode_6col_level3", |b| {
        b.iter(|| decode(black_box(&rendered.image), black_box(&rendered.corners), width, width))
    });
}

fn bench_decode_damaged(c: &mut Criterion) {
    let mut rendered = render_codewords(&encode_text(TEXT), 6, 3, 2, 6);
    for (row, column) in [(1, 1), (3, 4), (5, 2)] {
        let (left, top, width, height) = rendered.codeword_rect(row, column);
        rendered.image.set_region(left, top, width, height, true);
    }
    let width = rendered.codeword_width;
    c.bench_function("decode_6col_level3_three_erasures", |b| {
        b.iter(|| decode(black_box(&rendered.image), black_box(&rendered.corners), width, width))
    });
}

fn bench_decode_batch(c: &mut Criterion) {
    let symbols: Vec<_> = (0..16)
        .map(|i| render_codewords(&encode_text(&format!("{TEXT} #{i}")), 4 + i % 3, 2, 2, 5))
        .collect();
    let jobs: Vec<ScanJob<'_>> = symbols
        .iter()
        .map(|s| ScanJob {
            image: &s.image,
            corners: s.corners,
            min_codeword_width: s.codeword_width,
            max_codeword_width: s.codeword_width,
        })
        .collect();
    c.bench_function("decode_batch_16", |b| b.iter(|| decode_batch(black_box(&jobs))));
}

fn bench_reed_solomon(c: &mut Criterion) {
    let symbol = encode_symbol(&encode_text(TEXT), 8, 5);
    let num_ec = 1usize << 6;
    let mut damaged = symbol.codewords.clone();
    for i in [2usize, 9, 17, 30] {
        damaged[i] = (damaged[i] + 100) % 929;
    }
    let decoder = ReedSolomonDecoder::new();
    c.bench_function("reed_solomon_64ec_4errors_4erasures", |b| {
        b.iter(|| {
            let mut received = damaged.clone();
            decoder.correct(black_box(&mut received), num_ec, &[40, 41, 42, 43])
        })
    });
}

fn bench_bitstream(c: &mut Criterion) {
    let symbol = encode_symbol(&encode_text(TEXT), 8, 0);
    let data = &symbol.codewords[..symbol.codewords[0] as usize];
    c.bench_function("bitstream_text", |b| {
        b.iter(|| BitstreamParser::decode(black_box(data)))
    });
}

criterion_group!(
    benches,
    bench_decode_clean,
    bench_decode_damaged,
    bench_decode_batch,
    bench_reed_solomon,
    bench_bitstream
);
criterion_main!(benches);
