use crate::decoder::bitstream::BitstreamParser;
use crate::decoder::config;
use crate::decoder::detection::{BarcodeValue, DetectionResult};
use crate::decoder::error::{DecodeError, FailureKind};
use crate::decoder::reed_solomon::ErrorCorrector;
use crate::decoder::tables::{MAX_CODEWORDS_IN_BARCODE, MAX_EC_CODEWORDS};
use crate::models::{DecoderResult, Point};
use tracing::{debug, trace};

/// Codeword cell with more than one top-voted value
struct Ambiguous {
    index: usize,
    values: Vec<u32>,
}

/// Vote matrix, row indicators in the first and last column
fn barcode_matrix(result: &mut DetectionResult) -> Vec<Vec<BarcodeValue>> {
    result.adjust_row_numbers();
    let rows = result.row_count();
    let columns = result.column_count() + 2;
    let mut matrix = vec![vec![BarcodeValue::new(); columns]; rows];

    for barcode_column in 0..columns {
        let Some(column) = result.column(barcode_column) else {
            continue;
        };
        for codeword in column.codewords().iter().flatten() {
            // rows beyond the metadata row count are ignored
            if let Some(row) = codeword.row_number().filter(|&row| row < rows) {
                matrix[row][barcode_column].set_value(codeword.value());
            }
        }
    }

    if config::debug_dumps() {
        for (row, cells) in matrix.iter().enumerate() {
            let values: Vec<Vec<u32>> = cells.iter().map(BarcodeValue::value).collect();
            trace!(row, ?values, "vote matrix");
        }
    }
    matrix
}

/// Reconcile the symbol length descriptor with the row indicator metadata.
///
/// The count derived from the metadata replaces a missing or conflicting
/// descriptor vote.
fn adjust_codeword_count(
    result: &DetectionResult,
    matrix: &mut [Vec<BarcodeValue>],
) -> Result<(), DecodeError> {
    let calculated = (result.column_count() * result.row_count())
        .checked_sub(result.metadata().ec_codewords())
        .unwrap_or(0);
    let in_range = (1..=MAX_CODEWORDS_IN_BARCODE).contains(&calculated);
    let cell = &mut matrix[0][1];
    let voted = cell.value();

    match voted.first() {
        None if !in_range => return Err(DecodeError::CodewordCount(calculated)),
        None => cell.replace(calculated as u32),
        Some(&count) if count as usize != calculated && in_range => {
            debug!(voted = count, calculated, "replacing symbol length descriptor");
            cell.replace(calculated as u32);
        }
        Some(_) => {}
    }
    Ok(())
}

pub(super) fn decode_detection_result<C: ErrorCorrector + ?Sized>(
    result: &mut DetectionResult,
    corrector: &C,
) -> Result<DecoderResult, DecodeError> {
    let mut matrix = barcode_matrix(result);
    adjust_codeword_count(result, &mut matrix)?;

    let columns = result.column_count();
    let mut codewords = vec![0u32; result.row_count() * columns];
    let mut erasures = Vec::new();
    let mut ambiguous = Vec::new();
    for (row, cells) in matrix.iter().enumerate() {
        for column in 0..columns {
            let index = row * columns + column;
            let values = cells[column + 1].value();
            match values.as_slice() {
                [] => erasures.push(index),
                [value] => codewords[index] = *value,
                _ => ambiguous.push(Ambiguous { index, values }),
            }
        }
    }
    debug!(
        codewords = codewords.len(),
        erasures = erasures.len(),
        ambiguous = ambiguous.len(),
        "flattened vote matrix"
    );

    let position = result.bounding_box().corners();
    decode_ambiguous_values(
        result.ec_level(),
        codewords,
        &erasures,
        &ambiguous,
        position,
        corrector,
    )
}

/// Try candidate combinations for the ambiguous cells, odometer style,
/// until error correction accepts one.
fn decode_ambiguous_values<C: ErrorCorrector + ?Sized>(
    ec_level: u32,
    mut codewords: Vec<u32>,
    erasures: &[usize],
    ambiguous: &[Ambiguous],
    position: [Point; 4],
    corrector: &C,
) -> Result<DecoderResult, DecodeError> {
    let attempts = config::ambiguous_attempts();
    let mut choice = vec![0usize; ambiguous.len()];

    for attempt in 0..attempts {
        for (cell, &pick) in ambiguous.iter().zip(&choice) {
            codewords[cell.index] = cell.values[pick];
        }
        match decode_codewords(codewords.clone(), ec_level, erasures, position, corrector) {
            Ok(decoded) => return Ok(decoded),
            Err(err) if err.kind() == FailureKind::Capacity => {
                debug!(attempt, %err, "error correction rejected combination");
                if ambiguous.is_empty() {
                    return Err(err);
                }
            }
            Err(err) => return Err(err),
        }
        if !next_combination(&mut choice, ambiguous) {
            return Err(DecodeError::AmbiguityExhausted(attempt + 1));
        }
    }
    Err(DecodeError::AmbiguityExhausted(attempts))
}

/// Advance the odometer; false once every combination has been tried
fn next_combination(choice: &mut [usize], ambiguous: &[Ambiguous]) -> bool {
    for (pick, cell) in choice.iter_mut().zip(ambiguous) {
        if *pick + 1 < cell.values.len() {
            *pick += 1;
            return true;
        }
        *pick = 0;
    }
    false
}

fn decode_codewords<C: ErrorCorrector + ?Sized>(
    mut codewords: Vec<u32>,
    ec_level: u32,
    erasures: &[usize],
    position: [Point; 4],
    corrector: &C,
) -> Result<DecoderResult, DecodeError> {
    if codewords.is_empty() {
        return Err(DecodeError::Format("no codewords"));
    }
    let num_ec_codewords = 1usize << (ec_level + 1);
    let errors_corrected = correct_errors(&mut codewords, erasures, num_ec_codewords, corrector)?;
    verify_codeword_count(&mut codewords, num_ec_codewords)?;

    let stream = BitstreamParser::decode(&codewords)?;
    codewords.truncate(codewords[0] as usize);
    Ok(DecoderResult {
        text: stream.text,
        codewords,
        ec_level,
        errors_corrected,
        erasures: erasures.len(),
        macro_metadata: stream.macro_metadata,
        position,
    })
}

fn correct_errors<C: ErrorCorrector + ?Sized>(
    codewords: &mut [u32],
    erasures: &[usize],
    num_ec_codewords: usize,
    corrector: &C,
) -> Result<usize, DecodeError> {
    let max_erasures = num_ec_codewords / 2 + config::max_extra_erasures();
    if erasures.len() > max_erasures || num_ec_codewords > MAX_EC_CODEWORDS {
        return Err(DecodeError::TooManyErasures {
            erasures: erasures.len(),
            ec_codewords: num_ec_codewords,
        });
    }
    let errors = corrector.correct(codewords, num_ec_codewords, erasures)?;
    if 2 * errors + erasures.len() > num_ec_codewords {
        return Err(DecodeError::Checksum("correction exceeds capacity"));
    }
    Ok(errors)
}

/// Check the symbol length descriptor, filling it in when it was read as 0
fn verify_codeword_count(codewords: &mut [u32], num_ec_codewords: usize) -> Result<(), DecodeError> {
    if codewords.len() < 4 {
        return Err(DecodeError::Format("fewer than four codewords"));
    }
    let declared = codewords[0] as usize;
    if declared > codewords.len() {
        return Err(DecodeError::Format("length descriptor exceeds the symbol"));
    }
    if declared == 0 {
        if num_ec_codewords >= codewords.len() {
            return Err(DecodeError::Format("length descriptor missing"));
        }
        codewords[0] = (codewords.len() - num_ec_codewords) as u32;
    }
    Ok(())
}
