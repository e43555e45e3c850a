/// Byte compaction: five base-900 codewords pack six bytes, leftovers are
/// one byte per codeword.
use super::eci::EciStringBuilder;
use super::{BYTE_COMPACTION_MODE_LATCH_6, ECI_CHARSET, TEXT_COMPACTION_MODE_LATCH};
use crate::decoder::error::DecodeError;

/// Byte compaction run decoder (latches 901 and 924)
pub struct ByteDecoder;

impl ByteDecoder {
    /// Decode a byte run after latch `mode` (901 or 924). Returns the index
    /// of the first codeword that is not byte data.
    pub fn decode(
        mode: u32,
        codewords: &[u32],
        mut code_index: usize,
        limit: usize,
        out: &mut EciStringBuilder,
    ) -> Result<usize, DecodeError> {
        let is_data = |index: usize| index < limit && codewords[index] < TEXT_COMPACTION_MODE_LATCH;

        loop {
            while code_index < limit && codewords[code_index] == ECI_CHARSET {
                out.append_eci(Self::eci_designator(codewords, code_index + 1, limit)?)?;
                code_index += 2;
            }
            if !is_data(code_index) {
                return Ok(code_index);
            }

            let group_start = code_index;
            let mut value: u64 = 0;
            let mut count = 0;
            while count < 5 && is_data(code_index) {
                value = value * 900 + codewords[code_index] as u64;
                code_index += 1;
                count += 1;
            }

            // a full group packs six bytes unless it is the final group of a 901 run
            if count == 5 && (mode == BYTE_COMPACTION_MODE_LATCH_6 || is_data(code_index)) {
                for i in 0..6 {
                    out.append_byte((value >> (8 * (5 - i))) as u8);
                }
                continue;
            }

            code_index = group_start;
            while code_index < limit {
                let code = codewords[code_index];
                if code < TEXT_COMPACTION_MODE_LATCH {
                    out.append_byte(code as u8);
                    code_index += 1;
                } else if code == ECI_CHARSET {
                    out.append_eci(Self::eci_designator(codewords, code_index + 1, limit)?)?;
                    code_index += 2;
                } else {
                    break;
                }
            }
            return Ok(code_index);
        }
    }

    fn eci_designator(codewords: &[u32], index: usize, limit: usize) -> Result<u32, DecodeError> {
        codewords
            .get(index)
            .copied()
            .filter(|_| index < limit)
            .ok_or(DecodeError::Format("ECI designator missing"))
    }
}
