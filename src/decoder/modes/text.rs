/// Text compaction (codewords 0-899 carry two 30-symbol values)
use super::eci::EciStringBuilder;
use super::{
    BEGIN_MACRO_PDF417_CONTROL_BLOCK, BEGIN_MACRO_PDF417_OPTIONAL_FIELD,
    BYTE_COMPACTION_MODE_LATCH, BYTE_COMPACTION_MODE_LATCH_6, ECI_CHARSET, ECI_GENERAL_PURPOSE,
    ECI_USER_DEFINED, MACRO_PDF417_TERMINATOR, MODE_SHIFT_TO_BYTE_COMPACTION_MODE, NUMERIC_COMPACTION_MODE_LATCH,
    TEXT_COMPACTION_MODE_LATCH,
};
use crate::decoder::error::DecodeError;

const PL: u32 = 25;
const LL: u32 = 27;
const AS: u32 = 27;
const ML: u32 = 28;
const AL: u32 = 28;
const PS: u32 = 29;
const PAL: u32 = 29;

const MIXED_CHARS: &[u8; 25] = b"0123456789&\r\t,:#-.$/+%*=^";
const PUNCT_CHARS: &[u8; 29] = b";<>@[\\]_`~!\r\t,:\n-.$/\"|*()?{}'";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Submode {
    Alpha,
    Lower,
    Mixed,
    Punct,
    AlphaShift,
    PunctShift,
}

#[derive(Debug, Clone, Copy)]
enum Symbol {
    Value(u32),
    /// Codeword 900 inside the text run, resets to upper case
    Reset,
    /// Codeword 913 followed by a raw byte
    Byte(u8),
}

/// Text compaction run decoder
pub struct TextDecoder;

impl TextDecoder {
    /// Decode a text run starting at `code_index`, stopping before the next
    /// mode latch or macro codeword. Returns the index of the first unread
    /// codeword.
    pub fn decode(
        codewords: &[u32],
        mut code_index: usize,
        limit: usize,
        out: &mut EciStringBuilder,
    ) -> Result<usize, DecodeError> {
        let mut symbols = Vec::with_capacity(limit.saturating_sub(code_index) * 2);
        let mut submode = Submode::Alpha;

        while code_index < limit {
            let code = codewords[code_index];
            code_index += 1;
            if code < TEXT_COMPACTION_MODE_LATCH {
                symbols.push(Symbol::Value(code / 30));
                symbols.push(Symbol::Value(code % 30));
                continue;
            }
            match code {
                TEXT_COMPACTION_MODE_LATCH => symbols.push(Symbol::Reset),
                BYTE_COMPACTION_MODE_LATCH
                | BYTE_COMPACTION_MODE_LATCH_6
                | NUMERIC_COMPACTION_MODE_LATCH
                | BEGIN_MACRO_PDF417_CONTROL_BLOCK
                | BEGIN_MACRO_PDF417_OPTIONAL_FIELD
                | MACRO_PDF417_TERMINATOR
                | ECI_GENERAL_PURPOSE
                | ECI_USER_DEFINED => {
                    code_index -= 1;
                    break;
                }
                MODE_SHIFT_TO_BYTE_COMPACTION_MODE => {
                    let byte = codewords
                        .get(code_index)
                        .filter(|_| code_index < limit)
                        .ok_or(DecodeError::Format("shift to byte at end of data"))?;
                    code_index += 1;
                    symbols.push(Symbol::Byte(*byte as u8));
                }
                ECI_CHARSET => {
                    submode = Self::decode_symbols(&symbols, out, submode);
                    symbols.clear();
                    let eci = codewords
                        .get(code_index)
                        .filter(|_| code_index < limit)
                        .ok_or(DecodeError::Format("ECI designator missing"))?;
                    out.append_eci(*eci)?;
                    code_index += 1;
                }
                // reserved codewords carry nothing in text mode
                _ => {}
            }
        }

        Self::decode_symbols(&symbols, out, submode);
        Ok(code_index)
    }

    /// Returns the latched sub-mode at the end of the run
    fn decode_symbols(symbols: &[Symbol], out: &mut EciStringBuilder, start: Submode) -> Submode {
        let mut submode = start;
        let mut prior_to_shift = start;
        let mut latched = start;

        for &symbol in symbols {
            let value = match symbol {
                Symbol::Value(v) => v,
                Symbol::Reset => {
                    submode = Submode::Alpha;
                    latched = Submode::Alpha;
                    continue;
                }
                Symbol::Byte(byte) => {
                    out.append_byte(byte);
                    if matches!(submode, Submode::AlphaShift | Submode::PunctShift) {
                        submode = prior_to_shift;
                    }
                    continue;
                }
            };

            let mut ch = None;
            match submode {
                Submode::Alpha | Submode::Lower => {
                    let base = if submode == Submode::Alpha { b'A' } else { b'a' };
                    match value {
                        0..=25 => ch = Some((base + value as u8) as char),
                        26 => ch = Some(' '),
                        LL if submode == Submode::Alpha => {
                            submode = Submode::Lower;
                            latched = submode;
                        }
                        AS => {
                            prior_to_shift = submode;
                            submode = Submode::AlphaShift;
                        }
                        ML => {
                            submode = Submode::Mixed;
                            latched = submode;
                        }
                        _ => {
                            prior_to_shift = submode;
                            submode = Submode::PunctShift;
                        }
                    }
                }
                Submode::Mixed => match value {
                    0..=24 => ch = Some(MIXED_CHARS[value as usize] as char),
                    PL => {
                        submode = Submode::Punct;
                        latched = submode;
                    }
                    26 => ch = Some(' '),
                    LL => {
                        submode = Submode::Lower;
                        latched = submode;
                    }
                    AL => {
                        submode = Submode::Alpha;
                        latched = submode;
                    }
                    _ => {
                        prior_to_shift = submode;
                        submode = Submode::PunctShift;
                    }
                },
                Submode::Punct => match value {
                    0..=28 => ch = Some(PUNCT_CHARS[value as usize] as char),
                    _ => {
                        submode = Submode::Alpha;
                        latched = submode;
                    }
                },
                Submode::AlphaShift => {
                    submode = prior_to_shift;
                    match value {
                        0..=25 => ch = Some((b'A' + value as u8) as char),
                        26 => ch = Some(' '),
                        _ => {}
                    }
                }
                Submode::PunctShift => {
                    submode = prior_to_shift;
                    match value {
                        0..=28 => ch = Some(PUNCT_CHARS[value as usize] as char),
                        PAL => submode = Submode::Alpha,
                        _ => {}
                    }
                }
            }
            if let Some(ch) = ch {
                out.append_char(ch);
            }
        }
        latched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(values: &[u32]) -> Vec<u32> {
        values.chunks(2).map(|p| p[0] * 30 + p.get(1).copied().unwrap_or(PS)).collect()
    }

    fn decode(values: &[u32]) -> String {
        let codewords = pack(values);
        let mut out = EciStringBuilder::new();
        let end = TextDecoder::decode(&codewords, 0, codewords.len(), &mut out).unwrap();
        assert_eq!(end, codewords.len());
        out.finish()
    }

    #[test]
    fn test_alpha_and_lower() {
        // "Hi there": H, LL, i, space, t h e r e
        assert_eq!(decode(&[7, LL, 8, 26, 19, 7, 4, 17, 4]), "Hi there");
    }

    #[test]
    fn test_mixed_and_punct() {
        // "A1,B!" : A ML 1 , AL B PS !
        assert_eq!(decode(&[0, ML, 1, 13, AL, 1, PS, 10]), "A1,B!");
        // latch to punctuation and back
        assert_eq!(decode(&[ML, PL, 0, 2, PAL, 25]), ";>Z");
    }

    #[test]
    fn test_alpha_shift_from_lower() {
        // "aBc"
        assert_eq!(decode(&[LL, 0, AS, 1, 2]), "aBc");
    }

    #[test]
    fn test_stops_before_latch() {
        let codewords = [7 * 30 + 8, 902, 1, 2];
        let mut out = EciStringBuilder::new();
        let end = TextDecoder::decode(&codewords, 0, 4, &mut out).unwrap();
        assert_eq!(end, 1);
        assert_eq!(out.finish(), "HI");
    }

    #[test]
    fn test_byte_shift_and_eci() {
        // "A" + shifted byte 0xE9 + ECI 26 + "B"
        let codewords = [PS, 913, 0xE9, 927, 26, 30 + PS];
        let mut out = EciStringBuilder::new();
        let end = TextDecoder::decode(&codewords, 0, codewords.len(), &mut out).unwrap();
        assert_eq!(end, codewords.len());
        assert_eq!(out.finish(), "A\u{e9}B");
    }

    #[test]
    fn test_operands_past_the_limit_are_rejected() {
        // the byte after 913 and the ECI designator belong to the error
        // correction area when the run ends at `limit`
        let mut out = EciStringBuilder::new();
        let shift = [PS, 913, 0xE9, 30];
        let err = TextDecoder::decode(&shift, 0, 2, &mut out).unwrap_err();
        assert_eq!(err, DecodeError::Format("shift to byte at end of data"));

        let eci = [PS, 927, 26, 30];
        let err = TextDecoder::decode(&eci, 0, 2, &mut out).unwrap_err();
        assert_eq!(err, DecodeError::Format("ECI designator missing"));

        let short = [PS, 913];
        assert!(TextDecoder::decode(&short, 0, 2, &mut out).is_err());
    }

    #[test]
    fn test_reset_latch() {
        // lower "a", 900 resets to upper "A"
        let codewords = [LL * 30, 900, PS];
        let mut out = EciStringBuilder::new();
        TextDecoder::decode(&codewords, 0, 3, &mut out).unwrap();
        assert_eq!(out.finish(), "aA");
    }
}
