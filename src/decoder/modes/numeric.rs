/// Numeric compaction: groups of up to 15 codewords hold a base-900 number
/// whose decimal form is the payload digits behind a leading 1.
use super::eci::EciStringBuilder;
use super::{
    BEGIN_MACRO_PDF417_CONTROL_BLOCK, BEGIN_MACRO_PDF417_OPTIONAL_FIELD,
    BYTE_COMPACTION_MODE_LATCH, BYTE_COMPACTION_MODE_LATCH_6, ECI_CHARSET, ECI_GENERAL_PURPOSE,
    ECI_USER_DEFINED, MACRO_PDF417_TERMINATOR, NUMERIC_COMPACTION_MODE_LATCH, TEXT_COMPACTION_MODE_LATCH,
};
use crate::decoder::error::DecodeError;

/// Codewords per numeric group (44 digits plus the leading 1)
pub const MAX_NUMERIC_CODEWORDS: usize = 15;

const LIMB: u64 = 1_000_000_000;

/// Numeric compaction run decoder (latch 902)
pub struct NumericDecoder;

impl NumericDecoder {
    /// Decode a numeric run. A repeated 902 closes the current group and
    /// starts the next one.
    pub fn decode(
        codewords: &[u32],
        mut code_index: usize,
        limit: usize,
        out: &mut EciStringBuilder,
    ) -> Result<usize, DecodeError> {
        let mut group = Vec::with_capacity(MAX_NUMERIC_CODEWORDS);

        while code_index < limit {
            let code = codewords[code_index];
            code_index += 1;
            let mut end = code_index == limit;

            if code < TEXT_COMPACTION_MODE_LATCH {
                group.push(code);
            } else if matches!(
                code,
                TEXT_COMPACTION_MODE_LATCH
                    | BYTE_COMPACTION_MODE_LATCH
                    | BYTE_COMPACTION_MODE_LATCH_6
                    | BEGIN_MACRO_PDF417_CONTROL_BLOCK
                    | BEGIN_MACRO_PDF417_OPTIONAL_FIELD
                    | MACRO_PDF417_TERMINATOR
                    | ECI_CHARSET
                    | ECI_GENERAL_PURPOSE
                    | ECI_USER_DEFINED
            ) {
                code_index -= 1;
                end = true;
            }

            let flush = group.len() == MAX_NUMERIC_CODEWORDS
                || code == NUMERIC_COMPACTION_MODE_LATCH
                || end;
            if flush && !group.is_empty() {
                out.append_str(&base900_to_base10(&group)?);
                group.clear();
            }
            if end {
                break;
            }
        }
        Ok(code_index)
    }
}

/// Convert a numeric group to its digits, stripping the leading 1.
pub fn base900_to_base10(codewords: &[u32]) -> Result<String, DecodeError> {
    // little-endian base 10^9 limbs
    let mut limbs: Vec<u64> = vec![0];
    for &codeword in codewords {
        let mut carry = codeword as u64;
        for limb in limbs.iter_mut() {
            let v = *limb * 900 + carry;
            *limb = v % LIMB;
            carry = v / LIMB;
        }
        while carry > 0 {
            limbs.push(carry % LIMB);
            carry /= LIMB;
        }
    }

    let mut digits = String::with_capacity(limbs.len() * 9);
    let mut iter = limbs.iter().rev();
    if let Some(top) = iter.next() {
        digits.push_str(&top.to_string());
    }
    for limb in iter {
        digits.push_str(&format!("{limb:09}"));
    }

    match digits.strip_prefix('1') {
        Some(rest) => Ok(rest.to_string()),
        None => Err(DecodeError::Format("numeric group lacks leading 1")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Digits to codewords the way an encoder packs them
    fn encode_digits(digits: &str) -> Vec<u32> {
        let mut limbs: Vec<u32> = format!("1{digits}").bytes().map(|b| (b - b'0') as u32).collect();
        let mut out = Vec::new();
        while limbs.iter().any(|&d| d != 0) {
            let mut rem = 0u32;
            for d in limbs.iter_mut() {
                let v = rem * 10 + *d;
                *d = v / 900;
                rem = v % 900;
            }
            out.push(rem);
        }
        out.reverse();
        out
    }

    #[test]
    fn test_worked_example() {
        let codewords = [1, 624, 434, 632, 282, 200];
        assert_eq!(base900_to_base10(&codewords).unwrap(), "000213298174000");
        assert_eq!(encode_digits("000213298174000"), codewords);
    }

    #[test]
    fn test_missing_leading_one() {
        // 900^0 * 5 = "5"
        assert!(base900_to_base10(&[5]).is_err());
        assert!(base900_to_base10(&[0]).is_err());
    }

    #[test]
    fn test_decoder_groups() {
        let first = "1234567890".repeat(4) + "1234";
        let mut codewords = encode_digits(&first);
        assert_eq!(codewords.len(), MAX_NUMERIC_CODEWORDS);
        codewords.extend(encode_digits("77"));
        codewords.push(NUMERIC_COMPACTION_MODE_LATCH);
        codewords.extend(encode_digits("0042"));
        codewords.push(TEXT_COMPACTION_MODE_LATCH);

        let mut out = EciStringBuilder::new();
        let end = NumericDecoder::decode(&codewords, 0, codewords.len(), &mut out).unwrap();
        assert_eq!(end, codewords.len() - 1);
        assert_eq!(out.finish(), format!("{first}770042"));
    }

    proptest! {
        #[test]
        fn prop_digits_survive(digits in "[0-9]{1,44}") {
            let codewords = encode_digits(&digits);
            prop_assert!(codewords.len() <= MAX_NUMERIC_CODEWORDS);
            prop_assert_eq!(base900_to_base10(&codewords).unwrap(), digits);
        }
    }
}
