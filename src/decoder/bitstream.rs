//! Top-level compaction mode state machine over corrected data codewords.
//!
//! `codewords[0]` is the symbol length descriptor; it counts itself and
//! every data codeword, so it doubles as the end of the stream.

use crate::decoder::error::DecodeError;
use crate::decoder::modes::byte::ByteDecoder;
use crate::decoder::modes::eci::EciStringBuilder;
use crate::decoder::modes::numeric::{NumericDecoder, base900_to_base10};
use crate::decoder::modes::text::TextDecoder;
use crate::decoder::modes::{
    BEGIN_MACRO_PDF417_CONTROL_BLOCK, BEGIN_MACRO_PDF417_OPTIONAL_FIELD,
    BYTE_COMPACTION_MODE_LATCH, BYTE_COMPACTION_MODE_LATCH_6, ECI_CHARSET, ECI_GENERAL_PURPOSE,
    ECI_USER_DEFINED, MACRO_PDF417_TERMINATOR, MODE_SHIFT_TO_BYTE_COMPACTION_MODE,
    NUMERIC_COMPACTION_MODE_LATCH, TEXT_COMPACTION_MODE_LATCH,
};
use crate::models::MacroMetadata;

const SEGMENT_INDEX_CODEWORDS: usize = 2;

const FIELD_FILE_NAME: u32 = 0;
const FIELD_SEGMENT_COUNT: u32 = 1;
const FIELD_TIMESTAMP: u32 = 2;
const FIELD_SENDER: u32 = 3;
const FIELD_ADDRESSEE: u32 = 4;
const FIELD_FILE_SIZE: u32 = 5;
const FIELD_CHECKSUM: u32 = 6;

/// Payload recovered from a codeword stream
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedStream {
    /// Decoded payload text
    pub text: String,
    /// Macro PDF417 control block, when present
    pub macro_metadata: Option<MacroMetadata>,
}

/// Compaction mode state machine over corrected data codewords
pub struct BitstreamParser;

impl BitstreamParser {
    /// Decode data codewords (length descriptor first, no EC codewords)
    pub fn decode(codewords: &[u32]) -> Result<DecodedStream, DecodeError> {
        let limit = codewords
            .first()
            .map(|&n| (n as usize).min(codewords.len()))
            .ok_or(DecodeError::Format("empty codeword stream"))?;

        let mut out = EciStringBuilder::new();
        let mut macro_metadata = None;

        // streams open in text mode
        let mut code_index = TextDecoder::decode(codewords, 1, limit, &mut out)?;
        while code_index < limit {
            let code = codewords[code_index];
            code_index += 1;
            code_index = match code {
                TEXT_COMPACTION_MODE_LATCH => {
                    TextDecoder::decode(codewords, code_index, limit, &mut out)?
                }
                BYTE_COMPACTION_MODE_LATCH | BYTE_COMPACTION_MODE_LATCH_6 => {
                    ByteDecoder::decode(code, codewords, code_index, limit, &mut out)?
                }
                MODE_SHIFT_TO_BYTE_COMPACTION_MODE => {
                    let byte = Self::codeword_at(codewords, code_index, limit)?;
                    out.append_byte(byte as u8);
                    code_index + 1
                }
                NUMERIC_COMPACTION_MODE_LATCH => {
                    NumericDecoder::decode(codewords, code_index, limit, &mut out)?
                }
                ECI_CHARSET => {
                    out.append_eci(Self::codeword_at(codewords, code_index, limit)?)?;
                    code_index + 1
                }
                ECI_GENERAL_PURPOSE => code_index + 2,
                ECI_USER_DEFINED => code_index + 1,
                BEGIN_MACRO_PDF417_CONTROL_BLOCK => {
                    let mut metadata = MacroMetadata::default();
                    let next = Self::decode_macro_block(codewords, code_index, limit, &mut metadata)?;
                    macro_metadata = Some(metadata);
                    next
                }
                BEGIN_MACRO_PDF417_OPTIONAL_FIELD | MACRO_PDF417_TERMINATOR => {
                    return Err(DecodeError::Format("macro field outside a control block"));
                }
                _ => TextDecoder::decode(codewords, code_index - 1, limit, &mut out)?,
            };
        }

        let has_file_id = macro_metadata.as_ref().is_some_and(|m: &MacroMetadata| !m.file_id.is_empty());
        if out.is_empty() && !has_file_id {
            return Err(DecodeError::Format("stream carries no data"));
        }

        Ok(DecodedStream {
            text: out.finish(),
            macro_metadata,
        })
    }

    fn codeword_at(codewords: &[u32], index: usize, limit: usize) -> Result<u32, DecodeError> {
        if index < limit {
            Ok(codewords[index])
        } else {
            Err(DecodeError::Format("stream ends inside an escape"))
        }
    }

    /// Parse a macro control block starting after the 928 codeword. The
    /// block runs to the end of the stream.
    fn decode_macro_block(
        codewords: &[u32],
        mut code_index: usize,
        limit: usize,
        metadata: &mut MacroMetadata,
    ) -> Result<usize, DecodeError> {
        if code_index + SEGMENT_INDEX_CODEWORDS > limit {
            return Err(DecodeError::Format("truncated macro segment index"));
        }
        let segment = base900_to_base10(&codewords[code_index..code_index + SEGMENT_INDEX_CODEWORDS])?;
        metadata.segment_index = parse_number(&segment)?;
        code_index += SEGMENT_INDEX_CODEWORDS;

        let mut file_id = EciStringBuilder::new();
        code_index = TextDecoder::decode(codewords, code_index, limit, &mut file_id)?;
        metadata.file_id = file_id.finish();

        let optional_start =
            (code_index < limit && codewords[code_index] == BEGIN_MACRO_PDF417_OPTIONAL_FIELD)
                .then_some(code_index + 1);

        while code_index < limit {
            match codewords[code_index] {
                BEGIN_MACRO_PDF417_OPTIONAL_FIELD => {
                    let field = Self::codeword_at(codewords, code_index + 1, limit)?;
                    code_index = Self::decode_optional_field(field, codewords, code_index + 2, limit, metadata)?;
                }
                MACRO_PDF417_TERMINATOR => {
                    code_index += 1;
                    metadata.is_last_segment = true;
                }
                _ => return Err(DecodeError::Format("unexpected codeword in macro block")),
            }
        }

        if let Some(start) = optional_start {
            let mut end = code_index;
            if metadata.is_last_segment {
                end -= 1;
            }
            if end > start {
                metadata.optional_data = Some(codewords[start..end].to_vec());
            }
        }
        Ok(code_index)
    }

    fn decode_optional_field(
        field: u32,
        codewords: &[u32],
        code_index: usize,
        limit: usize,
        metadata: &mut MacroMetadata,
    ) -> Result<usize, DecodeError> {
        let mut value = EciStringBuilder::new();
        let next = match field {
            FIELD_FILE_NAME | FIELD_SENDER | FIELD_ADDRESSEE => {
                TextDecoder::decode(codewords, code_index, limit, &mut value)?
            }
            FIELD_SEGMENT_COUNT | FIELD_TIMESTAMP | FIELD_FILE_SIZE | FIELD_CHECKSUM => {
                NumericDecoder::decode(codewords, code_index, limit, &mut value)?
            }
            _ => return Err(DecodeError::Format("unknown macro optional field")),
        };
        let value = value.finish();
        match field {
            FIELD_FILE_NAME => metadata.file_name = Some(value),
            FIELD_SENDER => metadata.sender = Some(value),
            FIELD_ADDRESSEE => metadata.addressee = Some(value),
            FIELD_SEGMENT_COUNT => metadata.segment_count = Some(parse_number(&value)?),
            FIELD_TIMESTAMP => metadata.timestamp = Some(parse_number(&value)?),
            FIELD_FILE_SIZE => metadata.file_size = Some(parse_number(&value)?),
            _ => metadata.checksum = Some(parse_number(&value)?),
        }
        Ok(next)
    }
}

fn parse_number<T: std::str::FromStr + Default>(digits: &str) -> Result<T, DecodeError> {
    if digits.is_empty() {
        return Ok(T::default());
    }
    digits
        .parse()
        .map_err(|_| DecodeError::Format("macro number out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Text compaction of upper-case letters and spaces, padded with PS
    fn upper(text: &str) -> Vec<u32> {
        let values: Vec<u32> = text
            .bytes()
            .map(|b| if b == b' ' { 26 } else { (b - b'A') as u32 })
            .collect();
        values
            .chunks(2)
            .map(|p| p[0] * 30 + p.get(1).copied().unwrap_or(29))
            .collect()
    }

    fn stream(body: &[u32]) -> Vec<u32> {
        let mut codewords = vec![body.len() as u32 + 1];
        codewords.extend_from_slice(body);
        codewords
    }

    #[test]
    fn test_text_then_numeric() {
        let mut body = upper("AB");
        body.push(NUMERIC_COMPACTION_MODE_LATCH);
        body.extend([1, 624, 434, 632, 282, 200]);
        let decoded = BitstreamParser::decode(&stream(&body)).unwrap();
        assert_eq!(decoded.text, "AB000213298174000");
        assert!(decoded.macro_metadata.is_none());
    }

    #[test]
    fn test_ignores_trailing_padding_past_descriptor() {
        let mut codewords = stream(&upper("OK"));
        codewords.extend([900, 900, 900]);
        assert_eq!(BitstreamParser::decode(&codewords).unwrap().text, "OK");
    }

    #[test]
    fn test_top_level_shift_and_eci_skips() {
        let mut body = upper("A");
        body.extend([913, b'z' as u32, ECI_GENERAL_PURPOSE, 1, 2, ECI_USER_DEFINED, 7]);
        body.push(TEXT_COMPACTION_MODE_LATCH);
        body.extend(upper("B"));
        assert_eq!(BitstreamParser::decode(&stream(&body)).unwrap().text, "AzB");
    }

    #[test]
    fn test_macro_fields_outside_block() {
        let mut body = upper("A");
        body.push(MACRO_PDF417_TERMINATOR);
        assert_eq!(
            BitstreamParser::decode(&stream(&body)),
            Err(DecodeError::Format("macro field outside a control block"))
        );
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(BitstreamParser::decode(&stream(&[900, 900])).is_err());
    }

    #[test]
    fn test_macro_block() {
        let mut body = upper("HELLO");
        // segment index 2 -> "100002" = 111 * 900 + 102
        body.extend([BEGIN_MACRO_PDF417_CONTROL_BLOCK, 111, 102]);
        body.extend(upper("ID"));
        // file name "F", segment count 3 ("13")
        body.extend([BEGIN_MACRO_PDF417_OPTIONAL_FIELD, FIELD_FILE_NAME]);
        body.extend(upper("F"));
        body.extend([BEGIN_MACRO_PDF417_OPTIONAL_FIELD, FIELD_SEGMENT_COUNT, 13]);
        body.push(MACRO_PDF417_TERMINATOR);

        let decoded = BitstreamParser::decode(&stream(&body)).unwrap();
        assert_eq!(decoded.text, "HELLO");
        let metadata = decoded.macro_metadata.unwrap();
        assert_eq!(metadata.segment_index, 2);
        assert_eq!(metadata.file_id, "ID");
        assert_eq!(metadata.file_name.as_deref(), Some("F"));
        assert_eq!(metadata.segment_count, Some(3));
        assert!(metadata.is_last_segment);
        assert_eq!(
            metadata.optional_data,
            Some(vec![FIELD_FILE_NAME, 5 * 30 + 29, 923, FIELD_SEGMENT_COUNT, 13])
        );
    }

    #[test]
    fn test_macro_only_symbol() {
        let mut body = vec![BEGIN_MACRO_PDF417_CONTROL_BLOCK, 111, 100];
        body.extend(upper("XY"));
        let decoded = BitstreamParser::decode(&stream(&body)).unwrap();
        assert_eq!(decoded.text, "");
        let metadata = decoded.macro_metadata.unwrap();
        assert_eq!(metadata.segment_index, 0);
        assert_eq!(metadata.file_id, "XY");
        assert!(!metadata.is_last_segment);
        assert!(metadata.optional_data.is_none());
    }

    #[test]
    fn test_unknown_optional_field() {
        let mut body = upper("A");
        body.extend([BEGIN_MACRO_PDF417_CONTROL_BLOCK, 111, 100]);
        body.extend(upper("ID"));
        body.extend([BEGIN_MACRO_PDF417_OPTIONAL_FIELD, 9, 1]);
        assert!(BitstreamParser::decode(&stream(&body)).is_err());
    }
}
