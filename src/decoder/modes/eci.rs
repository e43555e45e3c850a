use crate::decoder::error::DecodeError;
use encoding_rs::Encoding;

/// Character set selected by an ECI designator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterSet {
    /// ISO-8859-1, every byte maps to the code point of the same value
    Latin1,
    /// Any other supported set
    Encoded(&'static Encoding),
}

impl CharacterSet {
    /// Character set for an ECI designator, if supported
    pub fn from_eci(value: u32) -> Option<Self> {
        use encoding_rs::*;
        let encoding: &'static Encoding = match value {
            1 | 3 | 27 | 170 => return Some(CharacterSet::Latin1),
            4 => ISO_8859_2,
            5 => ISO_8859_3,
            6 => ISO_8859_4,
            7 => ISO_8859_5,
            8 => ISO_8859_6,
            9 => ISO_8859_7,
            10 => ISO_8859_8,
            11 => WINDOWS_1254,
            12 => ISO_8859_10,
            13 => WINDOWS_874,
            15 => ISO_8859_13,
            16 => ISO_8859_14,
            17 => ISO_8859_15,
            18 => ISO_8859_16,
            20 => SHIFT_JIS,
            21 => WINDOWS_1250,
            22 => WINDOWS_1251,
            23 => WINDOWS_1252,
            24 => WINDOWS_1256,
            25 => UTF_16BE,
            26 => UTF_8,
            28 => BIG5,
            29 => GB18030,
            30 => EUC_KR,
            _ => return None,
        };
        Some(CharacterSet::Encoded(encoding))
    }

    fn decode_into(&self, bytes: &[u8], out: &mut String) {
        match self {
            CharacterSet::Latin1 => out.extend(bytes.iter().map(|&b| b as char)),
            CharacterSet::Encoded(encoding) => {
                let (text, _had_errors) = encoding.decode_without_bom_handling(bytes);
                out.push_str(&text);
            }
        }
    }
}

/// Output accumulator that decodes pending bytes with the character set in
/// force when they were written.
#[derive(Debug, Clone)]
pub struct EciStringBuilder {
    result: String,
    pending: Vec<u8>,
    charset: CharacterSet,
}

impl Default for EciStringBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EciStringBuilder {
    pub fn new() -> Self {
        Self {
            result: String::new(),
            pending: Vec::new(),
            charset: CharacterSet::Latin1,
        }
    }

    pub fn append_byte(&mut self, byte: u8) {
        self.pending.push(byte);
    }

    /// Append a text-compaction character (always ASCII)
    pub fn append_char(&mut self, ch: char) {
        self.pending.push(ch as u8);
    }

    /// Append already-decoded text such as numeric digits
    pub fn append_str(&mut self, text: &str) {
        self.flush();
        self.result.push_str(text);
    }

    /// Switch the character set for bytes that follow
    pub fn append_eci(&mut self, value: u32) -> Result<(), DecodeError> {
        let charset = CharacterSet::from_eci(value).ok_or(DecodeError::UnsupportedEci(value))?;
        self.flush();
        self.charset = charset;
        Ok(())
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.charset.decode_into(&self.pending, &mut self.result);
            self.pending.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_empty() && self.pending.is_empty()
    }

    pub fn finish(mut self) -> String {
        self.flush();
        self.result
    }
}
