//! PDF417 compaction mode decoders
//!
//! This module contains decoders for the compaction modes:
//! - Text: two characters per codeword across four sub-modes
//! - Byte: six bytes per five codewords, or one byte per codeword
//! - Numeric: base-900 groups of up to 15 codewords
//! - ECI: character set switching for the decoded output

pub mod byte;
pub mod eci;
pub mod numeric;
pub mod text;

pub(crate) const TEXT_COMPACTION_MODE_LATCH: u32 = 900;
pub(crate) const BYTE_COMPACTION_MODE_LATCH: u32 = 901;
pub(crate) const NUMERIC_COMPACTION_MODE_LATCH: u32 = 902;
pub(crate) const MODE_SHIFT_TO_BYTE_COMPACTION_MODE: u32 = 913;
pub(crate) const MACRO_PDF417_TERMINATOR: u32 = 922;
pub(crate) const BEGIN_MACRO_PDF417_OPTIONAL_FIELD: u32 = 923;
pub(crate) const BYTE_COMPACTION_MODE_LATCH_6: u32 = 924;
pub(crate) const ECI_USER_DEFINED: u32 = 925;
pub(crate) const ECI_GENERAL_PURPOSE: u32 = 926;
pub(crate) const ECI_CHARSET: u32 = 927;
pub(crate) const BEGIN_MACRO_PDF417_CONTROL_BLOCK: u32 = 928;
