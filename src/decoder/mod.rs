//! PDF417 decoding modules
//!
//! This module contains all the logic for decoding a PDF417 symbol once its
//! corners are known:
//! - Codeword detection (pixel runs, pattern table lookup)
//! - Row indicator voting and the detection matrix
//! - Error correction (Reed-Solomon over GF(929))
//! - Compaction mode decoding (text, byte, numeric, Macro PDF417)

/// Compaction-mode state machine over the corrected codewords
pub mod bitstream;
/// Run-length to symbol pattern matching
pub mod codeword_decoder;
pub mod config;
/// Row indicator, column and vote bookkeeping
pub mod detection;
/// Decode failures and their classification
pub mod error;
/// Data mode decoders (text, byte, numeric) and ECI handling
pub mod modes;
/// Reed-Solomon error correction over GF(929)
pub mod reed_solomon;
/// Orchestrates a scan from corners to decoded text
pub mod scanning;
/// PDF417 constants and the codeword pattern table
pub mod tables;

pub use error::{DecodeError, FailureKind};
pub use scanning::ScanningDecoder;
