//! Environment-backed tuning knobs, each read once per process.

use std::sync::OnceLock;

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| !matches!(v.trim(), "" | "0" | "false"))
        .unwrap_or(false)
}

static AMBIGUOUS_ATTEMPTS: OnceLock<usize> = OnceLock::new();

/// Upper bound on ambiguous codeword combinations tried before giving up.
pub(crate) fn ambiguous_attempts() -> usize {
    *AMBIGUOUS_ATTEMPTS
        .get_or_init(|| parse_env_usize("PDF417_AMBIGUOUS_ATTEMPTS", 100).clamp(1, 10_000))
}

static CODEWORD_SKEW: OnceLock<usize> = OnceLock::new();

/// Pixel tolerance for codeword start drift and width mismatch.
pub(crate) fn codeword_skew() -> usize {
    *CODEWORD_SKEW.get_or_init(|| parse_env_usize("PDF417_CODEWORD_SKEW", 2).clamp(0, 16))
}

static MAX_EXTRA_ERASURES: OnceLock<usize> = OnceLock::new();

/// Erasures allowed on top of half the error correction codewords.
pub(crate) fn max_extra_erasures() -> usize {
    *MAX_EXTRA_ERASURES
        .get_or_init(|| parse_env_usize("PDF417_MAX_EXTRA_ERASURES", 3).clamp(0, 64))
}

static DEBUG_DUMPS: OnceLock<bool> = OnceLock::new();

/// Emit trace-level dumps of the vote matrix.
pub(crate) fn debug_dumps() -> bool {
    *DEBUG_DUMPS.get_or_init(|| env_flag("PDF417_DEBUG"))
}
