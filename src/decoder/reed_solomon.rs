/// Reed-Solomon error correction for PDF417
/// PDF417 uses RS over the prime field GF(929) with generator 3
use super::error::DecodeError;
use std::sync::OnceLock;

/// Field size
pub const MODULUS: u32 = 929;
const GENERATOR: u32 = 3;

struct FieldTables {
    exp: Vec<u32>,
    log: Vec<u32>,
}

static FIELD: OnceLock<FieldTables> = OnceLock::new();

fn field() -> &'static FieldTables {
    FIELD.get_or_init(|| {
        let mut exp = vec![0u32; MODULUS as usize];
        let mut log = vec![0u32; MODULUS as usize];
        let mut x = 1u32;
        for (i, slot) in exp.iter_mut().enumerate() {
            *slot = x;
            x = (x * GENERATOR) % MODULUS;
            if i < MODULUS as usize - 1 {
                log[*slot as usize] = i as u32;
            }
        }
        FieldTables { exp, log }
    })
}

/// GF(929) field operations using log/exp tables
pub struct Gf929;

impl Gf929 {
    pub fn add(a: u32, b: u32) -> u32 {
        (a + b) % MODULUS
    }

    pub fn sub(a: u32, b: u32) -> u32 {
        (MODULUS + a - b) % MODULUS
    }

    pub fn mul(a: u32, b: u32) -> u32 {
        if a == 0 || b == 0 {
            return 0;
        }
        let t = field();
        t.exp[((t.log[a as usize] + t.log[b as usize]) % (MODULUS - 1)) as usize]
    }

    /// Multiplicative inverse; zero has none
    pub fn inverse(a: u32) -> Option<u32> {
        if a == 0 {
            return None;
        }
        let t = field();
        Some(t.exp[((MODULUS - 1 - t.log[a as usize]) % (MODULUS - 1)) as usize])
    }

    /// Generator raised to `n`
    pub fn exp(n: usize) -> u32 {
        field().exp[n % (MODULUS as usize - 1)]
    }

    pub fn negate(a: u32) -> u32 {
        (MODULUS - a % MODULUS) % MODULUS
    }
}

/// Polynomials are coefficient vectors, lowest degree first.
mod poly {
    use super::Gf929;

    pub fn trim(mut p: Vec<u32>) -> Vec<u32> {
        while p.len() > 1 && p.last() == Some(&0) {
            p.pop();
        }
        if p.is_empty() {
            p.push(0);
        }
        p
    }

    pub fn degree(p: &[u32]) -> usize {
        p.iter().rposition(|&c| c != 0).unwrap_or(0)
    }

    pub fn is_zero(p: &[u32]) -> bool {
        p.iter().all(|&c| c == 0)
    }

    pub fn eval(p: &[u32], x: u32) -> u32 {
        p.iter()
            .rev()
            .fold(0, |acc, &c| Gf929::add(Gf929::mul(acc, x), c))
    }

    pub fn mul(a: &[u32], b: &[u32]) -> Vec<u32> {
        let mut out = vec![0u32; a.len() + b.len() - 1];
        for (i, &x) in a.iter().enumerate() {
            if x == 0 {
                continue;
            }
            for (j, &y) in b.iter().enumerate() {
                out[i + j] = Gf929::add(out[i + j], Gf929::mul(x, y));
            }
        }
        trim(out)
    }

    pub fn sub(a: &[u32], b: &[u32]) -> Vec<u32> {
        let mut out = vec![0u32; a.len().max(b.len())];
        for (i, slot) in out.iter_mut().enumerate() {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            *slot = Gf929::sub(x, y);
        }
        trim(out)
    }

    pub fn scale(p: &[u32], factor: u32) -> Vec<u32> {
        trim(p.iter().map(|&c| Gf929::mul(c, factor)).collect())
    }

    pub fn truncate(p: &[u32], len: usize) -> Vec<u32> {
        trim(p.iter().take(len).copied().collect())
    }

    /// Quotient and remainder of `a / b`; `b` must be non-zero
    pub fn div_rem(a: &[u32], b: &[u32]) -> Option<(Vec<u32>, Vec<u32>)> {
        let db = degree(b);
        let lead_inv = Gf929::inverse(b[db])?;
        let mut rem = trim(a.to_vec());
        if is_zero(&rem) || degree(&rem) < db {
            return Some((vec![0], rem));
        }
        let mut quot = vec![0u32; degree(&rem) - db + 1];
        while !is_zero(&rem) && degree(&rem) >= db {
            let dr = degree(&rem);
            let coef = Gf929::mul(rem[dr], lead_inv);
            let shift = dr - db;
            quot[shift] = coef;
            for (i, &c) in b.iter().enumerate().take(db + 1) {
                rem[i + shift] = Gf929::sub(rem[i + shift], Gf929::mul(c, coef));
            }
            rem = trim(rem);
        }
        Some((trim(quot), rem))
    }

    pub fn derivative(p: &[u32]) -> Vec<u32> {
        if p.len() <= 1 {
            return vec![0];
        }
        trim(
            p.iter()
                .enumerate()
                .skip(1)
                .map(|(i, &c)| Gf929::mul(c, i as u32 % super::MODULUS))
                .collect(),
        )
    }
}

/// Corrects a received codeword block in place.
///
/// `erasures` lists positions known to be unreadable. Returns the number of
/// corrected positions that were not erasures.
pub trait ErrorCorrector {
    fn correct(
        &self,
        received: &mut [u32],
        num_ec_codewords: usize,
        erasures: &[usize],
    ) -> Result<usize, DecodeError>;
}

/// Reed-Solomon decoder for PDF417 with erasure support
#[derive(Debug, Clone, Copy, Default)]
pub struct ReedSolomonDecoder;

impl ReedSolomonDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Syndromes `S_j = r(3^j)` for `j = 1..=num_ec`, position `i` carrying `x^(n-1-i)`
    fn syndromes(received: &[u32], num_ec: usize) -> Vec<u32> {
        let mut r: Vec<u32> = received.to_vec();
        r.reverse();
        (1..=num_ec).map(|j| poly::eval(&r, Gf929::exp(j))).collect()
    }

    fn locator(n: usize, position: usize) -> u32 {
        Gf929::exp(n - 1 - position)
    }
}

impl ErrorCorrector for ReedSolomonDecoder {
    fn correct(
        &self,
        received: &mut [u32],
        num_ec_codewords: usize,
        erasures: &[usize],
    ) -> Result<usize, DecodeError> {
        let n = received.len();
        let k = num_ec_codewords;
        if k == 0 || n <= k || n > MODULUS as usize - 1 {
            return Err(DecodeError::Checksum("block length out of range"));
        }
        if received.iter().any(|&c| c >= MODULUS) {
            return Err(DecodeError::Checksum("codeword outside the field"));
        }

        let syndrome = Self::syndromes(received, k);
        if syndrome.iter().all(|&s| s == 0) {
            return Ok(0);
        }

        let mut erased: Vec<usize> = erasures.to_vec();
        erased.sort_unstable();
        erased.dedup();
        if erased.iter().any(|&e| e >= n) {
            return Err(DecodeError::Checksum("erasure outside the block"));
        }
        let rho = erased.len();
        if rho > k {
            return Err(DecodeError::Checksum("more erasures than check codewords"));
        }

        // Gamma(x) = prod (1 - X_e x)
        let mut gamma = vec![1u32];
        for &e in &erased {
            gamma = poly::mul(&gamma, &[1, Gf929::negate(Self::locator(n, e))]);
        }

        // Key equation with erasures folded into the syndromes
        let xi = poly::truncate(&poly::mul(&gamma, &syndrome), k);
        let mut r_prev = vec![0u32; k + 1];
        r_prev[k] = 1;
        let mut r_cur = xi;
        let mut t_prev = vec![0u32];
        let mut t_cur = vec![1u32];
        while !poly::is_zero(&r_cur) && 2 * poly::degree(&r_cur) >= k + rho {
            let (q, rem) = poly::div_rem(&r_prev, &r_cur)
                .ok_or(DecodeError::Checksum("euclidean division failed"))?;
            let t_next = poly::sub(&t_prev, &poly::mul(&q, &t_cur));
            r_prev = std::mem::replace(&mut r_cur, rem);
            t_prev = std::mem::replace(&mut t_cur, t_next);
        }
        let t0_inv =
            Gf929::inverse(t_cur[0]).ok_or(DecodeError::Checksum("error locator has no constant term"))?;
        let lambda = poly::scale(&t_cur, t0_inv);
        if 2 * poly::degree(&lambda) + rho > k {
            return Err(DecodeError::Checksum("too many errors"));
        }

        let psi = poly::mul(&lambda, &gamma);
        let omega = poly::truncate(&poly::mul(&psi, &syndrome), k);
        let psi_prime = poly::derivative(&psi);

        // Chien search over the block positions
        let mut positions = Vec::new();
        for i in 0..n {
            let x_inv = Gf929::inverse(Self::locator(n, i))
                .ok_or(DecodeError::Checksum("zero locator"))?;
            if poly::eval(&psi, x_inv) == 0 {
                positions.push((i, x_inv));
            }
        }
        if positions.len() != poly::degree(&psi) {
            return Err(DecodeError::Checksum("error locator roots do not match its degree"));
        }

        // Forney: e = -Omega(X^-1) / Psi'(X^-1)
        for &(pos, x_inv) in &positions {
            let denom = poly::eval(&psi_prime, x_inv);
            let denom_inv =
                Gf929::inverse(denom).ok_or(DecodeError::Checksum("locator derivative is zero"))?;
            let magnitude = Gf929::negate(Gf929::mul(poly::eval(&omega, x_inv), denom_inv));
            received[pos] = Gf929::sub(received[pos], magnitude);
        }

        if Self::syndromes(received, k).iter().any(|&s| s != 0) {
            return Err(DecodeError::Checksum("uncorrectable error"));
        }

        Ok(positions
            .iter()
            .filter(|(pos, _)| erased.binary_search(pos).is_err())
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// RS encoder for testing: data followed by `num_ec` check codewords.
    /// Generator polynomial has roots 3^1 .. 3^num_ec.
    fn rs_encode(data: &[u32], num_ec: usize) -> Vec<u32> {
        let mut generator = vec![1u32];
        for i in 1..=num_ec {
            generator = poly::mul(&generator, &[Gf929::negate(Gf929::exp(i)), 1]);
        }
        // data(x) * x^num_ec, position 0 is the highest power
        let mut shifted = vec![0u32; num_ec];
        shifted.extend(data.iter().rev());
        let (_, rem) = poly::div_rem(&shifted, &generator).unwrap();
        let mut codeword = data.to_vec();
        for i in (0..num_ec).rev() {
            codeword.push(Gf929::negate(rem.get(i).copied().unwrap_or(0)));
        }
        codeword
    }

    #[test]
    fn test_gf929_basic() {
        assert_eq!(Gf929::mul(0, 5), 0);
        assert_eq!(Gf929::mul(928, 928), 1);
        assert_eq!(Gf929::add(928, 2), 1);
        assert_eq!(Gf929::sub(1, 2), 928);
        for a in [1u32, 2, 3, 400, 928] {
            assert_eq!(Gf929::mul(a, Gf929::inverse(a).unwrap()), 1);
        }
        assert_eq!(Gf929::inverse(0), None);
        assert_eq!(Gf929::exp(0), 1);
        assert_eq!(Gf929::exp(928), 1);
        assert_eq!(Gf929::exp(1), 3);
    }

    #[test]
    fn test_encoded_block_has_zero_syndromes() {
        let block = rs_encode(&[5, 453, 178, 121, 239], 8);
        assert!(ReedSolomonDecoder::syndromes(&block, 8).iter().all(|&s| s == 0));
    }

    #[test]
    fn test_no_errors() {
        let mut block = rs_encode(&[4, 815, 514], 4);
        let expected = block.clone();
        assert_eq!(ReedSolomonDecoder.correct(&mut block, 4, &[]), Ok(0));
        assert_eq!(block, expected);
    }

    #[test]
    fn test_correct_errors() {
        let data = [12, 900, 1, 2, 3, 4, 5, 6, 7, 8];
        let mut block = rs_encode(&data, 8);
        let expected = block.clone();
        block[0] = 17;
        block[6] = (block[6] + 400) % 929;
        block[15] = 0;
        block[17] = 928 - block[17];
        assert_eq!(ReedSolomonDecoder.correct(&mut block, 8, &[]), Ok(4));
        assert_eq!(block, expected);
    }

    #[test]
    fn test_errors_and_erasures() {
        let data: Vec<u32> = (0..20).map(|i| (i * 37 + 11) % 929).collect();
        let mut block = rs_encode(&data, 16);
        let expected = block.clone();
        for &e in &[1usize, 4, 9, 22, 30] {
            block[e] = 0;
        }
        block[2] = 55;
        block[33] = 1;
        let fixed = ReedSolomonDecoder.correct(&mut block, 16, &[1, 4, 9, 22, 30]);
        assert_eq!(fixed, Ok(2));
        assert_eq!(block, expected);
    }

    #[test]
    fn test_full_erasure_capacity() {
        let mut block = rs_encode(&[9, 8, 7, 6], 8);
        let expected = block.clone();
        let erasures: Vec<usize> = (0..8).collect();
        for &e in &erasures {
            block[e] = 0;
        }
        assert_eq!(ReedSolomonDecoder.correct(&mut block, 8, &erasures), Ok(0));
        assert_eq!(block, expected);
    }

    #[test]
    fn test_beyond_capacity_fails() {
        let mut block = rs_encode(&[9, 8, 7, 6], 2);
        block[0] = 100;
        block[1] = 200;
        assert!(ReedSolomonDecoder.correct(&mut block, 2, &[]).is_err());
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let mut block = vec![1, 2];
        assert!(ReedSolomonDecoder.correct(&mut block, 2, &[]).is_err());
        let mut block = rs_encode(&[1, 2, 3], 2);
        block[0] = 4;
        assert_eq!(
            ReedSolomonDecoder.correct(&mut block, 2, &[7]),
            Err(DecodeError::Checksum("erasure outside the block"))
        );
    }

    proptest! {
        #[test]
        fn prop_erasures_within_capacity_recover(
            data in proptest::collection::vec(0u32..929, 3..40),
            level in 1u32..5,
            seed in any::<u64>(),
        ) {
            let num_ec = 1usize << (level + 1);
            let block = rs_encode(&data, num_ec);
            let mut damaged = block.clone();
            let mut erasures = Vec::new();
            let mut state = seed;
            while erasures.len() < num_ec / 2 {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let pos = (state >> 33) as usize % block.len();
                if !erasures.contains(&pos) {
                    erasures.push(pos);
                    damaged[pos] = (damaged[pos] + 1 + (state as u32 % 928)) % 929;
                }
            }
            prop_assert_eq!(ReedSolomonDecoder.correct(&mut damaged, num_ec, &erasures), Ok(0));
            prop_assert_eq!(damaged, block);
        }
    }
}
