use crate::error::{BloomError, Result};
use fnv::FnvHasher;
use std::hash::Hasher;

pub const FNV_PRIME: u64 = 1_099_511_628_211;
pub const FNV_OFFSET_BASIS: u64 = 14_695_981_039_346_656_037;

/// Largest bit array length the 8-digit length field can describe.
pub const MAX_BIT_ARRAY_LEN: u64 = 99_999_999;

/// FNV-1: multiply by the prime, then fold the byte in.
pub fn fnv1_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        hash.wrapping_mul(FNV_PRIME) ^ u64::from(byte)
    })
}

/// FNV-1a: fold the byte in, then multiply. `FnvHasher` implements
/// exactly this variant with the same constants.
pub fn fnv1a_64(data: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(data);
    hasher.finish()
}

/// The dispersion algorithms a filter can be built with.
///
/// Position in a filter's hash list is significant: the serialized hash
/// count `k` means "the first `k` kinds of [`HashKind::ALL`]".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    Fnv1,
    Fnv1a,
}

impl HashKind {
    pub const ALL: [HashKind; 2] = [HashKind::Fnv1, HashKind::Fnv1a];

    pub fn raw(self, data: &[u8]) -> u64 {
        match self {
            HashKind::Fnv1 => fnv1_64(data),
            HashKind::Fnv1a => fnv1a_64(data),
        }
    }
}

/// A hash function bound to a bit array length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReducedHash {
    kind: HashKind,
    modulus: u64,
}

impl ReducedHash {
    pub fn new(kind: HashKind, modulus: u64) -> Result<Self> {
        if modulus == 0 {
            return Err(BloomError::ZeroModulus);
        }
        Ok(Self { kind, modulus })
    }

    pub fn kind(&self) -> HashKind {
        self.kind
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Index into `[0, modulus)`.
    #[inline]
    pub fn index(&self, data: &[u8]) -> u64 {
        self.kind.raw(data) % self.modulus
    }
}

/// Binds the first `count` hash kinds to a bit array of length `modulus`.
pub fn reduced_hashes(count: usize, modulus: u64) -> Result<Vec<ReducedHash>> {
    if count == 0 || count > HashKind::ALL.len() {
        return Err(BloomError::InvalidConfig(format!(
            "Hash function count must be between 1 and {}, got {count}",
            HashKind::ALL.len()
        )));
    }
    HashKind::ALL[..count]
        .iter()
        .map(|&kind| ReducedHash::new(kind, modulus))
        .collect()
}

/// Bit array length for `expected_items` at the given false positive rate.
///
/// `m = floor(n * ln(1 / fpr) / ln(2)^2)`
pub fn optimal_bit_array_len(expected_items: u64, fpr: f64) -> u64 {
    let ln2 = std::f64::consts::LN_2;
    ((expected_items as f64) * (-fpr.ln()) / (ln2 * ln2)).floor() as u64
}
