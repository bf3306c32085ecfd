use crate::error::{BloomError, Result};
use crate::hash::{HashKind, MAX_BIT_ARRAY_LEN, ReducedHash, reduced_hashes};
use bitvec::{bitvec, order::Msb0, vec::BitVec};

/// Bit storage, most significant bit first within each byte so that the
/// raw bytes are already in serialized order.
pub type BitArray = BitVec<u8, Msb0>;

/// Bit array plus the hash functions bound to its length.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    bits: BitArray,
    hashes: Vec<ReducedHash>,
}

impl FilterEngine {
    /// Zeroed engine of `len` bits using the first `hash_count` hash kinds.
    pub fn new(len: u64, hash_count: usize) -> Result<Self> {
        check_len(len)?;
        let hashes = reduced_hashes(hash_count, len)?;
        Ok(Self {
            bits: bitvec![u8, Msb0; 0; len as usize],
            hashes,
        })
    }

    /// Engine over existing bits. `bits` must not be empty.
    pub fn from_bits(bits: BitArray, hash_count: usize) -> Result<Self> {
        check_len(bits.len() as u64)?;
        let hashes = reduced_hashes(hash_count, bits.len() as u64)?;
        Ok(Self { bits, hashes })
    }

    pub fn size(&self) -> u64 {
        self.bits.len() as u64
    }

    pub fn hash_count(&self) -> usize {
        self.hashes.len()
    }

    pub fn hash_kinds(&self) -> impl Iterator<Item = HashKind> + '_ {
        self.hashes.iter().map(ReducedHash::kind)
    }

    pub fn bits(&self) -> &BitArray {
        &self.bits
    }

    pub fn insert(&mut self, item: &[u8]) {
        for hash in &self.hashes {
            let idx = hash.index(item) as usize;
            self.bits.set(idx, true);
        }
    }

    /// `false` means definitely absent; `true` means possibly present.
    pub fn may_contain(&self, item: &[u8]) -> bool {
        self.hashes
            .iter()
            .all(|hash| self.bits[hash.index(item) as usize])
    }

    /// Ascending indices of the set bits.
    pub fn set_indices(&self) -> Vec<u64> {
        self.bits.iter_ones().map(|idx| idx as u64).collect()
    }

    pub fn set_bit_count(&self) -> u64 {
        self.bits.count_ones() as u64
    }

    /// Share of bits set, in `[0, 1]`.
    pub fn fill_ratio(&self) -> f64 {
        if self.bits.is_empty() {
            return 0.0;
        }
        self.set_bit_count() as f64 / self.bits.len() as f64
    }

    /// Probability that an item never inserted hits only set bits.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        self.fill_ratio().powi(self.hashes.len() as i32)
    }

    /// ORs `other` into `self`. Both must have the same length.
    pub fn union_with(&mut self, other: &FilterEngine) -> Result<()> {
        if self.size() != other.size() {
            return Err(BloomError::LengthMismatch {
                left: self.size(),
                right: other.size(),
            });
        }
        for idx in other.bits.iter_ones() {
            self.bits.set(idx, true);
        }
        Ok(())
    }

    /// Zeroed engine with the same length and hash functions.
    pub(crate) fn empty_like(&self) -> Self {
        Self {
            bits: bitvec![u8, Msb0; 0; self.bits.len()],
            hashes: self.hashes.clone(),
        }
    }
}

fn check_len(len: u64) -> Result<()> {
    if len > MAX_BIT_ARRAY_LEN {
        return Err(BloomError::BitArrayTooLarge { bits: len });
    }
    Ok(())
}

impl PartialEq for FilterEngine {
    fn eq(&self, other: &Self) -> bool {
        self.bits.len() == other.bits.len()
            && self.bits.iter_ones().eq(other.bits.iter_ones())
    }
}

impl Eq for FilterEngine {}
