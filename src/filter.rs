use crate::codec;
use crate::engine::{BitArray, FilterEngine};
use crate::error::Result;
use crate::hash::HashKind;
use serde::Serialize;
use std::fmt;
use std::io::{Read, Write};

/// Read phase of a filter, produced by
/// [`FilterBuilder::finalize`](crate::FilterBuilder::finalize) or decoded
/// from bytes. No operation mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    engine: FilterEngine,
}

/// Summary numbers for a filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterStats {
    pub size_bits: u64,
    pub encoded_bytes: usize,
    pub hash_functions: usize,
    pub set_bits: u64,
    pub fill_ratio: f64,
    pub estimated_fpr: f64,
}

impl BloomFilter {
    pub(crate) fn from_engine(engine: FilterEngine) -> Self {
        Self { engine }
    }

    pub fn size(&self) -> u64 {
        self.engine.size()
    }

    pub fn may_contain(&self, item: &[u8]) -> bool {
        self.engine.may_contain(item)
    }

    pub fn set_indices(&self) -> Vec<u64> {
        self.engine.set_indices()
    }

    pub fn hash_count(&self) -> usize {
        self.engine.hash_count()
    }

    pub fn hash_kinds(&self) -> Vec<HashKind> {
        self.engine.hash_kinds().collect()
    }

    pub fn bits(&self) -> &BitArray {
        self.engine.bits()
    }

    pub fn stats(&self) -> FilterStats {
        FilterStats {
            size_bits: self.size(),
            encoded_bytes: codec::encoded_len(self.size()),
            hash_functions: self.hash_count(),
            set_bits: self.engine.set_bit_count(),
            fill_ratio: self.engine.fill_ratio(),
            estimated_fpr: self.engine.estimated_false_positive_rate(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec::decode(bytes)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        codec::decode_stream(reader)
    }
}

impl fmt::Display for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indices = self.set_indices();
        write!(
            f,
            "BloomFilter[bits={}, hashes={}, set={} {:?}]",
            self.size(),
            self.hash_count(),
            indices.len(),
            indices
        )
    }
}
