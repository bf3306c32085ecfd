//! Bloom filter with a compact, self-describing file format.
//!
//! A filter is built in two phases. A [`FilterBuilder`] sizes a bit array
//! from a target probability and an expected item count, and accepts
//! inserts. [`FilterBuilder::finalize`] moves the bits into an immutable
//! [`BloomFilter`] that answers membership queries:
//!     * `false`: the item was definitely never inserted.
//!     * `true`: the item was possibly inserted.
//!
//! Hashing:
//!     * Two 64-bit hashes, FNV-1 and FNV-1a, each reduced modulo the
//!       bit array length. Both are unseeded, so positions are stable
//!       across processes and a saved filter can be queried anywhere.
//!
//! Sizing:
//!     * The target probability is a percentage in `(0, 100)`. A value of
//!       `p` gives a false positive rate of `1 - p / 100` and a bit array of
//!       `floor(n * ln(1 / fpr) / ln(2)^2)` bits.
//!
//! Persistence:
//!     * [`codec::encode`] writes a 14-byte ASCII header, `\r\n`, then the
//!       bits packed most significant bit first.
//!     * [`codec::decode`] parses a complete buffer;
//!       [`codec::decode_stream`] reads one through [`DelimitedChunks`].
//!
//! ```
//! use packed_bloom_rs::{BloomFilter, FilterBuilder};
//!
//! let mut builder = FilterBuilder::new(99.0, 3).unwrap();
//! builder.insert_all(["apple", "banana", "cherry"]);
//! let filter = builder.finalize();
//! assert!(filter.may_contain(b"banana"));
//!
//! let bytes = filter.to_bytes();
//! assert_eq!(BloomFilter::from_bytes(&bytes).unwrap(), filter);
//! ```

mod builder;
pub mod codec;
pub mod common;
mod config;
mod engine;
mod error;
mod filter;
mod hash;
pub mod reader;

pub use builder::FilterBuilder;
pub use config::{FilterConfig, FilterConfigBuilder, FilterConfigBuilderError};
pub use engine::{BitArray, FilterEngine};
pub use error::{BloomError, FormatField, Result};
pub use filter::{BloomFilter, FilterStats};
pub use hash::{
    HashKind, MAX_BIT_ARRAY_LEN, ReducedHash, fnv1_64, fnv1a_64,
    optimal_bit_array_len,
};
pub use reader::DelimitedChunks;
