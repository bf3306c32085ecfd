use crate::config::FilterConfig;
use crate::engine::FilterEngine;
use crate::error::{BloomError, Result};
use crate::filter::BloomFilter;
use crate::hash::HashKind;
use rayon::prelude::*;
use std::{fmt, thread};

/// Write phase of a filter. Collects items, then [`finalize`] hands the
/// bit array over to an immutable [`BloomFilter`].
///
/// [`finalize`]: FilterBuilder::finalize
#[derive(Debug, Clone)]
pub struct FilterBuilder {
    config: FilterConfig,
    engine: FilterEngine,
}

impl FilterBuilder {
    /// `target_probability` is a percentage in `(0, 100)`.
    pub fn new(target_probability: f64, expected_items: u64) -> Result<Self> {
        Self::from_config(FilterConfig::new(target_probability, expected_items))
    }

    pub fn from_config(config: FilterConfig) -> Result<Self> {
        let bits = config.bit_array_len()?;
        let engine = FilterEngine::new(bits, HashKind::ALL.len())?;
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn size(&self) -> u64 {
        self.engine.size()
    }

    pub fn insert(&mut self, item: &[u8]) {
        self.engine.insert(item);
    }

    pub fn insert_all<I, T>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        for item in items {
            self.engine.insert(item.as_ref());
        }
    }

    /// Inserts `items` on a pool of `workers` threads, capped at the
    /// available parallelism of the machine.
    ///
    /// Each worker fills a private bit array for its share of the items;
    /// the arrays are OR-ed into this builder before returning.
    pub fn insert_all_parallel<T>(&mut self, items: &[T], workers: usize) -> Result<()>
    where
        T: AsRef<[u8]> + Sync,
    {
        if workers == 0 {
            return Err(BloomError::InvalidConfig(
                "Worker count must be greater than 0".into(),
            ));
        }
        if items.is_empty() {
            return Ok(());
        }
        let workers = workers.min(max_workers());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| {
                BloomError::InvalidConfig(format!("Failed to create thread pool: {e}"))
            })?;

        let chunk_len = items.len().div_ceil(workers);
        let engine = &self.engine;
        let partials: Vec<FilterEngine> = pool.install(|| {
            items
                .par_chunks(chunk_len)
                .map(|chunk| {
                    let mut partial = engine.empty_like();
                    for item in chunk {
                        partial.insert(item.as_ref());
                    }
                    partial
                })
                .collect()
        });

        for partial in &partials {
            self.engine.union_with(partial)?;
        }
        Ok(())
    }

    /// Consumes the builder. The bit array moves into the filter as is.
    pub fn finalize(self) -> BloomFilter {
        BloomFilter::from_engine(self.engine)
    }
}

fn max_workers() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

impl fmt::Display for FilterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FilterBuilder[probability={}%, items={}, bits={}, hashes={}]",
            self.config.target_probability,
            self.config.expected_items,
            self.engine.size(),
            self.engine.hash_count()
        )
    }
}
