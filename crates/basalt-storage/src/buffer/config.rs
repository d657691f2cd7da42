//! Buffer pool configuration.

use basalt_common::constants::{DEFAULT_POOL_SIZE, DEFAULT_REPLACER_K, PAGE_TABLE_BUCKET_SIZE};

/// Configuration for the buffer pool.
#[derive(Debug, Clone)]
pub struct BufferPoolConfig {
    /// Number of page frames in the buffer pool.
    pub pool_size: usize,
    /// K for the LRU-K replacement policy.
    pub replacer_k: usize,
    /// Bucket capacity for the page-table hash directory.
    pub bucket_size: usize,
}

impl BufferPoolConfig {
    /// Creates a configuration with the specified number of frames.
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            replacer_k: DEFAULT_REPLACER_K,
            bucket_size: PAGE_TABLE_BUCKET_SIZE,
        }
    }

    /// Sets the K for the replacement policy.
    pub fn with_replacer_k(mut self, replacer_k: usize) -> Self {
        self.replacer_k = replacer_k;
        self
    }

    /// Sets the page-table bucket capacity.
    pub fn with_bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.pool_size == 0 {
            return Err("pool_size must be > 0");
        }
        if self.replacer_k == 0 {
            return Err("replacer_k must be >= 1");
        }
        if self.bucket_size == 0 {
            return Err("bucket_size must be > 0");
        }
        Ok(())
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = BufferPoolConfig::new(64);
        assert_eq!(config.pool_size, 64);
        assert_eq!(config.replacer_k, DEFAULT_REPLACER_K);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = BufferPoolConfig::new(8).with_replacer_k(3).with_bucket_size(4);
        assert_eq!(config.replacer_k, 3);
        assert_eq!(config.bucket_size, 4);
    }

    #[test]
    fn test_validation() {
        assert!(BufferPoolConfig::new(0).validate().is_err());
        assert!(BufferPoolConfig::new(8).with_replacer_k(0).validate().is_err());
        assert!(BufferPoolConfig::new(8).with_bucket_size(0).validate().is_err());
    }
}
