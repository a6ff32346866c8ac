use super::replacer::{ClockReplacer, LruReplacer};
use super::types::ReplacerGeneric;

/// Eviction policy of a buffer pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplacerPolicy {
    /// Evict the page released longest ago
    #[default]
    Lru,
    /// Second-chance sweep over the frames
    Clock,
}

impl ReplacerPolicy {
    /// Build a replacer for a pool of `pool_size` frames
    pub fn build(self, pool_size: usize) -> ReplacerGeneric {
        match self {
            ReplacerPolicy::Lru => Box::new(LruReplacer::new(pool_size)),
            ReplacerPolicy::Clock => Box::new(ClockReplacer::new(pool_size)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of frames in the pool
    pub pool_size: usize,
    pub replacer: ReplacerPolicy,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            replacer: ReplacerPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ReplacerPolicy::Lru)]
    #[case(ReplacerPolicy::Clock)]
    fn test_built_replacer_covers_pool(#[case] policy: ReplacerPolicy) {
        let replacer = policy.build(4);
        replacer.insert(3).unwrap();
        assert!(replacer.insert(4).is_err());
        assert_eq!(replacer.victim(), Ok(Some(3)));
    }

    #[rstest]
    fn test_default() {
        let config = BufferPoolConfig::default();
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.replacer, ReplacerPolicy::Lru);
    }
}
