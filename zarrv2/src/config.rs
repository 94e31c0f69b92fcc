//! Global configuration options.

use std::sync::OnceLock;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the zarrv2 crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Float16 Support
///  > default: [`true`]
///
/// If disabled, creating or opening an array with a `float16` data type (`<f2`/`>f2`) fails.
/// The option is read once when an array is opened.
///
/// ## Chunk Concurrent Limit
///  > default: `10`
///
/// The default number of chunks retrieved or stored concurrently by the async array API.
/// It can be overridden per operation with [`ArrayOptions`](crate::array::ArrayOptions).
/// A limit of zero is treated as one.
#[derive(Debug)]
pub struct Config {
    float16_support: bool,
    chunk_concurrent_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            float16_support: true,
            chunk_concurrent_limit: 10,
        }
    }
}

impl Config {
    /// Get the [float16 support](#float16-support) configuration.
    #[must_use]
    pub fn float16_support(&self) -> bool {
        self.float16_support
    }

    /// Set the [float16 support](#float16-support) configuration.
    pub fn set_float16_support(&mut self, float16_support: bool) {
        self.float16_support = float16_support;
    }

    /// Get the [chunk concurrent limit](#chunk-concurrent-limit) configuration.
    #[must_use]
    pub fn chunk_concurrent_limit(&self) -> usize {
        self.chunk_concurrent_limit
    }

    /// Set the [chunk concurrent limit](#chunk-concurrent-limit) configuration.
    pub fn set_chunk_concurrent_limit(&mut self, concurrent_limit: usize) {
        self.chunk_concurrent_limit = concurrent_limit;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global zarrv2 configuration.
///
/// Holding the returned guard while calling [`global_config_mut`] on the same thread deadlocks.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).read()
}

/// Returns a mutable reference to the global zarrv2 configuration.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).write()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn config_chunk_concurrent_limit() {
        assert_eq!(global_config().chunk_concurrent_limit(), 10);
        global_config_mut().set_chunk_concurrent_limit(2);
        assert_eq!(global_config().chunk_concurrent_limit(), 2);
        global_config_mut().set_chunk_concurrent_limit(10);
    }
}
