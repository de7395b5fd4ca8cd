//! Environment-variable runtime tuning.
//!
//! - `VREST_STACK_SIZE` — coroutine stack size in bytes, decimal or `0x` hex
//!   (default `0x10000`, 64 KB)
//! - `VREST_WORKERS` — connection worker pool size (default 100)

use std::env;

/// Default size of the connection worker pool.
pub const DEFAULT_WORKERS: usize = 100;

const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded once at startup.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for acceptor and worker coroutines, in bytes.
    pub stack_size: usize,
    /// Number of connection worker coroutines.
    pub workers: usize,
}

impl RuntimeConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var("VREST_STACK_SIZE")
            .ok()
            .and_then(|val| {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).ok()
                } else {
                    val.parse().ok()
                }
            })
            .unwrap_or(DEFAULT_STACK_SIZE);

        let workers = env::var("VREST_WORKERS")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(DEFAULT_WORKERS);

        Self {
            stack_size,
            workers,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            workers: DEFAULT_WORKERS,
        }
    }
}
