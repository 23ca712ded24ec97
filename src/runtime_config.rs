//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the coroutine runtime.
//!
//! ## Environment Variables
//!
//! ### `GLOBROUTE_STACK_SIZE`
//!
//! Stack size for coroutines, in decimal (`16384`) or hexadecimal
//! (`0x4000`). Default: `0x4000` (16 KB).
//!
//! Larger stacks support deeper call chains in handlers; smaller stacks
//! reduce memory for many concurrent coroutines. Tune to handler
//! complexity and concurrency.

use std::env;

/// Runtime configuration loaded from environment variables.
///
/// Load at startup with [`RuntimeConfig::from_env()`] and apply via
/// `may::config().set_stack_size(..)` before serving.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes (default: 16 KB / 0x4000)
    pub stack_size: usize,
}

const DEFAULT_STACK_SIZE: usize = 0x4000;

fn parse_stack_size(val: &str) -> Option<usize> {
    match val.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var("GLOBROUTE_STACK_SIZE")
            .ok()
            .and_then(|v| parse_stack_size(&v))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: parallel tests must not race on the env var.
    #[test]
    fn test_stack_size_parsing() {
        env::set_var("GLOBROUTE_STACK_SIZE", "0x8000");
        assert_eq!(RuntimeConfig::from_env().stack_size, 0x8000);
        env::set_var("GLOBROUTE_STACK_SIZE", "32768");
        assert_eq!(RuntimeConfig::from_env().stack_size, 32768);
        env::set_var("GLOBROUTE_STACK_SIZE", "not-a-number");
        assert_eq!(RuntimeConfig::from_env().stack_size, 0x4000);
        env::remove_var("GLOBROUTE_STACK_SIZE");
        assert_eq!(RuntimeConfig::from_env().stack_size, 0x4000);
    }
}
