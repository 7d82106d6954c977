//! Unified Timeout Configuration
//!
//! Provides a centralized timeout management system with:
//! - Operation-specific timeout defaults
//! - Helper function for wrapping async operations
//! - Consistent timeout error handling
//!
//! A provider call that never returns would otherwise hold its concurrency
//! permit forever and stall the rest of the batch.

use std::future::Future;
use std::time::Duration;

use crate::constants::network as net_constants;
use crate::types::{PkgError, Result};

/// Unified timeout configuration for all operations
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for a single provider analysis (default: 2 minutes)
    pub provider_request: Duration,
    /// Timeout for establishing provider connections (default: 30 seconds)
    pub connection: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            provider_request: Duration::from_secs(net_constants::DEFAULT_TIMEOUT_SECS),
            connection: Duration::from_secs(net_constants::CONNECTION_TIMEOUT_SECS),
        }
    }
}

impl TimeoutConfig {
    /// Create a config from the configured provider timeout
    pub fn with_provider_secs(secs: u64) -> Self {
        Self {
            provider_request: Duration::from_secs(secs),
            ..Self::default()
        }
    }
}

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(PkgError::timeout(operation_name, timeout)),
    }
}
