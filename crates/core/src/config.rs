//! Configuration management for SentinelLink.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    pub channel: ChannelConfig,
}

/// Reconnection policy applied after every channel disconnect.
///
/// Retries are uncapped: distress messaging keeps trying indefinitely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReconnectPolicy {
    /// Reconnect without delay
    Immediate,
    /// Fixed delay between attempts
    FixedDelay { delay_ms: u64 },
    /// Exponential backoff, doubling from `base_ms` up to `max_ms`
    ExponentialBackoff { base_ms: u64, max_ms: u64 },
}

impl ReconnectPolicy {
    /// Delay before the given attempt (1-based)
    pub fn delay_ms(&self, attempt: u32) -> u64 {
        match self {
            ReconnectPolicy::Immediate => 0,
            ReconnectPolicy::FixedDelay { delay_ms } => *delay_ms,
            ReconnectPolicy::ExponentialBackoff { base_ms, max_ms } => {
                let shift = attempt.saturating_sub(1).min(16);
                base_ms.saturating_mul(1u64 << shift).min(*max_ms)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Reconnection policy after channel loss
    pub reconnect: ReconnectPolicy,
    /// Bound on any single store call before it is treated as transient failure
    pub store_timeout_ms: u64,
    /// Override for the maximum message content length
    pub max_content_len: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Signal fan-out buffer depth per subscriber
    pub signal_buffer: usize,
    /// WebSocket bind address for the signal server
    pub ws_bind_addr: String,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            engine: EngineConfig {
                reconnect: ReconnectPolicy::ExponentialBackoff {
                    base_ms: 250,
                    max_ms: 15_000,
                },
                store_timeout_ms: 5_000,
                max_content_len: None,
            },
            channel: ChannelConfig {
                signal_buffer: 256,
                ws_bind_addr: "127.0.0.1:8765".to_string(),
            },
        }
    }
}
