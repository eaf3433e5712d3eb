//! Renderer tuning knobs
//!
//! Hosts usually embed this under a `[renderer]` table:
//! ```toml
//! [renderer]
//! overscan = 10
//! estimated_row_height = 1
//! pointer_quiet_ms = 150
//! ```

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Rows mounted above and below the viewport
    pub overscan: usize,
    /// Height assumed for rows that have not been measured yet
    pub estimated_row_height: u32,
    /// Quiet period after the last scroll before pointer input is restored
    pub pointer_quiet_ms: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            overscan: 10,
            estimated_row_height: 1,
            pointer_quiet_ms: 150,
        }
    }
}

impl RendererConfig {
    pub fn pointer_quiet_period(&self) -> Duration {
        Duration::from_millis(self.pointer_quiet_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: RendererConfig = serde_json::from_str(r#"{"overscan": 3}"#).unwrap();
        assert_eq!(config.overscan, 3);
        assert_eq!(config.estimated_row_height, 1);
        assert_eq!(config.pointer_quiet_period(), Duration::from_millis(150));
    }
}
