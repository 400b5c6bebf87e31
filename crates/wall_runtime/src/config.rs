//! Wall configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `TECHWALL_WIDTH`, `TECHWALL_HEIGHT`,
//!    `TECHWALL_PERIOD_MS`, `TECHWALL_TIMEOUT_MS`, `TECHWALL_ASSET_ROOT`
//! 2. Config file named by `TECHWALL_CONFIG`, else `techwall.toml`
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! step_hz = 60
//! refresh_hz = 60
//! rearrange_period_ms = 800
//! asset_root = "public"
//!
//! [layout]
//! width = 1200
//! height = 500
//! segments = 10
//! sigma = 2.0
//!
//! [physics]
//! gravity = [0.0, 980.0]
//! ```

use crate::error::{Result, WallError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use wall_layout::LayoutConfig;
use wall_physics::PhysicsConfig;

const DEFAULT_CONFIG_FILE: &str = "techwall.toml";

/// Everything needed to run a wall
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub layout: LayoutConfig,
    pub physics: PhysicsConfig,
    /// Simulation steps per second
    pub step_hz: u32,
    /// Canvas repaints per second
    pub refresh_hz: u32,
    /// Delay between rearrange batches
    pub rearrange_period_ms: u64,
    /// Bound on a single image load
    pub image_timeout_ms: u64,
    /// Extra wait before the CLI captures its screenshot
    pub settle_ms: u64,
    /// Root for relative image references
    pub asset_root: PathBuf,
    /// File the config was read from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            physics: PhysicsConfig::default(),
            step_hz: 60,
            refresh_hz: 60,
            rearrange_period_ms: 800,
            image_timeout_ms: 5000,
            settle_ms: 3000,
            asset_root: PathBuf::from("."),
            config_path: None,
        }
    }
}

impl WallConfig {
    /// Load from file and environment, falling back to defaults
    pub fn load() -> Self {
        let path = std::env::var("TECHWALL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = match Self::load_from_file(&path) {
            Ok(config) => {
                log::info!("Loaded wall config from {}", path);
                config
            }
            Err(WallError::Io(_)) => Self::default(),
            Err(e) => {
                log::warn!("Ignoring {}: {}", path, e);
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| WallError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TECHWALL_*` overrides read through `var`
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        fn parsed<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            let raw = var(key)?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    log::warn!("Ignoring {}={:?}: not a number", key, raw);
                    None
                }
            }
        }

        if let Some(width) = parsed(&var, "TECHWALL_WIDTH") {
            self.layout.width = width;
        }
        if let Some(height) = parsed(&var, "TECHWALL_HEIGHT") {
            self.layout.height = height;
        }
        if let Some(period) = parsed(&var, "TECHWALL_PERIOD_MS") {
            self.rearrange_period_ms = period;
        }
        if let Some(timeout) = parsed(&var, "TECHWALL_TIMEOUT_MS") {
            self.image_timeout_ms = timeout;
        }
        if let Some(root) = var("TECHWALL_ASSET_ROOT").filter(|r| !r.is_empty()) {
            self.asset_root = PathBuf::from(root);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.layout.width > 0.0 && self.layout.height > 0.0) {
            return Err(WallError::Config(format!(
                "container must be non-empty, got {}x{}",
                self.layout.width, self.layout.height
            )));
        }
        if self.step_hz == 0 || self.refresh_hz == 0 {
            return Err(WallError::Config("step_hz and refresh_hz must be positive".into()));
        }
        if self.rearrange_period_ms == 0 {
            return Err(WallError::Config("rearrange_period_ms must be positive".into()));
        }
        self.physics
            .validate()
            .map_err(|e| WallError::Config(e.to_string()))
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.step_hz.max(1) as f64)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.refresh_hz.max(1) as f64)
    }

    pub fn rearrange_period(&self) -> Duration {
        Duration::from_millis(self.rearrange_period_ms)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }

    pub fn settle_time(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = WallConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rearrange_period(), Duration::from_millis(800));
        assert_eq!(config.image_timeout(), Duration::from_secs(5));
        assert_eq!(config.layout.width, 1200.0);
    }

    #[test]
    fn test_partial_toml() {
        let config = WallConfig::from_toml_str(
            r#"
            rearrange_period_ms = 500

            [layout]
            width = 800.0
            "#,
        )
        .unwrap();
        assert_eq!(config.rearrange_period_ms, 500);
        assert_eq!(config.layout.width, 800.0);
        assert_eq!(config.layout.height, 500.0);
        assert_eq!(config.step_hz, 60);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(WallConfig::from_toml_str("step_hz = 0"), Err(WallError::Config(_))));
        assert!(matches!(WallConfig::from_toml_str("step_hz = ["), Err(WallError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TECHWALL_WIDTH", "640"),
            ("TECHWALL_PERIOD_MS", "250"),
            ("TECHWALL_TIMEOUT_MS", "soon"),
            ("TECHWALL_ASSET_ROOT", "/srv/wall"),
        ]
        .into_iter()
        .collect();

        let mut config = WallConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.layout.width, 640.0);
        assert_eq!(config.rearrange_period_ms, 250);
        assert_eq!(config.image_timeout_ms, 5000);
        assert_eq!(config.asset_root, PathBuf::from("/srv/wall"));
    }
}
