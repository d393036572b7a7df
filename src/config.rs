//! Stage Configuration
//!
//! All tuning of one page visit in a single serde-deserializable struct.
//! Every field has a default, so a partial document only overrides what it
//! names.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vitrine::config::StageConfig;
//!
//! let config = StageConfig::from_json_str(r#"{
//!     "preloader": { "settle_delay": 0.25 },
//!     "render_gate": { "idle_interval": 2.0 }
//! }"#)?;
//! let stage = Stage::mount(config, AssetManifest::for_catalog(["sofa", "lamp"]))?;
//! ```

use serde::{Deserialize, Serialize};

use crate::animation::{AnimatorConfig, EntranceConfig};
use crate::errors::{Result, VitrineError};
use crate::preloader::PreloaderConfig;
use crate::render_gate::RenderGateConfig;
use crate::scroll::{ScrollSignalConfig, Viewport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Viewport at mount time.
    pub viewport: Viewport,
    pub preloader: PreloaderConfig,
    /// Defaults for scenes mounted without their own settings.
    pub render_gate: RenderGateConfig,
    pub scroll: ScrollSignalConfig,
    pub animator: AnimatorConfig,
    /// Intro used by scenes that opt into an entrance.
    pub entrance: EntranceConfig,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(0.0, 900.0),
            preloader: PreloaderConfig::default(),
            render_gate: RenderGateConfig::default(),
            scroll: ScrollSignalConfig::default(),
            animator: AnimatorConfig::default(),
            entrance: EntranceConfig::default(),
        }
    }
}

impl StageConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.viewport.height.is_finite() || self.viewport.height <= 0.0 {
            return Err(VitrineError::InvalidConfig {
                field: "viewport.height",
                reason: format!("must be positive, got {}", self.viewport.height),
            });
        }
        self.preloader.validate()?;
        self.render_gate.validate()?;
        self.scroll.validate()?;
        self.animator.validate()?;
        self.entrance.validate()?;
        Ok(())
    }
}
