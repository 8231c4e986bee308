//! Overlay engine configuration (`overlay.toml`)
//!
//! Every field has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! hero_height = 600
//! always_dark_routes = ["/launch"]
//!
//! [thresholds]
//! light_min = 200
//! dark_max = 100
//!
//! [[regions]]
//! id = "faq"
//! matchers = ["faq"]
//! theme = "light"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::ForcedTheme;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level overlay configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Scroll offset below which a normal route is always `Light`
    pub hero_height: f32,
    /// Routes that are `Dark` at every scroll offset
    pub always_dark_routes: Vec<String>,
    /// Tolerance added around the overlay when testing region overlap
    pub region_padding: f32,
    /// Maximum number of nodes visited per ancestor walk
    pub max_walk_depth: usize,
    pub thresholds: Thresholds,
    pub small_element: SmallElement,
    pub hints: HintConfig,
    /// Named region overrides, highest priority first
    pub regions: Vec<RegionConfig>,
}

/// Channel thresholds for classifying a sampled color (0-255)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Thresholds {
    /// All channels above this read as a light background
    pub light_min: u8,
    /// All channels below this read as a dark background
    pub dark_max: u8,
    /// Blue must exceed red and green by at least this much
    pub blue_margin: u8,
    /// Minimum blue channel for a brand-blue background
    pub blue_min: u8,
}

/// Elements smaller than this in either dimension are skipped by the walk
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SmallElement {
    pub min_width: f32,
    pub min_height: f32,
}

/// Class/id markers that settle a walk step without reading colors.
/// Matched as whole tokens, ignoring ASCII case.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HintConfig {
    pub light: Vec<String>,
    pub dark: Vec<String>,
}

/// A named region override
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RegionConfig {
    pub id: String,
    /// Id/class fragments that identify the region. Defaults to `[id]`.
    #[serde(default)]
    pub matchers: Vec<String>,
    #[serde(default)]
    pub theme: ForcedTheme,
}

impl RegionConfig {
    pub fn new(id: impl Into<String>, theme: ForcedTheme) -> Self {
        Self {
            id: id.into(),
            matchers: Vec::new(),
            theme,
        }
    }

    pub fn with_matcher(mut self, matcher: impl Into<String>) -> Self {
        self.matchers.push(matcher.into());
        self
    }

    /// Trimmed matchers, falling back to the region id
    pub fn effective_matchers(&self) -> Vec<String> {
        if self.matchers.is_empty() {
            vec![self.id.trim().to_string()]
        } else {
            self.matchers.iter().map(|m| m.trim().to_string()).collect()
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            light_min: 200,
            dark_max: 100,
            blue_margin: 40,
            blue_min: 120,
        }
    }
}

impl Default for SmallElement {
    fn default() -> Self {
        Self {
            min_width: 120.0,
            min_height: 32.0,
        }
    }
}

impl Default for HintConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            light: owned(&[
                "bg-white",
                "bg-gray-50",
                "bg-slate-50",
                "bg-blue-50",
                "light-section",
            ]),
            dark: owned(&[
                "bg-black",
                "bg-gray-900",
                "bg-slate-900",
                "bg-blue-600",
                "bg-blue-700",
                "bg-blue-800",
                "bg-blue-900",
                "bg-brand",
                "dark-section",
            ]),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            hero_height: 600.0,
            always_dark_routes: vec!["/launch".to_string()],
            region_padding: 8.0,
            max_walk_depth: 64,
            thresholds: Thresholds::default(),
            small_element: SmallElement::default(),
            hints: HintConfig::default(),
            regions: vec![
                RegionConfig::new("pricing", ForcedTheme::Light),
                RegionConfig::new("faq", ForcedTheme::Light),
                RegionConfig::new("contact", ForcedTheme::Light),
            ],
        }
    }
}

impl OverlayConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: OverlayConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), regions = config.regions.len(), "loaded overlay config");
        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges and region ids
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.hero_height.is_finite() || self.hero_height < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "hero_height must be a non-negative number, got {}",
                self.hero_height
            )));
        }
        if !self.region_padding.is_finite() || self.region_padding < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "region_padding must be a non-negative number, got {}",
                self.region_padding
            )));
        }
        if self.max_walk_depth == 0 {
            return Err(ConfigError::Invalid("max_walk_depth must be at least 1".into()));
        }
        for (name, value) in [
            ("small_element.min_width", self.small_element.min_width),
            ("small_element.min_height", self.small_element.min_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.thresholds.dark_max >= self.thresholds.light_min {
            return Err(ConfigError::Invalid(format!(
                "thresholds.dark_max ({}) must be below thresholds.light_min ({})",
                self.thresholds.dark_max, self.thresholds.light_min
            )));
        }

        let mut seen = HashSet::new();
        for region in &self.regions {
            if region.id.trim().is_empty() {
                return Err(ConfigError::Invalid("region id must not be empty".into()));
            }
            if !seen.insert(region.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate region id {:?}",
                    region.id
                )));
            }
            if region.matchers.iter().any(|m| m.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "region {:?} has an empty matcher",
                    region.id
                )));
            }
        }
        Ok(())
    }
}
