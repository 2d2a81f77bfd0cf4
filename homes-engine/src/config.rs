//! User-facing helper configuration.
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MIN_PLANKS, DEFAULT_MIN_STEEL_BARS};
use crate::error::ConfigError;
use crate::markers::{MarkerBindings, MarkerRef, MarkerRole};
use crate::plank::PlankGrade;

/// Settings stored under [`CONFIG_GROUP`](crate::constants::CONFIG_GROUP).
///
/// Marker fields hold composite references (`source|group|id`); an empty
/// string means no marker is bound to that role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperConfig {
    #[serde(default)]
    pub plank_grade: PlankGrade,
    /// Derive thresholds from the contract table instead of the fixed values.
    #[serde(default)]
    pub dynamic_minimums: bool,
    #[serde(default = "HelperConfig::default_min_planks")]
    pub min_planks: i32,
    #[serde(default = "HelperConfig::default_min_steel_bars")]
    pub min_steel_bars: i32,
    #[serde(default)]
    pub varrock_marker: String,
    #[serde(default)]
    pub falador_marker: String,
    #[serde(default)]
    pub ardougne_marker: String,
    #[serde(default)]
    pub hosidius_marker: String,
    #[serde(default)]
    pub low_planks_marker: String,
    #[serde(default)]
    pub low_steel_marker: String,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            plank_grade: PlankGrade::default(),
            dynamic_minimums: false,
            min_planks: Self::default_min_planks(),
            min_steel_bars: Self::default_min_steel_bars(),
            varrock_marker: String::new(),
            falador_marker: String::new(),
            ardougne_marker: String::new(),
            hosidius_marker: String::new(),
            low_planks_marker: String::new(),
            low_steel_marker: String::new(),
        }
    }
}

impl HelperConfig {
    #[must_use]
    pub const fn default_min_planks() -> i32 {
        DEFAULT_MIN_PLANKS
    }

    #[must_use]
    pub const fn default_min_steel_bars() -> i32 {
        DEFAULT_MIN_STEEL_BARS
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON for this shape or
    /// fails [`HelperConfig::validate`].
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate thresholds and every non-empty marker reference.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a negative threshold or a marker reference
    /// that cannot be decoded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("min_planks", self.min_planks),
            ("min_steel_bars", self.min_steel_bars),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeThreshold { field, value });
            }
        }
        for role in MarkerRole::ALL {
            let raw = self.marker(role);
            if raw.is_empty() {
                continue;
            }
            raw.parse::<MarkerRef>()
                .map_err(|source| ConfigError::MarkerRef {
                    role: role.config_key(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Raw composite reference stored for `role`.
    #[must_use]
    pub fn marker(&self, role: MarkerRole) -> &str {
        match role {
            MarkerRole::Varrock => &self.varrock_marker,
            MarkerRole::Falador => &self.falador_marker,
            MarkerRole::Ardougne => &self.ardougne_marker,
            MarkerRole::Hosidius => &self.hosidius_marker,
            MarkerRole::LowPlanks => &self.low_planks_marker,
            MarkerRole::LowSteel => &self.low_steel_marker,
        }
    }

    /// Bind `role` to `marker`, or clear it.
    pub fn set_marker(&mut self, role: MarkerRole, marker: Option<&MarkerRef>) {
        let encoded = crate::markers::encode_binding(marker);
        match role {
            MarkerRole::Varrock => self.varrock_marker = encoded,
            MarkerRole::Falador => self.falador_marker = encoded,
            MarkerRole::Ardougne => self.ardougne_marker = encoded,
            MarkerRole::Hosidius => self.hosidius_marker = encoded,
            MarkerRole::LowPlanks => self.low_planks_marker = encoded,
            MarkerRole::LowSteel => self.low_steel_marker = encoded,
        }
    }

    #[must_use]
    pub fn bindings(&self) -> MarkerBindings {
        MarkerBindings::from_raw(|role| self.marker(role))
    }
}
