//! Resolver options

use crate::error::{Result, TokenError};
use crate::resolver::ResolverSettings;
use crate::utils::NameTransform;
use crate::validators::ValidationOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_THEME: &str = "default";

/// Unit applied to plain-number values of a type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplicitUnits {
    pub dimension: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    pub name_transform: NameTransform,
    pub implicit_units: ImplicitUnits,
    /// Escalate alias and override type mismatches to errors
    pub strict_types: bool,
    /// Reject out-of-range gradient stops instead of clamping
    pub strict_gradients: bool,
    /// Theme consulted first by lookups without an explicit theme
    pub default_theme: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            name_transform: NameTransform::None,
            implicit_units: ImplicitUnits::default(),
            strict_types: false,
            strict_gradients: false,
            default_theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl ResolverOptions {
    pub fn validation(&self) -> ValidationOptions {
        ValidationOptions {
            implicit_dimension_unit: self.implicit_units.dimension.clone(),
            implicit_duration_unit: self.implicit_units.duration.clone(),
            strict_gradients: self.strict_gradients,
        }
    }

    pub fn settings(&self) -> ResolverSettings {
        ResolverSettings {
            strict_types: self.strict_types,
        }
    }
}

/// Load options from a `.json` or `.toml` file
pub fn load(config_path: impl AsRef<Path>) -> Result<ResolverOptions> {
    let config_path = config_path.as_ref();
    let content = fs::read_to_string(config_path)
        .map_err(|e| TokenError::Io(format!("Config file {}: {}", config_path.display(), e)))?;

    let options = match config_path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| TokenError::InvalidFormat {
            message: format!("Invalid JSON config: {}", e),
        })?,
        Some("toml") => toml::from_str(&content).map_err(|e| TokenError::InvalidFormat {
            message: format!("Invalid TOML config: {}", e),
        })?,
        _ => {
            return Err(TokenError::InvalidFormat {
                message: "Config file must be .json or .toml format".to_string(),
            })
        }
    };
    log::info!("Loaded configuration from {}", config_path.display());
    Ok(options)
}
