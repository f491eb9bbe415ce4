// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiler settings.
//!
//! Stored as RON. Missing fields take their defaults, so an empty `()` is a
//! valid settings file.

use crate::optimizer::OptimizerPreset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for [`ShaderCompiler`](crate::compiler::ShaderCompiler)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Whether to run the optimizer at all
    pub optimize: bool,
    /// Knobs passed to the optimizer
    pub optimizer: OptimizerPreset,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            optimize: true,
            optimizer: OptimizerPreset::default(),
        }
    }
}

impl CompilerSettings {
    /// Parse settings from RON
    pub fn from_ron(source: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(source)?)
    }

    /// Serialize settings to pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load settings from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron(&source)
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid settings RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serializing failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::ShaderStage;

    #[test]
    fn test_default_settings() {
        let settings = CompilerSettings::default();
        assert!(settings.optimize);
        assert_eq!(settings.optimizer.target, 1);
        assert_eq!(settings.optimizer.stage, ShaderStage::Fragment);
    }

    #[test]
    fn test_serialization() {
        let settings = CompilerSettings {
            optimize: false,
            optimizer: OptimizerPreset {
                target: 2,
                stage: ShaderStage::Fragment,
            },
        };
        let ron_str = settings.to_ron().unwrap();
        let loaded = CompilerSettings::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_default() {
        let loaded = CompilerSettings::from_ron("(optimize: false)").unwrap();
        assert!(!loaded.optimize);
        assert_eq!(loaded.optimizer, OptimizerPreset::default());
        assert_eq!(CompilerSettings::from_ron("()").unwrap(), CompilerSettings::default());
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            CompilerSettings::from_ron("(optimize: 3)"),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            CompilerSettings::load("/definitely/not/here.ron"),
            Err(SettingsError::Io(_))
        ));
    }
}
