//! Drawing configuration.

use crate::input::Brush;
use crate::segment::{DEFAULT_NIB, NIB_SIZES, PaletteEntry, SerializableColor, default_palette};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default page width and height in pixels.
pub const DEFAULT_PAGE_SIZE: u32 = 1024;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Page size, palette and brush defaults. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    pub page_width: u32,
    pub page_height: u32,
    pub default_color: SerializableColor,
    pub default_nib: f64,
    pub nibs: Vec<f64>,
    pub palette: Vec<PaletteEntry>,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_SIZE,
            page_height: DEFAULT_PAGE_SIZE,
            default_color: SerializableColor::black(),
            default_nib: DEFAULT_NIB,
            nibs: NIB_SIZES.to_vec(),
            palette: default_palette(),
        }
    }
}

impl DrawingConfig {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.page_width == 0 || self.page_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "page size must be non-zero, got {}x{}",
                self.page_width, self.page_height
            )));
        }
        if self.default_nib.is_nan() || self.default_nib <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "default_nib must be positive, got {}",
                self.default_nib
            )));
        }
        Ok(())
    }

    /// Brush a new contributor starts with.
    pub fn default_brush(&self) -> Brush {
        Brush {
            color: self.default_color,
            nib: self.default_nib,
            under: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DrawingConfig::default();
        assert_eq!(config.page_width, 1024);
        assert_eq!(config.nibs, vec![2.0, 4.0, 12.0]);
        assert_eq!(config.default_brush().nib, 8.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DrawingConfig::from_json(r#"{"page_width": 640}"#).unwrap();
        assert_eq!(config.page_width, 640);
        assert_eq!(config.page_height, 1024);
        assert_eq!(config.palette.len(), 9);
    }

    #[test]
    fn test_rejects_zero_size() {
        let result = DrawingConfig::from_json(r#"{"page_height": 0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_nib": 4.0}}"#).unwrap();
        let config = DrawingConfig::load(file.path()).unwrap();
        assert_eq!(config.default_nib, 4.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = DrawingConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
