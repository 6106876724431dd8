use serde::Deserialize;
use std::path::Path;

use super::output_format::IconOutputFormat;
use crate::error::IconError;

/// Synthesis settings loaded from a YAML file.
///
/// ```yaml
/// formats: [from-win95, winxp-unpopular]
/// dither: true
/// vista_png: true
/// optimize_png: false
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Format names, combined into one flag set
    #[serde(default = "default_formats")]
    pub formats: Vec<IconOutputFormat>,

    /// Floyd-Steinberg error diffusion for indexed images
    #[serde(default = "default_true")]
    pub dither: bool,

    /// Store the 256x256 image as PNG
    #[serde(default = "default_true")]
    pub vista_png: bool,

    /// Run oxipng over every PNG resource
    #[serde(default)]
    pub optimize_png: bool,
}

fn default_formats() -> Vec<IconOutputFormat> {
    vec![IconOutputFormat::FROM_WIN_95]
}

fn default_true() -> bool {
    true
}

impl SynthesisConfig {
    pub fn load(path: &Path) -> Result<Self, IconError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, IconError> {
        serde_yaml::from_str(content).map_err(|e| IconError::Config(e.to_string()))
    }

    /// Load `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                tracing::info!(
                    path = %path.display(),
                    formats = ?config.output_format(),
                    "Loaded configuration"
                );
                config
            }
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Union of all configured formats.
    pub fn output_format(&self) -> IconOutputFormat {
        self.formats
            .iter()
            .fold(IconOutputFormat::NONE, |acc, format| acc | *format)
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            dither: true,
            vista_png: true,
            optimize_png: false,
        }
    }
}
