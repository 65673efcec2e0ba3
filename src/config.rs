//! Pipeline configuration.
//!
//! Settings come from an optional YAML file; command-line flags override
//! individual values. Example file:
//!
//! ```yaml
//! output_size: [224, 224]
//! overlap_threshold: 0.1
//! seed: 42
//! output_dir: out/classification
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PotholeError;
use crate::ir::{DatasetLayout, DEFAULT_OVERLAP_THRESHOLD};

/// Default `(width, height)` of every corpus image.
pub const DEFAULT_OUTPUT_SIZE: [u32; 2] = [224, 224];

/// Largest accepted output width or height.
///
/// Negatives are drawn from regions twice the output size, which must stay
/// addressable in `u32`.
pub const MAX_OUTPUT_SIDE: u32 = 16_384;

/// Settings for a corpus build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// `[width, height]` of every output image.
    pub output_size: [u32; 2],
    /// Maximum fraction of a negative candidate a pothole may cover.
    pub overlap_threshold: f64,
    /// Sampler seed; a fresh random seed is used when absent.
    pub seed: Option<u64>,
    /// Corpus directory; `<root>/processed/classification` when absent.
    pub output_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_size: DEFAULT_OUTPUT_SIZE,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            seed: None,
            output_dir: None,
        }
    }
}

/// Per-flag overrides, applied on top of a loaded config.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub output_size: Option<[u32; 2]>,
    pub overlap_threshold: Option<f64>,
    pub seed: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

impl PipelineConfig {
    /// Read a YAML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, PotholeError> {
        let data = fs::read_to_string(path).map_err(PotholeError::Io)?;
        serde_yaml::from_str(&data).map_err(|source| PotholeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` if given, else defaults; then apply overrides and validate.
    pub fn resolve(
        path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Self, PotholeError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(size) = overrides.output_size {
            self.output_size = size;
        }
        if let Some(threshold) = overrides.overlap_threshold {
            self.overlap_threshold = threshold;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        if overrides.output_dir.is_some() {
            self.output_dir = overrides.output_dir;
        }
    }

    pub fn validate(&self) -> Result<(), PotholeError> {
        let [width, height] = self.output_size;
        if width == 0 || height == 0 {
            return Err(PotholeError::InvalidConfig(format!(
                "output_size must be positive, got {}x{}",
                width, height
            )));
        }
        if width > MAX_OUTPUT_SIDE || height > MAX_OUTPUT_SIDE {
            return Err(PotholeError::InvalidConfig(format!(
                "output_size must be at most {max}x{max}, got {}x{}",
                width,
                height,
                max = MAX_OUTPUT_SIDE
            )));
        }
        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            return Err(PotholeError::InvalidConfig(format!(
                "overlap_threshold must be between 0.0 and 1.0, got {}",
                self.overlap_threshold
            )));
        }
        Ok(())
    }

    pub fn output_width(&self) -> u32 {
        self.output_size[0]
    }

    pub fn output_height(&self) -> u32 {
        self.output_size[1]
    }

    /// The corpus directory for a dataset laid out as `layout`.
    pub fn classification_dir(&self, layout: &DatasetLayout) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| layout.classification_dir())
    }
}

/// Parse `WIDTHxHEIGHT` (e.g. `224x224`).
pub fn parse_output_size(s: &str) -> Result<[u32; 2], String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width: u32 = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}'", w))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}'", h))?;
    if width == 0 || height == 0 {
        return Err("WIDTH and HEIGHT must be positive".to_string());
    }
    if width > MAX_OUTPUT_SIDE || height > MAX_OUTPUT_SIDE {
        return Err(format!("WIDTH and HEIGHT must be at most {MAX_OUTPUT_SIDE}"));
    }
    Ok([width, height])
}

/// Parse an overlap threshold in `[0, 1]`.
pub fn parse_threshold(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("THRESHOLD must be between 0.0 and 1.0".to_string()),
    }
}
