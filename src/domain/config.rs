//! Transform configuration
//!
//! A `TransformConfig` describes one spectral transform stage: its size,
//! direction, scaling convention and algorithm. Where the document comes
//! from (file, CLI, profile store) is the caller's business.

use serde::{Deserialize, Serialize};

use super::error::{SigprocError, SigprocResult};
use super::types::{Algorithm, Direction, Scaling};

fn default_scaling() -> Scaling {
    Scaling::Inverse
}

/// Parameters for building a [`SpectralTransform`](crate::dsp::SpectralTransform)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Transform length in samples
    pub size: usize,
    /// Forward or inverse
    pub direction: Direction,
    /// Normalisation convention
    #[serde(default = "default_scaling")]
    pub scaling: Scaling,
    /// Algorithm choice
    #[serde(default)]
    pub algorithm: Algorithm,
}

impl TransformConfig {
    pub fn new(size: usize, direction: Direction) -> Self {
        Self {
            size,
            direction,
            ..Self::default()
        }
    }

    /// Parse a configuration from a JSON document
    pub fn from_json(json: &str) -> SigprocResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| SigprocError::Config(format!("Failed to parse transform config: {e}")))
    }

    /// Configuration for the opposite direction with the same size and convention
    pub fn inverted(&self) -> Self {
        let direction = match self.direction {
            Direction::Forward => Direction::Inverse,
            Direction::Inverse => Direction::Forward,
        };
        Self {
            direction,
            ..self.clone()
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            size: 4096,
            direction: Direction::Forward,
            scaling: default_scaling(),
            algorithm: Algorithm::Auto,
        }
    }
}
