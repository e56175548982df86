//! Model configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, XStreamError};

/// Parameters of an [`XStream`](crate::XStream) model.
///
/// Deserializes with missing fields taken from [`Default`], so a config file
/// only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XStreamConfig {
    /// Number of independent chains in the ensemble.
    pub n_chains: usize,
    /// Nested resolution levels per chain.
    pub depth: usize,
    /// Samples per window; scales and reference sketches refresh at each multiple.
    pub window_size: usize,
    /// Half-ranges with magnitude at or below this are clamped to 1.0.
    pub scale_epsilon: f64,
    /// Per-feature half-range used until the first window completes.
    pub initial_scale: f64,
    /// Seed for the model's random draws; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for XStreamConfig {
    fn default() -> Self {
        Self {
            n_chains: 100,
            depth: 25,
            window_size: 25,
            scale_epsilon: 1e-4,
            initial_scale: 0.5,
            seed: None,
        }
    }
}

impl XStreamConfig {
    pub fn with_chains(mut self, n_chains: usize) -> Self {
        self.n_chains = n_chains;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_scale_epsilon(mut self, scale_epsilon: f64) -> Self {
        self.scale_epsilon = scale_epsilon;
        self
    }

    pub fn with_initial_scale(mut self, initial_scale: f64) -> Self {
        self.initial_scale = initial_scale;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject values no model can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.n_chains == 0 {
            return Err(XStreamError::config("n_chains", "must be positive"));
        }
        if self.depth == 0 {
            return Err(XStreamError::config("depth", "must be positive"));
        }
        if self.window_size == 0 {
            return Err(XStreamError::config("window_size", "must be positive"));
        }
        if !self.scale_epsilon.is_finite() || self.scale_epsilon < 0.0 {
            return Err(XStreamError::config(
                "scale_epsilon",
                format!("must be finite and non-negative, got {}", self.scale_epsilon),
            ));
        }
        if !self.initial_scale.is_finite() || self.initial_scale < 0.0 {
            return Err(XStreamError::config(
                "initial_scale",
                format!("must be finite and non-negative, got {}", self.initial_scale),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(XStreamConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_sizes_are_rejected() {
        for (cfg, field) in [
            (XStreamConfig::default().with_chains(0), "n_chains"),
            (XStreamConfig::default().with_depth(0), "depth"),
            (XStreamConfig::default().with_window_size(0), "window_size"),
        ] {
            match cfg.validate() {
                Err(XStreamError::InvalidConfig { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected InvalidConfig for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn bad_epsilon_is_rejected() {
        assert!(XStreamConfig::default().with_scale_epsilon(-1.0).validate().is_err());
        assert!(XStreamConfig::default().with_scale_epsilon(f64::NAN).validate().is_err());
    }
}
