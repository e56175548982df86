//! The streaming xStream model: projection, window control and the chain ensemble.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::XStreamConfig;
use crate::ensemble::ChainEnsemble;
use crate::error::{Result, XStreamError, check_input};
use crate::projection::{IdentityProjector, Projector};
use crate::window::WindowController;

/// A detector that learns and scores one sample at a time.
pub trait StreamingDetector {
    fn fit_partial(&mut self, x: &[f64]) -> Result<()>;

    /// Larger scores are more anomalous. Never changes the model.
    fn score_partial(&self, x: &[f64]) -> Result<f64>;

    /// Learn `x`, then score it against the updated model.
    fn fit_score_partial(&mut self, x: &[f64]) -> Result<f64> {
        self.fit_partial(x)?;
        self.score_partial(x)
    }

    /// Score `x` against what has been learned so far, then learn it.
    fn score_fit_partial(&mut self, x: &[f64]) -> Result<f64> {
        let score = self.score_partial(x)?;
        self.fit_partial(x)?;
        Ok(score)
    }
}

#[derive(Debug)]
pub struct XStream<P = IdentityProjector> {
    config: XStreamConfig,
    projector: P,
    window: WindowController,
    ensemble: ChainEnsemble,
}

impl XStream<IdentityProjector> {
    /// Model over raw `dim`-wide vectors, without projection.
    pub fn new(config: XStreamConfig, dim: usize) -> Result<Self> {
        Self::with_projector(config, IdentityProjector::new(dim))
    }
}

impl<P: Projector> XStream<P> {
    /// Randomness comes from `config.seed`, or the OS when unset.
    pub fn with_projector(config: XStreamConfig, projector: P) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, projector, &mut rng)
    }

    pub fn with_rng<R: Rng + ?Sized>(
        config: XStreamConfig,
        projector: P,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        let dim = projector.output_dim();
        if dim == 0 {
            return Err(XStreamError::config(
                "projector",
                "output dimension must be positive",
            ));
        }
        let ensemble = ChainEnsemble::new(&config, dim, rng)?;
        let window = WindowController::new(config.window_size, config.scale_epsilon);
        Ok(Self {
            config,
            projector,
            window,
            ensemble,
        })
    }

    pub fn config(&self) -> &XStreamConfig {
        &self.config
    }

    pub fn projector(&self) -> &P {
        &self.projector
    }

    pub fn ensemble(&self) -> &ChainEnsemble {
        &self.ensemble
    }

    pub fn samples_seen(&self) -> u64 {
        self.window.samples_seen()
    }

    pub fn windows_completed(&self) -> u64 {
        self.window.windows_completed()
    }
}

impl<P: Projector> StreamingDetector for XStream<P> {
    fn fit_partial(&mut self, x: &[f64]) -> Result<()> {
        check_input(x, self.projector.input_dim())?;
        let z = self.projector.project_partial(x)?;
        check_input(&z, self.ensemble.dim())?;
        let scale = self.window.next_scale(&z)?;
        if let Some(scale) = &scale {
            check_input(scale, self.ensemble.dim())?;
        }

        // everything is validated; nothing below can fail
        self.ensemble.fit(&z)?;
        self.window.commit(z);
        if let Some(scale) = scale {
            // scale first, so the promoted sketch is read under its own window's scale
            self.ensemble.rescale(&scale)?;
            self.ensemble.rollover();
            debug!(
                window = self.window.windows_completed(),
                samples_seen = self.window.samples_seen(),
                reference_bins = self.ensemble.reference_bins(),
                "window rollover"
            );
        }
        Ok(())
    }

    fn score_partial(&self, x: &[f64]) -> Result<f64> {
        check_input(x, self.projector.input_dim())?;
        let z = self.projector.project(x)?;
        self.ensemble.score(&z)
    }
}
