//! The chain ensemble: many independent chains scored as one.

use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::chain::Chain;
use crate::config::XStreamConfig;
use crate::error::{Result, check_input};

#[derive(Debug, Clone)]
pub struct ChainEnsemble {
    chains: Vec<Chain>,
    dim: usize,
}

impl ChainEnsemble {
    /// Build `config.n_chains` chains of `config.depth` levels over `dim` features,
    /// each starting from the uniform half-range `config.initial_scale`.
    pub fn new<R: Rng + ?Sized>(config: &XStreamConfig, dim: usize, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let scale = vec![config.initial_scale; dim];
        let chains = (0..config.n_chains)
            .map(|_| Chain::new(&scale, config.depth, config.scale_epsilon, rng))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            n_chains = config.n_chains,
            depth = config.depth,
            dim,
            "built chain ensemble"
        );
        Ok(Self { chains, dim })
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn fit(&mut self, x: &[f64]) -> Result<()> {
        check_input(x, self.dim)?;
        self.chains.par_iter_mut().for_each(|chain| chain.record(x));
        Ok(())
    }

    /// Mean of the per-chain scores.
    pub fn score(&self, x: &[f64]) -> Result<f64> {
        check_input(x, self.dim)?;
        Ok(self.score_unchecked(x))
    }

    pub fn score_batch(&self, xs: &[Vec<f64>]) -> Result<Vec<f64>> {
        for x in xs {
            check_input(x, self.dim)?;
        }
        Ok(xs.iter().map(|x| self.score_unchecked(x)).collect())
    }

    fn score_unchecked(&self, x: &[f64]) -> f64 {
        // collect in chain order, then sum serially: the result must not depend on scheduling
        let per_chain: Vec<f64> = self
            .chains
            .par_iter()
            .map(|chain| chain.score_unchecked(x))
            .collect();
        per_chain.iter().sum::<f64>() / self.chains.len() as f64
    }

    pub fn rescale(&mut self, scale: &[f64]) -> Result<()> {
        check_input(scale, self.dim)?;
        self.chains
            .par_iter_mut()
            .for_each(|chain| chain.apply_scale(scale));
        Ok(())
    }

    /// Roll every chain over to its next window. Returns once all chains have.
    pub fn rollover(&mut self) {
        self.chains.par_iter_mut().for_each(Chain::rollover);
    }

    /// Populated reference bins across all chains and depths.
    pub fn reference_bins(&self) -> usize {
        self.chains.iter().map(|c| c.reference().len()).sum()
    }

    /// Populated working bins across all chains and depths.
    pub fn working_bins(&self) -> usize {
        self.chains.iter().map(|c| c.working().len()).sum()
    }
}
