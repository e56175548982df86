//! One random half-space partitioning scheme ("chain").
//!
//! A chain assigns a random feature to each of its `depth` levels. Walking
//! the levels in order, the first visit to a feature places it in a bin of
//! width `scale[f]` offset by a random `shift[f]`; every later visit to the
//! same feature halves the bin width by doubling its running coordinate.
//! The bin at level `d` is identified by the floored running coordinates of
//! all features visited at levels `0..=d`.

use rand::Rng;

use crate::error::{Result, XStreamError, check_input};
use crate::sketch::{BinKey, FrequencySketch, Generations, Phase};
use crate::window::clamp_half_range;

#[derive(Debug, Clone, Copy)]
struct Level {
    feature: usize,
    first_visit: bool,
    // touched[..n_touched] are the features visited at this level or above
    n_touched: usize,
}

#[derive(Debug, Clone)]
pub struct Chain {
    levels: Vec<Level>,
    touched: Vec<usize>,
    // draws in [0, 1), kept for the chain's lifetime so shift can follow scale
    unit: Vec<f64>,
    scale: Vec<f64>,
    shift: Vec<f64>,
    epsilon: f64,
    sketches: Generations,
}

impl Chain {
    /// Create a chain of `depth` levels over `scale.len()` features.
    ///
    /// Half-ranges within `epsilon` of zero are clamped to 1.0.
    pub fn new<R: Rng + ?Sized>(
        scale: &[f64],
        depth: usize,
        epsilon: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if depth == 0 {
            return Err(XStreamError::config("depth", "must be positive"));
        }
        if scale.is_empty() {
            return Err(XStreamError::config("scale", "must cover at least one feature"));
        }
        let dim = scale.len();

        let mut touched = Vec::new();
        let levels = (0..depth)
            .map(|_| {
                let feature = rng.random_range(0..dim);
                let first_visit = !touched.contains(&feature);
                if first_visit {
                    touched.push(feature);
                }
                Level {
                    feature,
                    first_visit,
                    n_touched: touched.len(),
                }
            })
            .collect();
        let unit: Vec<f64> = (0..dim).map(|_| rng.random::<f64>()).collect();

        let mut chain = Self {
            levels,
            touched,
            unit,
            scale: Vec::new(),
            shift: Vec::new(),
            epsilon,
            sketches: Generations::new(depth),
        };
        chain.apply_scale(scale);
        Ok(chain)
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn dim(&self) -> usize {
        self.unit.len()
    }

    /// Feature assigned to each level.
    pub fn feature_assignment(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.feature).collect()
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn shift(&self) -> &[f64] {
        &self.shift
    }

    pub fn unit(&self) -> &[f64] {
        &self.unit
    }

    pub fn phase(&self) -> Phase {
        self.sketches.phase()
    }

    pub fn reference(&self) -> &FrequencySketch {
        self.sketches.reference()
    }

    pub fn working(&self) -> &FrequencySketch {
        self.sketches.working()
    }

    /// Count `x` in this window's sketch.
    pub fn fit(&mut self, x: &[f64]) -> Result<()> {
        check_input(x, self.dim())?;
        self.record(x);
        Ok(())
    }

    pub(crate) fn record(&mut self, x: &[f64]) {
        let bins = self.bins(x);
        self.sketches.record(&bins);
    }

    /// Anomaly score of `x` against the reference sketch; larger is more anomalous.
    pub fn score(&self, x: &[f64]) -> Result<f64> {
        check_input(x, self.dim())?;
        Ok(self.score_unchecked(x))
    }

    pub fn score_batch(&self, xs: &[Vec<f64>]) -> Result<Vec<f64>> {
        for x in xs {
            check_input(x, self.dim())?;
        }
        Ok(xs.iter().map(|x| self.score_unchecked(x)).collect())
    }

    pub(crate) fn score_unchecked(&self, x: &[f64]) -> f64 {
        // min over d of log2(count * 2^d), kept in log space so deep chains cannot overflow
        let most_normal = self
            .reference_counts(x)
            .iter()
            .enumerate()
            .map(|(d, &count)| (1.0 + count as f64).log2() + (d + 1) as f64)
            .fold(f64::INFINITY, f64::min);
        -most_normal
    }

    /// Reference count of the bin `x` falls into, per level.
    pub fn bin_counts(&self, x: &[f64]) -> Result<Vec<u64>> {
        check_input(x, self.dim())?;
        Ok(self.reference_counts(x))
    }

    fn reference_counts(&self, x: &[f64]) -> Vec<u64> {
        let reference = self.sketches.reference();
        self.bins(x)
            .iter()
            .enumerate()
            .map(|(d, key)| reference.count(d, key))
            .collect()
    }

    /// Running coordinate of each level's feature, before flooring.
    pub fn coordinates(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_input(x, self.dim())?;
        let mut coords = Vec::with_capacity(self.depth());
        self.descend(x, |level, running| coords.push(running[level.feature]));
        Ok(coords)
    }

    /// Bin key of `x` at every level.
    pub fn bins(&self, x: &[f64]) -> Vec<BinKey> {
        let mut bins = Vec::with_capacity(self.depth());
        self.descend(x, |level, running| {
            bins.push(
                self.touched[..level.n_touched]
                    .iter()
                    .map(|&f| running[f].floor() as i64)
                    .collect(),
            )
        });
        bins
    }

    fn descend(&self, x: &[f64], mut visit: impl FnMut(&Level, &[f64])) {
        let mut running = vec![0.0; self.dim()];
        for level in &self.levels {
            let f = level.feature;
            running[f] = if level.first_visit {
                (x[f] + self.shift[f]) / self.scale[f]
            } else {
                2.0 * running[f] - self.shift[f] / self.scale[f]
            };
            visit(level, &running[..]);
        }
    }

    /// Replace the per-feature half-ranges; shifts follow from the stored unit draws.
    pub fn rescale(&mut self, scale: &[f64]) -> Result<()> {
        check_input(scale, self.dim())?;
        self.apply_scale(scale);
        Ok(())
    }

    pub(crate) fn apply_scale(&mut self, scale: &[f64]) {
        self.scale = scale
            .iter()
            .enumerate()
            .map(|(f, &s)| clamp_half_range(f, s, self.epsilon))
            .collect();
        self.shift = self
            .unit
            .iter()
            .zip(&self.scale)
            .map(|(u, s)| u * s)
            .collect();
    }

    /// Close the current window: working becomes reference.
    pub fn rollover(&mut self) {
        self.sketches.rollover();
    }
}
