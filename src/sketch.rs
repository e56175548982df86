//! Per-depth bin frequency sketches and their two-generation lifecycle.

use std::collections::HashMap;
use std::mem;

/// Floored coordinates of every feature a chain has touched up to some depth.
pub type BinKey = Vec<i64>;

/// Occurrence counts per bin, one map per depth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencySketch {
    levels: Vec<HashMap<BinKey, u64>>,
}

impl FrequencySketch {
    pub fn new(depth: usize) -> Self {
        Self {
            levels: vec![HashMap::new(); depth],
        }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn increment(&mut self, depth: usize, key: &[i64]) {
        let level = &mut self.levels[depth];
        match level.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                level.insert(key.to_vec(), 1);
            }
        }
    }

    /// Count for `key` at `depth`; bins never seen count zero.
    pub fn count(&self, depth: usize, key: &[i64]) -> u64 {
        self.levels[depth].get(key).copied().unwrap_or(0)
    }

    /// Populated bins at one depth.
    pub fn depth_len(&self, depth: usize) -> usize {
        self.levels[depth].len()
    }

    /// Populated bins over all depths.
    pub fn len(&self) -> usize {
        self.levels.iter().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(HashMap::is_empty)
    }
}

/// Which sketch generations a fit writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No window has completed: fits land in both reference and working.
    Bootstrap,
    /// At least one rollover: fits land in working only.
    Steady,
}

/// Reference and working sketches of one chain.
#[derive(Debug, Clone)]
pub struct Generations {
    reference: FrequencySketch,
    working: FrequencySketch,
    phase: Phase,
}

impl Generations {
    pub fn new(depth: usize) -> Self {
        Self {
            reference: FrequencySketch::new(depth),
            working: FrequencySketch::new(depth),
            phase: Phase::Bootstrap,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Sketch scores are looked up against.
    pub fn reference(&self) -> &FrequencySketch {
        &self.reference
    }

    /// Sketch accumulating the current window.
    pub fn working(&self) -> &FrequencySketch {
        &self.working
    }

    /// Count one sample whose bin at depth `d` is `bins[d]`.
    pub fn record(&mut self, bins: &[BinKey]) {
        for (depth, key) in bins.iter().enumerate() {
            self.working.increment(depth, key);
            if self.phase == Phase::Bootstrap {
                self.reference.increment(depth, key);
            }
        }
    }

    /// Promote the working sketch to reference and start an empty one.
    pub fn rollover(&mut self) {
        let depth = self.working.depth();
        self.reference = mem::replace(&mut self.working, FrequencySketch::new(depth));
        self.phase = Phase::Steady;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_bins_count_zero() {
        let mut sketch = FrequencySketch::new(2);
        sketch.increment(1, &[3, -1]);
        sketch.increment(1, &[3, -1]);
        assert_eq!(sketch.count(1, &[3, -1]), 2);
        assert_eq!(sketch.count(1, &[3, 0]), 0);
        assert_eq!(sketch.count(0, &[3, -1]), 0);
        assert_eq!(sketch.len(), 1);
    }

    #[test]
    fn bootstrap_writes_both_generations() {
        let mut generations = Generations::new(2);
        generations.record(&[vec![0], vec![1]]);
        assert_eq!(generations.reference().count(0, &[0]), 1);
        assert_eq!(generations.working().count(1, &[1]), 1);
    }

    #[test]
    fn steady_writes_working_only() {
        let mut generations = Generations::new(1);
        generations.record(&[vec![7]]);
        generations.rollover();
        assert_eq!(generations.phase(), Phase::Steady);
        assert!(generations.working().is_empty());

        generations.record(&[vec![8]]);
        assert_eq!(generations.reference().count(0, &[8]), 0);
        assert_eq!(generations.reference().count(0, &[7]), 1);
        assert_eq!(generations.working().count(0, &[8]), 1);
    }

    #[test]
    fn rollover_discards_old_reference() {
        let mut generations = Generations::new(1);
        generations.record(&[vec![1]]);
        generations.rollover();
        generations.record(&[vec![2]]);
        generations.rollover();
        assert_eq!(generations.reference().count(0, &[1]), 0);
        assert_eq!(generations.reference().count(0, &[2]), 1);
        assert!(generations.working().is_empty());
        assert_eq!(generations.working().depth(), 1);
    }
}
