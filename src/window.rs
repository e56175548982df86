//! Window bookkeeping: when to refresh scales, and what the new scales are.

use std::iter;

use tracing::trace;

use crate::error::{Result, check_input};

/// Half-range to use for feature `feature`; values within `epsilon` of zero become 1.0.
pub fn clamp_half_range(feature: usize, half_range: f64, epsilon: f64) -> f64 {
    if half_range.abs() <= epsilon {
        trace!(feature, half_range, "degenerate half-range, clamping to 1.0");
        1.0
    } else {
        half_range
    }
}

/// Per-feature `(max - min) / 2` over `window`, clamped as in [`clamp_half_range`].
///
/// Returns `None` for an empty window. Every vector must be finite and as
/// wide as the first.
pub fn window_scale(window: &[Vec<f64>], epsilon: f64) -> Result<Option<Vec<f64>>> {
    half_ranges(window.iter().map(Vec::as_slice), epsilon)
}

fn half_ranges<'a>(
    mut rows: impl Iterator<Item = &'a [f64]>,
    epsilon: f64,
) -> Result<Option<Vec<f64>>> {
    let Some(first) = rows.next() else {
        return Ok(None);
    };
    check_input(first, first.len())?;
    let mut max = first.to_vec();
    let mut min = first.to_vec();
    for x in rows {
        check_input(x, first.len())?;
        for (f, &v) in x.iter().enumerate() {
            max[f] = max[f].max(v);
            min[f] = min[f].min(v);
        }
    }
    // halve before subtracting: opposite-sign extremes would overflow otherwise
    Ok(Some(
        max.iter()
            .zip(&min)
            .enumerate()
            .map(|(f, (hi, lo))| clamp_half_range(f, hi / 2.0 - lo / 2.0, epsilon))
            .collect(),
    ))
}

/// Counts samples and buffers the current window of projected vectors.
#[derive(Debug, Clone)]
pub struct WindowController {
    window_size: usize,
    epsilon: f64,
    samples_seen: u64,
    windows_completed: u64,
    buffer: Vec<Vec<f64>>,
}

impl WindowController {
    pub fn new(window_size: usize, epsilon: f64) -> Self {
        Self {
            window_size,
            epsilon,
            samples_seen: 0,
            windows_completed: 0,
            buffer: Vec::with_capacity(window_size),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    pub fn windows_completed(&self) -> u64 {
        self.windows_completed
    }

    /// Vectors buffered since the last rollover.
    pub fn buffered(&self) -> &[Vec<f64>] {
        &self.buffer
    }

    /// Scale that observing `x` would produce, without observing it.
    ///
    /// `Ok(None)` unless `x` completes a window. Fails if `x` is non-finite or
    /// narrower or wider than the vectors already buffered.
    pub fn next_scale(&self, x: &[f64]) -> Result<Option<Vec<f64>>> {
        let width = self.buffer.first().map_or(x.len(), Vec::len);
        check_input(x, width)?;
        if (self.samples_seen + 1) % self.window_size as u64 != 0 {
            return Ok(None);
        }
        let rows = self.buffer.iter().map(Vec::as_slice).chain(iter::once(x));
        half_ranges(rows, self.epsilon)
    }

    /// Record one fitted sample.
    ///
    /// When this sample completes a window, the buffer is drained and the
    /// scale for the next reference generation is returned. On error nothing
    /// is recorded.
    pub fn observe(&mut self, x: Vec<f64>) -> Result<Option<Vec<f64>>> {
        let scale = self.next_scale(&x)?;
        self.commit(x);
        Ok(scale)
    }

    /// Record `x` after [`next_scale`](Self::next_scale) has accepted it.
    pub(crate) fn commit(&mut self, x: Vec<f64>) {
        self.samples_seen += 1;
        if self.samples_seen % self.window_size as u64 == 0 {
            self.buffer.clear();
            self.windows_completed += 1;
        } else {
            self.buffer.push(x);
        }
    }
}
