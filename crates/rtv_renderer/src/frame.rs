//! Accumulation buffer for progressive rendering.

use rayon::prelude::*;
use rtv_core::Color;

/// Running sums of radiance samples with a per-pixel sample count, plus
/// optional per-strategy sums for bidirectional debugging.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    sums: Vec<Color>,
    counts: Vec<u32>,
    /// Side length of the `(s, t)` strategy grid; 0 when not recording
    strategy_side: usize,
    /// One strategy block per pixel, grouped by row
    strategies: Vec<Vec<Color>>,
}

/// Mutable view of one image row, handed to exactly one worker.
pub struct RowMut<'a> {
    pub y: u32,
    pub sums: &'a mut [Color],
    pub counts: &'a mut [u32],
    pub strategies: &'a mut [Color],
}

impl FrameBuffer {
    /// Create a new buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_strategies(width, height, 0)
    }

    /// Create a buffer that also tracks a `side x side` grid of strategy
    /// images per pixel.
    pub fn with_strategies(width: u32, height: u32, side: usize) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            sums: vec![Color::ZERO; pixels],
            counts: vec![0; pixels],
            strategy_side: side,
            strategies: (0..height)
                .map(|_| vec![Color::ZERO; width as usize * side * side])
                .collect(),
        }
    }

    pub fn strategy_side(&self) -> usize {
        self.strategy_side
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn sample_count(&self, x: u32, y: u32) -> u32 {
        self.counts[self.index(x, y)]
    }

    pub fn total_samples(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Mean radiance at (x, y); black before the first sample.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let i = self.index(x, y);
        mean(self.sums[i], self.counts[i])
    }

    /// Mean radiance of every pixel in row-major order.
    pub fn resolve(&self) -> Vec<Color> {
        self.sums
            .iter()
            .zip(&self.counts)
            .map(|(&sum, &count)| mean(sum, count))
            .collect()
    }

    /// Mean contribution of strategy `(s, t)` per pixel, if recorded.
    pub fn resolve_strategy(&self, s: usize, t: usize) -> Option<Vec<Color>> {
        let side = self.strategy_side;
        if s >= side || t >= side {
            return None;
        }

        let slot = strategy_slot(s, t, side);
        let image = self
            .strategies
            .iter()
            .flat_map(|row| row.chunks_exact(side * side).map(move |block| block[slot]))
            .zip(&self.counts)
            .map(|(sum, &count)| mean(sum, count))
            .collect();
        Some(image)
    }

    /// Rows for parallel accumulation.
    pub fn rows_mut(&mut self) -> impl IndexedParallelIterator<Item = RowMut<'_>> {
        let width = (self.width as usize).max(1);
        self.sums
            .par_chunks_mut(width)
            .zip(self.counts.par_chunks_mut(width))
            .zip(self.strategies.par_iter_mut())
            .enumerate()
            .map(|(y, ((sums, counts), strategies))| RowMut {
                y: y as u32,
                sums,
                counts,
                strategies: strategies.as_mut_slice(),
            })
    }
}

/// Index of strategy `(s, t)` inside one pixel's block.
#[inline]
pub fn strategy_slot(s: usize, t: usize, side: usize) -> usize {
    s * side + t
}

#[inline]
fn mean(sum: Color, count: u32) -> Color {
    if count == 0 {
        Color::ZERO
    } else {
        sum / count as f32
    }
}
