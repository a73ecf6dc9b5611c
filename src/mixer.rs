//! Quadrature frequency shifter.

use crate::{ComplexSample, Sample};

/// Wrap a phase into (-pi, pi].
fn wrap_phase(phase: f64) -> f64 {
    use std::f64::consts::PI;
    PI - (PI - phase).rem_euclid(2.0 * PI)
}

/// Mixes incoming samples with a numerically controlled oscillator to move
/// the signal of interest to the center of the band.
///
/// One batch worth of per-sample rotations is tabulated once, and each
/// batch is rotated by the tabulated phasors composed with the oscillator
/// phase reached at the end of the previous batch. The composition is the
/// angle-addition identity, so no per-sample sine or cosine is computed,
/// and the phase stays continuous across batch boundaries.
pub struct FrequencyShifter {
    /// Tabulated rotations exp(j i increment), one per sample of a batch.
    table: Vec<ComplexSample>,
    /// Oscillator phase at the start of the next batch, in (-pi, pi].
    phase: f64,
    /// Phase advance per sample in radians.
    increment: f64,
}

impl FrequencyShifter {
    /// shift is the oscillator frequency as a fraction of the sample rate.
    /// batch_size is the largest block process() will be given.
    pub fn new(shift: Sample, batch_size: usize) -> FrequencyShifter {
        let increment = 2.0 * std::f64::consts::PI * shift as f64;
        let mut phase: f64 = 0.0;
        let table = (0..batch_size)
            .map(|_| {
                let rotation = ComplexSample::new(phase.cos() as Sample, phase.sin() as Sample);
                phase = wrap_phase(phase + increment);
                rotation
            })
            .collect();
        FrequencyShifter {
            table,
            phase: 0.0,
            increment,
        }
    }

    /// Rotate a batch in place. The batch may be shorter than the tabulated
    /// size on a final short read; the phase advances by the actual count,
    /// so nothing is lost at end of stream.
    pub fn process(&mut self, samples: &mut [ComplexSample]) {
        assert!(samples.len() <= self.table.len());
        let start = ComplexSample::new(self.phase.cos() as Sample, self.phase.sin() as Sample);
        for (sample, rotation) in samples.iter_mut().zip(self.table.iter()) {
            *sample *= start * rotation;
        }
        self.phase = wrap_phase(self.phase + samples.len() as f64 * self.increment);
    }
}
