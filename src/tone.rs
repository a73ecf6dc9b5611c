//! Fixed-frequency complex tone generator, useful for testing.

use crate::{ComplexSample, Sample};

pub struct ToneGenerator {
    /// Phase accumulator.
    phase: Sample,
    /// Phase advance in radians per sample.
    step: Sample,
}

impl ToneGenerator {
    /// frequency is in cycles per sample.
    pub fn new(frequency: Sample) -> ToneGenerator {
        ToneGenerator {
            phase: 0.0,
            step: 2.0 * std::f32::consts::PI * frequency,
        }
    }

    pub fn sample(&mut self) -> ComplexSample {
        let result = ComplexSample::new(self.phase.cos(), self.phase.sin());
        self.phase = (self.phase + self.step).rem_euclid(2.0 * std::f32::consts::PI);
        result
    }

    pub fn block(&mut self, length: usize) -> Vec<ComplexSample> {
        (0..length).map(|_| self.sample()).collect()
    }
}
