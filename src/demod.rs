//! FM discriminator.

use crate::{ComplexSample, Sample};

/// Recovers instantaneous frequency as the phase difference between
/// consecutive samples (quadrature discriminator).
///
/// The previous sample is kept across calls so a stream can be fed in
/// arbitrary blocks. The very first sample of a stream has no
/// predecessor; its conjugate product against the zero history is zero,
/// so the discriminator reports no deviation for it.
pub struct FreqDem {
    gain: Sample,
    previous: ComplexSample,
}

impl FreqDem {
    pub fn new(gain: Sample) -> FreqDem {
        FreqDem {
            gain,
            previous: ComplexSample::ZERO,
        }
    }

    /// Demodulate a block into `output`, one value per input sample.
    /// The nominal range is [-pi * gain, pi * gain]; no clamping happens
    /// here, the quantizer decides what to do with overshoots.
    pub fn process(&mut self, input: &[ComplexSample], output: &mut Vec<Sample>) {
        output.clear();
        output.reserve(input.len());
        for &sample in input {
            output.push((sample * self.previous.conj()).arg() * self.gain);
            self.previous = sample;
        }
    }
}
