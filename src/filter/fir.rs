//! Streaming decimating FIR execution.

use wide::f32x8;

use crate::{ComplexSample, Sample};

/// FIR decimator for complex samples.
///
/// Filtering runs at the input rate and one output is produced on the last
/// sample of every group of `factor` inputs, so a stream fed in arbitrary
/// block sizes yields exactly floor(total / factor) outputs, with any
/// partial group carried into the next call rather than dropped.
///
/// The delay line is kept as separate re/im planes so the dot product can
/// run eight lanes at a time.
pub struct Decimator {
    /// Taps in reverse time order, so one output is a forward dot product
    /// over the newest taps.len() inputs.
    taps_rev: Vec<Sample>,
    factor: usize,
    /// Inputs still to arrive before the next output.
    skip: usize,
    /// The last taps.len() - 1 inputs, plus whatever the current call
    /// has appended.
    re: Vec<Sample>,
    im: Vec<Sample>,
    output: Vec<ComplexSample>,
}

impl Decimator {
    pub fn new(taps: &[Sample], factor: usize) -> Decimator {
        assert!(factor >= 1);
        assert!(!taps.is_empty());
        let taps_rev: Vec<Sample> = taps.iter().rev().copied().collect();
        let history = taps_rev.len() - 1;
        Decimator {
            factor,
            skip: factor - 1,
            re: vec![0.0; history],
            im: vec![0.0; history],
            taps_rev,
            output: Vec::new(),
        }
    }

    /// Filter and decimate one block. State persists across calls, as if
    /// the concatenation of all blocks were filtered in one piece.
    pub fn process(&mut self, input: &[ComplexSample]) -> &[ComplexSample] {
        self.output.clear();
        self.re.reserve(input.len());
        self.im.reserve(input.len());
        for sample in input {
            self.re.push(sample.re);
            self.im.push(sample.im);
            if self.skip == 0 {
                let end = self.re.len();
                let start = end - self.taps_rev.len();
                self.output.push(ComplexSample::new(
                    dot(&self.taps_rev, &self.re[start..end]),
                    dot(&self.taps_rev, &self.im[start..end]),
                ));
                self.skip = self.factor;
            }
            self.skip -= 1;
        }
        // Keep exactly the history the next window needs.
        let cut = self.re.len() - (self.taps_rev.len() - 1);
        self.re.drain(..cut);
        self.im.drain(..cut);
        &self.output
    }
}

/// Dot product of two equal-length slices, eight lanes at a time.
fn dot(a: &[Sample], b: &[Sample]) -> Sample {
    let mut lanes = f32x8::splat(0.0);
    let mut chunks_a = a.chunks_exact(8);
    let mut chunks_b = b.chunks_exact(8);
    for (ca, cb) in chunks_a.by_ref().zip(chunks_b.by_ref()) {
        lanes += f32x8::from(<[Sample; 8]>::try_from(ca).unwrap())
            * f32x8::from(<[Sample; 8]>::try_from(cb).unwrap());
    }
    let mut sum = lanes.reduce_add();
    for (x, y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        sum += x * y;
    }
    sum
}
