//! Everything between the raw IQ input and the quantized audio output.

use crate::configuration::Config;
use crate::demod::FreqDem;
use crate::filter;
use crate::mixer::FrequencyShifter;
use crate::{ComplexSample, Sample};

/// Stop-band attenuation of the decimation filter in dB.
const FILTER_ATTENUATION: f64 = 60.0;
/// Delay of the decimation filter in output-rate samples.
const FILTER_DELAY: usize = 8;

/// All demodulation stages and the buffers between them.
///
/// Owns every piece of state that must persist from one batch to the
/// next: oscillator phase, filter delay line and discriminator history
/// are threaded through process() and never reset while the stream lasts.
pub struct DemodPipeline {
    /// Oscillator mixer. None when no shift is configured; the samples
    /// then pass through at full precision.
    shifter: Option<FrequencyShifter>,
    /// Decimating low-pass filter. None when input and output rates match.
    decimator: Option<filter::Decimator>,
    demodulator: FreqDem,
    /// Raw samples of one batch are read into this buffer.
    input: Vec<ComplexSample>,
    audio: Vec<Sample>,
    pcm: Vec<i16>,
}

impl DemodPipeline {
    pub fn new(config: &Config) -> anyhow::Result<DemodPipeline> {
        let shifter = if config.shift != 0.0 {
            Some(FrequencyShifter::new(config.shift, config.batch_size))
        } else {
            None
        };
        let decimator = if config.decimation > 1 {
            let taps = filter::design_decimation_taps(
                config.decimation,
                FILTER_DELAY,
                FILTER_ATTENUATION,
            )?;
            Some(filter::Decimator::new(&taps, config.decimation))
        } else {
            None
        };
        Ok(DemodPipeline {
            shifter,
            decimator,
            demodulator: FreqDem::new(config.gain),
            input: vec![ComplexSample::ZERO; config.batch_size],
            audio: Vec::new(),
            pcm: Vec::new(),
        })
    }

    /// Buffer the next batch of raw samples should be read into.
    pub fn prepare_input_buffer(&mut self) -> &mut [ComplexSample] {
        &mut self.input
    }

    /// Run every stage over the first `count` samples of the input buffer
    /// and return the quantized output block. A short final batch is
    /// processed like any other; only unfinished decimation groups stay
    /// buffered in the filter.
    pub fn process(&mut self, count: usize) -> &[i16] {
        if let Some(shifter) = &mut self.shifter {
            shifter.process(&mut self.input[..count]);
        }
        let baseband: &[ComplexSample] = match &mut self.decimator {
            Some(decimator) => decimator.process(&self.input[..count]),
            None => &self.input[..count],
        };
        self.demodulator.process(baseband, &mut self.audio);
        quantize(&self.audio, &mut self.pcm);
        &self.pcm
    }
}

/// Convert to the 16-bit output format. Values beyond full scale saturate
/// at the rails instead of wrapping around.
fn quantize(audio: &[Sample], pcm: &mut Vec<i16>) {
    let full_scale = i16::MAX as Sample;
    pcm.clear();
    pcm.reserve(audio.len());
    for &value in audio {
        pcm.push((value * full_scale).round().clamp(-full_scale, full_scale) as i16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::ToneGenerator;

    fn config(decimation: usize, shift: Sample, batch_size: usize) -> Config {
        Config {
            samplerate: 48000 * decimation as u32,
            resamplerate: 48000,
            decimation,
            shift,
            gain: 0.5,
            batch_size,
            input: None,
        }
    }

    fn feed(pipeline: &mut DemodPipeline, samples: &[ComplexSample]) -> Vec<i16> {
        let buffer = pipeline.prepare_input_buffer();
        buffer[..samples.len()].copy_from_slice(samples);
        pipeline.process(samples.len()).to_vec()
    }

    #[test]
    fn rotating_unit_vector_end_to_end() {
        // Quarter cycle per sample at samplerate = resamplerate: constant
        // deviation of pi/2, scaled by the 0.5 gain and quantized.
        let input = [
            ComplexSample::new(1.0, 0.0),
            ComplexSample::new(0.0, 1.0),
            ComplexSample::new(-1.0, 0.0),
            ComplexSample::new(0.0, -1.0),
        ];
        let mut pipeline = DemodPipeline::new(&config(1, 0.0, 8)).unwrap();
        let output = feed(&mut pipeline, &input);
        let expected = (0.5 * std::f32::consts::FRAC_PI_2 * 32767.0).round() as i16;
        assert_eq!(output, [0, expected, expected, expected]);
    }

    #[test]
    fn batch_splits_do_not_change_output() {
        let signal = ToneGenerator::new(0.011).block(240);

        let mut whole = DemodPipeline::new(&config(3, 0.0, 240)).unwrap();
        let expected = feed(&mut whole, &signal);
        assert_eq!(expected.len(), 80);

        let mut split = DemodPipeline::new(&config(3, 0.0, 240)).unwrap();
        let mut collected = Vec::new();
        let mut rest: &[ComplexSample] = &signal;
        for chunk in [11usize, 64, 1, 100, 64] {
            let (head, tail) = rest.split_at(chunk);
            collected.extend_from_slice(&feed(&mut split, head));
            rest = tail;
        }
        // No-shift path: state threading makes this bit-exact.
        assert_eq!(collected, expected);
    }

    #[test]
    fn decimation_output_counts() {
        let mut pipeline = DemodPipeline::new(&config(4, 0.0, 64)).unwrap();
        let signal = ToneGenerator::new(0.02).block(10);
        // floor(10 / 4) outputs; the partial group waits for more input.
        assert_eq!(feed(&mut pipeline, &signal).len(), 2);
        let more = ToneGenerator::new(0.02).block(2);
        assert_eq!(feed(&mut pipeline, &more).len(), 1);
    }

    #[test]
    fn shifted_tone_demodulates_to_silence() {
        // A tone at the shift frequency mixed by the opposite shift lands
        // at DC, where the discriminator reads zero deviation.
        let signal = ToneGenerator::new(0.125).block(64);
        let mut pipeline = DemodPipeline::new(&config(1, -0.125, 64)).unwrap();
        let output = feed(&mut pipeline, &signal);
        for &value in &output[1..] {
            assert!(value.abs() <= 2, "expected silence, got {}", value);
        }
    }

    #[test]
    fn short_final_batch_is_processed_with_shift() {
        let signal = ToneGenerator::new(0.05).block(10);
        let mut pipeline = DemodPipeline::new(&config(1, 0.1, 64)).unwrap();
        // Fewer samples than the batch size must still produce output.
        assert_eq!(feed(&mut pipeline, &signal).len(), 10);
    }

    #[test]
    fn quantizer_boundaries() {
        let mut pcm = Vec::new();
        quantize(&[0.0, 1.0, -1.0, 1.5, -2.0, 0.5], &mut pcm);
        assert_eq!(pcm, [0, 32767, -32767, 32767, -32767, 16384]);
    }

    #[test]
    fn quantizer_rounds_to_nearest() {
        let mut pcm = Vec::new();
        quantize(&[1.4 / 32767.0, 1.6 / 32767.0, -1.6 / 32767.0], &mut pcm);
        assert_eq!(pcm, [1, 2, -2]);
    }
}
