
pub use clap::Parser;

use std::path::PathBuf;

use anyhow::ensure;

use crate::{sample_consts, Sample};

/// Demodulate FM from a signed 16-bit IQ sample stream.
///
/// Reads interleaved 16-bit (I, Q) pairs from standard input or a file,
/// optionally frequency-shifts and decimates them, and writes demodulated
/// signed 16-bit audio samples to standard output.
#[derive(Parser)]
pub struct Cli {
    /// Input data stream sample rate in Hz.
    #[arg(short = 's', long)]
    pub samplerate: u32,

    /// Output data stream sample rate in Hz.
    /// Must divide the input sample rate. Default is the input sample rate.
    #[arg(short = 'r', long)]
    pub resamplerate: Option<u32>,

    /// Input signal bandwidth in Hz.
    /// Accepted for compatibility; no channel filter is applied.
    #[arg(short = 'b', long)]
    pub bandwidth: Option<u32>,

    /// Frequency shift applied before decimation,
    /// as a fraction of the input sample rate.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub shift: Sample,

    /// FM deviation in Hz.
    /// If given, the discriminator gain becomes resamplerate / (2 pi deviation);
    /// otherwise the fixed constant 0.5 is used.
    #[arg(short = 'd', long)]
    pub deviation: Option<u32>,

    /// Read IQ samples from a file instead of standard input.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output samples produced per processed batch.
    #[arg(long, default_value_t = 8192)]
    pub batch_size: usize,
}

/// Validated settings derived from the command line once at startup.
pub struct Config {
    pub samplerate: u32,
    pub resamplerate: u32,
    /// Decimation factor samplerate / resamplerate, always >= 1.
    pub decimation: usize,
    /// Frequency shift as a fraction of the input sample rate, 0 = disabled.
    pub shift: Sample,
    /// Discriminator gain.
    pub gain: Sample,
    /// Complex input samples read per batch. A whole multiple of the
    /// decimation factor, so every full batch decimates to a whole number
    /// of output samples.
    pub batch_size: usize,
    pub input: Option<PathBuf>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Config> {
        ensure!(cli.samplerate > 0, "samplerate must be > 0");
        let resamplerate = cli.resamplerate.unwrap_or(cli.samplerate);
        ensure!(resamplerate > 0, "resamplerate must be > 0");
        ensure!(
            resamplerate <= cli.samplerate && cli.samplerate % resamplerate == 0,
            "resamplerate {} does not divide samplerate {}: \
             only integer decimation ratios are supported",
            resamplerate,
            cli.samplerate
        );
        if let Some(bandwidth) = cli.bandwidth {
            ensure!(bandwidth > 0, "bandwidth must be > 0 Hz");
            eprintln!("bandwidth {} Hz noted, no channel filter is applied", bandwidth);
        }
        ensure!(
            cli.shift.is_finite() && cli.shift.abs() < 0.5,
            "shift must be within (-0.5, 0.5) of the sample rate"
        );
        let gain = match cli.deviation {
            Some(deviation) => {
                ensure!(
                    deviation > 0 && deviation <= resamplerate / 2,
                    "deviation must be in 1..={} Hz (half the output rate)",
                    resamplerate / 2
                );
                resamplerate as Sample / (2.0 * sample_consts::PI * deviation as Sample)
            }
            // Compatibility default: fixed sensitivity, independent of any
            // configured deviation.
            None => 0.5,
        };
        ensure!(cli.batch_size > 0, "batch size must be > 0");
        let decimation = (cli.samplerate / resamplerate) as usize;
        Ok(Config {
            samplerate: cli.samplerate,
            resamplerate,
            decimation,
            shift: cli.shift,
            gain,
            batch_size: cli.batch_size * decimation,
            input: cli.input.clone(),
        })
    }
}
