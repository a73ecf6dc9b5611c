
pub use rustfft::num_complex as num_complex;
pub use rustfft::num_traits as num_traits;
/// Floating point type used for signal processing.
pub type Sample = f32;
/// Complex floating point type used for signal processing.
pub type ComplexSample = num_complex::Complex<Sample>;
/// Mathematical consts for the Sample type.
pub use std::f32::consts as sample_consts;

mod configuration;
use configuration::Parser;
mod demod;
mod filter;
mod mixer;
mod pipeline;
mod sampleio;
#[cfg(test)]
mod tone;

fn main() -> anyhow::Result<()> {
    let cli = configuration::Cli::parse();
    let config = configuration::Config::from_cli(&cli)?;

    eprintln!(
        "demodulating {} S/s IQ to {} S/s audio (decimation {})",
        config.samplerate, config.resamplerate, config.decimation
    );

    let mut source = sampleio::SampleSource::open(config.input.as_deref())?;
    let mut sink = sampleio::SampleSink::stdout();
    let mut pipeline = pipeline::DemodPipeline::new(&config)?;

    loop {
        let buffer = pipeline.prepare_input_buffer();
        let wanted = buffer.len();
        let got = source.read_samples(buffer)?;
        if got == 0 {
            break;
        }
        if got < wanted {
            eprintln!("short read: {} of {} samples", got, wanted);
        }
        sink.write_samples(pipeline.process(got))?;
        // Let a downstream consumer of the pipe run before we block on
        // the next read.
        std::thread::yield_now();
    }

    Ok(())
}
