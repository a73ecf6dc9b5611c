//! Raw sample stream I/O.
//!
//! The input is a headerless stream of interleaved native-endian signed
//! 16-bit (I, Q) pairs; the output is the same integer format with one
//! value per demodulated sample.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Stdout, Write};
use std::path::Path;

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};

use crate::{ComplexSample, Sample};

/// Bytes of one interleaved (I, Q) pair on the wire.
const BYTES_PER_PAIR: usize = 2 * std::mem::size_of::<i16>();

/// Blocking reader of 16-bit IQ pairs from standard input or a file.
pub struct SampleSource {
    reader: Box<dyn Read>,
    /// Raw bytes of one batch, resized on demand.
    bytes: Vec<u8>,
}

impl SampleSource {
    pub fn open(path: Option<&Path>) -> io::Result<SampleSource> {
        let reader: Box<dyn Read> = match path {
            Some(path) => Box::new(BufReader::new(File::open(path)?)),
            None => Box::new(io::stdin().lock()),
        };
        Ok(SampleSource::from_reader(reader))
    }

    fn from_reader(reader: Box<dyn Read>) -> SampleSource {
        SampleSource {
            reader,
            bytes: Vec::new(),
        }
    }

    /// Read up to buffer.len() complex samples, blocking until the stream
    /// delivers them or ends. Samples are scaled to [-1.0, 1.0].
    /// Returns the number of whole samples read; 0 means end of stream.
    pub fn read_samples(&mut self, buffer: &mut [ComplexSample]) -> io::Result<usize> {
        self.bytes.resize(buffer.len() * BYTES_PER_PAIR, 0);
        let mut filled = 0;
        while filled < self.bytes.len() {
            match self.reader.read(&mut self.bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        if filled % BYTES_PER_PAIR != 0 {
            // A truncated trailing pair cannot form a sample.
            eprintln!(
                "end of stream inside a sample, {} bytes ignored",
                filled % BYTES_PER_PAIR
            );
        }
        let samples = filled / BYTES_PER_PAIR;

        let scale = 1.0 / i16::MAX as Sample;
        let mut pairs = &self.bytes[..samples * BYTES_PER_PAIR];
        for slot in buffer[..samples].iter_mut() {
            let i = pairs.read_i16::<NativeEndian>()?;
            let q = pairs.read_i16::<NativeEndian>()?;
            *slot = ComplexSample::new(i as Sample * scale, q as Sample * scale);
        }
        Ok(samples)
    }
}

/// Writer of demodulated 16-bit audio samples.
pub struct SampleSink<W> {
    writer: W,
}

impl SampleSink<BufWriter<Stdout>> {
    pub fn stdout() -> SampleSink<BufWriter<Stdout>> {
        SampleSink {
            writer: BufWriter::new(io::stdout()),
        }
    }
}

impl<W: Write> SampleSink<W> {
    /// Write one output block and flush it, so a consumer reading the same
    /// pipe hears the audio without waiting for the next batch.
    pub fn write_samples(&mut self, samples: &[i16]) -> io::Result<()> {
        for &sample in samples {
            self.writer.write_i16::<NativeEndian>(sample)?;
        }
        self.writer.flush()
    }
}
