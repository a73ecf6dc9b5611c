//! Filter design

use anyhow::ensure;

use crate::Sample;

/// Design taps for a decimating low-pass FIR using the Kaiser window method.
///
/// The cutoff sits at half the decimated Nyquist rate, the kernel spans
/// 2 * factor * delay + 1 taps, and the result is normalized to unity gain
/// at DC so the passband level is preserved through decimation.
///
/// Fails on degenerate parameters; a broken kernel must stop the program
/// before any stream processing starts.
pub fn design_decimation_taps(
    factor: usize,
    delay: usize,
    attenuation_db: f64,
) -> anyhow::Result<Vec<Sample>> {
    ensure!(factor >= 1, "decimation factor must be >= 1");
    ensure!(delay >= 1, "filter delay must be >= 1 output sample");
    ensure!(
        attenuation_db > 0.0,
        "stop-band attenuation must be > 0 dB"
    );

    let length = 2 * factor * delay + 1;
    let cutoff = 0.5 / factor as f64;
    let beta = kaiser_beta(attenuation_db);

    let mut taps = (0..length)
        .map(|i| {
            let t = i as f64 - (length - 1) as f64 / 2.0;
            sinc(2.0 * cutoff * t) * kaiser(i, length, beta)
        })
        .collect::<Vec<f64>>();

    // Normalize to unity gain at DC
    let scaling = 1.0 / taps.iter().sum::<f64>();
    for value in taps.iter_mut() {
        *value *= scaling;
    }

    Ok(taps.into_iter().map(|tap| tap as Sample).collect())
}

/// sin(pi x) / (pi x), continuous at zero.
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = std::f64::consts::PI * x;
        px.sin() / px
    }
}

/// Kaiser shape parameter for a given stop-band attenuation.
fn kaiser_beta(attenuation_db: f64) -> f64 {
    if attenuation_db > 50.0 {
        0.1102 * (attenuation_db - 8.7)
    } else if attenuation_db > 21.0 {
        0.5842 * (attenuation_db - 21.0).powf(0.4) + 0.07886 * (attenuation_db - 21.0)
    } else {
        0.0
    }
}

/// Kaiser window value at position i of a length-n window.
fn kaiser(i: usize, n: usize, beta: f64) -> f64 {
    let r = 2.0 * i as f64 / (n - 1) as f64 - 1.0;
    bessel_i0(beta * (1.0 - r * r).sqrt()) / bessel_i0(beta)
}

/// Zeroth-order modified Bessel function of the first kind, as a power
/// series. Converges quickly for the beta values window design uses.
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut sum = 1.0;
    let mut term = 1.0;
    for k in 1..64 {
        let factor = half / k as f64;
        term *= factor * factor;
        sum += term;
        if term < sum * 1e-16 {
            break;
        }
    }
    sum
}
