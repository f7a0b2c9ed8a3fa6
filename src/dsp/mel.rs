// Mel module - perceptual frequency-axis processing
//
// Provides the triangular mel filterbank (HTK scale), decibel conversion
// referenced to the signal's own peak, and the orthonormal DCT-II used for
// cepstral coefficients.

use ndarray::Array2;

/// Noise floor used to avoid log(0)
const AMIN: f32 = 1e-10;

/// Dynamic range retained below the peak when converting to decibels
const TOP_DB: f32 = 80.0;

/// Triangular mel filterbank mapping FFT bins to mel bands
pub struct MelFilterbank {
    /// Filter weights, shape `(n_mels, n_freqs)`
    weights: Array2<f32>,
}

impl MelFilterbank {
    /// Build a filterbank for the given analysis parameters
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `n_fft` - FFT size the power spectrogram was computed with
    /// * `n_mels` - Number of mel bands
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let n_freqs = n_fft / 2 + 1;
        let f_max = sample_rate as f32 / 2.0;

        let mel_min = hz_to_mel(0.0);
        let mel_max = hz_to_mel(f_max);

        // n_mels + 2 edge frequencies define n_mels triangles
        let hz_points: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_min + i as f32 * (mel_max - mel_min) / (n_mels + 1) as f32))
            .collect();

        let bin_freq = |bin: usize| bin as f32 * sample_rate as f32 / n_fft as f32;

        let mut weights = Array2::<f32>::zeros((n_mels, n_freqs));
        for m in 0..n_mels {
            let (lower, center, upper) = (hz_points[m], hz_points[m + 1], hz_points[m + 2]);
            for bin in 0..n_freqs {
                let f = bin_freq(bin);
                let w = if f >= lower && f <= center && center > lower {
                    (f - lower) / (center - lower)
                } else if f > center && f <= upper && upper > center {
                    (upper - f) / (upper - center)
                } else {
                    0.0
                };
                weights[[m, bin]] = w;
            }
        }

        Self { weights }
    }

    pub fn n_mels(&self) -> usize {
        self.weights.dim().0
    }

    /// Apply the filterbank to a power spectrogram
    ///
    /// # Arguments
    /// * `power` - Power spectrogram, shape `(n_freqs, n_frames)`
    ///
    /// # Returns
    /// Mel power spectrogram, shape `(n_mels, n_frames)`
    pub fn apply(&self, power: &Array2<f32>) -> Array2<f32> {
        self.weights.dot(power)
    }
}

/// Convert a power spectrogram to decibels referenced to its own peak
///
/// Matches the usual `power_to_db(S, ref=max)` convention: output peaks at 0 dB
/// and is floored at -`TOP_DB` below the peak. A fully silent input comes out
/// as a constant 0 dB matrix (peak equals the noise floor).
pub fn power_to_db(power: &Array2<f32>) -> Array2<f32> {
    let reference = power.iter().cloned().fold(AMIN, f32::max);
    let ref_db = 10.0 * reference.log10();

    let mut db = power.mapv(|p| 10.0 * p.max(AMIN).log10() - ref_db);

    let peak = db.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let floor = peak - TOP_DB;
    db.mapv_inplace(|v| v.max(floor));
    db
}

/// Orthonormal DCT-II along the first axis, truncated to `n_out` coefficients
///
/// # Arguments
/// * `input` - Matrix of shape `(n, frames)`
/// * `n_out` - Number of leading coefficients to keep (cepstral order)
///
/// # Returns
/// Matrix of shape `(n_out, frames)`
pub fn dct_ii(input: &Array2<f32>, n_out: usize) -> Array2<f32> {
    let (n, frames) = input.dim();
    let n_out = n_out.min(n);
    let mut output = Array2::<f32>::zeros((n_out, frames));
    if n == 0 {
        return output;
    }

    let norm0 = (1.0 / n as f32).sqrt();
    let norm = (2.0 / n as f32).sqrt();

    // Pre-compute basis: basis[k][j] = cos(pi/n * (j + 0.5) * k)
    let mut basis = Array2::<f32>::zeros((n_out, n));
    for k in 0..n_out {
        let scale = if k == 0 { norm0 } else { norm };
        for j in 0..n {
            basis[[k, j]] = scale
                * (std::f32::consts::PI / n as f32 * (j as f32 + 0.5) * k as f32).cos();
        }
    }

    for t in 0..frames {
        let column = input.column(t);
        for k in 0..n_out {
            let mut acc = 0.0f32;
            for j in 0..n {
                acc += basis[[k, j]] * column[j];
            }
            output[[k, t]] = acc;
        }
    }

    output
}

/// Convert frequency in Hz to mel scale (HTK formula)
pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Convert mel scale to frequency in Hz (HTK formula)
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0f32.powf(mel / 2595.0) - 1.0)
}
