// MFCC module - mel-frequency cepstral coefficients over a segment
//
// The cepstral matrix is the orthonormal DCT-II of the dB-scaled mel power
// spectrogram, truncated to the leading coefficients. The pre-filter consumes
// per-coefficient means and standard deviations across frames.

use ndarray::Array2;

use crate::dsp::{dct_ii, power_to_db, MelFilterbank};

/// MFCC computation over pre-computed power spectrograms
pub struct MfccExtractor {
    filterbank: MelFilterbank,
    n_mfcc: usize,
}

impl MfccExtractor {
    /// Create a new MFCC extractor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `n_fft` - FFT size the power spectrograms use
    /// * `n_mels` - Number of mel bands in the intermediate spectrogram
    /// * `n_mfcc` - Number of cepstral coefficients to keep
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize, n_mfcc: usize) -> Self {
        Self {
            filterbank: MelFilterbank::new(sample_rate, n_fft, n_mels),
            n_mfcc,
        }
    }

    /// Compute the cepstral matrix of a power spectrogram
    ///
    /// # Arguments
    /// * `power` - Power spectrogram, shape `(n_freqs, n_frames)`
    ///
    /// # Returns
    /// MFCC matrix, shape `(n_mfcc, n_frames)`
    pub fn compute(&self, power: &Array2<f32>) -> Array2<f32> {
        let mel_db = power_to_db(&self.filterbank.apply(power));
        dct_ii(&mel_db, self.n_mfcc)
    }
}

/// Per-row mean over a matrix of shape `(rows, frames)`
pub fn row_means(matrix: &Array2<f32>) -> Vec<f32> {
    let frames = matrix.dim().1.max(1) as f32;
    matrix
        .rows()
        .into_iter()
        .map(|row| row.sum() / frames)
        .collect()
}

/// Per-row population standard deviation over a matrix of shape `(rows, frames)`
pub fn row_stds(matrix: &Array2<f32>, means: &[f32]) -> Vec<f32> {
    let frames = matrix.dim().1.max(1) as f32;
    matrix
        .rows()
        .into_iter()
        .zip(means)
        .map(|(row, &mean)| {
            let var = row.iter().map(|&v| (v - mean) * (v - mean)).sum::<f32>() / frames;
            var.sqrt()
        })
        .collect()
}
