// FeatureExtractor - handcrafted feature vector for the pre-filter
//
// Computes, over the full post-onset segment with a fixed FFT size (2048) and
// hop size (512):
// - 13 cepstral coefficients, mean and standard deviation per coefficient
// - scalar means of spectral centroid, zero-crossing rate, spectral bandwidth,
//   and spectral rolloff
//
// The concatenation order is a hard contract: the pre-filter's normalization
// parameters were fit on exactly this layout, and a silent reordering degrades
// accuracy without raising an error.
//
// Layout: [mfcc_mean[0..13] | mfcc_std[0..13] | centroid | zcr | bandwidth | rolloff]

mod mfcc;
mod spectral;
mod temporal;

use crate::dsp::StftProcessor;
use crate::error::StageError;
use crate::segment::Segment;
use mfcc::{row_means, row_stds, MfccExtractor};
use spectral::SpectralFeatures;
use temporal::TemporalFeatures;

/// FFT size for feature extraction
const N_FFT: usize = 2048;

/// Hop size for feature extraction
const HOP_SIZE: usize = 512;

/// Number of cepstral coefficients
const N_MFCC: usize = 13;

/// Number of mel bands in the MFCC intermediate spectrogram
const N_MELS: usize = 128;

/// Total feature vector length (13 means + 13 stds + 4 scalar statistics)
pub const FEATURE_DIM: usize = 2 * N_MFCC + 4;

/// Fixed-length feature vector in contract order
pub type FeatureVector = [f32; FEATURE_DIM];

/// FeatureExtractor coordinates the handcrafted feature pipeline
pub struct FeatureExtractor {
    stft: StftProcessor,
    mfcc: MfccExtractor,
    spectral: SpectralFeatures,
    temporal: TemporalFeatures,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor for the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self {
            stft: StftProcessor::new(N_FFT, HOP_SIZE),
            mfcc: MfccExtractor::new(sample_rate, N_FFT, N_MELS, N_MFCC),
            spectral: SpectralFeatures::new(sample_rate, N_FFT),
            temporal: TemporalFeatures::new(N_FFT, HOP_SIZE),
        }
    }

    /// Extract the feature vector from a segment
    ///
    /// # Arguments
    /// * `segment` - Post-onset segment (at least the pre-filter minimum length)
    ///
    /// # Returns
    /// The 30-dimensional feature vector, or `StageError::FeatureExtraction`
    /// for degenerate input (empty segment, non-finite results)
    pub fn extract(&self, segment: &Segment) -> Result<FeatureVector, StageError> {
        if segment.is_empty() {
            return Err(StageError::FeatureExtraction("empty segment".to_string()));
        }

        let power = self.stft.power_spectrogram(segment.samples());
        let n_frames = power.dim().1;
        if n_frames == 0 {
            return Err(StageError::FeatureExtraction(
                "segment produced no analysis frames".to_string(),
            ));
        }

        let mfcc_matrix = self.mfcc.compute(&power);
        let mfcc_means = row_means(&mfcc_matrix);
        let mfcc_stds = row_stds(&mfcc_matrix, &mfcc_means);

        // Framewise spectral statistics, averaged over the segment
        let mut centroid_sum = 0.0f32;
        let mut bandwidth_sum = 0.0f32;
        let mut rolloff_sum = 0.0f32;
        let mut magnitudes = vec![0.0f32; power.dim().0];
        for t in 0..n_frames {
            for (bin, slot) in magnitudes.iter_mut().enumerate() {
                *slot = power[[bin, t]].sqrt();
            }
            let centroid = self.spectral.centroid(&magnitudes);
            centroid_sum += centroid;
            bandwidth_sum += self.spectral.bandwidth(&magnitudes, centroid);
            rolloff_sum += self.spectral.rolloff(&magnitudes);
        }
        let centroid_mean = centroid_sum / n_frames as f32;
        let bandwidth_mean = bandwidth_sum / n_frames as f32;
        let rolloff_mean = rolloff_sum / n_frames as f32;

        let zcr_mean = self.temporal.mean_zcr(segment.samples());

        let mut features = [0.0f32; FEATURE_DIM];
        features[..N_MFCC].copy_from_slice(&mfcc_means);
        features[N_MFCC..2 * N_MFCC].copy_from_slice(&mfcc_stds);
        features[2 * N_MFCC] = centroid_mean;
        features[2 * N_MFCC + 1] = zcr_mean;
        features[2 * N_MFCC + 2] = bandwidth_mean;
        features[2 * N_MFCC + 3] = rolloff_mean;

        if features.iter().any(|v| !v.is_finite()) {
            return Err(StageError::FeatureExtraction(
                "non-finite feature values".to_string(),
            ));
        }

        Ok(features)
    }
}
