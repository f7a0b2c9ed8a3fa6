// ToneFeatureTransform - segment to canonical log-mel image
//
// Computes a 128-band mel power spectrogram of the segment (same FFT/hop as
// feature extraction), converts it to decibels referenced to the segment's own
// peak, and bilinearly resizes the result to the classifier's fixed input
// resolution. The canonical resolution is required because the classifier's
// input shape is fixed at model-build time.

use ndarray::Array2;

use crate::config::ToneConfig;
use crate::dsp::{power_to_db, MelFilterbank, StftProcessor};
use crate::error::StageError;
use crate::segment::Segment;
use crate::tone::ToneImage;

/// ToneFeatureTransform produces fixed-size classifier input images
pub struct ToneFeatureTransform {
    stft: StftProcessor,
    filterbank: MelFilterbank,
    image_size: usize,
}

impl ToneFeatureTransform {
    /// Create a transform for the given sample rate and tone parameters
    pub fn new(sample_rate: u32, config: &ToneConfig) -> Self {
        Self {
            stft: StftProcessor::new(config.n_fft, config.hop_size),
            filterbank: MelFilterbank::new(sample_rate, config.n_fft, config.n_mels),
            image_size: config.image_size,
        }
    }

    /// Transform a segment into the canonical classifier input image
    ///
    /// # Arguments
    /// * `segment` - Post-onset segment (at least the tone minimum length)
    ///
    /// # Returns
    /// A `ToneImage` of exactly `image_size` x `image_size`, or a
    /// `StageError::FeatureExtraction` for degenerate input
    pub fn transform(&self, segment: &Segment) -> Result<ToneImage, StageError> {
        if segment.is_empty() {
            return Err(StageError::FeatureExtraction("empty segment".to_string()));
        }

        let power = self.stft.power_spectrogram(segment.samples());
        if power.dim().1 == 0 {
            return Err(StageError::FeatureExtraction(
                "segment produced no spectrogram frames".to_string(),
            ));
        }

        let mel_db = power_to_db(&self.filterbank.apply(&power));
        let image = resize_bilinear(&mel_db, self.image_size, self.image_size);

        if image.iter().any(|v| !v.is_finite()) {
            return Err(StageError::FeatureExtraction(
                "non-finite tone image".to_string(),
            ));
        }

        Ok(image)
    }
}

/// Bilinear resize of a 2-D array to the target resolution
fn resize_bilinear(input: &Array2<f32>, out_rows: usize, out_cols: usize) -> Array2<f32> {
    let (in_rows, in_cols) = input.dim();
    let mut output = Array2::<f32>::zeros((out_rows, out_cols));

    // Map output pixel centers onto input coordinates
    let row_scale = in_rows as f32 / out_rows as f32;
    let col_scale = in_cols as f32 / out_cols as f32;

    for r in 0..out_rows {
        let src_r = ((r as f32 + 0.5) * row_scale - 0.5).max(0.0);
        let r0 = (src_r.floor() as usize).min(in_rows - 1);
        let r1 = (r0 + 1).min(in_rows - 1);
        let rf = src_r - r0 as f32;

        for c in 0..out_cols {
            let src_c = ((c as f32 + 0.5) * col_scale - 0.5).max(0.0);
            let c0 = (src_c.floor() as usize).min(in_cols - 1);
            let c1 = (c0 + 1).min(in_cols - 1);
            let cf = src_c - c0 as f32;

            let top = input[[r0, c0]] * (1.0 - cf) + input[[r0, c1]] * cf;
            let bottom = input[[r1, c0]] * (1.0 - cf) + input[[r1, c1]] * cf;
            output[[r, c]] = top * (1.0 - rf) + bottom * rf;
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment;
    use ndarray::arr2;

    const SAMPLE_RATE: u32 = 22050;

    #[test]
    fn test_transform_yields_canonical_resolution() {
        let transform = ToneFeatureTransform::new(SAMPLE_RATE, &ToneConfig::default());
        let signal: Vec<f32> = (0..8192)
            .map(|i| {
                (2.0 * std::f32::consts::PI * 523.25 * i as f32 / SAMPLE_RATE as f32).sin()
            })
            .collect();

        let image = transform
            .transform(&segment::extract(&signal, 0))
            .unwrap();
        assert_eq!(image.dim(), (128, 128));
    }

    #[test]
    fn test_transform_values_bounded_by_db_range() {
        let transform = ToneFeatureTransform::new(SAMPLE_RATE, &ToneConfig::default());
        let signal: Vec<f32> = (0..8192)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / SAMPLE_RATE as f32).sin())
            .collect();

        let image = transform
            .transform(&segment::extract(&signal, 0))
            .unwrap();
        // dB relative to peak: everything in [-80, 0]
        assert!(image.iter().all(|&v| (-80.0..=0.0).contains(&v)));
    }

    #[test]
    fn test_empty_segment_fails() {
        let transform = ToneFeatureTransform::new(SAMPLE_RATE, &ToneConfig::default());
        let signal: Vec<f32> = vec![];
        assert!(transform.transform(&segment::extract(&signal, 0)).is_err());
    }

    #[test]
    fn test_transform_is_deterministic() {
        let transform = ToneFeatureTransform::new(SAMPLE_RATE, &ToneConfig::default());
        let signal: Vec<f32> = (0..4096)
            .map(|i| (2.0 * std::f32::consts::PI * 880.0 * i as f32 / SAMPLE_RATE as f32).sin())
            .collect();

        let a = transform.transform(&segment::extract(&signal, 0)).unwrap();
        let b = transform.transform(&segment::extract(&signal, 0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resize_identity() {
        let input = arr2(&[[1.0f32, 2.0], [3.0, 4.0]]);
        let output = resize_bilinear(&input, 2, 2);
        assert_eq!(output, input);
    }

    #[test]
    fn test_resize_constant_input_stays_constant() {
        let input = Array2::<f32>::from_elem((128, 5), 7.0);
        let output = resize_bilinear(&input, 128, 128);
        assert!(output.iter().all(|&v| (v - 7.0).abs() < 1e-5));
    }

    #[test]
    fn test_resize_upscale_interpolates_between_extremes() {
        let input = arr2(&[[0.0f32], [10.0]]);
        let output = resize_bilinear(&input, 4, 1);
        // Monotone ramp from the low to the high row
        assert!(output[[0, 0]] <= output[[1, 0]]);
        assert!(output[[1, 0]] <= output[[2, 0]]);
        assert!(output[[2, 0]] <= output[[3, 0]]);
        assert!(output.iter().all(|&v| (0.0..=10.0).contains(&v)));
    }
}
