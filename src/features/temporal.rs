// Temporal module - time-domain feature extraction
//
// Zero-crossing rate is computed framewise over the segment so that its mean
// matches the frame grid of the spectral statistics.

/// Temporal feature computation functions
pub struct TemporalFeatures {
    frame_length: usize,
    hop_size: usize,
}

impl TemporalFeatures {
    /// Create a new temporal features processor
    ///
    /// # Arguments
    /// * `frame_length` - Analysis frame length in samples
    /// * `hop_size` - Advance between frames in samples
    pub fn new(frame_length: usize, hop_size: usize) -> Self {
        Self {
            frame_length: frame_length.max(2),
            hop_size: hop_size.max(1),
        }
    }

    /// Compute zero-crossing rate of one frame
    ///
    /// Formula: ZCR = crossings / (N - 1)
    ///
    /// High ZCR indicates noise-like content, low ZCR tonal content.
    ///
    /// # Arguments
    /// * `frame` - Time-domain frame
    ///
    /// # Returns
    /// Zero-crossing rate (0.0 to 1.0)
    pub fn zcr(&self, frame: &[f32]) -> f32 {
        if frame.len() < 2 {
            return 0.0;
        }

        let mut crossings = 0usize;
        for pair in frame.windows(2) {
            if (pair[1] >= 0.0 && pair[0] < 0.0) || (pair[1] < 0.0 && pair[0] >= 0.0) {
                crossings += 1;
            }
        }

        crossings as f32 / (frame.len() - 1) as f32
    }

    /// Mean zero-crossing rate over all frames of a segment
    ///
    /// Frames start every `hop_size` samples; a trailing partial frame is
    /// included so short segments still produce a value.
    pub fn mean_zcr(&self, samples: &[f32]) -> f32 {
        if samples.len() < 2 {
            return 0.0;
        }

        let mut sum = 0.0f32;
        let mut count = 0usize;
        let mut start = 0usize;
        while start < samples.len() {
            let end = (start + self.frame_length).min(samples.len());
            sum += self.zcr(&samples[start..end]);
            count += 1;
            if end == samples.len() {
                break;
            }
            start += self.hop_size;
        }

        sum / count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zcr_of_silence_is_zero() {
        let temporal = TemporalFeatures::new(2048, 512);
        assert_eq!(temporal.zcr(&vec![0.0; 2048]), 0.0);
    }

    #[test]
    fn test_zcr_of_alternating_signal_is_one() {
        let temporal = TemporalFeatures::new(2048, 512);
        let signal: Vec<f32> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!((temporal.zcr(&signal) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_low_frequency_sine_has_low_zcr() {
        let temporal = TemporalFeatures::new(2048, 512);
        let sample_rate = 22050.0f32;
        let signal: Vec<f32> = (0..4096)
            .map(|i| (2.0 * std::f32::consts::PI * 100.0 * i as f32 / sample_rate).sin())
            .collect();
        // 100 Hz crosses zero 200 times per second: rate ~ 200/22050
        let zcr = temporal.mean_zcr(&signal);
        assert!(zcr < 0.05, "expected low ZCR for 100 Hz sine, got {}", zcr);
    }

    #[test]
    fn test_mean_zcr_short_input() {
        let temporal = TemporalFeatures::new(2048, 512);
        assert_eq!(temporal.mean_zcr(&[0.5]), 0.0);
        assert_eq!(temporal.mean_zcr(&[]), 0.0);
    }

    #[test]
    fn test_mean_zcr_in_unit_range() {
        let temporal = TemporalFeatures::new(2048, 512);
        let signal: Vec<f32> = (0..5000).map(|i| ((i * 7919) % 1000) as f32 - 500.0).collect();
        let zcr = temporal.mean_zcr(&signal);
        assert!((0.0..=1.0).contains(&zcr));
    }
}
