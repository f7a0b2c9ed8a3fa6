// Spectral module - framewise frequency-domain statistics
//
// Computes per-frame spectral centroid, bandwidth, and rolloff from magnitude
// spectra. The pre-filter consumes the mean of each statistic over all frames
// of the segment.

/// Spectral rolloff threshold (85% of spectral energy)
const ROLLOFF_THRESHOLD: f32 = 0.85;

/// Spectral feature computation functions
pub struct SpectralFeatures {
    sample_rate: u32,
    n_fft: usize,
}

impl SpectralFeatures {
    /// Create a new spectral features processor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `n_fft` - FFT size the spectra were computed with
    pub fn new(sample_rate: u32, n_fft: usize) -> Self {
        Self {
            sample_rate,
            n_fft,
        }
    }

    fn freq_bin_width(&self) -> f32 {
        self.sample_rate as f32 / self.n_fft as f32
    }

    /// Compute spectral centroid (weighted mean frequency) of one frame
    ///
    /// Formula: centroid = Σ(f_i × |X[i]|) / Σ|X[i]|
    ///
    /// # Arguments
    /// * `magnitudes` - Magnitude spectrum of a single frame
    ///
    /// # Returns
    /// Spectral centroid in Hz (0.0 for a silent frame)
    pub fn centroid(&self, magnitudes: &[f32]) -> f32 {
        let bin_width = self.freq_bin_width();

        let weighted_sum: f32 = magnitudes
            .iter()
            .enumerate()
            .map(|(i, &mag)| i as f32 * bin_width * mag)
            .sum();
        let magnitude_sum: f32 = magnitudes.iter().sum();

        if magnitude_sum > 1e-10 {
            weighted_sum / magnitude_sum
        } else {
            0.0
        }
    }

    /// Compute spectral bandwidth (second-order deviation around the centroid)
    ///
    /// Formula: bandwidth = sqrt(Σ(|X[i]| × (f_i - centroid)²) / Σ|X[i]|)
    ///
    /// # Arguments
    /// * `magnitudes` - Magnitude spectrum of a single frame
    /// * `centroid` - Centroid of the same frame, in Hz
    ///
    /// # Returns
    /// Spectral bandwidth in Hz (0.0 for a silent frame)
    pub fn bandwidth(&self, magnitudes: &[f32], centroid: f32) -> f32 {
        let bin_width = self.freq_bin_width();

        let weighted_sum: f32 = magnitudes
            .iter()
            .enumerate()
            .map(|(i, &mag)| {
                let deviation = i as f32 * bin_width - centroid;
                mag * deviation * deviation
            })
            .sum();
        let magnitude_sum: f32 = magnitudes.iter().sum();

        if magnitude_sum > 1e-10 {
            (weighted_sum / magnitude_sum).sqrt()
        } else {
            0.0
        }
    }

    /// Compute spectral rolloff (85% energy threshold frequency) of one frame
    ///
    /// # Arguments
    /// * `magnitudes` - Magnitude spectrum of a single frame
    ///
    /// # Returns
    /// Rolloff frequency in Hz (0.0 for a silent frame)
    pub fn rolloff(&self, magnitudes: &[f32]) -> f32 {
        let total_energy: f32 = magnitudes.iter().map(|&mag| mag * mag).sum();
        if total_energy < 1e-10 {
            return 0.0;
        }

        let threshold = ROLLOFF_THRESHOLD * total_energy;
        let bin_width = self.freq_bin_width();

        let mut cumulative = 0.0f32;
        for (i, &mag) in magnitudes.iter().enumerate() {
            cumulative += mag * mag;
            if cumulative >= threshold {
                return i as f32 * bin_width;
            }
        }

        (magnitudes.len() - 1) as f32 * bin_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_bin_spectrum(n_bins: usize, peak_bin: usize) -> Vec<f32> {
        let mut spectrum = vec![0.0f32; n_bins];
        spectrum[peak_bin] = 1.0;
        spectrum
    }

    #[test]
    fn test_centroid_of_single_bin() {
        let spectral = SpectralFeatures::new(22050, 2048);
        let spectrum = single_bin_spectrum(1025, 100);
        let expected = 100.0 * 22050.0 / 2048.0;
        assert!((spectral.centroid(&spectrum) - expected).abs() < 0.01);
    }

    #[test]
    fn test_centroid_of_silence_is_zero() {
        let spectral = SpectralFeatures::new(22050, 2048);
        assert_eq!(spectral.centroid(&vec![0.0; 1025]), 0.0);
    }

    #[test]
    fn test_bandwidth_of_single_bin_is_zero() {
        let spectral = SpectralFeatures::new(22050, 2048);
        let spectrum = single_bin_spectrum(1025, 100);
        let centroid = spectral.centroid(&spectrum);
        assert!(spectral.bandwidth(&spectrum, centroid) < 0.01);
    }

    #[test]
    fn test_bandwidth_grows_with_spread() {
        let spectral = SpectralFeatures::new(22050, 2048);

        let mut narrow = vec![0.0f32; 1025];
        narrow[99] = 1.0;
        narrow[100] = 1.0;
        narrow[101] = 1.0;

        let mut wide = vec![0.0f32; 1025];
        wide[50] = 1.0;
        wide[100] = 1.0;
        wide[150] = 1.0;

        let bw_narrow = spectral.bandwidth(&narrow, spectral.centroid(&narrow));
        let bw_wide = spectral.bandwidth(&wide, spectral.centroid(&wide));
        assert!(bw_wide > bw_narrow);
    }

    #[test]
    fn test_rolloff_of_single_bin() {
        let spectral = SpectralFeatures::new(22050, 2048);
        let spectrum = single_bin_spectrum(1025, 200);
        let expected = 200.0 * 22050.0 / 2048.0;
        assert!((spectral.rolloff(&spectrum) - expected).abs() < 0.01);
    }

    #[test]
    fn test_rolloff_ordering_by_frequency_content() {
        let spectral = SpectralFeatures::new(22050, 2048);
        let low = single_bin_spectrum(1025, 50);
        let high = single_bin_spectrum(1025, 800);
        assert!(spectral.rolloff(&high) > spectral.rolloff(&low));
    }
}
