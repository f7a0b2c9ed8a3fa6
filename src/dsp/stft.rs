// STFT module - centered short-time Fourier analysis
//
// Computes power spectrograms over Hann-windowed frames. Frames are centered:
// the signal is reflect-padded by n_fft/2 on both sides so that frame t is
// centered on sample t * hop_size, which keeps onset indices aligned with the
// hop grid.

use ndarray::Array2;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// STFT processor producing power spectrograms
pub struct StftProcessor {
    fft: Arc<dyn Fft<f32>>,
    n_fft: usize,
    hop_size: usize,
    /// Pre-computed Hann window (reduces spectral leakage)
    window: Vec<f32>,
}

impl StftProcessor {
    /// Create a new STFT processor
    ///
    /// # Arguments
    /// * `n_fft` - FFT frame size in samples
    /// * `hop_size` - Advance between consecutive frames in samples
    pub fn new(n_fft: usize, hop_size: usize) -> Self {
        let n_fft = n_fft.max(2);
        let hop_size = hop_size.max(1);

        let window = (0..n_fft)
            .map(|i| {
                0.5 * (1.0 - ((2.0 * std::f32::consts::PI * i as f32) / (n_fft as f32 - 1.0)).cos())
            })
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n_fft);

        Self {
            fft,
            n_fft,
            hop_size,
            window,
        }
    }

    /// Number of frequency bins per frame (positive frequencies only)
    pub fn n_freqs(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Compute the power spectrogram of a signal
    ///
    /// # Arguments
    /// * `samples` - Time-domain signal of any length
    ///
    /// # Returns
    /// Power spectrogram with shape `(n_freqs, n_frames)` where
    /// `n_frames = samples.len() / hop_size + 1`. Empty input yields zero frames.
    pub fn power_spectrogram(&self, samples: &[f32]) -> Array2<f32> {
        let n_freqs = self.n_freqs();
        if samples.is_empty() {
            return Array2::zeros((n_freqs, 0));
        }

        let n_frames = samples.len() / self.hop_size + 1;
        let mut power = Array2::<f32>::zeros((n_freqs, n_frames));

        let pad = self.n_fft / 2;
        let mut buffer = vec![Complex::new(0.0f32, 0.0f32); self.n_fft];
        let mut scratch = vec![Complex::new(0.0f32, 0.0f32); self.fft.get_inplace_scratch_len()];

        for frame_idx in 0..n_frames {
            // Frame is centered on frame_idx * hop_size in the original signal
            let start = frame_idx as isize * self.hop_size as isize - pad as isize;

            for (i, slot) in buffer.iter_mut().enumerate() {
                let sample = reflected_sample(samples, start + i as isize);
                *slot = Complex::new(sample * self.window[i], 0.0);
            }

            self.fft.process_with_scratch(&mut buffer, &mut scratch);

            for (bin, c) in buffer.iter().take(n_freqs).enumerate() {
                power[[bin, frame_idx]] = c.re * c.re + c.im * c.im;
            }
        }

        power
    }
}

/// Read a sample with reflect padding (mirror without repeating the edge)
fn reflected_sample(samples: &[f32], index: isize) -> f32 {
    let len = samples.len() as isize;
    if len == 1 {
        return samples[0];
    }

    let mut i = index;
    // Fold into [0, len) by mirroring around the endpoints
    let period = 2 * (len - 1);
    i = i.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    samples[i as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(sample_rate: u32, frequency: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_frame_count() {
        let stft = StftProcessor::new(2048, 512);
        let signal = vec![0.0f32; 4096];
        let power = stft.power_spectrogram(&signal);
        assert_eq!(power.dim(), (1025, 4096 / 512 + 1));
    }

    #[test]
    fn test_empty_input_yields_no_frames() {
        let stft = StftProcessor::new(2048, 512);
        let power = stft.power_spectrogram(&[]);
        assert_eq!(power.dim(), (1025, 0));
    }

    #[test]
    fn test_sine_peak_bin() {
        let sample_rate = 22050;
        let stft = StftProcessor::new(2048, 512);
        // 861 Hz sits exactly on bin 80 (861.33 = 80 * 22050 / 2048)
        let signal = sine(sample_rate, 80.0 * 22050.0 / 2048.0, 8192);
        let power = stft.power_spectrogram(&signal);

        // Check an interior frame, away from padding effects
        let frame = power.column(8);
        let peak_bin = frame
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap();
        assert!(
            (peak_bin as i64 - 80).abs() <= 1,
            "expected peak near bin 80, got {}",
            peak_bin
        );
    }

    #[test]
    fn test_silence_has_zero_power() {
        let stft = StftProcessor::new(2048, 512);
        let power = stft.power_spectrogram(&vec![0.0f32; 4096]);
        assert!(power.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_reflected_sample_mirrors() {
        let samples = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(reflected_sample(&samples, -1), 2.0);
        assert_eq!(reflected_sample(&samples, -2), 3.0);
        assert_eq!(reflected_sample(&samples, 4), 3.0);
        assert_eq!(reflected_sample(&samples, 5), 2.0);
        assert_eq!(reflected_sample(&samples, 0), 1.0);
    }

    #[test]
    fn test_short_input_does_not_panic() {
        let stft = StftProcessor::new(2048, 512);
        let power = stft.power_spectrogram(&[0.5]);
        assert_eq!(power.dim().1, 1);
        assert!(power.iter().all(|p| p.is_finite()));
    }
}
