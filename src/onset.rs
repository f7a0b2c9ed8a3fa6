// OnsetDetector - locates the most recent attack in a complete clip
//
// Algorithm:
// 1. Compute a power mel spectrogram of the whole clip (n_fft 2048, hop 512)
// 2. Convert to decibels and take the framewise first-order difference,
//    half-wave rectified and averaged over mel bands (onset-strength envelope)
// 3. Peak-pick the envelope without backtracking: a frame is accepted when it
//    is a local maximum, exceeds the local mean by `delta`, and lies at least
//    `wait` hops after the previously accepted peak
// 4. Report the last accepted peak as a sample-domain index
//
// The detector holds no per-clip state; it can be shared behind a reference
// across concurrent recognition runs.

use ndarray::Array2;

use crate::config::OnsetConfig;
use crate::dsp::{power_to_db, MelFilterbank, StftProcessor};

/// Frames on each side that a peak must dominate
const PEAK_WINDOW: usize = 3;

/// Frames on each side contributing to the local mean threshold
const AVG_WINDOW: usize = 5;

/// OnsetDetector computes an onset-strength envelope and picks its peaks
pub struct OnsetDetector {
    stft: StftProcessor,
    filterbank: MelFilterbank,
    hop_size: usize,
    delta: f32,
    wait: usize,
}

impl OnsetDetector {
    /// Create a detector for the given sample rate with default parameters
    pub fn new(sample_rate: u32) -> Self {
        Self::with_config(sample_rate, &OnsetConfig::default())
    }

    /// Create a detector with explicit configuration parameters
    pub fn with_config(sample_rate: u32, config: &OnsetConfig) -> Self {
        let hop_size = config.hop_size.max(1);
        Self {
            stft: StftProcessor::new(config.n_fft, hop_size),
            filterbank: MelFilterbank::new(sample_rate, config.n_fft, config.n_mels),
            hop_size,
            delta: config.delta,
            wait: config.wait.max(1),
        }
    }

    /// Find the most recent onset in a clip
    ///
    /// # Arguments
    /// * `samples` - Complete waveform to analyze
    ///
    /// # Returns
    /// Sample index of the last detected onset, or `None` when the clip is
    /// empty, too short to frame, or contains no salient attack. Numerical
    /// degeneracies are logged and reported as "no onset", never propagated.
    pub fn detect_last(&self, samples: &[f32]) -> Option<usize> {
        if samples.is_empty() {
            return None;
        }

        let envelope = self.onset_strength(samples)?;
        let peaks = self.pick_peaks(&envelope);

        peaks.last().map(|&frame| frame * self.hop_size)
    }

    /// Compute the onset-strength envelope, indexed by spectrogram frame
    ///
    /// Entry `t` holds the rectified spectral increase from frame `t-1` to
    /// frame `t`, averaged over mel bands; entry 0 is zero by construction.
    fn onset_strength(&self, samples: &[f32]) -> Option<Vec<f32>> {
        let power = self.stft.power_spectrogram(samples);
        let n_frames = power.dim().1;
        if n_frames < 2 {
            return None;
        }

        let mel_db: Array2<f32> = power_to_db(&self.filterbank.apply(&power));
        let n_mels = mel_db.dim().0;

        let mut envelope = vec![0.0f32; n_frames];
        for t in 1..n_frames {
            let mut acc = 0.0f32;
            for m in 0..n_mels {
                acc += (mel_db[[m, t]] - mel_db[[m, t - 1]]).max(0.0);
            }
            envelope[t] = acc / n_mels as f32;
        }

        if envelope.iter().any(|v| !v.is_finite()) {
            log::warn!("[Onset] Non-finite onset-strength envelope; treating as no onset");
            return None;
        }

        Some(envelope)
    }

    /// Pick peaks in the onset-strength envelope
    ///
    /// # Returns
    /// Frame indices of accepted peaks, in increasing order
    fn pick_peaks(&self, envelope: &[f32]) -> Vec<usize> {
        let mut peaks = Vec::new();
        let n = envelope.len();
        let mut last_peak: Option<usize> = None;

        for i in 0..n {
            let value = envelope[i];

            // Local maximum over the peak window
            let lo = i.saturating_sub(PEAK_WINDOW);
            let hi = (i + PEAK_WINDOW + 1).min(n);
            if envelope[lo..hi].iter().any(|&v| v > value) {
                continue;
            }

            // Threshold against the local mean
            let lo = i.saturating_sub(AVG_WINDOW);
            let hi = (i + AVG_WINDOW + 1).min(n);
            let mean = envelope[lo..hi].iter().sum::<f32>() / (hi - lo) as f32;
            if value < mean + self.delta {
                continue;
            }

            // Minimum wait between accepted peaks
            if let Some(last) = last_peak {
                if i - last <= self.wait {
                    continue;
                }
            }

            peaks.push(i);
            last_peak = Some(i);
        }

        peaks
    }
}
