//! Configuration for the tone recognition pipeline
//!
//! All DSP constants the pipeline depends on live here with their deployed
//! defaults, so parameters can be adjusted from a JSON file without
//! recompilation. The sample rate is fixed per deployment: callers must
//! resample their audio to `sample_rate` before invoking the pipeline.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Expected input sample rate in Hz
    pub sample_rate: u32,
    pub onset: OnsetConfig,
    pub gates: GateConfig,
    /// Minimum classifier confidence for a tone to be reported
    pub confidence_threshold: f32,
    pub tone: ToneConfig,
}

/// Onset detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnsetConfig {
    /// FFT size for the onset-strength spectrogram
    pub n_fft: usize,
    /// Hop size in samples; onset indices are reported in multiples of this
    pub hop_size: usize,
    /// Number of mel bands for the onset-strength envelope
    pub n_mels: usize,
    /// Peak-picking sensitivity: a peak must exceed the local mean by this much
    pub delta: f32,
    /// Minimum number of hops between accepted peaks
    pub wait: usize,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_size: 512,
            n_mels: 128,
            delta: 0.3,
            wait: 1,
        }
    }
}

/// Minimum-length gates applied to the post-onset segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Segments below this length (samples, ~50 ms) short-circuit the pipeline
    pub min_len_prefilter: usize,
    /// Segments below this length (samples, ~90 ms) skip tone classification
    pub min_len_tone: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_len_prefilter: 1024,
            min_len_tone: 2048,
        }
    }
}

/// Tone feature transform parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneConfig {
    /// FFT size for the tone mel spectrogram
    pub n_fft: usize,
    /// Hop size for the tone mel spectrogram
    pub hop_size: usize,
    /// Number of mel bands (also the height of the classifier input)
    pub n_mels: usize,
    /// Canonical classifier input resolution (width and height)
    pub image_size: usize,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_size: 512,
            n_mels: 128,
            image_size: 128,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            onset: OnsetConfig::default(),
            gates: GateConfig::default(),
            confidence_threshold: 0.7,
            tone: ToneConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file is missing or invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.onset.hop_size, 512);
        assert_eq!(config.gates.min_len_prefilter, 1024);
        assert_eq!(config.gates.min_len_tone, 2048);
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.tone.image_size, 128);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.sample_rate, config.sample_rate);
        assert_eq!(parsed.onset.delta, config.onset.delta);
        assert_eq!(parsed.gates.min_len_tone, config.gates.min_len_tone);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = PipelineConfig::load_from_file("/nonexistent/config.json");
        assert_eq!(config.sample_rate, 22050);
    }
}
