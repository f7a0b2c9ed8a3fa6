// Pipeline - end-to-end tone recognition with the decision policy
//
// Stages run in a fixed order: onset detection, segmentation with length
// gates, optional instrument pre-filtering, tone classification with a
// confidence threshold. Every clip produces exactly one well-formed outcome;
// stage failures are logged and folded into negative outcomes rather than
// propagated, so one bad clip can never take the service down.

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::context::ModelContext;
use crate::features::FeatureExtractor;
use crate::labels;
use crate::onset::OnsetDetector;
use crate::prefilter::{PreFilter, PreFilterVerdict};
use crate::segment::{self, GateDecision};
use crate::tone::ToneClassifier;

/// Fixed outcome messages of the decision policy
pub mod messages {
    pub const NO_ONSET: &str = "silence or no salient attack";
    pub const TOO_SHORT: &str = "too short after onset";
    pub const NOT_TARGET: &str = "not the target instrument";
    pub const NOT_PLAUSIBLE: &str = "not plausible instrument";
    pub const SHORT_FOR_TONE_FILTERED: &str =
        "instrument detected but segment too short for tone classification";
    pub const SHORT_FOR_TONE: &str = "segment too short for tone classification";
    pub const RECOGNIZED: &str = "recognized";
    pub const LOW_CONFIDENCE: &str = "low-confidence tone";
}

/// A decoded mono audio clip
#[derive(Debug, Clone)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }
}

/// Final result of one recognition run
///
/// `tone` is a label name when a tone was recognized, `"None"` for every
/// negative outcome, and `"Error"` only for malformed input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    pub tone: String,
    pub confidence: f32,
    pub message: String,
}

impl PipelineOutcome {
    fn recognized(tone: &str, confidence: f32) -> Self {
        Self {
            tone: tone.to_string(),
            confidence,
            message: messages::RECOGNIZED.to_string(),
        }
    }

    fn none(message: &str) -> Self {
        Self {
            tone: "None".to_string(),
            confidence: 0.0,
            message: message.to_string(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            tone: "Error".to_string(),
            confidence: 0.0,
            message,
        }
    }
}

/// The assembled recognition pipeline
///
/// Construction wires every stage from one configuration and one model
/// context; the result is immutable and shareable across threads.
pub struct Pipeline {
    config: PipelineConfig,
    onset_detector: OnsetDetector,
    feature_extractor: FeatureExtractor,
    tone_classifier: ToneClassifier,
    pre_filter: Option<PreFilter>,
}

impl Pipeline {
    /// Build a pipeline from configuration and loaded models
    pub fn new(config: PipelineConfig, context: ModelContext) -> Self {
        let (tone_model, pre_filter) = context.into_parts();
        Self {
            onset_detector: OnsetDetector::with_config(config.sample_rate, &config.onset),
            feature_extractor: FeatureExtractor::new(config.sample_rate),
            tone_classifier: ToneClassifier::new(config.sample_rate, &config.tone, tone_model),
            pre_filter,
            config,
        }
    }

    /// Whether the instrument pre-filter stage is active
    pub fn has_pre_filter(&self) -> bool {
        self.pre_filter.is_some()
    }

    /// Run the full recognition pipeline on one clip
    ///
    /// # Arguments
    /// * `waveform` - Complete mono clip at the configured sample rate
    ///
    /// # Returns
    /// Always a well-formed outcome; stage failures downgrade to negative
    /// outcomes and only malformed input yields the `Error` tone
    pub fn recognize(&self, waveform: &Waveform) -> PipelineOutcome {
        if waveform.sample_rate != self.config.sample_rate {
            return PipelineOutcome::error(format!(
                "expected {} Hz input, got {} Hz",
                self.config.sample_rate, waveform.sample_rate
            ));
        }

        let onset = match self.onset_detector.detect_last(&waveform.samples) {
            Some(onset) => onset,
            None => {
                log::debug!("[Pipeline] No onset detected");
                return PipelineOutcome::none(messages::NO_ONSET);
            }
        };

        let segment = segment::extract(&waveform.samples, onset);
        let gate = GateDecision::for_len(segment.len(), &self.config.gates);
        log::debug!(
            "[Pipeline] Onset at sample {}, segment of {} samples, gate {:?}",
            onset,
            segment.len(),
            gate
        );

        if gate == GateDecision::TooShort {
            return PipelineOutcome::none(messages::TOO_SHORT);
        }

        // A feature-extraction failure while the pre-filter is active means the
        // plausibility of the segment cannot be judged at all.
        let verdict = match &self.pre_filter {
            None => None,
            Some(filter) => Some(match self.feature_extractor.extract(&segment) {
                Ok(features) => filter.verdict(&features),
                Err(err) => {
                    log::warn!("[Pipeline] Feature extraction failed: {}", err);
                    PreFilterVerdict::Indeterminate
                }
            }),
        };

        match verdict {
            Some(PreFilterVerdict::Outlier) => return PipelineOutcome::none(messages::NOT_TARGET),
            Some(PreFilterVerdict::Indeterminate) => {
                return PipelineOutcome::none(messages::NOT_PLAUSIBLE)
            }
            Some(PreFilterVerdict::Inlier) | None => {}
        }

        if gate == GateDecision::PreFilterOnly {
            let message = if verdict.is_some() {
                messages::SHORT_FOR_TONE_FILTERED
            } else {
                messages::SHORT_FOR_TONE
            };
            return PipelineOutcome::none(message);
        }

        match self.tone_classifier.classify(&segment) {
            Ok(result) if result.confidence >= self.config.confidence_threshold => {
                match labels::tone_name(result.label) {
                    Some(name) => {
                        log::info!(
                            "[Pipeline] Recognized {} with confidence {:.3}",
                            name,
                            result.confidence
                        );
                        PipelineOutcome::recognized(name, result.confidence)
                    }
                    None => {
                        log::warn!("[Pipeline] Classifier produced invalid label {}", result.label);
                        PipelineOutcome::none(messages::LOW_CONFIDENCE)
                    }
                }
            }
            Ok(result) => {
                log::debug!(
                    "[Pipeline] Confidence {:.3} below threshold {:.3}",
                    result.confidence,
                    self.config.confidence_threshold
                );
                PipelineOutcome::none(messages::LOW_CONFIDENCE)
            }
            Err(err) => {
                log::warn!("[Pipeline] Tone classification failed: {}", err);
                PipelineOutcome::none(messages::LOW_CONFIDENCE)
            }
        }
    }
}
