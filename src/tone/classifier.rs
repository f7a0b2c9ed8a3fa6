// ToneClassifier - learned multi-label tone classification
//
// The inference backend sits behind the ToneModel trait so the decision logic
// can be exercised with deterministic stub models in tests. The production
// implementation wraps an ONNX Runtime session: input is a single-channel
// image batch of one `[1, H, W, 1]`, output is a vector of 17 per-class
// activations.

use std::path::Path;
use std::sync::{Arc, Mutex};

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;

use crate::config::ToneConfig;
use crate::error::{ModelLoadError, StageError};
use crate::labels::NUM_TONES;
use crate::segment::Segment;
use crate::tone::{ToneFeatureTransform, ToneImage};

/// Result of a successful tone inference
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ClassificationResult {
    /// Predicted class index, always a valid label table index (0..=16)
    pub label: usize,
    /// Maximum activation of the output distribution, clamped to [0, 1]
    pub confidence: f32,
}

/// Inference seam for the tone classifier
///
/// Implementations must be shareable across concurrent pipeline runs.
pub trait ToneModel: Send + Sync {
    /// Run inference on a canonical tone image
    ///
    /// # Returns
    /// The raw per-class activation vector (length 17)
    fn activations(&self, image: &ToneImage) -> Result<Vec<f32>, StageError>;
}

/// ONNX Runtime-backed tone model
pub struct OnnxToneModel {
    // Session::run needs exclusive access; the lock serializes inference
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxToneModel {
    /// Load the tone model from an ONNX file
    ///
    /// # Arguments
    /// * `path` - Path to the serialized classifier graph
    ///
    /// # Returns
    /// The loaded model, or `ModelLoadError::ToneModel` (fatal to the pipeline)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let load = |path: &Path| -> Result<Session, ort::Error> {
            Session::builder()?
                .with_optimization_level(GraphOptimizationLevel::Level3)?
                .commit_from_file(path)
        };

        let session = load(path.as_ref()).map_err(|source| ModelLoadError::ToneModel {
            path: path.as_ref().display().to_string(),
            source,
        })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input".to_string());
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| "output".to_string());

        log::info!(
            "[ToneModel] Loaded ONNX model from {:?} (input={}, output={})",
            path.as_ref(),
            input_name,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl ToneModel for OnnxToneModel {
    fn activations(&self, image: &ToneImage) -> Result<Vec<f32>, StageError> {
        let (rows, cols) = image.dim();
        let data: Vec<f32> = image.iter().copied().collect();
        let tensor = Tensor::from_array(([1usize, rows, cols, 1usize], data))?;

        let mut session = self.session.lock().map_err(|_| {
            StageError::ToneInference("inference session lock poisoned".to_string())
        })?;

        let outputs = session.run(ort::inputs![self.input_name.as_str() => tensor])?;
        let (_, values) = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;

        Ok(values.to_vec())
    }
}

/// ToneClassifier combines the feature transform and the learned model
pub struct ToneClassifier {
    transform: ToneFeatureTransform,
    model: Arc<dyn ToneModel>,
}

impl ToneClassifier {
    /// Create a classifier from a transform configuration and a model backend
    pub fn new(sample_rate: u32, config: &ToneConfig, model: Arc<dyn ToneModel>) -> Self {
        Self {
            transform: ToneFeatureTransform::new(sample_rate, config),
            model,
        }
    }

    /// Classify a segment into a tone class with a confidence score
    ///
    /// # Arguments
    /// * `segment` - Post-onset segment of at least the tone minimum length
    ///
    /// # Returns
    /// The argmax class and its activation value, or a `StageError` when the
    /// transform or inference fails or the activation vector is unusable
    pub fn classify(&self, segment: &Segment) -> Result<ClassificationResult, StageError> {
        let image = self.transform.transform(segment)?;
        let activations = self.model.activations(&image)?;

        if activations.len() != NUM_TONES {
            return Err(StageError::ToneInference(format!(
                "expected {} activations, got {}",
                NUM_TONES,
                activations.len()
            )));
        }

        let (label, &max_value) = activations
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| StageError::ToneInference("empty activation vector".to_string()))?;

        if !max_value.is_finite() {
            return Err(StageError::ToneInference(
                "non-finite activation values".to_string(),
            ));
        }

        Ok(ClassificationResult {
            label,
            confidence: max_value.clamp(0.0, 1.0),
        })
    }
}
