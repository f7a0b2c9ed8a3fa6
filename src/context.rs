// ModelContext - immutable container for all loaded model artifacts
//
// Built exactly once at startup and shared read-only across every pipeline
// invocation. The tone model is required; the pre-filter artifacts are an
// optional capability decided here, once, rather than by nullable checks
// scattered through the pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ModelLoadError;
use crate::prefilter::PreFilter;
use crate::tone::{OnnxToneModel, ToneModel};

/// Filesystem locations of the model artifacts
#[derive(Debug, Clone)]
pub struct ModelPaths {
    /// ONNX tone classifier (required)
    pub tone_model: PathBuf,
    /// Fitted feature scaler JSON (optional, pre-filter)
    pub scaler: Option<PathBuf>,
    /// One-class boundary model JSON (optional, pre-filter)
    pub one_class: Option<PathBuf>,
}

/// Immutable model container shared across pipeline runs
pub struct ModelContext {
    tone_model: Arc<dyn ToneModel>,
    pre_filter: Option<PreFilter>,
}

impl std::fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContext")
            .field("pre_filter", &self.pre_filter)
            .finish_non_exhaustive()
    }
}

impl ModelContext {
    /// Load all model artifacts from disk
    ///
    /// The tone model is fatal on failure. The pre-filter requires both of its
    /// artifacts; any problem with either one disables the stage with a single
    /// warning and the pipeline treats every segment as a plausible instrument.
    ///
    /// # Arguments
    /// * `paths` - Artifact locations
    ///
    /// # Returns
    /// A ready context, or `ModelLoadError::ToneModel` when the required
    /// classifier cannot be loaded
    pub fn load(paths: &ModelPaths) -> Result<Self, ModelLoadError> {
        let tone_model: Arc<dyn ToneModel> =
            Arc::new(OnnxToneModel::from_file(&paths.tone_model)?);

        let pre_filter = match (&paths.scaler, &paths.one_class) {
            (Some(scaler), Some(one_class)) => match PreFilter::from_files(scaler, one_class) {
                Ok(filter) => {
                    log::info!("[Context] Pre-filter loaded; plausibility gating enabled");
                    Some(filter)
                }
                Err(err) => {
                    log::warn!(
                        "[Context] Pre-filter unavailable, stage disabled: {}",
                        err
                    );
                    None
                }
            },
            (None, None) => {
                log::info!("[Context] No pre-filter artifacts configured; stage disabled");
                None
            }
            _ => {
                log::warn!(
                    "[Context] Pre-filter needs both scaler and one-class model; stage disabled"
                );
                None
            }
        };

        Ok(Self {
            tone_model,
            pre_filter,
        })
    }

    /// Assemble a context from already-constructed parts
    ///
    /// This is the seam embedders and tests use to supply alternative
    /// inference backends.
    pub fn with_parts(tone_model: Arc<dyn ToneModel>, pre_filter: Option<PreFilter>) -> Self {
        Self {
            tone_model,
            pre_filter,
        }
    }

    pub fn has_pre_filter(&self) -> bool {
        self.pre_filter.is_some()
    }

    pub(crate) fn into_parts(self) -> (Arc<dyn ToneModel>, Option<PreFilter>) {
        (self.tone_model, self.pre_filter)
    }
}
