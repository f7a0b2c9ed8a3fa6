//! Kalimba tone recognition pipeline
//!
//! Recognizes which of 17 kalimba tines (C4 through E6) was struck in a short
//! mono audio clip. A complete run is onset detection, segmentation with
//! minimum-length gates, optional instrument pre-filtering, and learned tone
//! classification with a confidence threshold; every clip yields exactly one
//! well-formed [`PipelineOutcome`].
//!
//! Typical usage:
//!
//! ```no_run
//! use kalimba_tone::{ModelContext, ModelPaths, Pipeline, PipelineConfig, Waveform};
//!
//! # fn main() -> Result<(), kalimba_tone::ModelLoadError> {
//! let context = ModelContext::load(&ModelPaths {
//!     tone_model: "models/tone.onnx".into(),
//!     scaler: None,
//!     one_class: None,
//! })?;
//! let pipeline = Pipeline::new(PipelineConfig::default(), context);
//!
//! let clip = Waveform::new(vec![0.0; 22050], 22050);
//! let outcome = pipeline.recognize(&clip);
//! println!("{} ({})", outcome.tone, outcome.message);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod dsp;
pub mod error;
pub mod features;
pub mod labels;
pub mod onset;
pub mod pipeline;
pub mod prefilter;
pub mod segment;
pub mod tone;

pub use config::PipelineConfig;
pub use context::{ModelContext, ModelPaths};
pub use error::{ModelLoadError, StageError};
pub use pipeline::{Pipeline, PipelineOutcome, Waveform};
pub use prefilter::{PreFilter, PreFilterVerdict};
pub use tone::{ClassificationResult, OnnxToneModel, ToneModel};
