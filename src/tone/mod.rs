// Tone recognition - time-frequency transform plus learned classification
//
// Module organization:
// - transform: segment -> canonical 128x128 log-mel image
// - classifier: ToneModel inference seam, ONNX-backed implementation, and the
//   argmax/confidence decision

mod classifier;
mod transform;

pub use classifier::{ClassificationResult, OnnxToneModel, ToneClassifier, ToneModel};
pub use transform::ToneFeatureTransform;

use ndarray::Array2;

/// Fixed-resolution single-channel input image for the tone classifier.
/// Shape is `(image_size, image_size)`; the value scale is decibels relative
/// to the segment's own peak power.
pub type ToneImage = Array2<f32>;
