// PreFilterClassifier - optional instrument-plausibility gate
//
// Standardizes the 30-dim feature vector with the stored scaler and evaluates
// a one-class RBF decision boundary:
//
//     f(x) = Σ_i dual_coef[i] * exp(-gamma * ||x - sv_i||²) - rho
//
// f(x) >= 0 marks the segment as a plausible instrument sound (inlier). The
// normalization parameters MUST be the ones the boundary model was fit with;
// a shape mismatch is refused at load time because a silent mismatch degrades
// accuracy without any runtime symptom.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ModelLoadError, StageError};
use crate::features::{FeatureVector, FEATURE_DIM};

/// Binary plausibility verdict of the pre-filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreFilterVerdict {
    /// Plausible instrument sound; proceed to tone classification
    Inlier,
    /// Not the target instrument; tone classification is skipped
    Outlier,
    /// The decision function could not be evaluated
    Indeterminate,
}

/// Fitted standardization parameters (per-feature mean and scale)
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureScaler {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

impl FeatureScaler {
    fn apply(&self, features: &FeatureVector) -> Vec<f32> {
        features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&m, &s))| (x - m) / s)
            .collect()
    }
}

/// One-class SVM parameters with an RBF kernel
#[derive(Debug, Clone, Deserialize)]
pub struct OneClassSvm {
    gamma: f32,
    rho: f32,
    support_vectors: Vec<Vec<f32>>,
    dual_coef: Vec<f32>,
}

impl OneClassSvm {
    /// Evaluate the decision function on an already-standardized vector
    fn decision(&self, x: &[f32]) -> f32 {
        let mut acc = 0.0f32;
        for (sv, &coef) in self.support_vectors.iter().zip(self.dual_coef.iter()) {
            let dist_sq: f32 = x
                .iter()
                .zip(sv.iter())
                .map(|(&a, &b)| (a - b) * (a - b))
                .sum();
            acc += coef * (-self.gamma * dist_sq).exp();
        }
        acc - self.rho
    }
}

/// The complete pre-filter capability: scaler plus decision boundary
#[derive(Debug)]
pub struct PreFilter {
    scaler: FeatureScaler,
    svm: OneClassSvm,
}

impl PreFilter {
    /// Load and validate the pre-filter from its two JSON artifacts
    ///
    /// # Arguments
    /// * `scaler_path` - Fitted standardization parameters
    /// * `model_path` - One-class boundary model
    ///
    /// # Returns
    /// A validated pre-filter, or a `ModelLoadError` describing which artifact
    /// failed. The caller decides whether the failure disables the stage.
    pub fn from_files<P: AsRef<Path>>(
        scaler_path: P,
        model_path: P,
    ) -> Result<Self, ModelLoadError> {
        let scaler: FeatureScaler = read_json(&scaler_path).map_err(|reason| {
            ModelLoadError::PreFilterScaler {
                path: scaler_path.as_ref().display().to_string(),
                reason,
            }
        })?;
        let svm: OneClassSvm = read_json(&model_path).map_err(|reason| {
            ModelLoadError::PreFilterModel {
                path: model_path.as_ref().display().to_string(),
                reason,
            }
        })?;

        Self::from_parts(scaler, svm)
    }

    /// Assemble a pre-filter from in-memory parts, validating dimensions
    pub fn from_parts(
        mut scaler: FeatureScaler,
        svm: OneClassSvm,
    ) -> Result<Self, ModelLoadError> {
        if scaler.mean.len() != FEATURE_DIM || scaler.scale.len() != FEATURE_DIM {
            return Err(ModelLoadError::PreFilterShape {
                details: format!(
                    "scaler dimensions {}/{} do not match the {}-dim feature contract",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    FEATURE_DIM
                ),
            });
        }
        if let Some(sv) = svm.support_vectors.iter().find(|sv| sv.len() != FEATURE_DIM) {
            return Err(ModelLoadError::PreFilterShape {
                details: format!(
                    "support vector of dimension {} does not match the {}-dim feature contract",
                    sv.len(),
                    FEATURE_DIM
                ),
            });
        }
        if svm.support_vectors.len() != svm.dual_coef.len() {
            return Err(ModelLoadError::PreFilterShape {
                details: format!(
                    "{} support vectors but {} dual coefficients",
                    svm.support_vectors.len(),
                    svm.dual_coef.len()
                ),
            });
        }
        if svm.support_vectors.is_empty() {
            return Err(ModelLoadError::PreFilterShape {
                details: "one-class model has no support vectors".to_string(),
            });
        }

        // Constant features are stored with a zero scale; standardize them to 0
        for s in scaler.scale.iter_mut() {
            if s.abs() < 1e-12 {
                *s = 1.0;
            }
        }

        Ok(Self { scaler, svm })
    }

    /// Classify a feature vector as plausible instrument or not
    ///
    /// Evaluation failures are logged and reported as `Indeterminate`; the
    /// decision policy treats that as "plausibility unknown", not as a pass.
    pub fn verdict(&self, features: &FeatureVector) -> PreFilterVerdict {
        match self.score(features) {
            Ok(score) if score >= 0.0 => PreFilterVerdict::Inlier,
            Ok(_) => PreFilterVerdict::Outlier,
            Err(err) => {
                log::warn!("[PreFilter] {}; verdict indeterminate", err);
                PreFilterVerdict::Indeterminate
            }
        }
    }

    /// Evaluate the standardized decision function
    fn score(&self, features: &FeatureVector) -> Result<f32, StageError> {
        let standardized = self.scaler.apply(features);
        if standardized.iter().any(|v| !v.is_finite()) {
            return Err(StageError::PreFilter(
                "non-finite standardized features".to_string(),
            ));
        }

        let score = self.svm.decision(&standardized);
        if !score.is_finite() {
            return Err(StageError::PreFilter(
                "non-finite decision value".to_string(),
            ));
        }

        Ok(score)
    }
}

fn read_json<T: serde::de::DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, String> {
    let contents = fs::read_to_string(&path).map_err(|e| e.to_string())?;
    serde_json::from_str(&contents).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_scaler() -> FeatureScaler {
        FeatureScaler {
            mean: vec![0.0; FEATURE_DIM],
            scale: vec![1.0; FEATURE_DIM],
        }
    }

    /// One support vector at the origin: inliers are points near zero
    fn origin_svm(rho: f32) -> OneClassSvm {
        OneClassSvm {
            gamma: 0.1,
            rho,
            support_vectors: vec![vec![0.0; FEATURE_DIM]],
            dual_coef: vec![1.0],
        }
    }

    #[test]
    fn test_inlier_near_support_vector() {
        let filter = PreFilter::from_parts(identity_scaler(), origin_svm(0.5)).unwrap();
        let features = [0.0f32; FEATURE_DIM];
        assert_eq!(filter.verdict(&features), PreFilterVerdict::Inlier);
    }

    #[test]
    fn test_outlier_far_from_support_vector() {
        let filter = PreFilter::from_parts(identity_scaler(), origin_svm(0.5)).unwrap();
        let features = [100.0f32; FEATURE_DIM];
        assert_eq!(filter.verdict(&features), PreFilterVerdict::Outlier);
    }

    #[test]
    fn test_scaler_shape_mismatch_rejected() {
        let scaler = FeatureScaler {
            mean: vec![0.0; FEATURE_DIM - 1],
            scale: vec![1.0; FEATURE_DIM - 1],
        };
        let err = PreFilter::from_parts(scaler, origin_svm(0.5)).unwrap_err();
        assert!(matches!(err, ModelLoadError::PreFilterShape { .. }));
        assert!(err.is_pre_filter());
    }

    #[test]
    fn test_support_vector_shape_mismatch_rejected() {
        let svm = OneClassSvm {
            gamma: 0.1,
            rho: 0.5,
            support_vectors: vec![vec![0.0; 7]],
            dual_coef: vec![1.0],
        };
        let err = PreFilter::from_parts(identity_scaler(), svm).unwrap_err();
        assert!(matches!(err, ModelLoadError::PreFilterShape { .. }));
    }

    #[test]
    fn test_coefficient_count_mismatch_rejected() {
        let svm = OneClassSvm {
            gamma: 0.1,
            rho: 0.5,
            support_vectors: vec![vec![0.0; FEATURE_DIM]],
            dual_coef: vec![1.0, 2.0],
        };
        assert!(PreFilter::from_parts(identity_scaler(), svm).is_err());
    }

    #[test]
    fn test_empty_model_rejected() {
        let svm = OneClassSvm {
            gamma: 0.1,
            rho: 0.5,
            support_vectors: vec![],
            dual_coef: vec![],
        };
        assert!(PreFilter::from_parts(identity_scaler(), svm).is_err());
    }

    #[test]
    fn test_non_finite_decision_is_indeterminate() {
        // A pathological gamma drives the kernel sum to infinity for any
        // point away from the support vector
        let svm = OneClassSvm {
            gamma: -1e30,
            rho: 0.5,
            support_vectors: vec![vec![0.0; FEATURE_DIM]],
            dual_coef: vec![1.0],
        };
        let filter = PreFilter::from_parts(identity_scaler(), svm).unwrap();
        let verdict = filter.verdict(&[1.0; FEATURE_DIM]);
        assert_eq!(verdict, PreFilterVerdict::Indeterminate);
    }

    #[test]
    fn test_zero_scale_does_not_divide_by_zero() {
        let scaler = FeatureScaler {
            mean: vec![0.0; FEATURE_DIM],
            scale: vec![0.0; FEATURE_DIM],
        };
        let filter = PreFilter::from_parts(scaler, origin_svm(0.5)).unwrap();
        let verdict = filter.verdict(&[1.0; FEATURE_DIM]);
        assert_ne!(verdict, PreFilterVerdict::Indeterminate);
    }

    #[test]
    fn test_missing_files_report_paths() {
        let err =
            PreFilter::from_files("/nonexistent/scaler.json", "/nonexistent/ocsvm.json")
                .unwrap_err();
        assert!(err.to_string().contains("scaler"));
    }
}
