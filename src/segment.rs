// SegmentExtractor - slices the waveform at the onset and applies length gates
//
// The analyzed segment always runs from the detected onset to the end of the
// clip. Two independent minimum-length gates decide how far the pipeline may
// proceed with it; they are evaluated in order and the decision is terminal.

use crate::config::GateConfig;

/// A contiguous sub-range of a waveform, from the detected onset to the end
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    samples: &'a [f32],
}

impl<'a> Segment<'a> {
    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Extract the segment from an onset index to the end of the clip
///
/// An onset index at or past the end of the clip yields an empty segment,
/// which the length gates then reject.
pub fn extract(samples: &[f32], onset_index: usize) -> Segment<'_> {
    let start = onset_index.min(samples.len());
    Segment {
        samples: &samples[start..],
    }
}

/// Terminal decision of the minimum-length gates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Below the pre-filter minimum: the pipeline short-circuits entirely
    TooShort,
    /// Long enough for feature extraction and pre-filtering, but not for
    /// tone classification
    PreFilterOnly,
    /// Long enough for the full pipeline including tone classification
    Full,
}

impl GateDecision {
    /// Evaluate both gates, in order, for a segment of the given length
    pub fn for_len(len: usize, gates: &GateConfig) -> Self {
        if len < gates.min_len_prefilter {
            GateDecision::TooShort
        } else if len < gates.min_len_tone {
            GateDecision::PreFilterOnly
        } else {
            GateDecision::Full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_onset_to_end() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let segment = extract(&samples, 4);
        assert_eq!(segment.len(), 6);
        assert_eq!(segment.samples()[0], 4.0);
    }

    #[test]
    fn test_extract_at_zero_is_whole_clip() {
        let samples = vec![0.5f32; 8];
        assert_eq!(extract(&samples, 0).len(), 8);
    }

    #[test]
    fn test_extract_past_end_is_empty() {
        let samples = vec![0.5f32; 8];
        let segment = extract(&samples, 100);
        assert!(segment.is_empty());
    }

    #[test]
    fn test_gate_boundaries() {
        let gates = GateConfig::default();

        assert_eq!(GateDecision::for_len(0, &gates), GateDecision::TooShort);
        assert_eq!(GateDecision::for_len(1023, &gates), GateDecision::TooShort);
        assert_eq!(
            GateDecision::for_len(1024, &gates),
            GateDecision::PreFilterOnly
        );
        assert_eq!(
            GateDecision::for_len(2047, &gates),
            GateDecision::PreFilterOnly
        );
        assert_eq!(GateDecision::for_len(2048, &gates), GateDecision::Full);
        assert_eq!(GateDecision::for_len(100_000, &gates), GateDecision::Full);
    }
}
