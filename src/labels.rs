// ToneLabelTable - static mapping between classifier class indices and tone names
//
// The tone classifier emits 17 activations; index i corresponds to TONE_LABELS[i].
// The table is a bijection: every index has exactly one name and vice versa.

/// Number of tone classes the classifier distinguishes
pub const NUM_TONES: usize = 17;

/// Tone names in classifier output order (C4 through E6, diatonic)
pub const TONE_LABELS: [&str; NUM_TONES] = [
    "C4", "D4", "E4", "F4", "G4", "A4", "B4", // octave 4
    "C5", "D5", "E5", "F5", "G5", "A5", "B5", // octave 5
    "C6", "D6", "E6",
];

/// Look up the tone name for a class index
///
/// # Arguments
/// * `index` - Classifier class index (valid range 0..=16)
///
/// # Returns
/// `Some(name)` for a valid index, `None` otherwise
pub fn tone_name(index: usize) -> Option<&'static str> {
    TONE_LABELS.get(index).copied()
}

/// Look up the class index for a tone name
///
/// # Arguments
/// * `name` - Tone name such as "C4" or "E6"
///
/// # Returns
/// `Some(index)` if the name is in the vocabulary, `None` otherwise
pub fn tone_index(name: &str) -> Option<usize> {
    TONE_LABELS.iter().position(|&label| label == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bijection_all_indices() {
        for index in 0..NUM_TONES {
            let name = tone_name(index).expect("every index must map to a name");
            assert_eq!(
                tone_index(name),
                Some(index),
                "round trip failed for index {}",
                index
            );
        }
    }

    #[test]
    fn test_out_of_range_indices_have_no_name() {
        assert_eq!(tone_name(NUM_TONES), None);
        assert_eq!(tone_name(usize::MAX), None);
    }

    #[test]
    fn test_unknown_names_have_no_index() {
        assert_eq!(tone_index("F6"), None);
        assert_eq!(tone_index("None"), None);
        assert_eq!(tone_index(""), None);
    }

    #[test]
    fn test_vocabulary_endpoints() {
        assert_eq!(tone_name(0), Some("C4"));
        assert_eq!(tone_name(16), Some("E6"));
    }

    #[test]
    fn test_labels_are_unique() {
        for (i, a) in TONE_LABELS.iter().enumerate() {
            for b in TONE_LABELS.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
