// DSP primitives shared by onset detection, feature extraction, and the tone
// feature transform: short-time Fourier analysis and mel-scale processing.
//
// Everything here operates on complete in-memory buffers; there is no streaming
// state, so every processor is freely shareable behind a reference.

mod mel;
mod stft;

pub use mel::{dct_ii, power_to_db, MelFilterbank};
pub use stft::StftProcessor;
