pub mod capture;
pub mod segmenter;
pub mod source;
pub mod wav;

pub use capture::{CAPTURE_SAMPLE_RATE, CpalAudioSource};
pub use segmenter::{AudioSegment, Segmenter, SegmenterConfig};
pub use source::{AudioSource, MockAudioSource};
