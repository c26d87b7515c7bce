// Crisis keyword detection for live chat turns

mod detector;

pub use detector::{CrisisDetector, DEFAULT_CRISIS_KEYWORDS};
