mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from staffscan for tests
pub use staffscan::{
    BinarizationMethod, BoundingBox, Classification, Clef, Detection, Measure, Pitch,
    RecognitionPipeline, Score, ScoreEvent, Staff, StaffDetector, Step, SymbolClass,
    SymbolClassifier, TimeSignature,
};
