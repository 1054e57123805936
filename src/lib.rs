pub mod error;
pub mod models;
pub mod notation;
pub mod recognition;
pub mod score;

pub use error::{RecognitionError, Result};
pub use models::{BoundingBox, Detection, Region, Staff, SymbolClass};
pub use recognition::{
    BinarizationMethod, Classification, RecognitionPipeline, StaffDetector, SymbolClassifier,
};
pub use score::{Clef, Measure, Pitch, Score, ScoreEvent, Step, TimeSignature};
