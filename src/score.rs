//! The typed score produced by recognition.
//!
//! This is the terminal output of the pipeline. Downstream consumers (score
//! assembly, transposition, exporters) take ownership of the `Score` value;
//! this crate never serializes or persists it itself, but the types derive
//! `Serialize` so those consumers can.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Clef {
    Treble,
    Bass,
    Alto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSignature {
    pub beats: u8,
    pub beat_unit: u8,
}

impl TimeSignature {
    pub fn new(beats: u8, beat_unit: u8) -> Self {
        Self { beats, beat_unit }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.beat_unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        };
        write!(f, "{letter}")
    }
}

/// Letter-plus-octave pitch, e.g. C4 (middle C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pitch {
    pub step: Step,
    pub octave: u8,
}

impl Pitch {
    pub const fn new(step: Step, octave: u8) -> Self {
        Self { step, octave }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.step, self.octave)
    }
}

/// One recognized event. Durations are in quarter-note units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScoreEvent {
    Note {
        pitch: Pitch,
        duration: f32,
        /// Center of the source detection in image coordinates
        position: (u32, u32),
    },
    Rest {
        duration: f32,
        position: (u32, u32),
    },
}

impl ScoreEvent {
    pub fn duration(&self) -> f32 {
        match self {
            ScoreEvent::Note { duration, .. } | ScoreEvent::Rest { duration, .. } => *duration,
        }
    }
}

/// Events between two consecutive barlines
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Measure {
    pub events: Vec<ScoreEvent>,
}

impl Measure {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// A recognized single-staff score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub clef: Clef,
    pub time_signature: TimeSignature,
    /// Beats per minute
    pub tempo: u16,
    pub measures: Vec<Measure>,
}

impl Score {
    pub fn add_measure(&mut self, measure: Measure) {
        self.measures.push(measure);
    }

    /// Total number of note/rest events across all measures
    pub fn event_count(&self) -> usize {
        self.measures.iter().map(Measure::len).sum()
    }
}

impl Default for Score {
    fn default() -> Self {
        Self {
            clef: Clef::Treble,
            time_signature: TimeSignature::new(4, 4),
            tempo: 120,
            measures: Vec::new(),
        }
    }
}
