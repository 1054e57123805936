//! Reconstruction of a typed score from the filtered symbol stream.
//!
//! A single pass over the position-ordered detections drives a small state
//! machine: clef and time-signature symbols update score state immediately,
//! notes and rests accumulate into a pending measure, and barlines close it.

use crate::models::{Detection, Staff};
use crate::score::{Clef, Measure, Pitch, Score, ScoreEvent, Step};

/// Treble-clef pitches by staff grid slot, top line first.
/// Slot 0 is the top line (F5), slot 8 the bottom line (E4).
const TREBLE_PITCHES: [Pitch; 9] = [
    Pitch::new(Step::F, 5),
    Pitch::new(Step::E, 5),
    Pitch::new(Step::D, 5),
    Pitch::new(Step::C, 5),
    Pitch::new(Step::B, 4),
    Pitch::new(Step::A, 4),
    Pitch::new(Step::G, 4),
    Pitch::new(Step::F, 4),
    Pitch::new(Step::E, 4),
];

/// Fallback when no staff reference or pitch table applies. Dropping the
/// note instead would silently lose its duration, so we keep it at a
/// default pitch.
const FALLBACK_PITCH: Pitch = Pitch::new(Step::C, 4);

/// Convert the filtered, position-ordered detection stream into a score.
///
/// Measures are delimited solely by barline detections; a barline closes the
/// pending measure even when it is empty. A non-empty pending measure at the
/// end of the stream is flushed as a trailing measure, so
/// `measures.len() == barline count + (1 if the stream does not end on a
/// barline with events pending)`.
pub fn reconstruct(detections: &[Detection], staves: &[Staff]) -> Score {
    let mut score = Score::default();
    let mut pending = Measure::default();

    for det in detections {
        if let Some(clef) = det.class.clef() {
            score.clef = clef;
        } else if let Some(time_signature) = det.class.time_signature() {
            score.time_signature = time_signature;
        } else if let Some(duration) = det.class.note_duration() {
            let pitch = estimate_pitch(det.center.1 as f32, staves, score.clef);
            pending.events.push(ScoreEvent::Note {
                pitch,
                duration,
                position: det.center,
            });
        } else if let Some(duration) = det.class.rest_duration() {
            pending.events.push(ScoreEvent::Rest {
                duration,
                position: det.center,
            });
        } else if det.class.is_barline() {
            score.add_measure(std::mem::take(&mut pending));
        }
        // Accidentals, dots, beams and stems are recognized classes with no
        // reconstruction semantics yet; they pass through unused.
    }

    if !pending.is_empty() {
        score.add_measure(pending);
    }

    log::debug!(
        "reconstructed {} measure(s), {} event(s)",
        score.measures.len(),
        score.event_count()
    );
    score
}

/// Map a vertical position to a pitch via the nearest staff's line/space
/// grid. Only the treble table is populated; anything else falls back to C4.
pub fn estimate_pitch(y: f32, staves: &[Staff], clef: Clef) -> Pitch {
    let Some(staff) = nearest_staff(y, staves) else {
        return FALLBACK_PITCH;
    };
    let Some(table) = pitch_table(clef) else {
        return FALLBACK_PITCH;
    };

    let slot = staff.nearest_grid_index(y);
    table.get(slot).copied().unwrap_or(FALLBACK_PITCH)
}

fn nearest_staff<'a>(y: f32, staves: &'a [Staff]) -> Option<&'a Staff> {
    staves.iter().min_by(|a, b| {
        let da = (y - a.center_y()).abs();
        let db = (y - b.center_y()).abs();
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    })
}

fn pitch_table(clef: Clef) -> Option<&'static [Pitch]> {
    match clef {
        Clef::Treble => Some(&TREBLE_PITCHES),
        // No bass or alto tables yet; estimation falls back to the default
        Clef::Bass | Clef::Alto => None,
    }
}
