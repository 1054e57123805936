use serde::Serialize;

/// Bounding box in image coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Center of the box, rounded down
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Intersection-over-union with another box, in [0, 1]
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let xi1 = self.x.max(other.x);
        let yi1 = self.y.max(other.y);
        let xi2 = (self.x + self.width).min(other.x + other.width);
        let yi2 = (self.y + self.height).min(other.y + other.height);

        let inter = xi2.saturating_sub(xi1) * yi2.saturating_sub(yi1);
        let union = self.area() + other.area() - inter;

        if union == 0 {
            0.0
        } else {
            inter as f32 / union as f32
        }
    }
}

/// Connected-component region found after staff-line removal.
/// Candidate input to the symbol classifier; discarded once classified.
#[derive(Debug, Clone)]
pub struct Region {
    pub label: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub pixel_count: u32,
}

impl Region {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.min_x, self.min_y, self.width(), self.height())
    }

}

/// Closed vocabulary of the external symbol classifier.
///
/// The trained model and its weights are owned outside this crate; this enum
/// mirrors the model's output classes, including the reserved `Background`
/// class used to reject non-symbol regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolClass {
    TrebleClef,
    BassClef,
    AltoClef,
    WholeNote,
    HalfNote,
    QuarterNote,
    EighthNote,
    SixteenthNote,
    WholeRest,
    HalfRest,
    QuarterRest,
    EighthRest,
    SixteenthRest,
    Sharp,
    Flat,
    Natural,
    Time2_4,
    Time3_4,
    Time4_4,
    Time6_8,
    Barline,
    DoubleBarline,
    Dot,
    Beam,
    Stem,
    Background,
}

impl SymbolClass {
    /// All classes, in the model's output index order
    pub const ALL: [SymbolClass; 26] = [
        SymbolClass::TrebleClef,
        SymbolClass::BassClef,
        SymbolClass::AltoClef,
        SymbolClass::WholeNote,
        SymbolClass::HalfNote,
        SymbolClass::QuarterNote,
        SymbolClass::EighthNote,
        SymbolClass::SixteenthNote,
        SymbolClass::WholeRest,
        SymbolClass::HalfRest,
        SymbolClass::QuarterRest,
        SymbolClass::EighthRest,
        SymbolClass::SixteenthRest,
        SymbolClass::Sharp,
        SymbolClass::Flat,
        SymbolClass::Natural,
        SymbolClass::Time2_4,
        SymbolClass::Time3_4,
        SymbolClass::Time4_4,
        SymbolClass::Time6_8,
        SymbolClass::Barline,
        SymbolClass::DoubleBarline,
        SymbolClass::Dot,
        SymbolClass::Beam,
        SymbolClass::Stem,
        SymbolClass::Background,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SymbolClass::TrebleClef => "treble_clef",
            SymbolClass::BassClef => "bass_clef",
            SymbolClass::AltoClef => "alto_clef",
            SymbolClass::WholeNote => "whole_note",
            SymbolClass::HalfNote => "half_note",
            SymbolClass::QuarterNote => "quarter_note",
            SymbolClass::EighthNote => "eighth_note",
            SymbolClass::SixteenthNote => "sixteenth_note",
            SymbolClass::WholeRest => "whole_rest",
            SymbolClass::HalfRest => "half_rest",
            SymbolClass::QuarterRest => "quarter_rest",
            SymbolClass::EighthRest => "eighth_rest",
            SymbolClass::SixteenthRest => "sixteenth_rest",
            SymbolClass::Sharp => "sharp",
            SymbolClass::Flat => "flat",
            SymbolClass::Natural => "natural",
            SymbolClass::Time2_4 => "time_2_4",
            SymbolClass::Time3_4 => "time_3_4",
            SymbolClass::Time4_4 => "time_4_4",
            SymbolClass::Time6_8 => "time_6_8",
            SymbolClass::Barline => "barline",
            SymbolClass::DoubleBarline => "double_barline",
            SymbolClass::Dot => "dot",
            SymbolClass::Beam => "beam",
            SymbolClass::Stem => "stem",
            SymbolClass::Background => "background",
        }
    }

    pub fn from_label(label: &str) -> Option<SymbolClass> {
        SymbolClass::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Note duration in quarter-note units, if this class is a note
    pub fn note_duration(&self) -> Option<f32> {
        match self {
            SymbolClass::WholeNote => Some(4.0),
            SymbolClass::HalfNote => Some(2.0),
            SymbolClass::QuarterNote => Some(1.0),
            SymbolClass::EighthNote => Some(0.5),
            SymbolClass::SixteenthNote => Some(0.25),
            _ => None,
        }
    }

    /// Rest duration in quarter-note units, if this class is a rest
    pub fn rest_duration(&self) -> Option<f32> {
        match self {
            SymbolClass::WholeRest => Some(4.0),
            SymbolClass::HalfRest => Some(2.0),
            SymbolClass::QuarterRest => Some(1.0),
            SymbolClass::EighthRest => Some(0.5),
            SymbolClass::SixteenthRest => Some(0.25),
            _ => None,
        }
    }

    pub fn clef(&self) -> Option<crate::score::Clef> {
        match self {
            SymbolClass::TrebleClef => Some(crate::score::Clef::Treble),
            SymbolClass::BassClef => Some(crate::score::Clef::Bass),
            SymbolClass::AltoClef => Some(crate::score::Clef::Alto),
            _ => None,
        }
    }

    pub fn time_signature(&self) -> Option<crate::score::TimeSignature> {
        match self {
            SymbolClass::Time2_4 => Some(crate::score::TimeSignature::new(2, 4)),
            SymbolClass::Time3_4 => Some(crate::score::TimeSignature::new(3, 4)),
            SymbolClass::Time4_4 => Some(crate::score::TimeSignature::new(4, 4)),
            SymbolClass::Time6_8 => Some(crate::score::TimeSignature::new(6, 8)),
            _ => None,
        }
    }

    pub fn is_barline(&self) -> bool {
        matches!(self, SymbolClass::Barline | SymbolClass::DoubleBarline)
    }
}

/// One classified symbol candidate. Never mutated after creation; the
/// detection filter either keeps it or drops it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub class: SymbolClass,
    pub confidence: f32,
    pub bbox: BoundingBox,
    /// Bounding-box center, cached for position ordering and pitch lookup
    pub center: (u32, u32),
}

impl Detection {
    pub fn new(class: SymbolClass, confidence: f32, bbox: BoundingBox) -> Self {
        let center = bbox.center();
        Self { class, confidence, bbox, center }
    }
}

/// One five-line staff system. Line positions are vertical pixel coordinates,
/// top line first, strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Staff {
    pub lines: [u32; 5],
}

impl Staff {
    pub fn new(lines: [u32; 5]) -> Self {
        Self { lines }
    }

    /// Average inter-line spacing
    pub fn spacing(&self) -> f32 {
        (self.lines[4] - self.lines[0]) as f32 / 4.0
    }

    pub fn center_y(&self) -> f32 {
        (self.lines[0] + self.lines[4]) as f32 / 2.0
    }

    /// The 9 discrete pitch positions of the staff: 5 lines interleaved with
    /// the 4 spaces between them, top line first.
    pub fn grid(&self) -> [f32; 9] {
        let mut grid = [0.0f32; 9];
        for i in 0..5 {
            grid[2 * i] = self.lines[i] as f32;
            if i < 4 {
                grid[2 * i + 1] = (self.lines[i] + self.lines[i + 1]) as f32 / 2.0;
            }
        }
        grid
    }

    /// Index of the grid position closest to the given vertical coordinate
    pub fn nearest_grid_index(&self, y: f32) -> usize {
        let grid = self.grid();
        let mut best = 0;
        let mut best_dist = (y - grid[0]).abs();
        for (i, pos) in grid.iter().enumerate().skip(1) {
            let dist = (y - pos).abs();
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }
}
