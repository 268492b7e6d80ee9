//! Procedural track sections.
//!
//! A track is an ordered list of distance spans, each carrying one shape
//! rule. The race feeds the odometer through the list and writes the
//! evaluated curvature and elevation into the segment entering the far end
//! of the ring.

use serde::{Deserialize, Serialize};

use crate::config::TrackConfig;
use crate::rng::SeededRng;

/// One-off sprites pinned to a section boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMarker {
    Finish,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SectionShape {
    Flat,
    ConstantCurve { curve: f64 },
    ConstantHeight { height: f64 },
    SinusoidalHeight { interval: f64, amplitude: f64 },
    CurvedHill { curve: f64, height: f64 },
}

impl SectionShape {
    pub fn curvature(&self, _progress: f64) -> f64 {
        match *self {
            Self::ConstantCurve { curve } | Self::CurvedHill { curve, .. } => curve,
            Self::Flat | Self::ConstantHeight { .. } | Self::SinusoidalHeight { .. } => 0.0,
        }
    }

    pub fn elevation(&self, progress: f64) -> f64 {
        match *self {
            Self::ConstantHeight { height } | Self::CurvedHill { height, .. } => height,
            Self::SinusoidalHeight {
                interval,
                amplitude,
            } => (progress / interval).sin() * amplitude,
            Self::Flat | Self::ConstantCurve { .. } => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackSection {
    pub start: f64,
    pub end: f64,
    pub shape: SectionShape,
    pub special: Option<SpecialMarker>,
}

impl TrackSection {
    pub fn is_sentinel(&self) -> bool {
        self.start.is_infinite()
    }

    /// Strictly inside the span; the boundaries themselves are flat road.
    pub fn contains(&self, distance: f64) -> bool {
        self.start < distance && self.end > distance
    }

    pub fn is_passed(&self, distance: f64) -> bool {
        self.end <= distance
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    sections: Vec<TrackSection>,
}

impl Track {
    /// Regular sections first, then the finish span, then a sentinel at +inf.
    pub fn generate(config: &TrackConfig, finish_length: usize, rng: &mut SeededRng) -> Self {
        let mut sections = Vec::new();
        let mut cursor = 0;

        while cursor < config.length {
            let length = rng.next_floor_range(config.section_length.0, config.section_length.1);
            let height = f64::from(rng.next_floor_range(config.height.0, config.height.1));
            let magnitude = f64::from(rng.next_floor_range(config.curve.0, config.curve.1));
            let curve = if rng.next_f64() >= 0.5 {
                magnitude
            } else {
                -magnitude
            };
            let interval = f64::from(rng.next_floor_range(config.interval.0, config.interval.1));

            let shape = if rng.next_f64() > 0.9 {
                SectionShape::CurvedHill { curve, height }
            } else if rng.next_f64() > 0.8 {
                SectionShape::SinusoidalHeight {
                    interval,
                    amplitude: config.sine_amplitude,
                }
            } else if rng.next_f64() > 0.8 {
                SectionShape::ConstantHeight { height }
            } else {
                SectionShape::ConstantCurve { curve }
            };

            sections.push(TrackSection {
                start: f64::from(cursor),
                end: f64::from(cursor + length),
                shape,
                special: None,
            });
            cursor += length;
            cursor += rng.next_floor_range(config.gap.0, config.gap.1);
        }

        let finish_start = f64::from(cursor);
        sections.push(TrackSection {
            start: finish_start,
            end: finish_start + finish_length as f64,
            shape: SectionShape::Flat,
            special: Some(SpecialMarker::Finish),
        });
        sections.push(TrackSection {
            start: f64::INFINITY,
            end: f64::INFINITY,
            shape: SectionShape::Flat,
            special: None,
        });

        tracing::debug!(sections = sections.len(), finish_start, "generated track");
        Self { sections }
    }

    pub fn from_sections(sections: Vec<TrackSection>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[TrackSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Clamps to the sentinel so a cursor can never run off the end.
    pub fn section(&self, index: usize) -> Option<&TrackSection> {
        self.sections
            .get(index)
            .or_else(|| self.sections.last())
    }

    pub fn finish(&self) -> Option<&TrackSection> {
        self.sections
            .iter()
            .rev()
            .find(|section| section.special == Some(SpecialMarker::Finish))
    }

    /// Distance at which the finish span closes.
    pub fn finish_distance(&self) -> f64 {
        self.finish().map(|section| section.end).unwrap_or(0.0)
    }
}
