use crate::config::RoadConfig;
use crate::track::SpecialMarker;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadSegment {
    pub world_z: f64,
    pub world_y: f64,
    pub curvature: f64,
    pub special: Option<SpecialMarker>,
}

/// Fixed ring of road segments. Every index goes through [`SegmentRing::wrap`].
#[derive(Clone, Debug)]
pub struct SegmentRing {
    segments: Vec<RoadSegment>,
    segment_length: f64,
}

impl SegmentRing {
    pub fn new(config: &RoadConfig) -> Self {
        let segments = (0..config.segment_count)
            .map(|i| RoadSegment {
                world_z: i as f64 * config.segment_length + config.first_segment_z,
                world_y: 0.0,
                curvature: 0.0,
                special: None,
            })
            .collect();
        Self {
            segments,
            segment_length: config.segment_length,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn wrap(&self, index: isize) -> usize {
        index.rem_euclid(self.segments.len() as isize) as usize
    }

    pub fn get(&self, index: isize) -> &RoadSegment {
        &self.segments[self.wrap(index)]
    }

    pub fn get_mut(&mut self, index: isize) -> &mut RoadSegment {
        let slot = self.wrap(index);
        &mut self.segments[slot]
    }

    /// Ring slot under a camera at `position` world units.
    pub fn segment_at(&self, position: f64) -> usize {
        self.wrap((position / self.segment_length).floor() as isize)
    }

    /// The farthest visible slot, where new road is written.
    pub fn trailing(&self, camera_segment: usize) -> usize {
        self.wrap(camera_segment as isize + self.segments.len() as isize - 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoadSegment> {
        self.segments.iter()
    }
}
