pub mod circle;
pub mod rectangle;

use crate::aabb::Aabb;
use crate::aliases::Vec3;
use crate::ray::Ray;
use crate::rng::RandomGen;
use circle::CircleBeam;
use rectangle::RectangleBeam;

/// Instrument axis convention: which coordinate indices point along the beam
/// and upwards. The horizontal cross-beam axis is the remaining one.
#[derive(Clone, Copy, Debug)]
pub struct ReferenceFrame {
    pub beam: usize,
    pub up: usize,
}

impl ReferenceFrame {
    pub fn new(beam: usize, up: usize) -> Self {
        debug_assert!(beam < 3 && up < 3 && beam != up);
        ReferenceFrame { beam, up }
    }
    pub fn horizontal(&self) -> usize {
        3 - self.beam - self.up
    }
    pub fn beam_direction(&self) -> Vec3 {
        let mut dir = Vec3::zeros();
        dir[self.beam] = 1.0;
        dir
    }
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        // beam along z, up along y
        ReferenceFrame::new(2, 1)
    }
}

/// Cross-section of the incident beam; produces random entry rays travelling
/// along the beam axis.
pub trait BeamProfile: Send + Sync {
    /// Samples a point uniformly over the profile's cross-section.
    fn generate_point(&self, rng: &mut dyn RandomGen) -> Ray;
    /// As `generate_point`, but any cross-beam coordinate outside `bounds` is
    /// clipped to the nearest edge. Clipping rather than rejecting biases
    /// towards the edges; kept deliberately for parity with the established
    /// correction behaviour.
    fn generate_point_within(&self, rng: &mut dyn RandomGen, bounds: &Aabb) -> Ray;
    /// Region where scatter points may be generated: the profile footprint
    /// intersected with the sample box in the cross-beam axes, and the
    /// sample's full extent along the beam (the sample is assumed fully
    /// illuminated lengthwise).
    fn define_active_region(&self, sample_box: &Aabb) -> Aabb;
}

/// Geometry of the source as seen from the sample, as supplied by the
/// instrument definition.
#[derive(Clone, Copy, Debug)]
pub struct SourceGeometry {
    /// Distance from the sample (at the origin) back along the beam axis.
    pub distance: f64,
    pub shape: Option<BeamShape>,
}

#[derive(Clone, Copy, Debug)]
pub enum BeamShape {
    Slit { width: f64, height: f64 },
    Circle { radius: f64 },
}

/// Derives a beam profile from the source parameters, falling back to a
/// rectangle matching the sample bounding box when the instrument does not
/// describe its beam.
pub fn create_profile(
    frame: &ReferenceFrame,
    source: &SourceGeometry,
    sample_box: &Aabb,
) -> Box<dyn BeamProfile> {
    let mut centre = Vec3::zeros();
    centre[frame.beam] = -source.distance;
    match source.shape {
        Some(BeamShape::Slit { width, height }) => {
            Box::new(RectangleBeam::new(frame, &centre, width, height))
        }
        Some(BeamShape::Circle { radius }) => Box::new(CircleBeam::new(frame, &centre, radius)),
        None => {
            let widths = sample_box.widths();
            Box::new(RectangleBeam::new(
                frame,
                &centre,
                widths[frame.horizontal()],
                widths[frame.up],
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_axes_are_consistent() {
        let frame = ReferenceFrame::default();
        assert_eq!(frame.beam, 2);
        assert_eq!(frame.up, 1);
        assert_eq!(frame.horizontal(), 0);
        assert_eq!(frame.beam_direction(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn factory_falls_back_to_sample_box() {
        let frame = ReferenceFrame::default();
        let sample_box = Aabb::new(&Vec3::new(-0.5, -1.0, -0.25), &Vec3::new(0.5, 1.0, 0.25));
        let source = SourceGeometry {
            distance: 10.0,
            shape: None,
        };
        let profile = create_profile(&frame, &source, &sample_box);
        let mut rng = crate::rng::SeededRng::new(3);
        for _ in 0..200 {
            let ray = profile.generate_point(&mut rng);
            assert_eq!(ray.origin[2], -10.0);
            assert!(ray.origin[0].abs() <= 0.5);
            assert!(ray.origin[1].abs() <= 1.0);
            assert_eq!(ray.direction, Vec3::new(0.0, 0.0, 1.0));
        }
    }
}
