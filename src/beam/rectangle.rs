use crate::aabb::Aabb;
use crate::aliases::Vec3;
use crate::beam::{BeamProfile, ReferenceFrame};
use crate::ray::Ray;
use crate::rng::RandomGen;

/// Rectangular beam cross-section, e.g. a slit-collimated beam.
pub struct RectangleBeam {
    horizontal: usize,
    up: usize,
    direction: Vec3,
    corner: Vec3, // lower-left corner of the footprint, on the source plane
    width: f64,
    height: f64,
}

impl RectangleBeam {
    pub fn new(frame: &ReferenceFrame, centre: &Vec3, width: f64, height: f64) -> Self {
        let mut corner = *centre;
        corner[frame.horizontal()] -= 0.5 * width;
        corner[frame.up] -= 0.5 * height;
        RectangleBeam {
            horizontal: frame.horizontal(),
            up: frame.up,
            direction: frame.beam_direction(),
            corner,
            width,
            height,
        }
    }
}

impl BeamProfile for RectangleBeam {
    fn generate_point(&self, rng: &mut dyn RandomGen) -> Ray {
        let mut origin = self.corner;
        origin[self.horizontal] += rng.next_value() * self.width;
        origin[self.up] += rng.next_value() * self.height;
        Ray {
            origin,
            direction: self.direction,
        }
    }
    fn generate_point_within(&self, rng: &mut dyn RandomGen, bounds: &Aabb) -> Ray {
        let mut ray = self.generate_point(rng);
        for &a in &[self.horizontal, self.up] {
            ray.origin[a] = ray.origin[a].max(bounds.min[a]).min(bounds.max[a]);
        }
        ray
    }
    fn define_active_region(&self, sample_box: &Aabb) -> Aabb {
        let mut region = *sample_box;
        region.min[self.horizontal] = region.min[self.horizontal].max(self.corner[self.horizontal]);
        region.max[self.horizontal] = region.max[self.horizontal]
            .min(self.corner[self.horizontal] + self.width);
        region.min[self.up] = region.min[self.up].max(self.corner[self.up]);
        region.max[self.up] = region.max[self.up].min(self.corner[self.up] + self.height);
        region
    }
}
