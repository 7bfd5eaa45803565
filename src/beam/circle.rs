use crate::aabb::Aabb;
use crate::aliases::Vec3;
use crate::beam::{BeamProfile, ReferenceFrame};
use crate::ray::Ray;
use crate::rng::RandomGen;
use std::f64::consts::PI;

/// Circular beam cross-section, e.g. a pinhole-collimated beam.
pub struct CircleBeam {
    horizontal: usize,
    up: usize,
    direction: Vec3,
    centre: Vec3,
    radius: f64,
}

impl CircleBeam {
    pub fn new(frame: &ReferenceFrame, centre: &Vec3, radius: f64) -> Self {
        CircleBeam {
            horizontal: frame.horizontal(),
            up: frame.up,
            direction: frame.beam_direction(),
            centre: *centre,
            radius,
        }
    }
}

impl BeamProfile for CircleBeam {
    fn generate_point(&self, rng: &mut dyn RandomGen) -> Ray {
        // radius drawn as sqrt(u)*R to keep the area density uniform
        let r = rng.next_value().sqrt() * self.radius;
        let phi = 2.0 * PI * rng.next_value();
        let mut origin = self.centre;
        origin[self.horizontal] += r * phi.cos();
        origin[self.up] += r * phi.sin();
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
        for &a in &[self.horizontal, self.up] {
            region.min[a] = region.min[a].max(self.centre[a] - self.radius);
            region.max[a] = region.max[a].min(self.centre[a] + self.radius);
        }
        region
    }
}
