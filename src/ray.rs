use crate::aliases::Vec3;

/// A semi-infinite ray with a unit direction.
#[derive(Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3, // unit length
}

impl Ray {
    pub fn new(origin: &Vec3, direction: &Vec3) -> Self {
        Ray {
            origin: *origin,
            direction: direction.normalize(),
        }
    }
    pub fn evaluate(&self, t: f64) -> Vec3 {
        self.origin + t * self.direction
    }
}
