use crate::aliases::Vec3;
use crate::util::{max_vec3, min_vec3};

/// Axis-Aligned Bounding Box
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: &Vec3, max: &Vec3) -> Self {
        Aabb {
            min: *min,
            max: *max,
        }
    }
    pub fn empty() -> Self {
        Aabb::new(
            &Vec3::new(std::f64::INFINITY, std::f64::INFINITY, std::f64::INFINITY),
            &Vec3::new(
                std::f64::NEG_INFINITY,
                std::f64::NEG_INFINITY,
                std::f64::NEG_INFINITY,
            ),
        )
    }
    /// True when the box encloses no volume (any min above its max).
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1] || self.min[2] > self.max[2]
    }
    pub fn contains(&self, point: &Vec3) -> bool {
        (0..3).all(|a| self.min[a] <= point[a] && point[a] <= self.max[a])
    }
    pub fn unite(lhs: &Aabb, rhs: &Aabb) -> Aabb {
        Aabb::new(&min_vec3(&lhs.min, &rhs.min), &max_vec3(&lhs.max, &rhs.max))
    }
    pub fn intersection(lhs: &Aabb, rhs: &Aabb) -> Aabb {
        Aabb::new(&max_vec3(&lhs.min, &rhs.min), &min_vec3(&lhs.max, &rhs.max))
    }
    pub fn grow(&mut self, point: &Vec3) {
        self.min = min_vec3(&self.min, point);
        self.max = max_vec3(&self.max, point);
    }
    pub fn widths(&self) -> Vec3 {
        self.max - self.min
    }
}
