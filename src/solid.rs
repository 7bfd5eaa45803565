use crate::aabb::Aabb;
use crate::aliases::Vec3;
use crate::material::Material;
use crate::ray::Ray;
use crate::rng::RandomGen;
use crate::track::Track;
use std::sync::Arc;

/// Segments shorter than this are treated as grazing hits and discarded.
const MIN_SEGMENT: f64 = 1e-10;

/// A convex solid object with an attached material.
///
/// Convexity is assumed: a ray crosses the surface at most twice, so the
/// intersection with a semi-infinite ray is a single interval.
pub trait Solid: Send + Sync {
    fn bounding_box(&self) -> Aabb;
    fn contains(&self, point: &Vec3) -> bool;
    fn material(&self) -> &Arc<dyn Material>;
    /// Parameter interval [t_enter, t_exit] of the ray inside the solid,
    /// clipped to t >= 0. `None` when the ray misses entirely.
    fn intersection_interval(&self, ray: &Ray) -> Option<(f64, f64)>;

    /// Intersects the track's ray with this solid, appending a link for the
    /// traversed segment. Returns the number of links added (0 or 1).
    fn intercept_surface(&self, track: &mut Track) -> usize {
        match self.intersection_interval(&track.ray) {
            Some((t0, t1)) if t1 - t0 > MIN_SEGMENT => {
                let entry = track.ray.evaluate(t0);
                track.add_link(entry, t1 - t0, self.material().clone());
                1
            }
            _ => 0,
        }
    }

    /// Single attempt at generating a point uniformly inside this solid
    /// restricted to `region`. Samples the intersected bounding box once and
    /// rejects points outside the solid.
    fn generate_point(&self, rng: &mut dyn RandomGen, region: &Aabb) -> Option<Vec3> {
        let bounds = Aabb::intersection(&self.bounding_box(), region);
        if bounds.is_empty() {
            return None;
        }
        let widths = bounds.widths();
        let point = bounds.min
            + Vec3::new(
                rng.next_value() * widths[0],
                rng.next_value() * widths[1],
                rng.next_value() * widths[2],
            );
        if self.contains(&point) {
            Some(point)
        } else {
            None
        }
    }
}

pub struct Cuboid {
    min: Vec3,
    max: Vec3,
    material: Arc<dyn Material>,
}

impl Cuboid {
    pub fn new(min: &Vec3, max: &Vec3, material: Arc<dyn Material>) -> Self {
        Cuboid {
            min: *min,
            max: *max,
            material,
        }
    }
    /// Cube of edge length `edge` centred on `centre`.
    pub fn cube(centre: &Vec3, edge: f64, material: Arc<dyn Material>) -> Self {
        let half = 0.5 * edge * Vec3::new(1.0, 1.0, 1.0);
        Cuboid::new(&(centre - half), &(centre + half), material)
    }
}

impl Solid for Cuboid {
    fn bounding_box(&self) -> Aabb {
        Aabb::new(&self.min, &self.max)
    }
    fn contains(&self, point: &Vec3) -> bool {
        self.bounding_box().contains(point)
    }
    fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }
    fn intersection_interval(&self, ray: &Ray) -> Option<(f64, f64)> {
        let mut t_min = 0.0f64;
        let mut t_max = std::f64::INFINITY;
        for a in 0..3 {
            let inv_d = 1.0 / ray.direction[a];
            let mut t0 = (self.min[a] - ray.origin[a]) * inv_d;
            let mut t1 = (self.max[a] - ray.origin[a]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = f64::max(t_min, t0);
            t_max = f64::min(t_max, t1);
            if t_min > t_max {
                return None;
            }
        }
        Some((t_min, t_max))
    }
}

pub struct Sphere {
    centre: Vec3,
    radius: f64,
    material: Arc<dyn Material>,
}

impl Sphere {
    pub fn new(centre: &Vec3, radius: f64, material: Arc<dyn Material>) -> Self {
        Sphere {
            centre: *centre,
            radius,
            material,
        }
    }
}

impl Solid for Sphere {
    fn bounding_box(&self) -> Aabb {
        let rad_vec = Vec3::new(self.radius, self.radius, self.radius);
        Aabb::new(&(self.centre - rad_vec), &(self.centre + rad_vec))
    }
    fn contains(&self, point: &Vec3) -> bool {
        (point - self.centre).norm_squared() <= self.radius * self.radius
    }
    fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }
    fn intersection_interval(&self, ray: &Ray) -> Option<(f64, f64)> {
        let oc = ray.origin - self.centre;
        let b = oc.dot(&ray.direction);
        let c = oc.norm_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc <= 0.0 {
            return None;
        }
        let disc_rt = disc.sqrt();
        let t_exit = -b + disc_rt;
        if t_exit <= 0.0 {
            return None;
        }
        Some((f64::max(-b - disc_rt, 0.0), t_exit))
    }
}

/// Intersection of half-spaces `normal . p <= offset`, for shapes that are
/// neither boxes nor spheres (wedges, prisms). The caller supplies the
/// bounding box since it is not derivable from the planes alone.
pub struct ConvexSolid {
    planes: Vec<(Vec3, f64)>, // (unit normal, offset)
    bbox: Aabb,
    material: Arc<dyn Material>,
}

impl ConvexSolid {
    pub fn new(planes: Vec<(Vec3, f64)>, bbox: Aabb, material: Arc<dyn Material>) -> Self {
        let planes = planes
            .into_iter()
            .map(|(n, d)| {
                let norm = n.norm();
                (n / norm, d / norm)
            })
            .collect();
        ConvexSolid {
            planes,
            bbox,
            material,
        }
    }
}

impl Solid for ConvexSolid {
    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
    fn contains(&self, point: &Vec3) -> bool {
        self.planes
            .iter()
            .all(|(n, d)| n.dot(point) <= *d + MIN_SEGMENT)
    }
    fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }
    fn intersection_interval(&self, ray: &Ray) -> Option<(f64, f64)> {
        let mut t_min = 0.0f64;
        let mut t_max = std::f64::INFINITY;
        for (n, d) in &self.planes {
            let denom = n.dot(&ray.direction);
            let dist = d - n.dot(&ray.origin);
            if denom.abs() < 1e-14 {
                if dist < 0.0 {
                    return None; // parallel and outside
                }
            } else if denom > 0.0 {
                t_max = f64::min(t_max, dist / denom);
            } else {
                t_min = f64::max(t_min, dist / denom);
            }
            if t_min > t_max {
                return None;
            }
        }
        if !t_max.is_finite() {
            return None; // unbounded plane set, treat as a miss
        }
        Some((t_min, t_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::IsotropicMaterial;
    use crate::rng::SeededRng;
    use approx::assert_relative_eq;

    fn unit_material() -> Arc<dyn Material> {
        Arc::new(IsotropicMaterial::new(1.0, 0.0))
    }

    #[test]
    fn cuboid_interval_from_inside_and_outside() {
        let cube = Cuboid::cube(&Vec3::new(0.0, 0.0, 0.0), 1.0, unit_material());
        // from inside: entry clipped to 0
        let ray = Ray::new(&Vec3::new(0.1, 0.0, 0.0), &Vec3::new(1.0, 0.0, 0.0));
        let (t0, t1) = cube.intersection_interval(&ray).unwrap();
        assert_relative_eq!(t0, 0.0, epsilon = 1e-12);
        assert_relative_eq!(t1, 0.4, epsilon = 1e-12);
        // from outside
        let ray = Ray::new(&Vec3::new(-2.0, 0.0, 0.0), &Vec3::new(1.0, 0.0, 0.0));
        let (t0, t1) = cube.intersection_interval(&ray).unwrap();
        assert_relative_eq!(t0, 1.5, epsilon = 1e-12);
        assert_relative_eq!(t1, 2.5, epsilon = 1e-12);
        // miss
        let ray = Ray::new(&Vec3::new(-2.0, 2.0, 0.0), &Vec3::new(1.0, 0.0, 0.0));
        assert!(cube.intersection_interval(&ray).is_none());
    }

    #[test]
    fn cuboid_intercept_appends_one_link() {
        let cube = Cuboid::cube(&Vec3::new(0.0, 0.0, 0.0), 1.0, unit_material());
        let mut track = Track::new(&Vec3::new(0.0, 0.0, 0.0), &Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(cube.intercept_surface(&mut track), 1);
        assert_relative_eq!(track.links()[0].distance, 0.5, epsilon = 1e-12);
        // track starting past the far face misses
        let mut track = Track::new(&Vec3::new(0.0, 0.0, 2.0), &Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(cube.intercept_surface(&mut track), 0);
    }

    #[test]
    fn sphere_interval_through_centre() {
        let ball = Sphere::new(&Vec3::new(0.0, 0.0, 0.0), 1.0, unit_material());
        let ray = Ray::new(&Vec3::new(-3.0, 0.0, 0.0), &Vec3::new(1.0, 0.0, 0.0));
        let (t0, t1) = ball.intersection_interval(&ray).unwrap();
        assert_relative_eq!(t0, 2.0, epsilon = 1e-12);
        assert_relative_eq!(t1, 4.0, epsilon = 1e-12);
        // behind the origin
        let ray = Ray::new(&Vec3::new(3.0, 0.0, 0.0), &Vec3::new(1.0, 0.0, 0.0));
        assert!(ball.intersection_interval(&ray).is_none());
    }

    #[test]
    fn convex_wedge_matches_plane_set() {
        // wedge: x >= 0, y <= 1, x - y <= 1, |z| <= 0.5
        let wedge = ConvexSolid::new(
            vec![
                (Vec3::new(-1.0, 0.0, 0.0), 0.0),
                (Vec3::new(0.0, 1.0, 0.0), 1.0),
                (Vec3::new(1.0, -1.0, 0.0), 1.0),
                (Vec3::new(0.0, 0.0, 1.0), 0.5),
                (Vec3::new(0.0, 0.0, -1.0), 0.5),
            ],
            Aabb::new(&Vec3::new(0.0, -1.0, -0.5), &Vec3::new(2.0, 1.0, 0.5)),
            unit_material(),
        );
        assert!(wedge.contains(&Vec3::new(0.5, 0.5, 0.0)));
        assert!(!wedge.contains(&Vec3::new(1.5, 0.0, 0.0))); // beyond the hypotenuse
        let ray = Ray::new(&Vec3::new(0.5, 0.2, 0.0), &Vec3::new(-1.0, 0.0, 0.0));
        let (t0, t1) = wedge.intersection_interval(&ray).unwrap();
        assert_relative_eq!(t0, 0.0, epsilon = 1e-12);
        assert_relative_eq!(t1, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn generated_points_lie_inside_solid_and_region() {
        let ball = Sphere::new(&Vec3::new(0.0, 0.0, 0.0), 1.0, unit_material());
        let region = Aabb::new(&Vec3::new(0.0, -1.0, -1.0), &Vec3::new(1.0, 1.0, 1.0));
        let mut rng = SeededRng::new(1);
        let mut accepted = 0;
        for _ in 0..500 {
            if let Some(p) = ball.generate_point(&mut rng, &region) {
                assert!(ball.contains(&p));
                assert!(region.contains(&p));
                accepted += 1;
            }
        }
        assert!(accepted > 0);
    }
}
