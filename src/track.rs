use crate::aliases::Vec3;
use crate::material::Material;
use crate::ray::Ray;
use std::sync::Arc;

/// One traversed segment of a track: where the ray entered an object, how far
/// it travelled inside, and the material it crossed.
pub struct Link {
    pub entry: Vec3,
    pub distance: f64,
    pub material: Arc<dyn Material>,
}

/// Ordered intersections of a semi-infinite ray with the sample and
/// environment geometry. Zero links means the ray missed every object.
pub struct Track {
    pub ray: Ray,
    links: Vec<Link>,
}

impl Track {
    pub fn new(origin: &Vec3, direction: &Vec3) -> Self {
        Track {
            ray: Ray::new(origin, direction),
            links: Vec::new(),
        }
    }
    pub fn add_link(&mut self, entry: Vec3, distance: f64, material: Arc<dyn Material>) {
        self.links.push(Link {
            entry,
            distance,
            material,
        });
    }
    /// Orders links by their entry distance along the ray.
    pub fn sort_links(&mut self) {
        let origin = self.ray.origin;
        self.links.sort_by(|a, b| {
            let da = (a.entry - origin).norm_squared();
            let db = (b.entry - origin).norm_squared();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    pub fn links(&self) -> &[Link] {
        &self.links
    }
    pub fn total_distance(&self) -> f64 {
        self.links.iter().map(|l| l.distance).sum()
    }
    /// Product of per-link material attenuations at the given wavelength.
    pub fn attenuation(&self, wavelength: f64) -> f64 {
        self.links
            .iter()
            .map(|l| l.material.attenuation(l.distance, wavelength))
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::IsotropicMaterial;
    use approx::assert_relative_eq;

    #[test]
    fn attenuation_is_product_over_links() {
        let mat: Arc<dyn Material> = Arc::new(IsotropicMaterial::new(1.0, 0.0));
        let mut track = Track::new(&Vec3::new(0.0, 0.0, 0.0), &Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(track.attenuation(1.8), 1.0);
        track.add_link(Vec3::new(0.0, 0.0, 0.0), 0.5, mat.clone());
        track.add_link(Vec3::new(1.0, 0.0, 0.0), 0.25, mat);
        assert_relative_eq!(track.attenuation(1.8), (-0.75f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(track.total_distance(), 0.75, epsilon = 1e-15);
    }

    #[test]
    fn sort_links_orders_by_entry_distance() {
        let mat: Arc<dyn Material> = Arc::new(IsotropicMaterial::new(1.0, 0.0));
        let mut track = Track::new(&Vec3::new(0.0, 0.0, 0.0), &Vec3::new(1.0, 0.0, 0.0));
        track.add_link(Vec3::new(2.0, 0.0, 0.0), 1.0, mat.clone());
        track.add_link(Vec3::new(0.5, 0.0, 0.0), 1.0, mat);
        track.sort_links();
        assert_eq!(track.links()[0].entry[0], 0.5);
        assert_eq!(track.links()[1].entry[0], 2.0);
    }
}
