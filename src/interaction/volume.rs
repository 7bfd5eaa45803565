use crate::aabb::Aabb;
use crate::aliases::Vec3;
use crate::error::SimulationError;
use crate::interaction::statistics::InteractionStatistics;
use crate::rng::RandomGen;
use crate::sample::Sample;
use crate::solid::Solid;
use crate::track::Track;
use std::sync::Arc;

/// Which components scatter points may be generated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScatterOrigin {
    SampleOnly,
    EnvironmentOnly,
    SampleAndEnvironment,
}

/// A scatter point together with the component it was generated in.
/// Component -1 is the sample; 0..N-1 are environment parts.
#[derive(Clone, Copy)]
pub struct ComponentScatterPoint {
    pub component: isize,
    pub point: Vec3,
}

/// Geometry a single simulated event interacts with: scatter-point
/// generation plus before/after track construction and attenuation.
pub trait InteractionVolume: Send + Sync {
    fn bounding_box(&self) -> Aabb;
    /// Generates one scatter point and the geometric tracks from it towards
    /// the beam start and towards the exit position. `Ok(None)` flags the
    /// numerically degenerate case of an empty before-track (point exactly on
    /// a boundary); the caller decides whether to retry. Statistics are
    /// updated on every attempt.
    fn calculate_before_after_track(
        &self,
        rng: &mut dyn RandomGen,
        start_pos: &Vec3,
        end_pos: &Vec3,
        stats: &mut InteractionStatistics,
    ) -> Result<Option<(Track, Track)>, SimulationError>;
    /// Attenuation over both track legs, the before leg at `lambda_before`
    /// and the after leg at `lambda_after`.
    fn calculate_absorption(
        &self,
        before: &Track,
        after: &Track,
        lambda_before: f64,
        lambda_after: f64,
    ) -> f64;
}

/// Sample shape plus ordered environment components, with the active region
/// restricting where scatter points are generated.
pub struct ScatteringVolume {
    sample: Option<Arc<dyn Solid>>,
    environment: Vec<Arc<dyn Solid>>,
    active_region: Aabb,
    max_scatter_attempts: usize,
    origin: ScatterOrigin,
}

impl ScatteringVolume {
    pub fn new(
        sample: &Sample,
        max_scatter_attempts: usize,
        origin: ScatterOrigin,
    ) -> Result<Self, SimulationError> {
        let shape = sample.shape.clone();
        let environment: Vec<Arc<dyn Solid>> = sample
            .environment
            .as_ref()
            .map(|env| env.components().to_vec())
            .unwrap_or_default();
        // narrow the requested origin to the geometry that actually exists
        let origin = match origin {
            ScatterOrigin::SampleOnly | ScatterOrigin::EnvironmentOnly => origin,
            ScatterOrigin::SampleAndEnvironment => {
                if environment.is_empty() {
                    ScatterOrigin::SampleOnly
                } else if shape.is_none() {
                    ScatterOrigin::EnvironmentOnly
                } else {
                    ScatterOrigin::SampleAndEnvironment
                }
            }
        };
        match origin {
            ScatterOrigin::SampleOnly if shape.is_none() => return Err(SimulationError::InvalidSample),
            ScatterOrigin::EnvironmentOnly if environment.is_empty() => {
                return Err(SimulationError::InvalidSample)
            }
            _ => {}
        }
        let mut volume = ScatteringVolume {
            sample: shape,
            environment,
            active_region: Aabb::empty(),
            max_scatter_attempts,
            origin,
        };
        volume.active_region = volume.full_bounding_box();
        Ok(volume)
    }

    /// Union of the sample and environment boxes, ignoring the active region.
    pub fn full_bounding_box(&self) -> Aabb {
        let mut bbox = self
            .sample
            .as_ref()
            .map_or_else(Aabb::empty, |s| s.bounding_box());
        for part in &self.environment {
            bbox = Aabb::unite(&bbox, &part.bounding_box());
        }
        bbox
    }

    /// Restricts scatter-point generation to `region`. Set once, before the
    /// volume is shared across simulation threads.
    pub fn set_active_region(&mut self, region: Aabb) {
        self.active_region = region;
    }
    pub fn active_region(&self) -> &Aabb {
        &self.active_region
    }

    /// `None` for a component the volume does not hold; the constructor's
    /// origin narrowing keeps chosen components resolvable.
    fn solid_for(&self, component: isize) -> Option<&Arc<dyn Solid>> {
        if component < 0 {
            self.sample.as_ref()
        } else {
            self.environment.get(component as usize)
        }
    }

    fn choose_component(&self, rng: &mut dyn RandomGen) -> isize {
        match self.origin {
            ScatterOrigin::SampleOnly => -1,
            ScatterOrigin::EnvironmentOnly => rng.next_int(0, self.environment.len() as i64 - 1) as isize,
            ScatterOrigin::SampleAndEnvironment => {
                rng.next_int(-1, self.environment.len() as i64 - 1) as isize
            }
        }
    }

    /// Picks a component and makes a single in-shape sampling attempt,
    /// repeating with a freshly chosen component until a point is found or
    /// the attempt budget is exhausted (a fatal error).
    pub fn generate_point(
        &self,
        rng: &mut dyn RandomGen,
    ) -> Result<ComponentScatterPoint, SimulationError> {
        for _ in 0..self.max_scatter_attempts {
            let component = self.choose_component(rng);
            let solid = self
                .solid_for(component)
                .ok_or(SimulationError::InvalidSample)?;
            if let Some(point) = solid.generate_point(rng, &self.active_region) {
                return Ok(ComponentScatterPoint { component, point });
            }
        }
        Err(SimulationError::ScatterPointFailure {
            attempts: self.max_scatter_attempts,
        })
    }

    fn intersect_all(&self, track: &mut Track) -> usize {
        let mut links = 0;
        if let Some(ref sample) = self.sample {
            links += sample.intercept_surface(track);
        }
        for part in &self.environment {
            links += part.intercept_surface(track);
        }
        track.sort_links();
        links
    }
}

impl InteractionVolume for ScatteringVolume {
    fn bounding_box(&self) -> Aabb {
        self.full_bounding_box()
    }

    fn calculate_before_after_track(
        &self,
        rng: &mut dyn RandomGen,
        start_pos: &Vec3,
        end_pos: &Vec3,
        stats: &mut InteractionStatistics,
    ) -> Result<Option<(Track, Track)>, SimulationError> {
        let scatter = self.generate_point(rng)?;
        let to_start = (start_pos - scatter.point).normalize();
        let mut before = Track::new(&scatter.point, &to_start);
        if self.intersect_all(&mut before) == 0 {
            // degenerate: the point sat exactly on a boundary
            stats.update_scatter_point_counts(scatter.component, false);
            return Ok(None);
        }
        let scattered = (end_pos - scatter.point).normalize();
        let mut after = Track::new(&scatter.point, &scattered);
        self.intersect_all(&mut after);
        stats.update_scatter_point_counts(scatter.component, true);
        stats.update_scatter_angle(&to_start, &scattered);
        Ok(Some((before, after)))
    }

    fn calculate_absorption(
        &self,
        before: &Track,
        after: &Track,
        lambda_before: f64,
        lambda_after: f64,
    ) -> f64 {
        before.attenuation(lambda_before) * after.attenuation(lambda_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{IsotropicMaterial, Material};
    use crate::rng::{SeededRng, SequenceRng};
    use crate::sample::SampleEnvironment;
    use crate::solid::Cuboid;
    use approx::assert_relative_eq;

    fn unit_material() -> Arc<dyn Material> {
        Arc::new(IsotropicMaterial::new(1.0, 0.0))
    }

    fn cube_sample() -> Sample {
        let cube = Cuboid::cube(&Vec3::new(0.0, 0.0, 0.0), 1.0, unit_material());
        Sample::new(Some(Arc::new(cube)), None)
    }

    fn cube_with_plate() -> Sample {
        let cube = Cuboid::cube(&Vec3::new(0.0, 0.0, 0.0), 1.0, unit_material());
        // a thin plate downstream of the sample
        let plate = Cuboid::new(
            &Vec3::new(-0.5, -0.5, 0.6),
            &Vec3::new(0.5, 0.5, 0.7),
            unit_material(),
        );
        Sample::new(
            Some(Arc::new(cube)),
            Some(SampleEnvironment::new(vec![Arc::new(plate)])),
        )
    }

    #[test]
    fn scatter_points_stay_inside_attributed_component() {
        let sample = cube_with_plate();
        let volume =
            ScatteringVolume::new(&sample, 100, ScatterOrigin::SampleAndEnvironment).unwrap();
        let mut rng = SeededRng::new(13);
        let mut seen_sample = false;
        let mut seen_env = false;
        for _ in 0..300 {
            let scatter = volume.generate_point(&mut rng).unwrap();
            let solid = volume.solid_for(scatter.component).unwrap();
            assert!(solid.contains(&scatter.point));
            assert!(volume.active_region().contains(&scatter.point));
            match scatter.component {
                -1 => seen_sample = true,
                0 => seen_env = true,
                other => panic!("unexpected component index {}", other),
            }
        }
        assert!(seen_sample && seen_env);
    }

    #[test]
    fn sample_only_origin_never_picks_environment() {
        let sample = cube_with_plate();
        let volume = ScatteringVolume::new(&sample, 100, ScatterOrigin::SampleOnly).unwrap();
        let mut rng = SeededRng::new(19);
        for _ in 0..100 {
            assert_eq!(volume.generate_point(&mut rng).unwrap().component, -1);
        }
    }

    #[test]
    fn unknown_components_resolve_to_none() {
        let sample = cube_sample();
        let volume =
            ScatteringVolume::new(&sample, 100, ScatterOrigin::SampleAndEnvironment).unwrap();
        assert!(volume.solid_for(-1).is_some());
        assert!(volume.solid_for(0).is_none());
        assert!(volume.solid_for(5).is_none());
    }

    #[test]
    fn empty_sample_is_rejected() {
        let sample = Sample::new(None, None);
        assert!(matches!(
            ScatteringVolume::new(&sample, 10, ScatterOrigin::SampleAndEnvironment),
            Err(SimulationError::InvalidSample)
        ));
    }

    #[test]
    fn exhausted_attempt_budget_is_fatal() {
        let sample = cube_sample();
        let mut volume =
            ScatteringVolume::new(&sample, 5, ScatterOrigin::SampleAndEnvironment).unwrap();
        // active region outside the cube: every sampling attempt fails
        volume.set_active_region(Aabb::new(
            &Vec3::new(5.0, 5.0, 5.0),
            &Vec3::new(6.0, 6.0, 6.0),
        ));
        let mut rng = SeededRng::new(2);
        assert!(matches!(
            volume.generate_point(&mut rng),
            Err(SimulationError::ScatterPointFailure { attempts: 5 })
        ));
    }

    #[test]
    fn before_after_tracks_span_the_cube() {
        let sample = cube_sample();
        let volume =
            ScatteringVolume::new(&sample, 100, ScatterOrigin::SampleAndEnvironment).unwrap();
        // canned values put the scatter point at the cube centre
        let mut rng = SequenceRng::new(&[0.5]);
        let mut stats = InteractionStatistics::new(0, 0);
        let start = Vec3::new(0.0, 0.0, -100.0);
        let end = Vec3::new(0.0, 0.0, 100.0);
        let (before, after) = volume
            .calculate_before_after_track(&mut rng, &start, &end, &mut stats)
            .unwrap()
            .unwrap();
        assert_eq!(before.links().len(), 1);
        assert_eq!(after.links().len(), 1);
        assert_relative_eq!(before.total_distance(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(after.total_distance(), 0.5, epsilon = 1e-9);
        assert_eq!(stats.generated_points(-1), 1);
        assert_eq!(stats.used_points(-1), 1);
        // straight-through scattering: 180 degrees between the two legs
        assert_relative_eq!(stats.scatter_angle_mean(), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn absorption_is_product_of_both_legs() {
        let sample = cube_sample();
        let volume =
            ScatteringVolume::new(&sample, 100, ScatterOrigin::SampleAndEnvironment).unwrap();
        let mut rng = SequenceRng::new(&[0.5]);
        let mut stats = InteractionStatistics::new(0, 0);
        let start = Vec3::new(0.0, 0.0, -100.0);
        let end = Vec3::new(0.0, 0.0, 100.0);
        let (before, after) = volume
            .calculate_before_after_track(&mut rng, &start, &end, &mut stats)
            .unwrap()
            .unwrap();
        let factor = volume.calculate_absorption(&before, &after, 1.8, 1.8);
        // mu = 1, total path = 1.0
        assert_relative_eq!(factor, (-1.0f64).exp(), epsilon = 1e-9);
        assert!(factor > 0.0 && factor <= 1.0);
    }
}
