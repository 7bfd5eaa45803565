use crate::aabb::Aabb;
use crate::aliases::Vec3;
use crate::beam::BeamProfile;
use crate::error::SimulationError;
use crate::interaction::statistics::InteractionStatistics;
use crate::interaction::volume::InteractionVolume;
use crate::rng::RandomGen;
use crate::track::Track;
use crate::workspace::DeltaEMode;
use std::sync::Arc;

/// Computes attenuation factors for one detector over a set of wavelengths.
pub trait AbsorptionStrategy: Send + Sync {
    /// Fills `factors`/`errors` (same length as `wavelengths`) with the mean
    /// per-event attenuation and its statistical error.
    fn calculate(
        &self,
        rng: &mut dyn RandomGen,
        detector_pos: &Vec3,
        wavelengths: &[f64],
        lambda_fixed: f64,
        factors: &mut [f64],
        errors: &mut [f64],
        stats: &mut InteractionStatistics,
    ) -> Result<(), SimulationError>;
}

/// The Monte Carlo strategy: average the Beer-Lambert attenuation of random
/// scatter-point tracks between a sampled beam ray and the detector.
pub struct MonteCarloStrategy {
    beam: Arc<dyn BeamProfile>,
    volume: Arc<dyn InteractionVolume>,
    active_region: Aabb,
    nevents: usize,
    max_scatter_attempts: usize,
    emode: DeltaEMode,
    /// When set, a fresh track set is generated per wavelength instead of
    /// reusing one set across all wavelengths. Reuse is valid because
    /// wavelength only affects attenuation coefficients, not ray geometry.
    regenerate_tracks: bool,
}

impl MonteCarloStrategy {
    pub fn new(
        beam: Arc<dyn BeamProfile>,
        volume: Arc<dyn InteractionVolume>,
        active_region: Aabb,
        nevents: usize,
        max_scatter_attempts: usize,
        emode: DeltaEMode,
        regenerate_tracks: bool,
    ) -> Self {
        MonteCarloStrategy {
            beam,
            volume,
            active_region,
            nevents,
            max_scatter_attempts,
            emode,
            regenerate_tracks,
        }
    }

    /// (lambda_before, lambda_after) for one simulated wavelength point.
    fn lambda_pair(&self, lambda_step: f64, lambda_fixed: f64) -> (f64, f64) {
        match self.emode {
            DeltaEMode::Elastic => (lambda_step, lambda_step),
            DeltaEMode::Direct => (lambda_fixed, lambda_step),
            DeltaEMode::Indirect => (lambda_step, lambda_fixed),
        }
    }

    /// Samples a beam ray and builds its track pair, retrying degenerate
    /// track generation up to the attempt budget.
    fn generate_tracks(
        &self,
        rng: &mut dyn RandomGen,
        detector_pos: &Vec3,
        stats: &mut InteractionStatistics,
    ) -> Result<(Track, Track), SimulationError> {
        for _ in 0..self.max_scatter_attempts {
            let ray = self.beam.generate_point_within(rng, &self.active_region);
            if let Some(pair) =
                self.volume
                    .calculate_before_after_track(rng, &ray.origin, detector_pos, stats)?
            {
                return Ok(pair);
            }
        }
        Err(SimulationError::TrackGenerationFailure {
            attempts: self.max_scatter_attempts,
        })
    }
}

impl AbsorptionStrategy for MonteCarloStrategy {
    fn calculate(
        &self,
        rng: &mut dyn RandomGen,
        detector_pos: &Vec3,
        wavelengths: &[f64],
        lambda_fixed: f64,
        factors: &mut [f64],
        errors: &mut [f64],
        stats: &mut InteractionStatistics,
    ) -> Result<(), SimulationError> {
        debug_assert_eq!(wavelengths.len(), factors.len());
        debug_assert_eq!(wavelengths.len(), errors.len());
        for factor in factors.iter_mut() {
            *factor = 0.0;
        }
        if self.regenerate_tracks {
            for (i, &lambda) in wavelengths.iter().enumerate() {
                let (before_l, after_l) = self.lambda_pair(lambda, lambda_fixed);
                for _ in 0..self.nevents {
                    let (before, after) = self.generate_tracks(rng, detector_pos, stats)?;
                    factors[i] += self
                        .volume
                        .calculate_absorption(&before, &after, before_l, after_l);
                }
            }
        } else {
            for _ in 0..self.nevents {
                let (before, after) = self.generate_tracks(rng, detector_pos, stats)?;
                for (i, &lambda) in wavelengths.iter().enumerate() {
                    let (before_l, after_l) = self.lambda_pair(lambda, lambda_fixed);
                    factors[i] += self
                        .volume
                        .calculate_absorption(&before, &after, before_l, after_l);
                }
            }
        }
        let nevents = self.nevents as f64;
        // fixed statistical-error approximation, not the sample SD
        let error = 1.0 / nevents.sqrt();
        for i in 0..wavelengths.len() {
            factors[i] /= nevents;
            errors[i] = error;
        }
        Ok(())
    }
}
