use crate::beam::{create_profile, BeamProfile};
use crate::error::SimulationError;
use crate::interaction::statistics::InteractionStatistics;
use crate::interaction::volume::{ScatterOrigin, ScatteringVolume};
use crate::interpolation::{interpolate_cspline_inplace, interpolate_linear_inplace};
use crate::rng::SeededRng;
use crate::sample::Sample;
use crate::sparse::{detector_angles, SparseWorkspace};
use crate::strategy::{AbsorptionStrategy, MonteCarloStrategy};
use crate::workspace::{DeltaEMode, Workspace, XUnit};
use crate::aliases::Vec3;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// How un-simulated wavelength bins are filled from the simulated subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    CSpline,
}

/// Tuning knobs of an absorption-correction run.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Monte Carlo events per simulated wavelength point.
    pub events_per_point: usize,
    /// Number of wavelength points to simulate per spectrum; `None` simulates
    /// every bin.
    pub wavelength_points: Option<usize>,
    pub seed: u64,
    /// Regenerate tracks for every wavelength instead of reusing one set.
    pub resimulate_tracks: bool,
    pub interpolation: Interpolation,
    /// Simulate a coarse detector grid and interpolate the real detectors.
    pub sparse_instrument: bool,
    pub detector_rows: usize,
    pub detector_columns: usize,
    pub max_scatter_attempts: usize,
    pub scatter_origin: ScatterOrigin,
    /// Worker thread count; `None` uses the available parallelism.
    pub threads: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            events_per_point: 300,
            wavelength_points: None,
            seed: 123456789,
            resimulate_tracks: false,
            interpolation: Interpolation::Linear,
            sparse_instrument: false,
            detector_rows: 10,
            detector_columns: 10,
            max_scatter_attempts: 5000,
            scatter_origin: ScatterOrigin::SampleAndEnvironment,
            threads: None,
        }
    }
}

/// Orchestrates a run: validation, optional sparse-grid build, per-spectrum
/// simulation, wavelength and angular interpolation, output assembly.
pub struct MonteCarloAbsorption {
    config: SimulationConfig,
}

impl MonteCarloAbsorption {
    pub fn new(config: SimulationConfig) -> Self {
        MonteCarloAbsorption { config }
    }

    /// Runs the full correction, producing a clone of the input workspace
    /// with Y/E replaced by attenuation factors and their errors.
    pub fn run(&self, workspace: &Workspace, sample: &Sample) -> Result<Workspace, SimulationError> {
        let cancel = AtomicBool::new(false);
        self.run_cancellable(workspace, sample, &cancel)
    }

    /// As `run`, polling `cancel` roughly every 100 simulated histograms per
    /// worker; a set flag aborts with `SimulationError::Interrupted`.
    pub fn run_cancellable(
        &self,
        workspace: &Workspace,
        sample: &Sample,
        cancel: &AtomicBool,
    ) -> Result<Workspace, SimulationError> {
        self.validate(workspace, sample)?;
        let mut volume = ScatteringVolume::new(
            sample,
            self.config.max_scatter_attempts,
            self.config.scatter_origin,
        )?;
        let full_box = volume.full_bounding_box();
        let beam: Arc<dyn BeamProfile> = create_profile(
            &workspace.instrument.frame,
            &workspace.instrument.source,
            &full_box,
        )
        .into();
        let active_region = beam.define_active_region(&full_box);
        volume.set_active_region(active_region);
        let strategy = MonteCarloStrategy::new(
            beam,
            Arc::new(volume),
            active_region,
            self.config.events_per_point,
            self.config.max_scatter_attempts,
            workspace.emode,
            self.config.resimulate_tracks,
        );
        self.execute(workspace, sample.environment_size(), &strategy, cancel)
    }

    /// Injection seam for testing with a substitute strategy.
    pub fn run_with_strategy(
        &self,
        workspace: &Workspace,
        sample: &Sample,
        strategy: &dyn AbsorptionStrategy,
    ) -> Result<Workspace, SimulationError> {
        self.validate(workspace, sample)?;
        let cancel = AtomicBool::new(false);
        self.execute(workspace, sample.environment_size(), strategy, &cancel)
    }

    fn validate(&self, workspace: &Workspace, sample: &Sample) -> Result<(), SimulationError> {
        if workspace.x_unit != XUnit::Wavelength {
            return Err(SimulationError::InvalidUnits);
        }
        if !sample.has_geometry() {
            return Err(SimulationError::InvalidSample);
        }
        match workspace.emode {
            DeltaEMode::Direct | DeltaEMode::Indirect if workspace.lambda_fixed.is_none() => {
                return Err(SimulationError::MissingFixedWavelength)
            }
            _ => {}
        }
        Ok(())
    }

    fn execute(
        &self,
        workspace: &Workspace,
        environment_size: usize,
        strategy: &dyn AbsorptionStrategy,
        cancel: &AtomicBool,
    ) -> Result<Workspace, SimulationError> {
        log::info!(
            "Simulating {} events per wavelength point (seed {})",
            self.config.events_per_point,
            self.config.seed
        );
        let lambda_fixed = workspace.lambda_fixed.unwrap_or(0.0);
        let mut output = workspace.clone();
        let skipped = AtomicUsize::new(0);
        if self.config.sparse_instrument {
            self.execute_sparse(
                workspace,
                environment_size,
                strategy,
                lambda_fixed,
                cancel,
                &skipped,
                &mut output,
            )?;
        } else {
            let results = self.parallel_map(workspace.spectrum_count(), cancel, &|idx| {
                let spectrum = &workspace.spectra[idx];
                let histogram = &workspace.histograms[idx];
                let nbins = histogram.bin_count();
                if spectrum.masked {
                    return Ok((vec![0.0; nbins], vec![0.0; nbins]));
                }
                let detector = match spectrum.detector {
                    Some(detector) => detector,
                    None => {
                        skipped.fetch_add(1, Ordering::Relaxed);
                        return Ok((vec![0.0; nbins], vec![0.0; nbins]));
                    }
                };
                self.simulate_histogram(
                    strategy,
                    detector.id,
                    &detector.position,
                    &histogram.points(),
                    lambda_fixed,
                    environment_size,
                    self.config.seed.wrapping_add(idx as u64),
                )
            })?;
            for (idx, (y, e)) in results.into_iter().enumerate() {
                output.histograms[idx].y = y;
                output.histograms[idx].e = e;
            }
        }
        let skipped = skipped.load(Ordering::Relaxed);
        if skipped > 0 {
            log::warn!(
                "{} spectra without a resolvable detector were given zero output",
                skipped
            );
        }
        output.distribution = true;
        output.y_label = "Attenuation factor".to_string();
        Ok(output)
    }

    fn execute_sparse(
        &self,
        workspace: &Workspace,
        environment_size: usize,
        strategy: &dyn AbsorptionStrategy,
        lambda_fixed: f64,
        cancel: &AtomicBool,
        skipped: &AtomicUsize,
        output: &mut Workspace,
    ) -> Result<(), SimulationError> {
        let mut sparse = SparseWorkspace::new(
            workspace,
            self.config.detector_rows,
            self.config.detector_columns,
        )?;
        log::info!(
            "Sparse instrument: simulating a {}x{} detector grid",
            self.config.detector_rows,
            self.config.detector_columns
        );
        let model_points = workspace
            .histograms
            .first()
            .map(|h| h.points())
            .unwrap_or_default();
        let results = self.parallel_map(sparse.grid_size(), cancel, &|idx| {
            let position = sparse.detector(idx).position;
            self.simulate_histogram(
                strategy,
                idx as i64,
                &position,
                &model_points,
                lambda_fixed,
                environment_size,
                self.config.seed.wrapping_add(idx as u64),
            )
        })?;
        for (idx, (y, e)) in results.into_iter().enumerate() {
            sparse.set_result(idx, y, e);
        }
        let frame = workspace.instrument.frame;
        for (idx, spectrum) in workspace.spectra.iter().enumerate() {
            let nbins = workspace.histograms[idx].bin_count();
            let (y, e) = if spectrum.masked {
                (vec![0.0; nbins], vec![0.0; nbins])
            } else if let Some(detector) = spectrum.detector {
                let (latitude, longitude) = detector_angles(&frame, &detector.position);
                sparse.interpolate(latitude, longitude)
            } else {
                skipped.fetch_add(1, Ordering::Relaxed);
                (vec![0.0; nbins], vec![0.0; nbins])
            };
            output.histograms[idx].y = y;
            output.histograms[idx].e = e;
        }
        Ok(())
    }

    /// Simulates one detector: picks the wavelength subset, invokes the
    /// strategy once with it, scatters the results into the full axis and
    /// fills the gaps by interpolation.
    #[allow(clippy::too_many_arguments)]
    fn simulate_histogram(
        &self,
        strategy: &dyn AbsorptionStrategy,
        detector_id: i64,
        position: &Vec3,
        points: &[f64],
        lambda_fixed: f64,
        environment_size: usize,
        seed: u64,
    ) -> Result<(Vec<f64>, Vec<f64>), SimulationError> {
        let nbins = points.len();
        if nbins == 0 {
            return Ok((Vec::new(), Vec::new()));
        }
        let nlambda = self
            .config
            .wavelength_points
            .unwrap_or(nbins)
            .max(1)
            .min(nbins);
        let step = (nbins / nlambda).max(1);
        let mut simulated: Vec<usize> = (0..nbins).step_by(step).collect();
        // the last bin is always simulated so interpolation has a right neighbour
        if simulated.last() != Some(&(nbins - 1)) {
            simulated.push(nbins - 1);
        }
        if step > 1
            && self.config.interpolation == Interpolation::CSpline
            && simulated.len() < 3
        {
            return Err(SimulationError::TooFewWavelengthPoints(simulated.len()));
        }
        let lambdas: Vec<f64> = simulated.iter().map(|&i| points[i]).collect();
        let mut factors = vec![0.0; simulated.len()];
        let mut errors = vec![0.0; simulated.len()];
        let mut stats = InteractionStatistics::new(detector_id, environment_size);
        let mut rng = SeededRng::new(seed);
        strategy.calculate(
            &mut rng,
            position,
            &lambdas,
            lambda_fixed,
            &mut factors,
            &mut errors,
            &mut stats,
        )?;
        log::debug!("{}", stats.report());
        let mut y = vec![0.0; nbins];
        let mut e = vec![0.0; nbins];
        for (k, &i) in simulated.iter().enumerate() {
            y[i] = factors[k];
            e[i] = errors[k];
        }
        if step > 1 {
            match self.config.interpolation {
                Interpolation::Linear => interpolate_linear_inplace(points, &simulated, &mut y, &mut e),
                Interpolation::CSpline => {
                    interpolate_cspline_inplace(points, &simulated, &mut y, &mut e)
                }
            }
        }
        Ok((y, e))
    }

    /// Fork/join map over `count` units of work. Spectra are strided across
    /// workers; each worker owns its results until join, so no locking is
    /// needed. The first captured error (or panic) is rethrown after all
    /// workers have joined.
    fn parallel_map<F>(
        &self,
        count: usize,
        cancel: &AtomicBool,
        worker: &F,
    ) -> Result<Vec<(Vec<f64>, Vec<f64>)>, SimulationError>
    where
        F: Fn(usize) -> Result<(Vec<f64>, Vec<f64>), SimulationError> + Sync,
    {
        if count == 0 {
            return Ok(Vec::new());
        }
        let n_threads = self
            .config
            .threads
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
            .min(count);
        type Part = Vec<(usize, (Vec<f64>, Vec<f64>))>;
        let scope_result = crossbeam::thread::scope(|scope| {
            let mut handles = Vec::new();
            for t in 0..n_threads {
                handles.push(scope.spawn(move |_| -> Result<Part, SimulationError> {
                    let mut part = Part::new();
                    let mut processed = 0usize;
                    let mut idx = t;
                    while idx < count {
                        if processed % 100 == 0 && cancel.load(Ordering::Relaxed) {
                            return Err(SimulationError::Interrupted);
                        }
                        part.push((idx, worker(idx)?));
                        processed += 1;
                        idx += n_threads;
                    }
                    Ok(part)
                }));
            }
            let mut merged: Vec<(Vec<f64>, Vec<f64>)> = vec![Default::default(); count];
            let mut first_err: Option<SimulationError> = None;
            for handle in handles {
                match handle.join() {
                    Ok(Ok(part)) => {
                        for (idx, data) in part {
                            merged[idx] = data;
                        }
                    }
                    Ok(Err(err)) => {
                        if first_err.is_none() {
                            first_err = Some(err);
                        }
                    }
                    Err(_) => {
                        if first_err.is_none() {
                            first_err = Some(SimulationError::WorkerPanic);
                        }
                    }
                }
            }
            match first_err {
                Some(err) => Err(err),
                None => Ok(merged),
            }
        });
        match scope_result {
            Ok(result) => result,
            Err(_) => Err(SimulationError::WorkerPanic),
        }
    }
}
