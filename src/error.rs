use thiserror::Error;

/// Failure modes of an absorption-correction run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("sample has neither a valid shape nor an environment to scatter from")]
    InvalidSample,
    #[error("input workspace x-axis must be in units of wavelength")]
    InvalidUnits,
    #[error("direct/indirect energy mode requires a fixed wavelength on the workspace")]
    MissingFixedWavelength,
    #[error("unable to generate a scatter point after {attempts} attempts")]
    ScatterPointFailure { attempts: usize },
    #[error("unable to generate a valid before/after track pair after {attempts} attempts")]
    TrackGenerationFailure { attempts: usize },
    #[error("cubic spline interpolation requires at least 3 simulated wavelength points, got {0}")]
    TooFewWavelengthPoints(usize),
    #[error("instrument has no detectors with a resolvable position")]
    NoDetectors,
    #[error("simulation interrupted")]
    Interrupted,
    #[error("simulation worker thread panicked")]
    WorkerPanic,
}
