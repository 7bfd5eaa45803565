//! Monte Carlo calculation of self-attenuation corrections for scattered
//! radiation. For each detector, random scatter points inside the sample (and
//! its environment) are joined to a sampled beam entry ray and to the
//! detector; averaging the Beer-Lambert attenuation along those track pairs
//! yields the wavelength-dependent attenuation factor and its error.
//!
//! [`simulation::MonteCarloAbsorption`] is the entry point; everything else
//! is the machinery it drives.

pub mod aabb;
pub mod aliases;
pub mod beam;
pub mod error;
pub mod interaction;
pub mod interpolation;
pub mod material;
pub mod ray;
pub mod rng;
pub mod sample;
pub mod simulation;
pub mod solid;
pub mod sparse;
pub mod strategy;
pub mod track;
pub mod util;
pub mod workspace;
