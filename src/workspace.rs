use crate::aliases::Vec3;
use crate::beam::{ReferenceFrame, SourceGeometry};

/// Unit of the x-axis of a workspace. Only wavelength is usable here; the
/// conversion itself belongs to the surrounding reduction framework.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XUnit {
    Wavelength,
    Other,
}

/// Energy-transfer mode of the measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeltaEMode {
    Elastic,
    Direct,
    Indirect,
}

/// A physical detector pixel: stable identifier plus position relative to
/// the sample at the origin.
#[derive(Clone, Copy, Debug)]
pub struct Detector {
    pub id: i64,
    pub position: Vec3,
}

/// One spectrum's wavelength axis and data. `x` holds either points
/// (`x.len() == y.len()`) or bin edges (`x.len() == y.len() + 1`).
#[derive(Clone, Debug)]
pub struct Histogram {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub e: Vec<f64>,
}

impl Histogram {
    pub fn new(x: Vec<f64>, y: Vec<f64>, e: Vec<f64>) -> Self {
        Histogram { x, y, e }
    }
    /// X values as points, converting bin edges to centres when necessary.
    pub fn points(&self) -> Vec<f64> {
        if self.x.len() == self.y.len() + 1 {
            self.x.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
        } else {
            self.x.clone()
        }
    }
    pub fn bin_count(&self) -> usize {
        self.y.len()
    }
}

/// Per-spectrum metadata: the detector it maps to (if any) and its mask flag.
#[derive(Clone, Copy, Debug)]
pub struct SpectrumInfo {
    pub detector: Option<Detector>,
    pub masked: bool,
}

impl SpectrumInfo {
    pub fn mapped(detector: Detector) -> Self {
        SpectrumInfo {
            detector: Some(detector),
            masked: false,
        }
    }
    pub fn unmapped() -> Self {
        SpectrumInfo {
            detector: None,
            masked: false,
        }
    }
}

/// The instrument parameters this correction consumes: the axis convention
/// and the source-as-seen-from-the-sample geometry.
#[derive(Clone, Copy, Debug)]
pub struct Instrument {
    pub frame: ReferenceFrame,
    pub source: SourceGeometry,
}

/// Minimal in-memory workspace: parallel histograms and spectrum metadata,
/// plus the labels the output inherits. Cloning produces the skeleton the
/// simulation writes its Y/E into.
#[derive(Clone, Debug)]
pub struct Workspace {
    pub instrument: Instrument,
    pub histograms: Vec<Histogram>,
    pub spectra: Vec<SpectrumInfo>,
    pub x_unit: XUnit,
    pub emode: DeltaEMode,
    /// Fixed wavelength for direct/indirect geometry, already converted from
    /// the fixed energy by the framework.
    pub lambda_fixed: Option<f64>,
    pub distribution: bool,
    pub y_label: String,
}

impl Workspace {
    pub fn new(
        instrument: Instrument,
        histograms: Vec<Histogram>,
        spectra: Vec<SpectrumInfo>,
    ) -> Self {
        debug_assert_eq!(histograms.len(), spectra.len());
        Workspace {
            instrument,
            histograms,
            spectra,
            x_unit: XUnit::Wavelength,
            emode: DeltaEMode::Elastic,
            lambda_fixed: None,
            distribution: false,
            y_label: String::new(),
        }
    }
    pub fn spectrum_count(&self) -> usize {
        self.histograms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_edges_convert_to_centres() {
        let hist = Histogram::new(vec![0.0, 1.0, 2.0], vec![5.0, 6.0], vec![0.1, 0.1]);
        assert_eq!(hist.points(), vec![0.5, 1.5]);
        // point data passes through unchanged
        let hist = Histogram::new(vec![0.5, 1.5], vec![5.0, 6.0], vec![0.1, 0.1]);
        assert_eq!(hist.points(), vec![0.5, 1.5]);
    }
}
