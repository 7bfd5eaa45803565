use crate::aliases::Vec3;
use crate::beam::ReferenceFrame;
use crate::error::SimulationError;
use crate::workspace::Workspace;
use itertools::iproduct;

/// (latitude, longitude) of a position relative to the sample at the origin:
/// latitude is the elevation out of the horizontal plane, longitude the
/// rotation around the up axis measured from the beam direction.
pub fn detector_angles(frame: &ReferenceFrame, position: &Vec3) -> (f64, f64) {
    let beam = position[frame.beam];
    let horizontal = position[frame.horizontal()];
    let up = position[frame.up];
    let latitude = up.atan2((beam * beam + horizontal * horizontal).sqrt());
    let longitude = horizontal.atan2(beam);
    (latitude, longitude)
}

/// One synthetic grid detector.
#[derive(Clone, Copy, Debug)]
pub struct SparseDetector {
    pub latitude: f64,
    pub longitude: f64,
    pub position: Vec3,
}

/// A coarse rows x columns grid of synthetic detectors spanning the angular
/// extent of the real instrument. Grid histograms are simulated once, then
/// consumed read-only to interpolate every real detector.
pub struct SparseWorkspace {
    rows: usize,
    columns: usize,
    detectors: Vec<SparseDetector>, // row-major
    lat_min: f64,
    lat_step: f64,
    long_min: f64,
    long_step: f64,
    /// Simulated (y, e) per grid detector, filled after construction.
    results: Vec<(Vec<f64>, Vec<f64>)>,
}

impl SparseWorkspace {
    /// Lays out the grid over the latitude/longitude extremes of every
    /// spectrum with a resolvable detector position.
    pub fn new(
        workspace: &Workspace,
        rows: usize,
        columns: usize,
    ) -> Result<Self, SimulationError> {
        let frame = workspace.instrument.frame;
        let mut lat_min = std::f64::INFINITY;
        let mut lat_max = std::f64::NEG_INFINITY;
        let mut long_min = std::f64::INFINITY;
        let mut long_max = std::f64::NEG_INFINITY;
        let mut distance_sum = 0.0;
        let mut detector_count = 0usize;
        for spectrum in &workspace.spectra {
            if let Some(detector) = spectrum.detector {
                let (lat, long) = detector_angles(&frame, &detector.position);
                lat_min = lat_min.min(lat);
                lat_max = lat_max.max(lat);
                long_min = long_min.min(long);
                long_max = long_max.max(long);
                distance_sum += detector.position.norm();
                detector_count += 1;
            }
        }
        if detector_count == 0 {
            return Err(SimulationError::NoDetectors);
        }
        let radius = distance_sum / detector_count as f64;
        let lat_step = if rows > 1 {
            (lat_max - lat_min) / (rows - 1) as f64
        } else {
            0.0
        };
        let long_step = if columns > 1 {
            (long_max - long_min) / (columns - 1) as f64
        } else {
            0.0
        };
        let detectors = iproduct!(0..rows, 0..columns)
            .map(|(i, j)| {
                let latitude = lat_min + i as f64 * lat_step;
                let longitude = long_min + j as f64 * long_step;
                let mut position = Vec3::zeros();
                position[frame.beam] = radius * latitude.cos() * longitude.cos();
                position[frame.horizontal()] = radius * latitude.cos() * longitude.sin();
                position[frame.up] = radius * latitude.sin();
                SparseDetector {
                    latitude,
                    longitude,
                    position,
                }
            })
            .collect::<Vec<_>>();
        let count = detectors.len();
        Ok(SparseWorkspace {
            rows,
            columns,
            detectors,
            lat_min,
            lat_step,
            long_min,
            long_step,
            results: vec![(Vec::new(), Vec::new()); count],
        })
    }

    pub fn grid_size(&self) -> usize {
        self.rows * self.columns
    }
    pub fn detector(&self, index: usize) -> &SparseDetector {
        &self.detectors[index]
    }
    pub fn set_result(&mut self, index: usize, y: Vec<f64>, e: Vec<f64>) {
        self.results[index] = (y, e);
    }

    /// Cell index and fractional offset along one grid axis, clamped so
    /// detectors slightly outside the grid reuse the edge cells.
    fn cell(value: f64, origin: f64, step: f64, count: usize) -> (usize, usize, f64) {
        if count <= 1 || step == 0.0 {
            return (0, 0, 0.0);
        }
        let t = ((value - origin) / step).max(0.0);
        let i = (t.floor() as usize).min(count - 2);
        let frac = (t - i as f64).max(0.0).min(1.0);
        (i, i + 1, frac)
    }

    /// Bilinear interpolation over the four grid points surrounding the
    /// detector's angular position; errors combine in quadrature with the
    /// same weights.
    pub fn interpolate(&self, latitude: f64, longitude: f64) -> (Vec<f64>, Vec<f64>) {
        let (i0, i1, u) = Self::cell(latitude, self.lat_min, self.lat_step, self.rows);
        let (j0, j1, v) = Self::cell(longitude, self.long_min, self.long_step, self.columns);
        let corners = [
            (i0 * self.columns + j0, (1.0 - u) * (1.0 - v)),
            (i1 * self.columns + j0, u * (1.0 - v)),
            (i0 * self.columns + j1, (1.0 - u) * v),
            (i1 * self.columns + j1, u * v),
        ];
        let nbins = self.results[corners[0].0].0.len();
        let mut y = vec![0.0; nbins];
        let mut e = vec![0.0; nbins];
        for &(idx, weight) in &corners {
            let (ref cy, ref ce) = self.results[idx];
            for k in 0..nbins {
                y[k] += weight * cy[k];
                e[k] += (weight * ce[k]).powi(2);
            }
        }
        for ek in e.iter_mut() {
            *ek = ek.sqrt();
        }
        (y, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::SourceGeometry;
    use crate::workspace::{Detector, Histogram, Instrument, SpectrumInfo};
    use approx::assert_relative_eq;

    fn workspace_with_detectors(positions: &[Vec3]) -> Workspace {
        let instrument = Instrument {
            frame: ReferenceFrame::default(),
            source: SourceGeometry {
                distance: 10.0,
                shape: None,
            },
        };
        let histograms = positions
            .iter()
            .map(|_| Histogram::new(vec![1.0, 2.0], vec![0.0, 0.0], vec![0.0, 0.0]))
            .collect();
        let spectra = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                SpectrumInfo::mapped(Detector {
                    id: i as i64,
                    position: *p,
                })
            })
            .collect();
        Workspace::new(instrument, histograms, spectra)
    }

    #[test]
    fn angles_for_axis_aligned_detectors() {
        let frame = ReferenceFrame::default(); // beam z, up y
        let (lat, long) = detector_angles(&frame, &Vec3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(lat, 0.0, epsilon = 1e-12);
        assert_relative_eq!(long, 0.0, epsilon = 1e-12);
        let (lat, long) = detector_angles(&frame, &Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(lat, 0.0, epsilon = 1e-12);
        assert_relative_eq!(long, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        let (lat, _) = detector_angles(&frame, &Vec3::new(0.0, 2.0, 2.0));
        assert_relative_eq!(lat, std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn grid_spans_detector_extremes() {
        let ws = workspace_with_detectors(&[
            Vec3::new(0.0, -1.0, 2.0),
            Vec3::new(0.0, 1.0, 2.0),
            Vec3::new(1.0, 0.0, 2.0),
        ]);
        let sparse = SparseWorkspace::new(&ws, 3, 4).unwrap();
        assert_eq!(sparse.grid_size(), 12);
        let first = sparse.detector(0);
        let last = sparse.detector(11);
        assert!(first.latitude < last.latitude);
        assert!(first.longitude < last.longitude);
    }

    #[test]
    fn no_positions_is_an_error() {
        let instrument = Instrument {
            frame: ReferenceFrame::default(),
            source: SourceGeometry {
                distance: 10.0,
                shape: None,
            },
        };
        let ws = Workspace::new(
            instrument,
            vec![Histogram::new(vec![1.0], vec![0.0], vec![0.0])],
            vec![SpectrumInfo::unmapped()],
        );
        assert!(matches!(
            SparseWorkspace::new(&ws, 2, 2),
            Err(SimulationError::NoDetectors)
        ));
    }

    #[test]
    fn bilinear_interpolation_recovers_corner_and_midpoint() {
        let ws = workspace_with_detectors(&[
            Vec3::new(0.0, -1.0, 2.0),
            Vec3::new(0.0, 1.0, 2.0),
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::new(-1.0, 0.0, 2.0),
        ]);
        let mut sparse = SparseWorkspace::new(&ws, 2, 2).unwrap();
        for idx in 0..4 {
            // value encodes the grid index so the weights are visible
            sparse.set_result(idx, vec![idx as f64], vec![0.1]);
        }
        // exactly on the first grid point
        let det = *sparse.detector(0);
        let (y, _) = sparse.interpolate(det.latitude, det.longitude);
        assert_relative_eq!(y[0], 0.0, epsilon = 1e-12);
        // centre of the cell averages all four corners
        let lat_mid = sparse.lat_min + 0.5 * sparse.lat_step;
        let long_mid = sparse.long_min + 0.5 * sparse.long_step;
        let (y, e) = sparse.interpolate(lat_mid, long_mid);
        assert_relative_eq!(y[0], (0.0 + 1.0 + 2.0 + 3.0) / 4.0, epsilon = 1e-12);
        assert_relative_eq!(e[0], (4.0f64 * (0.025f64).powi(2)).sqrt(), epsilon = 1e-12);
    }
}
