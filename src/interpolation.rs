//! Fills un-simulated wavelength bins from the simulated subset.

/// Linearly interpolates `y` at every index between consecutive entries of
/// `simulated` (sorted indices into `x`/`y`/`e`). Errors of filled bins are
/// the simulated neighbours' errors combined in quadrature and halved.
pub fn interpolate_linear_inplace(x: &[f64], simulated: &[usize], y: &mut [f64], e: &mut [f64]) {
    for window in simulated.windows(2) {
        let (left, right) = (window[0], window[1]);
        if right - left < 2 {
            continue;
        }
        let span = x[right] - x[left];
        let filled_error = (e[left].powi(2) + e[right].powi(2)).sqrt() / 2.0;
        for i in left + 1..right {
            let t = if span == 0.0 {
                0.5
            } else {
                (x[i] - x[left]) / span
            };
            y[i] = y[left] + t * (y[right] - y[left]);
            e[i] = filled_error;
        }
    }
}

/// Natural cubic spline through a set of knots, evaluated piecewise.
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSpline {
    /// Builds the spline; requires at least 3 knots with ascending `xs`.
    pub fn new(xs: &[f64], ys: &[f64]) -> Self {
        let n = xs.len();
        debug_assert!(n >= 3);
        debug_assert_eq!(n, ys.len());
        let h: Vec<f64> = (0..n - 1).map(|i| xs[i + 1] - xs[i]).collect();
        // tridiagonal solve for second derivatives, natural end conditions
        let mut mu = vec![0.0; n];
        let mut z = vec![0.0; n];
        for i in 1..n - 1 {
            let alpha =
                3.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
            let l = 2.0 * (xs[i + 1] - xs[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l;
            z[i] = (alpha - h[i - 1] * z[i - 1]) / l;
        }
        let mut c = vec![0.0; n];
        let mut b = vec![0.0; n - 1];
        let mut d = vec![0.0; n - 1];
        for j in (0..n - 1).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            b[j] = (ys[j + 1] - ys[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            d[j] = (c[j + 1] - c[j]) / (3.0 * h[j]);
        }
        CubicSpline {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            b,
            c,
            d,
        }
    }

    pub fn value(&self, x: f64) -> f64 {
        let n = self.xs.len();
        // locate the interval, clamping outside evaluation to the end pieces
        let mut j = match self
            .xs
            .binary_search_by(|probe| probe.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Less))
        {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        if j > n - 2 {
            j = n - 2;
        }
        let dx = x - self.xs[j];
        self.ys[j] + dx * (self.b[j] + dx * (self.c[j] + dx * self.d[j]))
    }
}

/// Fills un-simulated bins with a natural cubic spline through the simulated
/// points. Errors use the same quadrature-and-halve rule as the linear fill.
pub fn interpolate_cspline_inplace(x: &[f64], simulated: &[usize], y: &mut [f64], e: &mut [f64]) {
    let knot_x: Vec<f64> = simulated.iter().map(|&i| x[i]).collect();
    let knot_y: Vec<f64> = simulated.iter().map(|&i| y[i]).collect();
    let spline = CubicSpline::new(&knot_x, &knot_y);
    for window in simulated.windows(2) {
        let (left, right) = (window[0], window[1]);
        let filled_error = (e[left].powi(2) + e[right].powi(2)).sqrt() / 2.0;
        for i in left + 1..right {
            y[i] = spline.value(x[i]);
            e[i] = filled_error;
        }
    }
}
