use crate::aliases::Vec3;

/// Scatter-point counts for a single component.
#[derive(Clone, Copy, Default)]
pub struct PointCounts {
    pub generated: usize,
    pub used: usize,
}

/// Per-detector diagnostic accumulator: how many scatter points each
/// component produced and consumed, plus running mean/SD of the scattering
/// angle. Created per detector and discarded after its simulation; the angle
/// statistic uses Welford's online algorithm and is never reset mid-detector.
pub struct InteractionStatistics {
    detector_id: i64,
    counts: Vec<PointCounts>, // slot 0 = sample, 1.. = environment parts
    angle_count: u64,
    angle_mean: f64,
    angle_m2: f64,
}

impl InteractionStatistics {
    pub fn new(detector_id: i64, environment_size: usize) -> Self {
        InteractionStatistics {
            detector_id,
            counts: vec![PointCounts::default(); environment_size + 1],
            angle_count: 0,
            angle_mean: 0.0,
            angle_m2: 0.0,
        }
    }

    fn slot(&mut self, component: isize) -> &mut PointCounts {
        // component -1 is the sample, 0..N-1 the environment parts
        &mut self.counts[(component + 1) as usize]
    }

    /// Records one scatter-point attempt for `component`; `used` marks that a
    /// full valid before/after track pair was produced from it.
    pub fn update_scatter_point_counts(&mut self, component: isize, used: bool) {
        let counts = self.slot(component);
        counts.generated += 1;
        if used {
            counts.used += 1;
        }
    }

    /// Folds the angle between the towards-source direction and the outgoing
    /// direction into the running mean/M2 (Welford).
    pub fn update_scatter_angle(&mut self, to_start: &Vec3, scattered: &Vec3) {
        let cosine = to_start
            .normalize()
            .dot(&scattered.normalize())
            .max(-1.0)
            .min(1.0);
        let angle = cosine.acos().to_degrees();
        self.angle_count += 1;
        let delta = angle - self.angle_mean;
        self.angle_mean += delta / self.angle_count as f64;
        self.angle_m2 += delta * (angle - self.angle_mean);
    }

    pub fn generated_points(&self, component: isize) -> usize {
        self.counts[(component + 1) as usize].generated
    }
    pub fn used_points(&self, component: isize) -> usize {
        self.counts[(component + 1) as usize].used
    }
    pub fn scatter_angle_mean(&self) -> f64 {
        self.angle_mean
    }
    pub fn scatter_angle_sd(&self) -> f64 {
        if self.angle_count < 2 {
            0.0
        } else {
            (self.angle_m2 / (self.angle_count - 1) as f64).sqrt()
        }
    }

    /// Human-readable summary, emitted at debug level after each detector.
    pub fn report(&self) -> String {
        let mut out = format!(
            "Scatter point counts for detector {}:\n",
            self.detector_id
        );
        for (i, counts) in self.counts.iter().enumerate() {
            let label = if i == 0 {
                "sample".to_string()
            } else {
                format!("environment part {}", i - 1)
            };
            out.push_str(&format!(
                "  {}: generated={} used={}\n",
                label, counts.generated, counts.used
            ));
        }
        out.push_str(&format!(
            "  scattering angle: mean={:.3} deg, sd={:.3} deg",
            self.scatter_angle_mean(),
            self.scatter_angle_sd()
        ));
        out
    }
}
