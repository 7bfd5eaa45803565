/// Reference wavelength at which tabulated absorption cross-sections are
/// quoted, in Angstroms (2200 m/s neutrons).
pub const REFERENCE_WAVELENGTH: f64 = 1.7982;

/// Attenuating medium a track segment passes through.
pub trait Material: Send + Sync {
    /// Fraction of intensity transmitted across `distance` at `wavelength`,
    /// always in (0, 1].
    fn attenuation(&self, distance: f64, wavelength: f64) -> f64;
}

/// Homogeneous medium with a wavelength-independent scattering term and an
/// absorption term linear in wavelength (1/v law).
pub struct IsotropicMaterial {
    /// Scattering attenuation coefficient, per unit length.
    pub scattering: f64,
    /// Absorption attenuation coefficient at `REFERENCE_WAVELENGTH`, per unit length.
    pub absorption: f64,
}

impl IsotropicMaterial {
    pub fn new(scattering: f64, absorption: f64) -> Self {
        IsotropicMaterial {
            scattering,
            absorption,
        }
    }
    fn total_coefficient(&self, wavelength: f64) -> f64 {
        self.scattering + self.absorption * wavelength / REFERENCE_WAVELENGTH
    }
}

impl Material for IsotropicMaterial {
    fn attenuation(&self, distance: f64, wavelength: f64) -> f64 {
        (-self.total_coefficient(wavelength) * distance).exp()
    }
}
