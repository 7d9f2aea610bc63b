use crate::common::constants::{
    ELECTRON_REST_MASS_ENERGY, FINE_STRUCTURE_CONSTANT, THOMAS_FERMI_FACTOR,
};

/// Per-element quantities of the screened Rutherford elastic cross section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticElectronTraits {
    atomic_number: u32,
    screening_prefactor: f64,
    charge_term: f64,
}

impl ElasticElectronTraits {
    pub fn new(atomic_number: u32) -> Self {
        let z = f64::from(atomic_number);
        let alpha_over_radius = FINE_STRUCTURE_CONSTANT / THOMAS_FERMI_FACTOR;
        let alpha_z = FINE_STRUCTURE_CONSTANT * z;

        Self {
            atomic_number,
            screening_prefactor: 0.25 * alpha_over_radius * alpha_over_radius * z.powf(2.0 / 3.0),
            charge_term: 3.76 * alpha_z * alpha_z,
        }
    }

    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    /// Moliere screening parameter `eta` at `energy` (MeV).
    pub fn moliere_screening_constant(&self, energy: f64) -> f64 {
        let tau = energy / ELECTRON_REST_MASS_ENERGY;
        let momentum_squared = tau * (tau + 2.0);
        let beta_squared = momentum_squared / ((tau + 1.0) * (tau + 1.0));
        let correction = 1.13 + self.charge_term / beta_squared * (tau / (tau + 1.0)).sqrt();

        self.screening_prefactor / momentum_squared * correction
    }
}
