//! Cosmological unit conversions.
//!
//! The cooling engine only needs to move masses and velocities between the
//! comoving units of the halo catalogue and physical units.

use serde::{Deserialize, Serialize};

use crate::units::{ComovingMass, ComovingVelocity, PhysicalMass, PhysicalVelocity};

/// Conversion capability between comoving and physical units.
pub trait Cosmology: Send + Sync {
    /// Converts a comoving mass (Msun/h) into a physical mass (Msun).
    fn comoving_to_physical_mass(&self, mass: ComovingMass) -> PhysicalMass;

    /// Converts a physical mass (Msun) into a comoving mass (Msun/h).
    fn physical_to_comoving_mass(&self, mass: PhysicalMass) -> ComovingMass;

    /// Converts a catalogue velocity into a proper velocity at redshift `z`.
    fn comoving_to_physical_velocity(&self, velocity: ComovingVelocity, z: f64) -> PhysicalVelocity;
}

/// Flat cosmology parameterised by the dimensionless Hubble parameter.
///
/// Masses are stored in Msun/h. Halo finders report proper circular velocities,
/// so velocities convert as the identity at every redshift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatCosmology {
    /// Dimensionless Hubble parameter, `H0 / (100 km/s/Mpc)`.
    pub hubble_h: f64,
}

impl Default for FlatCosmology {
    fn default() -> Self {
        Self { hubble_h: 0.6751 }
    }
}

impl FlatCosmology {
    /// Creates a cosmology with the given Hubble parameter.
    #[must_use]
    pub const fn new(hubble_h: f64) -> Self {
        Self { hubble_h }
    }
}

impl Cosmology for FlatCosmology {
    fn comoving_to_physical_mass(&self, mass: ComovingMass) -> PhysicalMass {
        PhysicalMass::new(mass.value() / self.hubble_h)
    }

    fn physical_to_comoving_mass(&self, mass: PhysicalMass) -> ComovingMass {
        ComovingMass::new(mass.value() * self.hubble_h)
    }

    fn comoving_to_physical_velocity(&self, velocity: ComovingVelocity, _z: f64) -> PhysicalVelocity {
        PhysicalVelocity::new(velocity.value())
    }
}
