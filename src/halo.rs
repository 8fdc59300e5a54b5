//! Halo, galaxy and black-hole state read and updated by the cooling engine.
//!
//! All masses stored here are comoving (Msun/h) and all velocities are as
//! reported by the halo catalogue (km/s).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::units::{ComovingMass, ComovingVelocity};

/// Stable identifier for a subhalo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubhaloId(uuid::Uuid);

impl SubhaloId {
    /// Creates a new random subhalo ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SubhaloId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubhaloId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a subhalo hosts the dominant galaxy of its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubhaloType {
    /// Dominant subhalo of its host; the only kind that cools gas.
    Central,
    /// Subhalo orbiting within another halo's potential.
    Satellite,
}

/// A gas reservoir: total mass and mass in metals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BaryonReservoir {
    /// Gas mass (Msun/h).
    pub mass: f64,
    /// Metal mass (Msun/h).
    pub mass_metals: f64,
}

impl BaryonReservoir {
    /// Creates a reservoir.
    #[must_use]
    pub const fn new(mass: f64, mass_metals: f64) -> Self {
        Self { mass, mass_metals }
    }

    /// Mass as a comoving quantity.
    #[must_use]
    pub const fn comoving_mass(&self) -> ComovingMass {
        ComovingMass::new(self.mass)
    }

    /// Metal mass as a comoving quantity.
    #[must_use]
    pub const fn comoving_metals(&self) -> ComovingMass {
        ComovingMass::new(self.mass_metals)
    }

    /// Metal mass fraction, 0 for an empty reservoir.
    #[must_use]
    pub fn metallicity(&self) -> f64 {
        if self.mass > 0.0 {
            self.mass_metals / self.mass
        } else {
            0.0
        }
    }
}

/// Supermassive black hole state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlackHole {
    /// Black hole mass (Msun/h).
    pub mass: f64,
    /// Black hole metal mass (Msun/h).
    pub mass_metals: f64,
    /// Accretion rate (Msun/h per Gyr).
    pub macc: f64,
}

impl BlackHole {
    /// True once a seed has been planted.
    #[must_use]
    pub fn is_seeded(&self) -> bool {
        self.mass > 0.0
    }
}

/// A galaxy hosted by a subhalo. Only its black hole matters for cooling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Galaxy {
    /// Central supermassive black hole.
    pub smbh: BlackHole,
}

/// One timestep of cooling history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoolingRecord {
    /// Cooling time at the notional mean density (Gyr).
    pub tcooling: f64,
    /// Virial temperature (K).
    pub temp: f64,
    /// Timestep duration (Gyr).
    pub deltat: f64,
    /// Halo gas mass (Msun/h).
    pub mass: f64,
}

/// Append-only per-subhalo history of cooling properties.
///
/// The four series are stored column-wise and always have equal length; index
/// `i` holds the values of the `i`-th timestep the subhalo was processed as a
/// central.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoolingHistory {
    tcooling: Vec<f64>,
    temp: Vec<f64>,
    deltat: Vec<f64>,
    mass: Vec<f64>,
}

impl CoolingHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one timestep.
    pub fn push(&mut self, record: CoolingRecord) {
        self.tcooling.push(record.tcooling);
        self.temp.push(record.temp);
        self.deltat.push(record.deltat);
        self.mass.push(record.mass);
    }

    /// Number of recorded timesteps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deltat.len()
    }

    /// True if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltat.is_empty()
    }

    /// Cooling times (Gyr).
    #[must_use]
    pub fn tcooling(&self) -> &[f64] {
        &self.tcooling
    }

    /// Virial temperatures (K).
    #[must_use]
    pub fn temp(&self) -> &[f64] {
        &self.temp
    }

    /// Timestep durations (Gyr).
    #[must_use]
    pub fn deltat(&self) -> &[f64] {
        &self.deltat
    }

    /// Gas masses (Msun/h).
    #[must_use]
    pub fn mass(&self) -> &[f64] {
        &self.mass
    }

    /// Returns the record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<CoolingRecord> {
        Some(CoolingRecord {
            tcooling: *self.tcooling.get(index)?,
            temp: *self.temp.get(index)?,
            deltat: *self.deltat.get(index)?,
            mass: *self.mass.get(index)?,
        })
    }

    /// `sum_i T_i * M_i / tcool_i * dt_i` over the whole history.
    ///
    /// Recomputed from scratch on every call.
    #[must_use]
    pub fn weighted_integral(&self) -> f64 {
        self.temp
            .iter()
            .zip(&self.mass)
            .zip(&self.tcooling)
            .zip(&self.deltat)
            .map(|(((t, m), tcool), dt)| t * m / tcool * dt)
            .sum()
    }
}

/// A subhalo and the baryonic state the cooling engine works on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subhalo {
    /// Identifier.
    pub id: SubhaloId,
    /// Central or satellite.
    pub subhalo_type: SubhaloType,
    /// Virial velocity (km/s).
    pub vvir: f64,
    /// Virial mass (Msun/h).
    pub mvir: f64,
    /// Hot gas in the halo.
    pub hot_halo_gas: BaryonReservoir,
    /// Gas that cooled during the last timestep.
    pub cold_halo_gas: BaryonReservoir,
    /// Gas ejected from galaxies.
    pub ejected_galaxy_gas: BaryonReservoir,
    /// History used by the Benson & Bower (2010) cooling model.
    pub cooling_subhalo_tracking: CoolingHistory,
    /// Hosted galaxies; the first one is the central galaxy.
    pub galaxies: Vec<Galaxy>,
}

impl Subhalo {
    /// Creates a gas-free subhalo with a central galaxy.
    #[must_use]
    pub fn new(subhalo_type: SubhaloType, vvir: f64, mvir: f64) -> Self {
        Self {
            id: SubhaloId::new(),
            subhalo_type,
            vvir,
            mvir,
            hot_halo_gas: BaryonReservoir::default(),
            cold_halo_gas: BaryonReservoir::default(),
            ejected_galaxy_gas: BaryonReservoir::default(),
            cooling_subhalo_tracking: CoolingHistory::new(),
            galaxies: vec![Galaxy::default()],
        }
    }

    /// Creates a central subhalo.
    #[must_use]
    pub fn central(vvir: f64, mvir: f64) -> Self {
        Self::new(SubhaloType::Central, vvir, mvir)
    }

    /// Creates a satellite subhalo.
    #[must_use]
    pub fn satellite(vvir: f64, mvir: f64) -> Self {
        Self::new(SubhaloType::Satellite, vvir, mvir)
    }

    /// Sets the hot gas reservoir.
    #[must_use]
    pub fn with_hot_gas(mut self, mass: f64, mass_metals: f64) -> Self {
        self.hot_halo_gas = BaryonReservoir::new(mass, mass_metals);
        self
    }

    /// Sets the cold gas reservoir.
    #[must_use]
    pub fn with_cold_gas(mut self, mass: f64, mass_metals: f64) -> Self {
        self.cold_halo_gas = BaryonReservoir::new(mass, mass_metals);
        self
    }

    /// Sets the ejected gas reservoir.
    #[must_use]
    pub fn with_ejected_gas(mut self, mass: f64, mass_metals: f64) -> Self {
        self.ejected_galaxy_gas = BaryonReservoir::new(mass, mass_metals);
        self
    }

    /// True if this subhalo is a central.
    #[must_use]
    pub fn is_central(&self) -> bool {
        self.subhalo_type == SubhaloType::Central
    }

    /// Virial velocity as a catalogue quantity.
    #[must_use]
    pub const fn comoving_vvir(&self) -> ComovingVelocity {
        ComovingVelocity::new(self.vvir)
    }

    /// Virial mass as a comoving quantity.
    #[must_use]
    pub const fn comoving_mvir(&self) -> ComovingMass {
        ComovingMass::new(self.mvir)
    }

    /// Hot, cold and ejected gas combined.
    #[must_use]
    pub fn total_halo_gas(&self) -> BaryonReservoir {
        BaryonReservoir {
            mass: self.hot_halo_gas.mass + self.cold_halo_gas.mass + self.ejected_galaxy_gas.mass,
            mass_metals: self.hot_halo_gas.mass_metals
                + self.cold_halo_gas.mass_metals
                + self.ejected_galaxy_gas.mass_metals,
        }
    }

    /// The central galaxy, if any.
    #[must_use]
    pub fn central_galaxy(&self) -> Option<&Galaxy> {
        self.galaxies.first()
    }

    /// The central galaxy, created empty if the subhalo hosts none.
    pub fn central_galaxy_mut(&mut self) -> &mut Galaxy {
        if self.galaxies.is_empty() {
            self.galaxies.push(Galaxy::default());
        }
        &mut self.galaxies[0]
    }
}
