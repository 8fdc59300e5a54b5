//! Closed-form cooling physics for an isothermal hot-gas profile.
//!
//! All functions are pure. Inputs are physical: masses in Msun, radii in
//! Mpc, velocities in km/s, temperatures in K, cooling functions as
//! log10 Lambda in erg cm^3 / s.

use crate::constants::{
    GYR2S, G, K_BOLTZMANN_ERG, LUMINOSITY_UNIT_ERG_S, MPC2CM, MPC_PER_KMS_TO_GYR, MSOLAR_G,
    MU_PRIMORDIAL, M_ATOMIC_G, PI4, SPHERE_VOLUME, TVIR_COEFFICIENT,
};
use crate::units::{PhysicalMass, PhysicalVelocity};

/// Virial temperature (K) of a halo with proper circular velocity `vvir`.
#[must_use]
pub fn virial_temperature(vvir: PhysicalVelocity) -> f64 {
    TVIR_COEFFICIENT * vvir.value().powi(2)
}

/// Virial radius (Mpc), `G * Mvir / Vvir^2`.
#[must_use]
pub fn virial_radius(mvir: PhysicalMass, vvir: PhysicalVelocity) -> f64 {
    G * mvir.value() / vvir.value().powi(2)
}

/// Crossing time (Gyr) of radius `r` (Mpc) at velocity `vvir`.
#[must_use]
pub fn dynamical_time(r: f64, vvir: PhysicalVelocity) -> f64 {
    r / vvir.value() * MPC_PER_KMS_TO_GYR
}

/// Cooling time (Gyr) of gas at temperature `tvir` and number density
/// `density` (cm^-3): `3 k T / (2 Lambda n)`.
#[must_use]
pub fn cooling_time(tvir: f64, log_lambda: f64, density: f64) -> f64 {
    3.0 * K_BOLTZMANN_ERG * tvir / (2.0 * 10f64.powf(log_lambda) * density) / GYR2S
}

/// Mean number density (cm^-3) of `mhot` spread uniformly within `rvir` (Mpc).
#[must_use]
pub fn mean_density(mhot: PhysicalMass, rvir: f64) -> f64 {
    mhot.value() * MSOLAR_G / (SPHERE_VOLUME * (rvir * MPC2CM).powi(3)) / M_ATOMIC_G
}

/// Radius (Mpc) within which gas at `density` cools in `time` seconds.
#[must_use]
pub fn cooling_radius(density: f64, time: f64, log_lambda: f64, tvir: f64) -> f64 {
    let thermal = 1.5 * M_ATOMIC_G * MU_PRIMORDIAL * K_BOLTZMANN_ERG * tvir;
    (density * time * 10f64.powf(log_lambda) / thermal).sqrt() / MPC2CM
}

/// Number density (cm^-3) of an isothermal profile holding `mhot` within
/// `rvir`, evaluated at radius `r` (both Mpc).
#[must_use]
pub fn density_shell(mhot: PhysicalMass, rvir: f64, r: f64) -> f64 {
    let r_cm = r * MPC2CM;
    mhot.value() * MSOLAR_G / PI4 / (rvir * MPC2CM) / (r_cm * r_cm) / M_ATOMIC_G
}

/// Luminosity (1e40 erg/s) radiated by the isothermal gas between `rcool`
/// and `rvir`. Zero once the cooling radius reaches the virial radius.
#[must_use]
pub fn cooling_luminosity(log_lambda: f64, rcool: f64, rvir: f64, mhot: PhysicalMass) -> f64 {
    if rcool >= rvir {
        return 0.0;
    }
    let mass_enclosed = mhot.value() / PI4 / rvir * (rvir - rcool) * MSOLAR_G;
    PI4 * 10f64.powf(log_lambda) * mass_enclosed / LUMINOSITY_UNIT_ERG_S
}

/// Pseudo cooling luminosity `k T / Lambda`, in units of 1e40.
#[must_use]
pub fn pseudo_cooling_luminosity(tvir: f64, log_lambda: f64) -> f64 {
    K_BOLTZMANN_ERG * tvir / 10f64.powf(log_lambda) / LUMINOSITY_UNIT_ERG_S
}
