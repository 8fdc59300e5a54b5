//! Physical constants and unit conversions (cgs and simulation units).
//!
//! Simulation units: mass in Msun, length in Mpc, velocity in km/s, time in Gyr.

use std::f64::consts::PI;

/// Gravitational constant in Mpc (km/s)^2 / Msun.
pub const G: f64 = 4.299e-9;

/// Boltzmann constant (erg/K).
pub const K_BOLTZMANN_ERG: f64 = 1.380_648_8e-16;

/// Solar mass (g).
pub const MSOLAR_G: f64 = 1.988_92e33;

/// Atomic mass unit (g).
pub const M_ATOMIC_G: f64 = 1.660_538_86e-24;

/// Mean molecular weight of a fully ionised primordial plasma.
pub const MU_PRIMORDIAL: f64 = 1.22;

/// Speed of light (cm/s).
pub const C_LIGHT_CM: f64 = 2.997_924_58e10;

/// One megaparsec in cm.
pub const MPC2CM: f64 = 3.085_677_580_7e24;

/// One megaparsec in km.
pub const MPC2KM: f64 = 3.085_677_580_7e19;

/// One km in cm.
pub const KM2CM: f64 = 1.0e5;

/// One Gyr in seconds.
pub const GYR2S: f64 = 3.155_76e16;

/// Converts a ratio Mpc / (km/s) into Gyr.
pub const MPC_PER_KMS_TO_GYR: f64 = MPC2KM / GYR2S;

/// Converts an accretion rate in g/s into Msun/Gyr.
pub const GS_TO_MSUN_PER_GYR: f64 = GYR2S / MSOLAR_G;

/// Luminosities are carried in units of 1e40 erg/s.
pub const LUMINOSITY_UNIT_ERG_S: f64 = 1.0e40;

/// Virial temperature coefficient: `Tvir = 35.9 * Vvir^2` with Vvir in km/s.
pub const TVIR_COEFFICIENT: f64 = 35.9;

/// `4 * pi`.
pub const PI4: f64 = 4.0 * PI;

/// Volume of the unit sphere, `4/3 * pi`.
pub const SPHERE_VOLUME: f64 = 4.0 / 3.0 * PI;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamical_time_conversion_is_about_a_gyr_per_kpc_per_kms() {
        // 1 Mpc at 1000 km/s takes roughly 0.98 Gyr.
        let t = 1.0 / 1000.0 * MPC_PER_KMS_TO_GYR;
        assert!((t - 0.9778).abs() < 1e-3);
    }

    #[test]
    fn accretion_conversion_is_positive() {
        assert!(GS_TO_MSUN_PER_GYR > 0.0);
        assert!((GS_TO_MSUN_PER_GYR * MSOLAR_G / GYR2S - 1.0).abs() < 1e-12);
    }
}
