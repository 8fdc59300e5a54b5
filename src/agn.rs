//! AGN feedback capability consumed by the cooling engine.
//!
//! The engine needs the feedback model tag, its coupling parameters, and four
//! formulas: black-hole seeding, Eddington luminosity, hot-halo accretion rate
//! and bolometric luminosity. Luminosities are in units of 1e40 erg/s and
//! accretion rates in Msun/Gyr.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{C_LIGHT_CM, GS_TO_MSUN_PER_GYR, KM2CM, LUMINOSITY_UNIT_ERG_S};
use crate::error::ConfigError;
use crate::halo::Subhalo;

/// Which AGN feedback model couples to cooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgnFeedbackModel {
    /// Radio-mode feedback in hot halos (Bower et al. 2006).
    Galform,
    /// Pseudo-luminosity heating (Croton et al. 2006 / Henriques et al.).
    #[serde(rename = "lgalaxies")]
    LGalaxies,
    /// No AGN feedback.
    #[default]
    None,
}

impl FromStr for AgnFeedbackModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "galform" => Ok(Self::Galform),
            "lgalaxies" => Ok(Self::LGalaxies),
            "none" => Ok(Self::None),
            other => Err(ConfigError::invalid(
                "agn_feedback.model",
                other,
                &["galform", "lgalaxies", "none"],
            )),
        }
    }
}

impl fmt::Display for AgnFeedbackModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Galform => write!(f, "galform"),
            Self::LGalaxies => write!(f, "lgalaxies"),
            Self::None => write!(f, "none"),
        }
    }
}

/// AGN feedback parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgnFeedbackParameters {
    /// Feedback model.
    pub model: AgnFeedbackModel,
    /// Hot-halo threshold: halos with `tcool/tdyn > 1/alpha_cool` are eligible
    /// for radio-mode feedback. Zero disables the radio-mode branch.
    pub alpha_cool: f64,
    /// Fraction of the Eddington luminosity the AGN can offset.
    pub f_edd: f64,
    /// Seed black hole mass (Msun/h).
    pub mseed: f64,
    /// Minimum halo mass that receives a seed (Msun/h).
    pub mhalo_seed: f64,
    /// Radiative efficiency of accretion.
    pub epsilon_smbh: f64,
    /// Normalisation of the LGALAXIES accretion rate.
    pub kappa_agn: f64,
}

impl Default for AgnFeedbackParameters {
    fn default() -> Self {
        Self {
            model: AgnFeedbackModel::None,
            alpha_cool: 0.0,
            f_edd: 0.01,
            mseed: 1e5,
            mhalo_seed: 1e10,
            epsilon_smbh: 0.1,
            kappa_agn: 0.01,
        }
    }
}

/// AGN feedback formulas.
pub trait AgnFeedback: Send + Sync {
    /// Feedback parameters, including the model tag.
    fn parameters(&self) -> &AgnFeedbackParameters;

    /// Plants a seed black hole in the central galaxy if it does not have one.
    fn plant_seed_smbh(&self, subhalo: &mut Subhalo);

    /// Eddington luminosity of a black hole of the given mass (1e40 erg/s).
    fn eddington_luminosity(&self, smbh_mass: f64) -> f64;

    /// Black hole accretion rate sustained by a hot-halo luminosity (Msun/Gyr).
    fn accretion_rate_hothalo_smbh(&self, luminosity: f64, smbh_mass: f64) -> f64;

    /// Bolometric luminosity produced by an accretion rate (1e40 erg/s).
    fn agn_bolometric_luminosity(&self, accretion_rate: f64) -> f64;
}

/// Reference radio-mode AGN feedback.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RadioModeFeedback {
    /// Model parameters.
    pub parameters: AgnFeedbackParameters,
}

impl RadioModeFeedback {
    /// Creates the feedback model.
    #[must_use]
    pub const fn new(parameters: AgnFeedbackParameters) -> Self {
        Self { parameters }
    }

    fn rest_mass_energy_per_msun_per_gyr(&self) -> f64 {
        // erg/s released per Msun/Gyr of accretion at the configured efficiency.
        self.parameters.epsilon_smbh * C_LIGHT_CM * C_LIGHT_CM / GS_TO_MSUN_PER_GYR
    }
}

impl AgnFeedback for RadioModeFeedback {
    fn parameters(&self) -> &AgnFeedbackParameters {
        &self.parameters
    }

    fn plant_seed_smbh(&self, subhalo: &mut Subhalo) {
        let mvir = subhalo.mvir;
        let smbh = &mut subhalo.central_galaxy_mut().smbh;
        if !smbh.is_seeded() && mvir > self.parameters.mhalo_seed {
            smbh.mass = self.parameters.mseed;
            log::trace!("planted seed black hole of {} Msun/h", self.parameters.mseed);
        }
    }

    fn eddington_luminosity(&self, smbh_mass: f64) -> f64 {
        1.26e6 * (smbh_mass / 1e8)
    }

    fn accretion_rate_hothalo_smbh(&self, luminosity: f64, smbh_mass: f64) -> f64 {
        match self.parameters.model {
            AgnFeedbackModel::Galform => {
                luminosity * LUMINOSITY_UNIT_ERG_S / self.rest_mass_energy_per_msun_per_gyr()
            }
            AgnFeedbackModel::LGalaxies => {
                self.parameters.kappa_agn * (smbh_mass / 1e8) * luminosity * 1e9
            }
            AgnFeedbackModel::None => 0.0,
        }
    }

    fn agn_bolometric_luminosity(&self, accretion_rate: f64) -> f64 {
        accretion_rate * self.rest_mass_energy_per_msun_per_gyr() / LUMINOSITY_UNIT_ERG_S
    }
}

/// Mass heating rate (Msun/Gyr) that an AGN luminosity (1e40 erg/s) can keep
/// hot in a halo of proper virial velocity `vvir` (km/s).
#[must_use]
pub fn agn_heating_rate(luminosity: f64, vvir: f64) -> f64 {
    let vvir_cm = vvir * KM2CM;
    luminosity * LUMINOSITY_UNIT_ERG_S / (0.5 * vvir_cm * vvir_cm) * GS_TO_MSUN_PER_GYR
}
