//! Configuration for the cooling engine and its collaborators.
//!
//! Configuration is a JSON document with one section per component. Model
//! selectors are plain strings; unknown selectors are rejected with
//! `ConfigError::InvalidConfiguration` naming the offending option.
//!
//! ```json
//! {
//!   "gas_cooling":  { "model": "Croton06", "lambdamodel": "cloudy",
//!                     "rcore": 0.0, "cooling_tables_dir": "data/cooling" },
//!   "reionisation": { "vcut": 35.0, "zcut": 10.0 },
//!   "agn_feedback": { "model": "galform", "alpha_cool": 0.5, "f_edd": 0.01 },
//!   "cosmology":    { "hubble_h": 0.6751 }
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::agn::{AgnFeedbackModel, AgnFeedbackParameters};
use crate::cosmology::FlatCosmology;
use crate::error::ConfigError;

/// Cooling-time model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoolingModel {
    /// Cooling time equals the halo dynamical time (Croton et al. 2006).
    #[default]
    Croton06,
    /// Time available for cooling integrates the halo's history (Benson & Bower 2010).
    Benson10,
}

impl FromStr for CoolingModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Croton06" => Ok(Self::Croton06),
            "Benson10" => Ok(Self::Benson10),
            other => Err(ConfigError::invalid(
                "gas_cooling.model",
                other,
                &["Croton06", "Benson10"],
            )),
        }
    }
}

impl fmt::Display for CoolingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Croton06 => write!(f, "Croton06"),
            Self::Benson10 => write!(f, "Benson10"),
        }
    }
}

/// Source of the cooling-function tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LambdaModel {
    /// CLOUDY 08.00 tables.
    #[default]
    Cloudy,
    /// Sutherland & Dopita (1993) tables.
    Sutherland,
}

impl LambdaModel {
    /// File-name prefix of this model's tables.
    #[must_use]
    pub const fn table_prefix(self) -> &'static str {
        match self {
            Self::Cloudy => "C08.00_",
            Self::Sutherland => "S93_",
        }
    }
}

impl FromStr for LambdaModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cloudy" => Ok(Self::Cloudy),
            "sutherland" => Ok(Self::Sutherland),
            other => Err(ConfigError::invalid(
                "gas_cooling.lambdamodel",
                other,
                &["cloudy", "sutherland"],
            )),
        }
    }
}

impl fmt::Display for LambdaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloudy => write!(f, "cloudy"),
            Self::Sutherland => write!(f, "sutherland"),
        }
    }
}

/// Gas cooling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasCoolingParameters {
    /// Cooling-time model.
    pub model: CoolingModel,
    /// Cooling-function table source.
    pub lambdamodel: LambdaModel,
    /// Core radius of the hot gas profile, in units of the virial radius.
    pub rcore: f64,
    /// Directory holding the cooling tables.
    pub cooling_tables_dir: PathBuf,
}

impl Default for GasCoolingParameters {
    fn default() -> Self {
        Self {
            model: CoolingModel::Croton06,
            lambdamodel: LambdaModel::Cloudy,
            rcore: 0.0,
            cooling_tables_dir: PathBuf::new(),
        }
    }
}

impl GasCoolingParameters {
    /// Path of the metallicity index for the selected table source,
    /// `<cooling_tables_dir>/<prefix>tables.txt`.
    #[must_use]
    pub fn tables_index_path(&self) -> PathBuf {
        self.cooling_tables_dir
            .join(format!("{}tables.txt", self.lambdamodel.table_prefix()))
    }
}

/// Reionisation cutoff: halos with `Vvir < vcut` below redshift `zcut` do not cool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReionisationParameters {
    /// Circular velocity threshold (km/s).
    pub vcut: f64,
    /// Redshift of reionisation.
    pub zcut: f64,
}

impl Default for ReionisationParameters {
    fn default() -> Self {
        Self {
            vcut: 35.0,
            zcut: 10.0,
        }
    }
}

impl ReionisationParameters {
    /// Parameters that never suppress cooling.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { vcut: 0.0, zcut: 0.0 }
    }

    /// True if a halo with circular velocity `vvir` cannot cool at redshift `z`.
    #[must_use]
    pub fn suppresses(&self, vvir: f64, z: f64) -> bool {
        vvir < self.vcut && z < self.zcut
    }
}

/// Full configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationConfig {
    /// Gas cooling section.
    pub gas_cooling: GasCoolingParameters,
    /// Reionisation section.
    pub reionisation: ReionisationParameters,
    /// AGN feedback section.
    pub agn_feedback: AgnFeedbackParameters,
    /// Cosmology section.
    pub cosmology: FlatCosmology,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    gas_cooling: RawGasCooling,
    reionisation: ReionisationParameters,
    agn_feedback: RawAgnFeedback,
    cosmology: RawCosmology,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawGasCooling {
    model: String,
    lambdamodel: String,
    rcore: f64,
    cooling_tables_dir: PathBuf,
}

impl Default for RawGasCooling {
    fn default() -> Self {
        let d = GasCoolingParameters::default();
        Self {
            model: d.model.to_string(),
            lambdamodel: d.lambdamodel.to_string(),
            rcore: d.rcore,
            cooling_tables_dir: d.cooling_tables_dir,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawAgnFeedback {
    model: String,
    alpha_cool: f64,
    f_edd: f64,
    mseed: f64,
    mhalo_seed: f64,
    epsilon_smbh: f64,
    kappa_agn: f64,
}

impl Default for RawAgnFeedback {
    fn default() -> Self {
        let d = AgnFeedbackParameters::default();
        Self {
            model: d.model.to_string(),
            alpha_cool: d.alpha_cool,
            f_edd: d.f_edd,
            mseed: d.mseed,
            mhalo_seed: d.mhalo_seed,
            epsilon_smbh: d.epsilon_smbh,
            kappa_agn: d.kappa_agn,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawCosmology {
    hubble_h: f64,
}

impl Default for RawCosmology {
    fn default() -> Self {
        Self {
            hubble_h: FlatCosmology::default().hubble_h,
        }
    }
}

impl TryFrom<RawConfig> for SimulationConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let gas_cooling = GasCoolingParameters {
            model: raw.gas_cooling.model.parse()?,
            lambdamodel: raw.gas_cooling.lambdamodel.parse()?,
            rcore: raw.gas_cooling.rcore,
            cooling_tables_dir: raw.gas_cooling.cooling_tables_dir,
        };
        let agn_feedback = AgnFeedbackParameters {
            model: raw.agn_feedback.model.parse::<AgnFeedbackModel>()?,
            alpha_cool: raw.agn_feedback.alpha_cool,
            f_edd: raw.agn_feedback.f_edd,
            mseed: raw.agn_feedback.mseed,
            mhalo_seed: raw.agn_feedback.mhalo_seed,
            epsilon_smbh: raw.agn_feedback.epsilon_smbh,
            kappa_agn: raw.agn_feedback.kappa_agn,
        };
        let config = Self {
            gas_cooling,
            reionisation: raw.reionisation,
            agn_feedback,
            cosmology: FlatCosmology::new(raw.cosmology.hubble_h),
        };
        config.validate()?;
        Ok(config)
    }
}

impl SimulationConfig {
    /// Parses a JSON configuration document.
    ///
    /// Missing sections and fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON or unknown keys, and
    /// `ConfigError::InvalidConfiguration` for unknown model selectors or
    /// out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        Self::try_from(raw)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// errors of [`Self::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_json_str(&text)?;
        let dir = &config.gas_cooling.cooling_tables_dir;
        if !dir.as_os_str().is_empty() && !dir.is_dir() {
            log::warn!("cooling_tables_dir {} does not exist", dir.display());
        }
        log::debug!(
            "loaded configuration from {}: cooling model {}, lambda model {}, agn model {}",
            path.display(),
            config.gas_cooling.model,
            config.gas_cooling.lambdamodel,
            config.agn_feedback.model
        );
        Ok(config)
    }

    /// Checks numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidConfiguration` naming the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&str, f64, bool); 6] = [
            ("gas_cooling.rcore", self.gas_cooling.rcore, self.gas_cooling.rcore >= 0.0),
            ("agn_feedback.alpha_cool", self.agn_feedback.alpha_cool, self.agn_feedback.alpha_cool >= 0.0),
            ("agn_feedback.f_edd", self.agn_feedback.f_edd, self.agn_feedback.f_edd >= 0.0),
            ("agn_feedback.mseed", self.agn_feedback.mseed, self.agn_feedback.mseed >= 0.0),
            (
                "agn_feedback.epsilon_smbh",
                self.agn_feedback.epsilon_smbh,
                self.agn_feedback.epsilon_smbh > 0.0,
            ),
            ("cosmology.hubble_h", self.cosmology.hubble_h, self.cosmology.hubble_h > 0.0),
        ];
        for (option, value, ok) in checks {
            if !ok || !value.is_finite() {
                return Err(ConfigError::InvalidConfiguration {
                    option: option.to_string(),
                    value: value.to_string(),
                    supported: "finite non-negative numbers".to_string(),
                });
            }
        }
        Ok(())
    }
}
