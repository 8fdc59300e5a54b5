//! # halo-cooling - Radiative gas cooling for semi-analytic galaxy formation
//!
//! Computes, per dark-matter halo and timestep, how much hot halo gas cools
//! onto the central galaxy, and couples the result to AGN feedback from the
//! central supermassive black hole.
//!
//! ## Core Concepts
//!
//! - **CoolingTable**: tabulated cooling function log10 Lambda(T, Z), one track per metallicity
//! - **BivariateInterpolator**: bilinear or bicubic surface over the table grid
//! - **GasCooling**: the engine; `cooling_rate` updates a halo's gas reservoirs and black hole
//! - **Cosmology / AgnFeedback**: collaborator traits with reference implementations
//! - **CoolingRuntime**: bounded worker pool for cooling independent halos in parallel
//!
//! ## Usage
//!
//! ```rust
//! use halo_cooling::{CoolingTable, GasCooling, MetallicityTrack, SimulationConfig, Subhalo};
//!
//! let temps = vec![4.0, 5.0, 6.0, 7.0, 8.0];
//! let table = CoolingTable::from_tracks(vec![
//!     MetallicityTrack::new(0.0, temps.clone(), vec![-23.0, -22.2, -22.6, -22.9, -22.7]),
//!     MetallicityTrack::new(0.02, temps, vec![-22.4, -21.6, -21.9, -22.4, -22.5]),
//! ])?;
//!
//! let config = SimulationConfig::from_json_str(r#"{"reionisation": {"vcut": 30.0, "zcut": 10.0}}"#)?;
//! let engine = GasCooling::from_config(&config, &table)?;
//!
//! let mut halo = Subhalo::central(200.0, 1e12).with_hot_gas(1e10, 2e8);
//! let rate = engine.cooling_rate(&mut halo, 0.5, 0.1);
//! assert!(rate >= 0.0);
//! # Ok::<(), halo_cooling::CoolingError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Physical model
pub mod constants;
pub mod cosmology;
pub mod error;
pub mod halo;
pub mod units;

// Cooling function
pub mod interpolation;
pub mod table;

// Engine
pub mod agn;
pub mod config;
pub mod cooling;
pub mod runtime;

// Re-export primary types at crate root for convenience
pub use agn::{AgnFeedback, AgnFeedbackModel, AgnFeedbackParameters, RadioModeFeedback};
pub use config::{
    CoolingModel, GasCoolingParameters, LambdaModel, ReionisationParameters, SimulationConfig,
};
pub use cooling::GasCooling;
pub use cosmology::{Cosmology, FlatCosmology};
pub use error::{ConfigError, CoolingError, CoolingResult, RuntimeError};
pub use halo::{
    BaryonReservoir, BlackHole, CoolingHistory, CoolingRecord, Galaxy, Subhalo, SubhaloId,
    SubhaloType,
};
pub use interpolation::{BivariateInterpolator, EvalContext, InterpolationKind};
pub use runtime::{CoolingHandle, CoolingOutcome, CoolingRuntime, RuntimeConfig};
pub use table::{CoolingTable, MetallicityTrack, TableRow, TableSample};
pub use units::{ComovingMass, ComovingVelocity, PhysicalMass, PhysicalVelocity};
