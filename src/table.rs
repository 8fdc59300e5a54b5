//! Radiative cooling function tables.
//!
//! A cooling table merges several metallicity tracks, each a sequence of
//! `log10 T -> log10 Lambda` samples. Tracks need not share a temperature
//! sampling; [`CoolingTable::grid`] resamples them onto a common axis before
//! an interpolation surface is built.

use serde::{Deserialize, Serialize};

use crate::error::{CoolingError, CoolingResult};
use crate::interpolation::{spline, BivariateInterpolator, InterpolationKind};

/// Metallicity offset used to widen a single-track table into a flat
/// two-row grid.
pub const SINGLE_TRACK_METALLICITY_WIDTH: f64 = 1.0;

/// One row of a cooling-function table file.
///
/// Only the temperature and the cooling rate are used; the densities are
/// carried for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// log10 temperature (K).
    pub log_temperature: f64,
    /// Electron number density.
    pub electron_density: f64,
    /// Hydrogen number density.
    pub hydrogen_density: f64,
    /// Total number density.
    pub total_density: f64,
    /// log10 cooling rate Lambda (erg cm^3 / s).
    pub log_lambda: f64,
}

/// A single sample of the merged table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableSample {
    /// log10 temperature (K).
    pub log_temperature: f64,
    /// Metal mass fraction.
    pub metallicity: f64,
    /// log10 cooling rate (erg cm^3 / s).
    pub log_lambda: f64,
}

/// Cooling function at fixed metallicity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetallicityTrack {
    /// Metal mass fraction of this track.
    pub metallicity: f64,
    /// log10 temperatures (K), strictly increasing.
    pub log_temperature: Vec<f64>,
    /// log10 cooling rates, aligned with `log_temperature`.
    pub log_lambda: Vec<f64>,
}

impl MetallicityTrack {
    /// Creates a track from aligned temperature and cooling-rate samples.
    #[must_use]
    pub fn new(metallicity: f64, log_temperature: Vec<f64>, log_lambda: Vec<f64>) -> Self {
        Self {
            metallicity,
            log_temperature,
            log_lambda,
        }
    }

    /// Creates a track from table-file rows.
    #[must_use]
    pub fn from_rows(metallicity: f64, rows: &[TableRow]) -> Self {
        Self {
            metallicity,
            log_temperature: rows.iter().map(|r| r.log_temperature).collect(),
            log_lambda: rows.iter().map(|r| r.log_lambda).collect(),
        }
    }

    /// Number of temperature samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log_temperature.len()
    }

    /// True if the track has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log_temperature.is_empty()
    }

    /// log10 Lambda at `log_t`, linearly extrapolated outside the track.
    #[must_use]
    pub fn log_lambda_at(&self, log_t: f64) -> f64 {
        spline::linear(&self.log_temperature, &self.log_lambda, log_t)
    }

    fn validate(&self) -> CoolingResult<()> {
        let z = self.metallicity;
        if !z.is_finite() {
            return Err(CoolingError::interpolation("track metallicity is not finite"));
        }
        if self.log_temperature.len() != self.log_lambda.len() {
            return Err(CoolingError::interpolation(format!(
                "track Z={z} has {} temperatures but {} cooling rates",
                self.log_temperature.len(),
                self.log_lambda.len()
            )));
        }
        if self.len() < 2 {
            return Err(CoolingError::interpolation(format!(
                "track Z={z} has {} temperature points, at least 2 are required",
                self.len()
            )));
        }
        if self
            .log_temperature
            .iter()
            .chain(&self.log_lambda)
            .any(|v| !v.is_finite())
        {
            return Err(CoolingError::interpolation(format!(
                "track Z={z} contains non-finite values"
            )));
        }
        if let Some(pos) = self.log_temperature.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CoolingError::interpolation(format!(
                "track Z={z} temperatures are not increasing at row {}",
                pos + 1
            )));
        }
        Ok(())
    }
}

/// Rectilinear grid derived from a cooling table.
#[derive(Debug, Clone, PartialEq)]
pub struct CoolingGrid {
    /// log10 temperature axis.
    pub log_temperature: Vec<f64>,
    /// Metallicity axis.
    pub metallicity: Vec<f64>,
    /// log10 Lambda values, temperature-fastest.
    pub log_lambda: Vec<f64>,
}

/// Merged, immutable cooling-function table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoolingTable {
    tracks: Vec<MetallicityTrack>,
}

impl CoolingTable {
    /// Merges metallicity tracks into a table, ordered by metallicity.
    ///
    /// # Errors
    ///
    /// Returns `CoolingError::InvalidInterpolationInput` if there are no
    /// tracks, a track has fewer than two points or non-increasing
    /// temperatures, or two tracks share a metallicity.
    pub fn from_tracks(mut tracks: Vec<MetallicityTrack>) -> CoolingResult<Self> {
        if tracks.is_empty() {
            return Err(CoolingError::interpolation("cooling table has no tracks"));
        }
        for track in &tracks {
            track.validate()?;
        }
        tracks.sort_by(|a, b| a.metallicity.total_cmp(&b.metallicity));
        if let Some(w) = tracks.windows(2).find(|w| w[0].metallicity == w[1].metallicity) {
            return Err(CoolingError::interpolation(format!(
                "duplicate metallicity track Z={}",
                w[0].metallicity
            )));
        }
        Ok(Self { tracks })
    }

    /// Tracks ordered by metallicity.
    #[must_use]
    pub fn tracks(&self) -> &[MetallicityTrack] {
        &self.tracks
    }

    /// Distinct metallicities, ascending.
    #[must_use]
    pub fn metallicities(&self) -> Vec<f64> {
        self.tracks.iter().map(|t| t.metallicity).collect()
    }

    /// Every `(log T, Z, log Lambda)` sample in the table.
    pub fn samples(&self) -> impl Iterator<Item = TableSample> + '_ {
        self.tracks.iter().flat_map(|track| {
            track
                .log_temperature
                .iter()
                .zip(&track.log_lambda)
                .map(move |(&log_temperature, &log_lambda)| TableSample {
                    log_temperature,
                    metallicity: track.metallicity,
                    log_lambda,
                })
        })
    }

    /// Total number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.iter().map(MetallicityTrack::len).sum()
    }

    /// True if the table holds no samples. Never true for a validated table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable blake3 digest of the table contents, hex encoded.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for s in self.samples() {
            hasher.update(&s.log_temperature.to_le_bytes());
            hasher.update(&s.metallicity.to_le_bytes());
            hasher.update(&s.log_lambda.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Resamples every track onto the union of all track temperatures.
    ///
    /// A table with a single track is widened into two identical rows at
    /// `Z` and `Z + SINGLE_TRACK_METALLICITY_WIDTH`, which makes the surface
    /// flat in metallicity.
    #[must_use]
    pub fn grid(&self) -> CoolingGrid {
        let mut log_temperature: Vec<f64> = self
            .tracks
            .iter()
            .flat_map(|t| t.log_temperature.iter().copied())
            .collect();
        log_temperature.sort_by(f64::total_cmp);
        log_temperature.dedup();

        let mut metallicity = self.metallicities();
        let mut log_lambda = Vec::with_capacity(log_temperature.len() * (metallicity.len() + 1));
        for track in &self.tracks {
            log_lambda.extend(log_temperature.iter().map(|&t| track.log_lambda_at(t)));
        }

        if let [only] = self.tracks.as_slice() {
            metallicity.push(only.metallicity + SINGLE_TRACK_METALLICITY_WIDTH);
            log_lambda.extend_from_within(..);
        }

        CoolingGrid {
            log_temperature,
            metallicity,
            log_lambda,
        }
    }

    /// Builds an interpolation surface `(log10 T, Z) -> log10 Lambda`.
    ///
    /// # Errors
    ///
    /// Returns `CoolingError::InvalidInterpolationInput` if the resampled grid
    /// is too small for `kind`.
    pub fn interpolator(&self, kind: InterpolationKind) -> CoolingResult<BivariateInterpolator> {
        let grid = self.grid();
        log::debug!(
            "building {kind} cooling surface: {} tracks, {} x {} grid, digest {}",
            self.tracks.len(),
            grid.log_temperature.len(),
            grid.metallicity.len(),
            self.fingerprint()
        );
        BivariateInterpolator::new(grid.log_temperature, grid.metallicity, grid.log_lambda, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(z: f64, temps: &[f64], lams: &[f64]) -> MetallicityTrack {
        MetallicityTrack::new(z, temps.to_vec(), lams.to_vec())
    }

    #[test]
    fn tracks_are_sorted_by_metallicity() {
        let table = CoolingTable::from_tracks(vec![
            track(0.02, &[4.0, 6.0], &[-22.0, -23.0]),
            track(0.0, &[4.0, 6.0], &[-23.0, -23.5]),
        ])
        .unwrap();
        assert_eq!(table.metallicities(), vec![0.0, 0.02]);
        assert_eq!(table.len(), 4);
        assert_eq!(table.samples().count(), 4);
    }

    #[test]
    fn rejects_invalid_tracks() {
        assert!(CoolingTable::from_tracks(vec![]).unwrap_err().is_interpolation());
        assert!(CoolingTable::from_tracks(vec![track(0.0, &[4.0], &[-22.0])]).is_err());
        assert!(CoolingTable::from_tracks(vec![track(0.0, &[5.0, 4.0], &[-22.0, -23.0])]).is_err());
        assert!(CoolingTable::from_tracks(vec![track(0.0, &[4.0, 5.0], &[-22.0])]).is_err());

        let err = CoolingTable::from_tracks(vec![
            track(0.01, &[4.0, 5.0], &[-22.0, -23.0]),
            track(0.01, &[4.0, 5.0], &[-22.0, -23.0]),
        ])
        .unwrap_err();
        assert!(format!("{err}").contains("duplicate metallicity"));
    }

    #[test]
    fn grid_uses_union_of_temperatures() {
        let table = CoolingTable::from_tracks(vec![
            track(0.0, &[4.0, 6.0], &[-22.0, -24.0]),
            track(0.02, &[4.0, 5.0, 6.0], &[-21.0, -21.5, -23.0]),
        ])
        .unwrap();
        let grid = table.grid();
        assert_eq!(grid.log_temperature, vec![4.0, 5.0, 6.0]);
        assert_eq!(grid.metallicity, vec![0.0, 0.02]);
        assert_eq!(grid.log_lambda, vec![-22.0, -23.0, -24.0, -21.0, -21.5, -23.0]);
    }

    #[test]
    fn single_track_is_flat_in_metallicity() {
        let table = CoolingTable::from_tracks(vec![track(0.02, &[4.0, 6.0], &[-22.0, -23.0])]).unwrap();
        let interp = table.interpolator(InterpolationKind::Bilinear).unwrap();
        let mid = interp.get(5.0, 0.02);
        assert!(mid < -22.0 && mid > -23.0);
        assert!((interp.get(5.0, 0.3) - mid).abs() < 1e-12);
        assert!((interp.get(5.0, -0.5) - mid).abs() < 1e-12);
    }

    #[test]
    fn fingerprint_tracks_contents() {
        let a = CoolingTable::from_tracks(vec![track(0.0, &[4.0, 6.0], &[-22.0, -24.0])]).unwrap();
        let b = CoolingTable::from_tracks(vec![track(0.0, &[4.0, 6.0], &[-22.0, -24.0])]).unwrap();
        let c = CoolingTable::from_tracks(vec![track(0.0, &[4.0, 6.0], &[-22.0, -24.5])]).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn rows_keep_temperature_and_rate_only() {
        let rows = [
            TableRow {
                log_temperature: 4.0,
                electron_density: 0.1,
                hydrogen_density: 0.2,
                total_density: 0.3,
                log_lambda: -22.0,
            },
            TableRow {
                log_temperature: 4.5,
                electron_density: 0.1,
                hydrogen_density: 0.2,
                total_density: 0.3,
                log_lambda: -22.4,
            },
        ];
        let t = MetallicityTrack::from_rows(0.004, &rows);
        assert_eq!(t.log_temperature, vec![4.0, 4.5]);
        assert_eq!(t.log_lambda, vec![-22.0, -22.4]);
    }
}
