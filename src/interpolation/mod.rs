//! Bivariate interpolation over a rectilinear grid.
//!
//! The surface owns copies of both coordinate axes and the dependent-value
//! grid. Evaluation is pure: every call either builds a private
//! [`EvalContext`] or borrows one from the caller, and points outside the
//! sampled box are extrapolated from the nearest cell.

mod accel;
pub mod spline;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoolingError, CoolingResult};

pub use accel::{Accelerator, EvalContext};

/// Interpolation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationKind {
    /// Bilinear interpolation inside each cell.
    Bilinear,
    /// Bicubic Hermite patches with natural-spline derivatives.
    Bicubic,
}

impl InterpolationKind {
    /// Minimum number of points per axis.
    #[must_use]
    pub const fn min_size(self) -> usize {
        match self {
            Self::Bilinear => 2,
            Self::Bicubic => 4,
        }
    }
}

impl fmt::Display for InterpolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bilinear => write!(f, "bilinear"),
            Self::Bicubic => write!(f, "bicubic"),
        }
    }
}

/// Partial derivatives at every grid node, used by bicubic evaluation.
#[derive(Debug, Clone, PartialEq)]
struct NodeDerivatives {
    zx: Vec<f64>,
    zy: Vec<f64>,
    zxy: Vec<f64>,
}

/// Interpolation surface `z = f(x, y)`.
///
/// Values are stored x-fastest: the value at `(xs[i], ys[j])` is
/// `zs[j * xs.len() + i]`.
///
/// # Examples
///
/// ```
/// use halo_cooling::{BivariateInterpolator, InterpolationKind};
///
/// let interp = BivariateInterpolator::new(
///     vec![0.0, 1.0],
///     vec![0.0, 1.0],
///     vec![0.0, 1.0, 1.0, 2.0],
///     InterpolationKind::Bilinear,
/// )
/// .unwrap();
/// assert!((interp.get(0.5, 0.5) - 1.0).abs() < 1e-12);
/// // Outside the grid the edge cell is extended.
/// assert!((interp.get(2.0, 0.0) - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BivariateInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    zs: Vec<f64>,
    kind: InterpolationKind,
    derivatives: Option<NodeDerivatives>,
}

impl BivariateInterpolator {
    /// Builds a surface.
    ///
    /// # Errors
    ///
    /// Returns `CoolingError::InvalidInterpolationInput` if an axis is shorter
    /// than the kind's minimum, an axis is not strictly increasing, the grid
    /// size is not `xs.len() * ys.len()`, or any input is not finite.
    pub fn new(
        xs: Vec<f64>,
        ys: Vec<f64>,
        zs: Vec<f64>,
        kind: InterpolationKind,
    ) -> CoolingResult<Self> {
        let min = kind.min_size();
        if xs.len() < min {
            return Err(CoolingError::interpolation(format!(
                "x axis has {} points, {kind} interpolation needs at least {min}",
                xs.len()
            )));
        }
        if ys.len() < min {
            return Err(CoolingError::interpolation(format!(
                "y axis has {} points, {kind} interpolation needs at least {min}",
                ys.len()
            )));
        }
        if zs.len() != xs.len() * ys.len() {
            return Err(CoolingError::interpolation(format!(
                "grid has {} values, expected {} x {} = {}",
                zs.len(),
                xs.len(),
                ys.len(),
                xs.len() * ys.len()
            )));
        }
        check_axis("x", &xs)?;
        check_axis("y", &ys)?;
        if let Some(pos) = zs.iter().position(|z| !z.is_finite()) {
            return Err(CoolingError::interpolation(format!(
                "grid value at index {pos} is not finite"
            )));
        }

        let derivatives = match kind {
            InterpolationKind::Bilinear => None,
            InterpolationKind::Bicubic => Some(node_derivatives(&xs, &ys, &zs)),
        };

        Ok(Self {
            xs,
            ys,
            zs,
            kind,
            derivatives,
        })
    }

    /// Evaluates the surface at `(x, y)` using a private evaluation context.
    #[must_use]
    pub fn get(&self, x: f64, y: f64) -> f64 {
        let mut ctx = EvalContext::new();
        self.get_with(&mut ctx, x, y)
    }

    /// Evaluates the surface at `(x, y)` reusing the caller's context.
    ///
    /// The result does not depend on the state of `ctx`; only lookup cost does.
    #[must_use]
    pub fn get_with(&self, ctx: &mut EvalContext, x: f64, y: f64) -> f64 {
        let i = ctx.x.find(&self.xs, x);
        let j = ctx.y.find(&self.ys, y);
        match &self.derivatives {
            None => self.bilinear(i, j, x, y),
            Some(d) => self.bicubic(d, i, j, x, y),
        }
    }

    /// Interpolation scheme.
    #[must_use]
    pub const fn kind(&self) -> InterpolationKind {
        self.kind
    }

    /// The x axis.
    #[must_use]
    pub fn x_axis(&self) -> &[f64] {
        &self.xs
    }

    /// The y axis.
    #[must_use]
    pub fn y_axis(&self) -> &[f64] {
        &self.ys
    }

    /// The value grid, x-fastest.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.zs
    }

    /// Sampled x range.
    #[must_use]
    pub fn x_range(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Sampled y range.
    #[must_use]
    pub fn y_range(&self) -> (f64, f64) {
        (self.ys[0], self.ys[self.ys.len() - 1])
    }

    fn idx(&self, i: usize, j: usize) -> usize {
        j * self.xs.len() + i
    }

    fn bilinear(&self, i: usize, j: usize, x: f64, y: f64) -> f64 {
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[j], self.ys[j + 1]);
        let t = (x - x0) / (x1 - x0);
        let u = (y - y0) / (y1 - y0);

        let z00 = self.zs[self.idx(i, j)];
        let z10 = self.zs[self.idx(i + 1, j)];
        let z01 = self.zs[self.idx(i, j + 1)];
        let z11 = self.zs[self.idx(i + 1, j + 1)];

        (1.0 - t) * (1.0 - u) * z00 + t * (1.0 - u) * z10 + (1.0 - t) * u * z01 + t * u * z11
    }

    fn bicubic(&self, d: &NodeDerivatives, i: usize, j: usize, x: f64, y: f64) -> f64 {
        let dx = self.xs[i + 1] - self.xs[i];
        let dy = self.ys[j + 1] - self.ys[j];
        let t = (x - self.xs[i]) / dx;
        let u = (y - self.ys[j]) / dy;

        let (ht, gt) = hermite(t);
        let (hu, gu) = hermite(u);

        let mut z = 0.0;
        for (a, ii) in [i, i + 1].into_iter().enumerate() {
            for (b, jj) in [j, j + 1].into_iter().enumerate() {
                let k = self.idx(ii, jj);
                z += ht[a] * hu[b] * self.zs[k]
                    + gt[a] * hu[b] * dx * d.zx[k]
                    + ht[a] * gu[b] * dy * d.zy[k]
                    + gt[a] * gu[b] * dx * dy * d.zxy[k];
            }
        }
        z
    }
}

/// Cubic Hermite basis on the unit interval: value weights for the left and
/// right node, then slope weights for the left and right node.
fn hermite(t: f64) -> ([f64; 2], [f64; 2]) {
    let t2 = t * t;
    let t3 = t2 * t;
    (
        [2.0 * t3 - 3.0 * t2 + 1.0, -2.0 * t3 + 3.0 * t2],
        [t3 - 2.0 * t2 + t, t3 - t2],
    )
}

fn check_axis(name: &str, axis: &[f64]) -> CoolingResult<()> {
    if let Some(pos) = axis.iter().position(|v| !v.is_finite()) {
        return Err(CoolingError::interpolation(format!(
            "{name} axis value at index {pos} is not finite"
        )));
    }
    if let Some(pos) = axis.windows(2).position(|w| w[1] <= w[0]) {
        return Err(CoolingError::interpolation(format!(
            "{name} axis is not strictly increasing at index {}",
            pos + 1
        )));
    }
    Ok(())
}

fn node_derivatives(xs: &[f64], ys: &[f64], zs: &[f64]) -> NodeDerivatives {
    let nx = xs.len();
    let ny = ys.len();
    let mut zx = vec![0.0; zs.len()];
    let mut zy = vec![0.0; zs.len()];
    let mut zxy = vec![0.0; zs.len()];

    for j in 0..ny {
        let row = &zs[j * nx..(j + 1) * nx];
        let slopes = spline::natural_slopes(xs, row);
        zx[j * nx..(j + 1) * nx].copy_from_slice(&slopes);
    }

    let mut column = vec![0.0; ny];
    let mut column_x = vec![0.0; ny];
    for i in 0..nx {
        for j in 0..ny {
            column[j] = zs[j * nx + i];
            column_x[j] = zx[j * nx + i];
        }
        let slopes = spline::natural_slopes(ys, &column);
        let cross = spline::natural_slopes(ys, &column_x);
        for j in 0..ny {
            zy[j * nx + i] = slopes[j];
            zxy[j * nx + i] = cross[j];
        }
    }

    NodeDerivatives { zx, zy, zxy }
}
