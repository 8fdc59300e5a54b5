//! One-dimensional helpers: linear interpolation with extrapolation and
//! natural cubic spline slopes.

/// Index of the cell `[xa[i], xa[i+1]]` used to evaluate `x`.
///
/// Points left of the axis map to the first cell and points right of it to
/// the last, so evaluation extrapolates from the nearest cell.
#[must_use]
pub fn bracket(xa: &[f64], x: f64) -> usize {
    debug_assert!(xa.len() >= 2);
    let last = xa.len() - 2;
    // First index with xa[i] > x, minus one.
    let upper = xa.partition_point(|&v| v <= x);
    upper.saturating_sub(1).min(last)
}

/// Linear interpolation through `(xa, ya)`, extrapolating linearly beyond the
/// first and last points.
#[must_use]
pub fn linear(xa: &[f64], ya: &[f64], x: f64) -> f64 {
    let i = bracket(xa, x);
    let t = (x - xa[i]) / (xa[i + 1] - xa[i]);
    ya[i] + t * (ya[i + 1] - ya[i])
}

/// First derivatives at the knots of the natural cubic spline through `(x, y)`.
///
/// `x` must be strictly increasing with at least two points.
#[must_use]
pub fn natural_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    debug_assert!(n >= 2 && y.len() == n);

    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let secant: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

    // Second derivatives; natural end conditions pin m[0] = m[n-1] = 0.
    let mut m = vec![0.0; n];
    if n > 2 {
        let interior = n - 2;
        let mut diag = vec![0.0; interior];
        let mut rhs = vec![0.0; interior];
        for k in 0..interior {
            let i = k + 1;
            diag[k] = 2.0 * (h[i - 1] + h[i]);
            rhs[k] = 6.0 * (secant[i] - secant[i - 1]);
        }
        // Thomas algorithm on the symmetric tridiagonal system.
        for k in 1..interior {
            let w = h[k] / diag[k - 1];
            diag[k] -= w * h[k];
            rhs[k] -= w * rhs[k - 1];
        }
        m[interior] = rhs[interior - 1] / diag[interior - 1];
        for k in (0..interior - 1).rev() {
            m[k + 1] = (rhs[k] - h[k + 1] * m[k + 2]) / diag[k];
        }
    }

    let mut slopes = Vec::with_capacity(n);
    for i in 0..n - 1 {
        slopes.push(secant[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0);
    }
    let last = n - 2;
    slopes.push(secant[last] + h[last] * (m[last] + 2.0 * m[last + 1]) / 6.0);
    slopes
}
