//! Interpolating B-splines over a 1D parameter.
//!
//! Fits a curve `f(s) -> P` through `(s_i, P_i)` control pairs with a
//! degree 1, 2 or 3 B-spline that passes through every control point.
//! Knots follow the usual not-a-knot placement:
//! - odd degree `k`: data sites, dropping `(k - 1) / 2` interior sites at
//!   each end
//! - degree 2: midpoints between data sites, dropping the first and last
//!
//! with both ends clamped (`k + 1` repeated knots). The coefficients come
//! from solving the `n x n` collocation system once per coordinate.

use crate::error::PathError;
use nalgebra::{DMatrix, Vector3};

/// A fitted B-spline curve in 3D.
#[derive(Debug, Clone)]
pub struct InterpolatingSpline {
    /// Polynomial degree (1 = linear, 2 = quadratic, 3 = cubic)
    degree: usize,

    /// Clamped knot vector, `coefficients.len() + degree + 1` entries
    knots: Vec<f64>,

    /// Control coefficients, one per data site
    coefficients: Vec<Vector3<f64>>,
}

impl InterpolatingSpline {
    /// Fits a spline through `values` at strictly increasing `params`.
    ///
    /// The degree is lowered to `params.len() - 1` when there are too few
    /// sites for the requested one, so two sites always give a segment.
    pub fn fit(
        params: &[f64],
        values: &[Vector3<f64>],
        degree: usize,
    ) -> Result<Self, PathError> {
        let n = params.len();
        if n < 2 || values.len() != n {
            return Err(PathError::malformed(format!(
                "spline needs at least two matching sites, got {} params and {} values",
                n,
                values.len()
            )));
        }
        if params.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(PathError::malformed(
                "spline parameters must be strictly increasing",
            ));
        }

        let degree = degree.clamp(1, n - 1);
        let knots = Self::build_knots(params, degree);

        let mut spline = Self {
            degree,
            knots,
            coefficients: vec![Vector3::zeros(); n],
        };

        // Linear B-splines are hat functions: coefficients are the data
        if degree == 1 {
            spline.coefficients = values.to_vec();
            return Ok(spline);
        }

        // Collocation: A[i][j] = B_j(s_i)
        let mut collocation = DMatrix::<f64>::zeros(n, n);
        for (row, &s) in params.iter().enumerate() {
            let span = spline.find_span(s);
            let basis = spline.basis(span, s);
            for (r, b) in basis.iter().enumerate() {
                collocation[(row, span - degree + r)] = *b;
            }
        }

        let mut rhs = DMatrix::<f64>::zeros(n, 3);
        for (row, v) in values.iter().enumerate() {
            rhs[(row, 0)] = v.x;
            rhs[(row, 1)] = v.y;
            rhs[(row, 2)] = v.z;
        }

        let solution = collocation
            .lu()
            .solve(&rhs)
            .ok_or_else(|| PathError::malformed("singular spline collocation system"))?;

        spline.coefficients = (0..n)
            .map(|i| Vector3::new(solution[(i, 0)], solution[(i, 1)], solution[(i, 2)]))
            .collect();

        Ok(spline)
    }

    /// Effective degree after fitting.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Evaluates the curve at `s`.
    ///
    /// Parameters outside the fitted range are clamped to the nearest end
    /// span and extrapolated from its polynomial.
    pub fn evaluate(&self, s: f64) -> Vector3<f64> {
        let span = self.find_span(s);
        let basis = self.basis(span, s);
        basis
            .iter()
            .enumerate()
            .fold(Vector3::zeros(), |acc, (r, b)| {
                acc + self.coefficients[span - self.degree + r] * *b
            })
    }

    // ========== Private Helper Methods ==========

    fn build_knots(params: &[f64], degree: usize) -> Vec<f64> {
        let n = params.len();
        let first = params[0];
        let last = params[n - 1];

        let interior: Vec<f64> = if degree % 2 == 1 {
            let m = (degree - 1) / 2;
            params[m + 1..n - m - 1].to_vec()
        } else {
            // Midpoints, omitting the first and last
            let mids: Vec<f64> = params.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
            mids[1..mids.len() - 1].to_vec()
        };

        let mut knots = Vec::with_capacity(n + degree + 1);
        knots.extend(std::iter::repeat(first).take(degree + 1));
        knots.extend(interior);
        knots.extend(std::iter::repeat(last).take(degree + 1));
        knots
    }

    /// Index `l` of the knot span with `knots[l] <= s < knots[l + 1]`,
    /// restricted to the valid spans `degree..=n - 1`.
    fn find_span(&self, s: f64) -> usize {
        let n = self.coefficients.len();
        let k = self.degree;

        if s >= self.knots[n] {
            return n - 1;
        }
        if s <= self.knots[k] {
            return k;
        }

        let (mut lo, mut hi) = (k, n);
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if s < self.knots[mid] {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        lo
    }

    /// The `degree + 1` non-vanishing basis functions on `span` at `s`
    /// (Cox-de Boor, triangular form).
    fn basis(&self, span: usize, s: f64) -> Vec<f64> {
        let k = self.degree;
        let mut n = vec![0.0; k + 1];
        let mut left = vec![0.0; k + 1];
        let mut right = vec![0.0; k + 1];
        n[0] = 1.0;

        for j in 1..=k {
            left[j] = s - self.knots[span + 1 - j];
            right[j] = self.knots[span + j] - s;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = n[r] / (right[r + 1] + left[j - r]);
                n[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            n[j] = saved;
        }

        n
    }
}
