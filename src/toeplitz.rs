// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Solver for Toeplitz sets of linear equations.
//!
//! Solves `L s = d` where `L` is the `(n + 1) x (n + 1)` Toeplitz matrix
//!
//! ```text
//!     | 1     a[0]  a[1]  ...  a[n-1] |
//!     | r[0]  1     a[0]  ...  a[n-2] |
//! L = | r[1]  r[0]  1     ...  a[n-3] |
//!     | ...                           |
//!     | r[n-1] ...        r[0] 1      |
//! ```
//!
//! using the recursion of Zohar, "The Solution of a Toeplitz Set of Linear
//! Equations", J. ACM 21 (1974), which improves on Trench (1967). The cost is
//! about `2 (n + 1)^2` multiply-adds.

use super::arrayutils::inner_product;
use super::arrayutils::Value;
use super::error::NumericError;
use super::error::RangeError;

/// Checks the argument sizes and returns `n`.
fn check_sizes<T>(a: &[T], r: &[T], d_len: usize) -> Result<usize, RangeError> {
    let n = a.len();
    if n < 1 {
        return Err(RangeError::from_display("a.len()", "must be at least 1", &n));
    }
    if r.len() < n {
        return Err(RangeError::from_display(
            "r.len()",
            &format!("must be at least a.len() = {n}"),
            &r.len(),
        ));
    }
    if d_len < n + 1 {
        return Err(RangeError::from_display(
            "d.len()",
            &format!("must be at least a.len() + 1 = {}", n + 1),
            &d_len,
        ));
    }
    Ok(n)
}

/// Zohar's recursion. Returns `n + 1` elements of the solution.
///
/// Hats in the variable names indicate reversed vectors. `s` and `g` are
/// updated in place, while the reversed `ehat` needs a fresh buffer at every
/// step.
fn zohar_recursion<T: Value>(a: &[T], r: &[T], d: &[T]) -> Result<Vec<T>, NumericError> {
    let n = check_sizes(a, r, d.len())?;

    let mut s: Vec<T> = Vec::with_capacity(n + 1);
    let mut ehat: Vec<T> = Vec::with_capacity(n);
    let mut g: Vec<T> = Vec::with_capacity(n);
    let mut next_ehat: Vec<T> = Vec::with_capacity(n);
    s.push(d[0].clone());
    ehat.push(-a[0].clone());
    g.push(-r[0].clone());
    let mut lambda = T::one() - a[0].clone() * r[0].clone();

    for i in 1..n {
        if lambda.is_zero() {
            return Err(NumericError::SingularPivot { step: i });
        }
        let rhat = &r[..i];

        // theta_i = delta_{i+1} - s_i~ rhat_i
        let neg_theta = inner_product(&s, rhat.iter().rev(), -d[i].clone());
        // eta_i = -rho_{-(i+1)} - a_i~ ehat_i
        let neg_eta = inner_product(&ehat, &a[..i], a[i].clone());
        // gamma_i = -rho_{i+1} - g_i~ rhat_i
        let neg_gamma = inner_product(&g, rhat.iter().rev(), r[i].clone());

        let theta_by_lambda = -neg_theta / lambda.clone();
        let eta_by_lambda = -neg_eta.clone() / lambda.clone();
        let gamma_by_lambda = -neg_gamma.clone() / lambda.clone();

        next_ehat.clear();
        next_ehat.push(eta_by_lambda.clone());
        for j in 0..i {
            s[j] = s[j].clone() + theta_by_lambda.clone() * ehat[j].clone();
            next_ehat.push(ehat[j].clone() + eta_by_lambda.clone() * g[j].clone());
            g[j] = g[j].clone() + gamma_by_lambda.clone() * ehat[j].clone();
        }
        s.push(theta_by_lambda);
        g.push(gamma_by_lambda);
        std::mem::swap(&mut ehat, &mut next_ehat);

        lambda = lambda.clone() - neg_eta * neg_gamma / lambda;
    }

    // The last step only updates `s`.
    if lambda.is_zero() {
        return Err(NumericError::SingularPivot { step: n });
    }
    let neg_theta = inner_product(&s, r[..n].iter().rev(), -d[n].clone());
    let theta_by_lambda = -neg_theta / lambda;
    for (sj, ej) in s.iter_mut().zip(&ehat) {
        *sj = sj.clone() + theta_by_lambda.clone() * ej.clone();
    }
    s.push(theta_by_lambda);

    Ok(s)
}

/// Solves a Toeplitz set of linear equations.
///
/// The dimension is fixed by `n = a.len()`; `r` must have at least `n`
/// elements, and `d` and `dest` at least `n + 1`. The solution is written to
/// `dest[..n + 1]`. A symmetric system is solved by passing the same slice as
/// `a` and `r`.
///
/// # Errors
///
/// Returns [`NumericError::Range`] if the sizes are invalid, and
/// [`NumericError::SingularPivot`] if a leading principal minor is singular.
/// `dest` is left untouched in both cases.
///
/// # Examples
///
/// ```
/// # use arburg::toeplitz::zohar_linear_solve;
/// // | 1    0.5 | s = | 2 |
/// // | 0.25 1   |     | 1 |
/// let mut s = [0.0f64; 2];
/// zohar_linear_solve(&[0.5], &[0.25], &[2.0, 1.0], &mut s).unwrap();
/// assert!((s[0] + 0.5 * s[1] - 2.0).abs() < 1e-12);
/// assert!((0.25 * s[0] + s[1] - 1.0).abs() < 1e-12);
/// ```
pub fn zohar_linear_solve<T: Value>(
    a: &[T],
    r: &[T],
    d: &[T],
    dest: &mut [T],
) -> Result<(), NumericError> {
    if dest.len() < a.len() + 1 {
        return Err(RangeError::from_display(
            "dest.len()",
            &format!("must be at least a.len() + 1 = {}", a.len() + 1),
            &dest.len(),
        )
        .into());
    }
    let s = zohar_recursion(a, r, d)?;
    dest[..s.len()].clone_from_slice(&s);
    Ok(())
}

/// Solves a Toeplitz set of linear equations in place.
///
/// Same as [`zohar_linear_solve`], except that the solution overwrites
/// `d[..n + 1]`.
///
/// # Errors
///
/// Same as [`zohar_linear_solve`]. `d` is left untouched on errors.
pub fn zohar_linear_solve_in_place<T: Value>(
    a: &[T],
    r: &[T],
    d: &mut [T],
) -> Result<(), NumericError> {
    let s = zohar_recursion(a, r, d)?;
    d[..s.len()].clone_from_slice(&s);
    Ok(())
}

/// Solves a real-valued symmetric Toeplitz set of linear equations in place.
///
/// This is [`zohar_linear_solve_in_place`] with `r` set to `a`. Solving
/// with `a` set to lags `1..=p` of an autocorrelation sequence and `d` set
/// to `[1, 0, ..., 0]` yields the Yule-Walker AR(p) parameters scaled by the
/// gain.
///
/// # Errors
///
/// Same as [`zohar_linear_solve`].
///
/// # Examples
///
/// ```
/// # use arburg::toeplitz::symmetric_zohar_linear_solve;
/// // AR(1) with a[1] = -0.5 has autocorrelation 0.5 at lag 1.
/// let mut d = [1.0f64, 0.0];
/// symmetric_zohar_linear_solve(&[0.5], &mut d).unwrap();
/// assert!((d[1] / d[0] + 0.5).abs() < 1e-12);
/// ```
pub fn symmetric_zohar_linear_solve<T: Value>(a: &[T], d: &mut [T]) -> Result<(), NumericError> {
    zohar_linear_solve_in_place(a, a, d)
}

#[cfg(test)]
#[allow(clippy::pedantic, clippy::nursery, clippy::needless_range_loop)]
mod tests {
    use super::*;
    use crate::assert_close;
    use crate::assert_finite;
    use crate::test_helper;

    use num_rational::BigRational;
    use num_traits::FromPrimitive;
    use rand::distributions::Distribution;
    use rand::distributions::Uniform;
    use rand::SeedableRng;
    use rstest::rstest;

    fn random_system(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        // Strictly diagonally dominant for n <= 9, so every leading principal
        // minor is nonsingular.
        let offdiag = Uniform::from(-0.1..0.1);
        let rhs = Uniform::from(-10.0..10.0);
        let a = (0..n).map(|_| offdiag.sample(&mut rng)).collect();
        let r = (0..n).map(|_| offdiag.sample(&mut rng)).collect();
        let d = (0..=n).map(|_| rhs.sample(&mut rng)).collect();
        (a, r, d)
    }

    #[test]
    fn first_order_closed_form() {
        let a = [0.5];
        let r = [-0.25];
        let d = [3.0, 2.0];
        let mut s = [0.0; 2];
        zohar_linear_solve(&a, &r, &d, &mut s).unwrap();

        let lambda: f64 = 1.0 - a[0] * r[0];
        let s1 = (d[1] - d[0] * r[0]) / lambda;
        let s0 = d[0] - a[0] * s1;
        assert_close!(s[0], s0);
        assert_close!(s[1], s1);
    }

    #[rstest]
    fn agrees_with_dense_solver(#[values(1, 2, 3, 5, 9)] n: usize, #[values(1, 7, 42)] seed: u64) {
        let (a, r, d) = random_system(n, seed);
        let expected = test_helper::dense_toeplitz_solve(&a, &r, &d);

        let mut s = vec![0.0; n + 1];
        zohar_linear_solve(&a, &r, &d, &mut s).unwrap();
        assert_finite!(s);
        for (x, expected_x) in s.iter().zip(&expected) {
            assert_close!(x, expected_x, rtol = 1e-9, atol = 1e-9);
        }

        let mut inplace = d.clone();
        zohar_linear_solve_in_place(&a, &r, &mut inplace).unwrap();
        assert_eq!(inplace, s);
    }

    #[rstest]
    fn symmetric_form_matches_general_form(#[values(1, 4, 8)] n: usize) {
        let (a, _r, d) = random_system(n, 123);
        let mut general = vec![0.0; n + 1];
        zohar_linear_solve(&a, &a.clone(), &d, &mut general).unwrap();

        let mut symmetric = d.clone();
        symmetric_zohar_linear_solve(&a, &mut symmetric).unwrap();
        assert_eq!(symmetric, general);
    }

    #[test]
    fn works_with_f32() {
        let a = [0.5f32, 0.25];
        let mut d = [1.0f32, 0.0, 0.0];
        symmetric_zohar_linear_solve(&a, &mut d).unwrap();
        let expected = test_helper::dense_toeplitz_solve(&[0.5, 0.25], &[0.5, 0.25], &[1.0, 0.0, 0.0]);
        for (x, expected_x) in d.iter().zip(&expected) {
            assert_close!(f64::from(*x), expected_x, rtol = 1e-5, atol = 1e-5);
        }
    }

    #[test]
    fn exact_with_rationals() {
        let ratio = |num: i64, den: i64| {
            BigRational::from_i64(num).unwrap() / BigRational::from_i64(den).unwrap()
        };
        let a = [ratio(1, 2), ratio(1, 3)];
        let r = [ratio(1, 4), ratio(-1, 5)];
        let d = [ratio(1, 1), ratio(2, 1), ratio(-3, 7)];
        let mut s = vec![ratio(0, 1); 3];
        zohar_linear_solve(&a, &r, &d, &mut s).unwrap();

        // L s must reproduce d exactly.
        for i in 0..3 {
            let mut row = ratio(0, 1);
            for j in 0..3 {
                let coef = match i.cmp(&j) {
                    std::cmp::Ordering::Equal => ratio(1, 1),
                    std::cmp::Ordering::Less => a[j - i - 1].clone(),
                    std::cmp::Ordering::Greater => r[i - j - 1].clone(),
                };
                row = row + coef * s[j].clone();
            }
            assert_eq!(row, d[i]);
        }
    }

    #[test]
    fn trailing_elements_are_kept() {
        let mut d = [1.0, 0.0, 99.0];
        symmetric_zohar_linear_solve(&[0.5], &mut d).unwrap();
        assert_eq!(d[2], 99.0);
    }

    #[test]
    fn empty_generator_is_rejected() {
        let mut d = [1.0];
        let err = symmetric_zohar_linear_solve::<f64>(&[], &mut d).unwrap_err();
        assert!(matches!(err, NumericError::Range(ref e) if e.var() == "a.len()"));
        assert_eq!(d, [1.0]);
    }

    #[test]
    fn short_buffers_are_rejected() {
        let mut dest = [0.0; 3];
        let err = zohar_linear_solve(&[0.1, 0.2], &[0.1], &[1.0, 2.0, 3.0], &mut dest).unwrap_err();
        assert!(matches!(err, NumericError::Range(ref e) if e.var() == "r.len()"));

        let err = zohar_linear_solve(&[0.1, 0.2], &[0.1, 0.2], &[1.0, 2.0], &mut dest).unwrap_err();
        assert!(matches!(err, NumericError::Range(ref e) if e.var() == "d.len()"));

        let mut dest = [0.0; 2];
        let err =
            zohar_linear_solve(&[0.1, 0.2], &[0.1, 0.2], &[1.0, 2.0, 3.0], &mut dest).unwrap_err();
        assert!(matches!(err, NumericError::Range(ref e) if e.var() == "dest.len()"));
        assert_eq!(dest, [0.0; 2]);
    }

    #[test]
    fn singular_minor_is_reported() {
        // The leading 2x2 block [[1, 1], [1, 1]] is singular.
        let mut d = [1.0, 2.0, 3.0];
        let err = symmetric_zohar_linear_solve(&[1.0, 0.5], &mut d).unwrap_err();
        assert_eq!(err, NumericError::SingularPivot { step: 1 });
        assert_eq!(d, [1.0, 2.0, 3.0]);

        let mut d = [1.0, 2.0];
        let err = symmetric_zohar_linear_solve(&[-1.0], &mut d).unwrap_err();
        assert_eq!(err, NumericError::SingularPivot { step: 1 });
    }

    #[test]
    fn zero_solution_is_not_an_error() {
        let mut d = [0.0; 4];
        symmetric_zohar_linear_solve(&[0.3, 0.2, 0.1], &mut d).unwrap();
        assert_eq!(d, [0.0; 4]);
    }
}
