// Copyright 2022-2024 Google LLC
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

#![allow(clippy::missing_panics_doc)]

use std::collections::BTreeMap;

use nalgebra::DMatrix;
use nalgebra::DVector;
use once_cell::sync::Lazy;

use super::sigen::Ar;
use super::sigen::Noise;
use super::sigen::Signal;
use super::sigen::Sine;

#[macro_export]
macro_rules! assert_close {
    ($actual:expr, $expected:expr, rtol = $rtol:expr, atol = $atol:expr) => {{
        let actual = $actual;
        let expected = $expected;
        let err = (actual - expected).abs();
        #[allow(clippy::suboptimal_flops)]
        let tol = $rtol * (expected).abs() + $atol;
        assert!(
            err < tol,
            "actual={:?}, expected={:?}, err={:?}, tol={:?}",
            actual,
            expected,
            err,
            tol
        );
    }};
    ($actual:expr, $expected:expr) => {{
        assert_close!($actual, $expected, rtol = 0.00001, atol = 0.00001);
    }};
}

#[macro_export]
macro_rules! assert_finite {
    ($result:expr) => {{
        for (i, &value) in $result.iter().enumerate() {
            assert!(
                value.is_normal() || value == 0.0,
                "{}-th element in a vector is not finite ({}), x={:?}.",
                i,
                value,
                $result
            );
        }
    }};
}

/// Number of samples in each reference signal.
pub const REFERENCE_SIGNAL_LEN: usize = 2000;

static REFERENCE_SIGNALS: Lazy<BTreeMap<&str, Vec<f64>>> = Lazy::new(|| {
    BTreeMap::from([
        (
            "ar1",
            Ar::new(&[-0.6], Noise::with_seed(1, 1.0)).to_vec(REFERENCE_SIGNAL_LEN),
        ),
        (
            "ar2",
            Ar::new(&[-0.75, 0.5], Noise::with_seed(2, 1.0)).to_vec(REFERENCE_SIGNAL_LEN),
        ),
        (
            "sinusoid",
            Sine::new(16.0, 1.0)
                .noise_with_seed(3, 0.01)
                .to_vec(REFERENCE_SIGNAL_LEN),
        ),
    ])
});

/// Loads a reference signal by key.
///
/// - `"ar1"`: AR(1) with `a[1] = -0.6` driven by uniform noise.
/// - `"ar2"`: AR(2) with `a = [-0.75, 0.5]` driven by uniform noise.
/// - `"sinusoid"`: a sine wave with period 16 plus weak noise.
pub fn reference_signal(name: &str) -> Vec<f64> {
    REFERENCE_SIGNALS
        .get(name)
        .expect("Specified reference signal not found.")
        .clone()
}

/// Builds the dense `(n + 1) x (n + 1)` Toeplitz matrix with unit diagonal,
/// `a` above and `r` below the diagonal.
pub fn dense_toeplitz(a: &[f64], r: &[f64]) -> DMatrix<f64> {
    let n = a.len();
    DMatrix::from_fn(n + 1, n + 1, |i, j| match i.cmp(&j) {
        std::cmp::Ordering::Equal => 1.0,
        std::cmp::Ordering::Less => a[j - i - 1],
        std::cmp::Ordering::Greater => r[i - j - 1],
    })
}

/// Solves the Toeplitz system with a dense LU decomposition.
pub fn dense_toeplitz_solve(a: &[f64], r: &[f64], d: &[f64]) -> Vec<f64> {
    let n = a.len();
    let rhs = DVector::from_column_slice(&d[..=n]);
    dense_toeplitz(a, r)
        .lu()
        .solve(&rhs)
        .expect("Dense solver failed.")
        .iter()
        .copied()
        .collect()
}
