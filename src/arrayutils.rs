// Copyright 2023 Google LLC
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

//! Module for array processing utility functions.

use std::fmt;
use std::ops::Neg;

use num_traits::FromPrimitive;
use num_traits::Num;

use super::error::NumericError;
use super::error::RangeError;

/// Working value type of the recursions.
///
/// Anything that behaves like a field and can be built from a sample count
/// works: `f32`, `f64`, or exact rational types such as
/// `num_rational::BigRational`. The recursions never take square roots or
/// compare against tolerances, so exact types give exact results. Values are
/// cloned where they are reused, which is free for the primitive floats.
pub trait Value: Clone + fmt::Debug + PartialOrd + Num + FromPrimitive + Neg<Output = Self> {}

impl<T> Value for T where T: Clone + fmt::Debug + PartialOrd + Num + FromPrimitive + Neg<Output = T> {}

/// Converts a count into the working type.
///
/// # Errors
///
/// Returns `RangeError` when `T` cannot represent `count`.
pub(crate) fn count_as<T: Value>(var: &str, count: usize) -> Result<T, RangeError> {
    T::from_usize(count)
        .ok_or_else(|| RangeError::from_display(var, "not representable in the working type", &count))
}

/// Computes `init + sum(x * y)` over the shorter of the two inputs.
#[inline]
pub fn inner_product<'a, 'b, T, I, J>(xs: I, ys: J, init: T) -> T
where
    T: Value + 'a + 'b,
    I: IntoIterator<Item = &'a T>,
    J: IntoIterator<Item = &'b T>,
{
    xs.into_iter()
        .zip(ys)
        .fold(init, |acc, (x, y)| acc + x.clone() * y.clone())
}

/// Sums `values` by combining partial sums in a binary tree.
///
/// Rounding error grows like `O(log N)` instead of `O(N)` for the naive
/// left-to-right loop. The tree is padded with zeros when `N` is not a power
/// of two, so every input is added exactly once.
///
/// # Examples
///
/// ```
/// # use arburg::arrayutils::pairwise_sum;
/// assert_eq!(pairwise_sum(&[1.0, 2.0, 3.0, 4.0, 5.0]), 15.0);
/// assert_eq!(pairwise_sum::<f64>(&[]), 0.0);
/// ```
pub fn pairwise_sum<T: Value>(values: &[T]) -> T {
    let len = values.len();
    if len == 0 {
        return T::zero();
    }

    // first pass halves the problem while copying.
    let mut partial = vec![T::zero(); len];
    for (i, v) in values.iter().enumerate() {
        let acc = std::mem::replace(&mut partial[i / 2], T::zero());
        partial[i / 2] = acc + v.clone();
    }

    // `width` starts from the largest power of two not exceeding `len`, so
    // that `partial[..width]` covers the `ceil(len / 2)` first-pass sums.
    let mut width = 1usize << (usize::BITS - 1 - len.leading_zeros());
    while width > 1 {
        width /= 2;
        for j in 0..width {
            let lhs = std::mem::replace(&mut partial[2 * j], T::zero());
            let rhs = std::mem::replace(&mut partial[2 * j + 1], T::zero());
            partial[j] = lhs + rhs;
        }
    }
    partial.swap_remove(0)
}

/// Computes the arithmetic mean of `values` using [`pairwise_sum`].
///
/// # Errors
///
/// Returns [`NumericError::EmptyInput`] if `values` is empty, and
/// [`NumericError::Range`] if the length is not representable in `T`.
///
/// # Examples
///
/// ```
/// # use arburg::arrayutils::pairwise_mean;
/// # use arburg::error::NumericError;
/// assert_eq!(pairwise_mean(&[1.0f32, 2.0, 3.0, 6.0]).unwrap(), 3.0);
/// assert_eq!(pairwise_mean::<f64>(&[]), Err(NumericError::EmptyInput));
/// ```
pub fn pairwise_mean<T: Value>(values: &[T]) -> Result<T, NumericError> {
    if values.is_empty() {
        return Err(NumericError::EmptyInput);
    }
    let denom: T = count_as("values.len()", values.len())?;
    Ok(pairwise_sum(values) / denom)
}

#[cfg(test)]
#[allow(clippy::pedantic, clippy::nursery)]
mod tests {
    use super::*;
    use crate::assert_close;

    use num_rational::BigRational;
    use rstest::rstest;

    #[rstest]
    fn pairwise_sum_covers_every_element(
        #[values(1, 2, 3, 5, 7, 8, 9, 31, 32, 33, 1000)] len: usize,
    ) {
        let values: Vec<f64> = (1..=len).map(|x| x as f64).collect();
        let expected = (len * (len + 1) / 2) as f64;
        assert_eq!(pairwise_sum(&values), expected);
    }

    #[test]
    fn pairwise_sum_is_generic() {
        let values = [0.5f32, 0.25, 0.125, 0.125];
        assert_eq!(pairwise_sum(&values), 1.0f32);
    }

    #[test]
    fn pairwise_sum_is_more_accurate_than_naive_loop() {
        let tiny = 1e-16f64;
        let count = 1usize << 16;
        let mut values = vec![tiny; count];
        values[0] = 1.0;

        let naive: f64 = values.iter().fold(0.0, |acc, x| acc + x);
        let pairwise = pairwise_sum(&values);
        let expected = 1.0 + tiny * (count - 1) as f64;

        eprintln!("naive = {naive:e}, pairwise = {pairwise:e}, expected = {expected:e}");
        assert_eq!(naive, 1.0);
        assert!((pairwise - expected).abs() < (naive - expected).abs());
        assert_close!(pairwise, expected, rtol = 1e-14, atol = 0.0);
    }

    #[test]
    fn mean_of_integers_is_exact() {
        let values: Vec<f64> = (1..=7).map(f64::from).collect();
        assert_eq!(pairwise_mean(&values), Ok(4.0));
        assert_eq!(pairwise_mean(&[-3.5f64]), Ok(-3.5));
    }

    #[test]
    fn mean_of_rationals_is_exact() {
        let ratio = |num: i64, den: i64| {
            BigRational::from_i64(num).unwrap() / BigRational::from_i64(den).unwrap()
        };
        let values = [ratio(1, 3), ratio(1, 6), ratio(1, 2), ratio(-2, 7), ratio(5, 1)];
        let expected = ratio(1, 5) * (ratio(1, 1) + ratio(-2, 7) + ratio(5, 1));
        assert_eq!(pairwise_mean(&values), Ok(expected));
        assert_eq!(
            inner_product(&values[..2], &values[2..4], ratio(0, 1)),
            ratio(1, 6) - ratio(1, 21)
        );
    }

    #[test]
    fn mean_of_nothing_is_an_error() {
        assert_eq!(pairwise_mean::<f32>(&[]), Err(NumericError::EmptyInput));
    }

    #[test]
    fn inner_product_truncates_to_shorter_input() {
        let xs = [1.0, 2.0, 3.0];
        let ys = [4.0, 5.0];
        assert_eq!(inner_product(&xs, &ys, 0.5), 0.5 + 4.0 + 10.0);
        assert_eq!(inner_product(xs.iter().rev(), &ys, 0.0), 12.0 + 10.0);
    }
}
