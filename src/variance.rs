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

//! Method-specific empirical variances of AR parameter estimates.
//!
//! These closed-form approximations (Broersen and Wensink, 1993) give the
//! variance of the `i`-th reflection coefficient estimated from `N`
//! observations. They are the finite-sample ingredient of AR order-selection
//! criteria.

use std::iter::FusedIterator;
use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde::Deserialize;
#[cfg(feature = "serde")]
use serde::Serialize;

use super::arrayutils::count_as;
use super::arrayutils::Value;
use super::error::NumericError;
use super::error::RangeError;

/// How the sample mean was treated before estimation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum MeanHandling {
    /// The sample mean was subtracted from the signal.
    Subtracted,
    /// The sample mean was retained in the signal.
    Retained,
}

/// Estimation method that produced the AR parameters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Method {
    /// Solving the Yule-Walker equations.
    YuleWalker,
    /// Burg's recursive method.
    Burg,
    /// Least-squares minimization of forward prediction errors.
    Lsf,
    /// Least-squares minimization of forward and backward prediction errors.
    Lsfb,
}

/// Computes the empirical variance estimate for `order` given `n` samples.
///
/// # Errors
///
/// Returns [`NumericError::Range`] if `n` is zero, if `order` exceeds `n`, or
/// if the formula for `method` has no finite value at `order`.
///
/// # Examples
///
/// ```
/// # use arburg::variance::*;
/// let v: f64 = empirical_variance(Method::Burg, MeanHandling::Subtracted, 10, 3).unwrap();
/// assert_eq!(v, 1.0 / 8.0);
/// let v: f64 = empirical_variance(Method::Burg, MeanHandling::Subtracted, 10, 0).unwrap();
/// assert_eq!(v, 1.0 / 10.0);
/// ```
pub fn empirical_variance<T: Value>(
    method: Method,
    mean_handling: MeanHandling,
    n: usize,
    order: usize,
) -> Result<T, NumericError> {
    if n == 0 {
        return Err(RangeError::from_display("n", "must be at least 1", &n).into());
    }
    if order > n {
        return Err(RangeError::from_display("order", "must not exceed `n`", &order).into());
    }

    if order == 0 {
        return match mean_handling {
            MeanHandling::Subtracted => Ok(T::one() / count_as::<T>("n", n)?),
            MeanHandling::Retained => Ok(T::zero()),
        };
    }

    let big_n: T = count_as("n", n)?;
    let i: T = count_as("order", order)?;
    let two = T::one() + T::one();
    let three_halves = (two.clone() + T::one()) / two.clone();

    // subtractions are done in `T` since they can go negative.
    let (num, den) = match method {
        Method::YuleWalker => (big_n.clone() - i, big_n.clone() * (big_n + two)),
        Method::Burg => (T::one(), big_n + T::one() - i),
        Method::Lsf => (T::one(), big_n + two.clone() - two * i),
        Method::Lsfb => (T::one(), big_n + three_halves.clone() - three_halves * i),
    };
    if den.is_zero() {
        return Err(RangeError::from_display(
            "order",
            "makes the variance formula singular",
            &order,
        )
        .into());
    }
    Ok(num / den)
}

/// Lazy sequence of empirical variances for orders `0, 1, ..., n`.
///
/// The sequence is finite (`n + 1` items), and can be restarted by cloning
/// before iteration.
///
/// # Examples
///
/// ```
/// # use arburg::variance::*;
/// let seq = EmpiricalVariances::<f64>::new(Method::YuleWalker, MeanHandling::Retained, 4).unwrap();
/// assert_eq!(seq.len(), 5);
/// let vs: Vec<f64> = seq.clone().collect::<Result<_, _>>().unwrap();
/// assert_eq!(vs[0], 0.0);
/// assert_eq!(vs[4], 0.0);
/// assert_eq!(seq.count(), 5);
/// ```
#[derive(Clone, Debug)]
pub struct EmpiricalVariances<T> {
    method: Method,
    mean_handling: MeanHandling,
    n: usize,
    next_order: usize,
    phantom: PhantomData<T>,
}

impl<T: Value> EmpiricalVariances<T> {
    /// Constructs a sequence for `n` observations.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::Range`] if `n` is zero.
    pub fn new(method: Method, mean_handling: MeanHandling, n: usize) -> Result<Self, NumericError> {
        if n == 0 {
            return Err(RangeError::from_display("n", "must be at least 1", &n).into());
        }
        Ok(Self {
            method,
            mean_handling,
            n,
            next_order: 0,
            phantom: PhantomData,
        })
    }

    /// Returns the number of observations.
    pub const fn samples(&self) -> usize {
        self.n
    }

    /// Returns the model order of the next item.
    pub const fn next_order(&self) -> usize {
        self.next_order
    }
}

impl<T: Value> Iterator for EmpiricalVariances<T> {
    type Item = Result<T, NumericError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_order > self.n {
            return None;
        }
        let order = self.next_order;
        self.next_order += 1;
        Some(empirical_variance(
            self.method,
            self.mean_handling,
            self.n,
            order,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.n + 1).saturating_sub(self.next_order);
        (remaining, Some(remaining))
    }
}

impl<T: Value> ExactSizeIterator for EmpiricalVariances<T> {}

impl<T: Value> FusedIterator for EmpiricalVariances<T> {}
