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

//! Autoregressive model estimation with Burg's method.
//!
//! The model follows the sign convention
//!
//! ```text
//! x[n] + a[1] x[n-1] + ... + a[p] x[n-p] = e[n]
//! ```
//!
//! and Burg's recursion picks `a` so that the sum of squared forward and
//! backward prediction errors is minimized at every order. The recursion
//! follows Collomb's formulation, with gain and autocorrelation updates from
//! Broersen (2006), sections 5.2 and 5.3.

#[cfg(feature = "serde")]
use serde::Deserialize;
#[cfg(feature = "serde")]
use serde::Serialize;

use super::arrayutils::count_as;
use super::arrayutils::inner_product;
use super::arrayutils::pairwise_mean;
use super::arrayutils::Value;
use super::config;
#[cfg(feature = "log")]
use super::constant::log_target;
use super::error::NumericError;
use super::error::Verified;
use super::variance::EmpiricalVariances;
use super::variance::MeanHandling;
use super::variance::Method;

/// Result of Burg's method.
///
/// Parameters, innovation variances, and gains are stored flattened in the
/// order of model orders. When the fit was made without the hierarchy flag,
/// only the model of the final order is stored. Use [`BurgFit::models`] or
/// [`BurgFit::model`] for structured access.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct BurgFit<T> {
    mean: T,
    max_order: usize,
    samples: usize,
    subtract_mean: bool,
    hierarchy: bool,
    params: Vec<T>,
    sigma2e: Vec<T>,
    gain: Vec<T>,
    autocor: Vec<T>,
}

impl<T: Value> BurgFit<T> {
    fn empty(mean: T, samples: usize, subtract_mean: bool, hierarchy: bool) -> Self {
        Self {
            mean,
            max_order: 0,
            samples,
            subtract_mean,
            hierarchy,
            params: vec![],
            sigma2e: vec![],
            gain: vec![],
            autocor: vec![],
        }
    }

    /// Returns the sample mean (computed even when it was not subtracted.)
    pub fn mean(&self) -> T {
        self.mean.clone()
    }

    /// Returns the maximum model order actually fitted.
    pub const fn max_order(&self) -> usize {
        self.max_order
    }

    /// Returns the number of samples consumed.
    pub const fn samples(&self) -> usize {
        self.samples
    }

    /// Returns true if the mean was subtracted before the recursion.
    pub const fn subtract_mean(&self) -> bool {
        self.subtract_mean
    }

    /// Returns true if models of all orders were emitted.
    pub const fn is_hierarchy(&self) -> bool {
        self.hierarchy
    }

    /// Returns how the sample mean was treated.
    pub const fn mean_handling(&self) -> MeanHandling {
        if self.subtract_mean {
            MeanHandling::Subtracted
        } else {
            MeanHandling::Retained
        }
    }

    /// Returns flattened AR parameters.
    ///
    /// In hierarchy mode, this contains `p * (p + 1) / 2` coefficients for
    /// AR(1), AR(2), ..., AR(p) in this order. Otherwise, this only contains
    /// `p` coefficients of AR(p).
    pub fn params(&self) -> &[T] {
        &self.params
    }

    /// Returns innovation variances, one for each emitted model.
    pub fn sigma2e(&self) -> &[T] {
        &self.sigma2e
    }

    /// Returns gains, one for each emitted model.
    pub fn gain(&self) -> &[T] {
        &self.gain
    }

    /// Returns autocorrelations for lags `1..=max_order`.
    pub fn autocor(&self) -> &[T] {
        &self.autocor
    }

    /// Returns the AR model of the given order if it was emitted.
    pub fn model(&self, order: usize) -> Option<ArModel<'_, T>> {
        if order == 0 || order > self.max_order {
            return None;
        }
        let (offset, index) = if self.hierarchy {
            (order * (order - 1) / 2, order - 1)
        } else if order == self.max_order {
            (0, 0)
        } else {
            return None;
        };
        Some(ArModel {
            order,
            params: self.params.get(offset..offset + order)?,
            sigma2e: self.sigma2e.get(index)?,
            gain: self.gain.get(index)?,
            autocor: self.autocor.get(..order)?,
        })
    }

    /// Returns the AR model of the maximum order, if any.
    pub fn final_model(&self) -> Option<ArModel<'_, T>> {
        self.model(self.max_order)
    }

    /// Returns an iterator over all emitted models in increasing order.
    pub fn models(&self) -> impl Iterator<Item = ArModel<'_, T>> + '_ {
        (1..=self.max_order).filter_map(move |order| self.model(order))
    }

    /// Returns the empirical variance sequence matching this fit.
    ///
    /// # Errors
    ///
    /// Returns an error if the fit does not hold any sample, which does not
    /// happen for the results of [`burg_method`].
    pub fn empirical_variances(&self) -> Result<EmpiricalVariances<T>, NumericError> {
        EmpiricalVariances::new(Method::Burg, self.mean_handling(), self.samples)
    }
}

/// A view of one AR model in [`BurgFit`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArModel<'a, T> {
    order: usize,
    params: &'a [T],
    sigma2e: &'a T,
    gain: &'a T,
    autocor: &'a [T],
}

impl<'a, T: Value> ArModel<'a, T> {
    /// Returns the model order.
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Returns `a[1], ..., a[order]`.
    pub fn params(&self) -> &'a [T] {
        self.params
    }

    /// Returns the innovation variance (mean squared discrepancy.)
    pub fn sigma2e(&self) -> T {
        self.sigma2e.clone()
    }

    /// Returns the gain, i.e. the ratio of process to innovation variances.
    pub fn gain(&self) -> T {
        self.gain.clone()
    }

    /// Returns autocorrelations for lags `1..=order`.
    pub fn autocor(&self) -> &'a [T] {
        self.autocor
    }

    /// Returns the process variance implied by the model.
    pub fn process_variance(&self) -> T {
        self.gain.clone() * self.sigma2e.clone()
    }

    /// Returns autocovariances for lags `0..=order`.
    pub fn autocovariances(&self) -> Vec<T> {
        let var = self.process_variance();
        std::iter::once(var.clone())
            .chain(self.autocor.iter().map(|rho| rho.clone() * var.clone()))
            .collect()
    }
}

/// Fits AR models to `data` using Burg's method.
///
/// `data` is read once. The mean is computed with pairwise summation and
/// reported even when `subtract_mean` is false. At most `N - 1` orders can be
/// fitted from `N` samples, so `max_order` is silently clamped and the
/// achieved order is reported via [`BurgFit::max_order`]. If it is zero,
/// nothing but the mean and the sample count is reported.
///
/// All lower order models are always computed; `hierarchy` only controls
/// whether they are kept in the output.
///
/// # Errors
///
/// - [`NumericError::EmptyInput`] if `data` yields nothing.
/// - [`NumericError::DegeneratePower`] if the prediction-error power
///   vanishes, e.g. for a constant signal with its mean removed.
/// - [`NumericError::UnitReflection`] if the data are perfectly predictable
///   by a lower order model.
///
/// # Examples
///
/// ```
/// # use arburg::burg::burg_method;
/// let fit = burg_method([1.0f64, 2.0], 3, false, false).unwrap();
/// assert_eq!(fit.max_order(), 1);
/// assert_eq!(fit.mean(), 1.5);
/// assert!((fit.params()[0] + 0.8).abs() < 1e-12);
/// assert!((fit.autocor()[0] - 0.8).abs() < 1e-12);
/// ```
#[allow(clippy::module_name_repetitions, clippy::many_single_char_names)]
pub fn burg_method<T, I>(
    data: I,
    max_order: usize,
    subtract_mean: bool,
    hierarchy: bool,
) -> Result<BurgFit<T>, NumericError>
where
    T: Value,
    I: IntoIterator<Item = T>,
{
    let mut f: Vec<T> = data.into_iter().collect();
    let n = f.len();
    let mean = pairwise_mean(&f)?;
    let mut fit = BurgFit::empty(mean, n, subtract_mean, hierarchy);

    let requested_order = max_order;
    let max_order = std::cmp::min(requested_order, n - 1);
    #[cfg(feature = "log")]
    if max_order < requested_order {
        log::debug!("order {requested_order} is clamped to {max_order} for {n} samples");
    }
    fit.max_order = max_order;
    if max_order == 0 {
        return Ok(fit);
    }

    if subtract_mean {
        for v in &mut f {
            *v = v.clone() - fit.mean.clone();
        }
    }

    let two = T::one() + T::one();
    let sumsq = inner_product(&f, &f, T::zero());
    let mut dk = two.clone() * sumsq.clone()
        - f[0].clone() * f[0].clone()
        - f[n - 1].clone() * f[n - 1].clone();
    let mut sigma2e = sumsq / count_as::<T>("data.len()", n)?;

    let mut b = f.clone();
    let mut ak = vec![T::zero(); max_order + 1];
    ak[0] = T::one();
    let mut gain = T::one();
    let mut autocor: Vec<T> = Vec::with_capacity(max_order);

    let emitted_models = if hierarchy { max_order } else { 1 };
    let mut params = Vec::with_capacity(if hierarchy {
        max_order * (max_order + 1) / 2
    } else {
        max_order
    });
    let mut sigma2es = Vec::with_capacity(emitted_models);
    let mut gains = Vec::with_capacity(emitted_models);

    for k in 1..=max_order {
        if dk.is_zero() {
            return Err(NumericError::DegeneratePower { order: k });
        }
        // After the update below, `ak[k]` is the reflection coefficient and
        // `ak[1..=k]` holds AR(k) parameters.
        let mu = two.clone() / dk.clone() * inner_product(&f[k..], &b[..n - k], T::zero());
        let residual_ratio = T::one() - mu.clone() * mu.clone();
        if residual_ratio.is_zero() {
            return Err(NumericError::UnitReflection { order: k });
        }
        sigma2e = sigma2e * residual_ratio.clone();
        for i in 0..=k / 2 {
            let (lo, hi) = (ak[i].clone(), ak[k - i].clone());
            ak[i] = lo.clone() - mu.clone() * hi.clone();
            ak[k - i] = hi - mu.clone() * lo;
        }

        // Broersen (2006), eq. (5.25)
        gain = gain * (T::one() / (T::one() - ak[k].clone() * ak[k].clone()));

        // Broersen (2006), eqs. (5.28) and (5.31)
        let rho = -inner_product(autocor.iter().rev(), &ak[1..], ak[k].clone());
        autocor.push(rho);

        #[cfg(feature = "log")]
        log::trace!(
            target: log_target::BURG_RECURSION,
            "order={k}, mu={mu:?}, sigma2e={sigma2e:?}, gain={gain:?}, dk={dk:?}"
        );

        if hierarchy || k == max_order {
            params.extend_from_slice(&ak[1..=k]);
            sigma2es.push(sigma2e.clone());
            gains.push(gain.clone());
        }

        if k < max_order {
            for i in 0..n - k {
                let (fv, bv) = (f[i + k].clone(), b[i].clone());
                f[i + k] = fv.clone() - mu.clone() * bv.clone();
                b[i] = bv - mu.clone() * fv;
            }
            dk = residual_ratio * dk
                - f[k].clone() * f[k].clone()
                - b[n - k - 1].clone() * b[n - k - 1].clone();

            #[cfg(feature = "log")]
            if dk < T::zero() {
                log::warn!(
                    "prediction-error power turned negative after order {k} (dk={dk:?}), \
                     higher order results may be meaningless"
                );
            }
        }
    }

    fit.params = params;
    fit.sigma2e = sigma2es;
    fit.gain = gains;
    fit.autocor = autocor;
    Ok(fit)
}

/// Fits AR models to `data` with settings in `config`.
///
/// `config` is verified beforehand, so `config.max_order` never exceeds
/// [`MAX_ORDER`]. Clamping to the sample count is done silently as in
/// [`burg_method`]. Call [`burg_method`] directly to request larger orders.
///
/// [`MAX_ORDER`]: crate::constant::burg::MAX_ORDER
///
/// # Errors
///
/// Same as [`burg_method`].
///
/// # Examples
///
/// ```
/// # use arburg::burg::fit;
/// # use arburg::config;
/// # use arburg::error::Verify;
/// let mut config = config::Burg::default();
/// config.max_order = 2;
/// config.hierarchy = true;
/// let config = config.into_verified().unwrap();
/// let result = fit(&config, [0.0f64, 1.0, 0.5, -0.25, -1.0, 0.0]).unwrap();
/// assert_eq!(result.models().count(), 2);
/// ```
pub fn fit<T, I>(config: &Verified<config::Burg>, data: I) -> Result<BurgFit<T>, NumericError>
where
    T: Value,
    I: IntoIterator<Item = T>,
{
    burg_method(
        data,
        config.max_order,
        config.subtract_mean,
        config.hierarchy,
    )
}
