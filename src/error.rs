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

//! Error and verification traits

use std::error::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Deserialize;
#[cfg(feature = "serde")]
use serde::Serialize;

/// Enum of errors that can be returned from the numerical recursions.
///
/// All of them are deterministic given the input, and no partial results are
/// returned along with them.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[allow(clippy::module_name_repetitions)]
#[non_exhaustive]
pub enum NumericError {
    /// At least one observation is required.
    EmptyInput,
    /// An argument (typically a buffer length) is out of the supported range.
    Range(RangeError),
    /// The pivot of the Toeplitz recursion vanished at the given step.
    ///
    /// This means that a leading principal minor of the Toeplitz matrix is
    /// singular.
    SingularPivot {
        /// Recursion step (1-based) that would have divided by zero.
        step: usize,
    },
    /// Burg's prediction-error power vanished before fitting `order`.
    DegeneratePower {
        /// Model order that could not be fitted.
        order: usize,
    },
    /// The reflection coefficient for `order` has unit magnitude.
    ///
    /// The data are perfectly predictable at this order, which would make
    /// the gain infinite.
    UnitReflection {
        /// Model order that could not be fitted.
        order: usize,
    },
}

impl Error for NumericError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Range(e) => Some(e),
            Self::EmptyInput
            | Self::SingularPivot { .. }
            | Self::DegeneratePower { .. }
            | Self::UnitReflection { .. } => None,
        }
    }
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "no observation is given"),
            Self::Range(err) => err.fmt(f),
            Self::SingularPivot { step } => {
                write!(f, "singular leading principal minor found at step {step}")
            }
            Self::DegeneratePower { order } => {
                write!(
                    f,
                    "prediction-error power vanished before fitting order {order}"
                )
            }
            Self::UnitReflection { order } => {
                write!(f, "reflection coefficient of order {order} has unit magnitude")
            }
        }
    }
}

impl From<RangeError> for NumericError {
    fn from(e: RangeError) -> Self {
        Self::Range(e)
    }
}

/// Error emitted when a parameter is out of the expected range.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub struct RangeError {
    var: String,
    reason: String,
    actual: String,
}

/// Error object returned when a variable is out of supported range.
impl RangeError {
    /// Makes range error from `actual: impl Display` that is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// # use arburg::error::*;
    /// let err = RangeError::from_display("a.len()", "must be at least 1", &0);
    /// assert_eq!(
    ///     format!("{}", err),
    ///     "`a.len()` is out of range: must be at least 1 (actual=0)"
    /// );
    /// ```
    pub fn from_display<T>(var: &str, reason: &str, actual: &T) -> Self
    where
        T: fmt::Display,
    {
        Self {
            var: var.to_owned(),
            reason: reason.to_owned(),
            actual: format!("{actual}"),
        }
    }

    /// Returns the name of the variable that is out of range.
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Error for RangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` is out of range: {} (actual={})",
            self.var, self.reason, self.actual
        )
    }
}

/// Error object returned when config integrity verification failed.
///
/// This error maintains a path to the component that is actually erroneous
/// in the nested components.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub struct VerifyError {
    components: Vec<String>,
    reason: String,
}

impl VerifyError {
    /// Makes verification error for an invalid variable `component`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use arburg::error::*;
    /// let err = VerifyError::new("max_order", "must be less than or equal to 4096");
    /// assert_eq!(
    ///     format!("{}", err),
    ///     "verification error: `max_order` is not valid. reason: must be less than or equal to 4096"
    /// );
    /// ```
    pub fn new(component: &str, reason: &str) -> Self {
        Self {
            components: vec![component.to_owned()],
            reason: reason.to_owned(),
        }
    }

    /// Prepends the name of an enclosing component to the error location.
    ///
    /// # Examples
    ///
    /// ```
    /// # use arburg::error::*;
    /// let err = VerifyError::new("max_order", "too large");
    /// let err = err.within("burg");
    /// assert_eq!(
    ///     format!("{}", err),
    ///     "verification error: `burg.max_order` is not valid. reason: too large"
    /// );
    /// ```
    #[must_use]
    pub fn within(self, component: &str) -> Self {
        let mut components = self.components;
        let reason = self.reason;
        components.push(component.to_owned());
        Self { components, reason }
    }

    /// Gets dot-separated path string for the error location.
    ///
    /// # Examples
    ///
    /// ```
    /// # use arburg::error::*;
    /// let err = VerifyError::new("max_order", "too large");
    /// let err = err.within("burg");
    /// assert_eq!(err.path(), "burg.max_order");
    /// ```
    pub fn path(&self) -> String {
        let mut path = String::new();
        for (i, name) in self.components.iter().rev().enumerate() {
            if i != 0 {
                path.push('.');
            }
            path.push_str(name);
        }
        path
    }
}

impl Error for VerifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "verification error: `{}` is not valid. reason: {}",
            self.path(),
            self.reason
        )
    }
}

/// A wrapper that ensures that the inner `T` is verified and unchanged.
///
/// `Verified<T>` is obtained via [`Verify::into_verified`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Verified<T>(T);

impl<T> std::ops::Deref for Verified<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}

/// Trait for verifiable structs.
pub trait Verify: Sized + seal_verify::Sealed {
    /// Verifies there's no internal data inconsistency.
    ///
    /// # Errors
    ///
    /// Returns `VerifyError` if there's an invalid variable.
    ///
    /// # Examples
    ///
    /// [`config::Burg`] implements `Verify`.
    ///
    /// [`config::Burg`]: crate::config::Burg
    ///
    /// ```
    /// # use arburg::error::*;
    /// # use arburg::config::Burg;
    /// let mut config = Burg::default();
    /// config.max_order = usize::MAX;  // invalid setting
    /// assert!(config.verify().is_err());
    ///
    /// config.max_order = 10; // valid setting
    /// assert!(config.verify().is_ok());
    /// ```
    fn verify(&self) -> Result<(), VerifyError>;

    /// Wraps into `Verified` to indicate that the data is already verified.
    ///
    /// # Errors
    ///
    /// Returns the original input and `VerifyError` if `verify` failed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use arburg::error::*;
    /// # use arburg::config::Burg;
    /// let mut config = Burg::default();
    /// config.max_order = usize::MAX;
    /// assert!(config.clone().into_verified().is_err());
    ///
    /// config.max_order = 7;
    /// assert_eq!(config.into_verified().unwrap().max_order, 7);
    /// ```
    fn into_verified(self) -> Result<Verified<Self>, (Self, VerifyError)> {
        let result = self.verify();
        if let Err(e) = result {
            Err((self, e))
        } else {
            Ok(Verified(self))
        }
    }
}

/// A wrapping function to make it compatible with "?" operator.
pub(crate) fn verify_macro_impl(cond: bool, varname: &str, msg: &str) -> Result<(), VerifyError> {
    if !cond {
        return Err(VerifyError::new(varname, msg));
    }
    Ok(())
}

/// Checks if `$cond` is true and do `return Err(...)` if so.
///
/// An error object `VerifyErr` is constructed using `$varname` and
/// `$msg` that are formatted using the extra args (`$args`).
macro_rules! verify_true {
    ($varname:literal, $cond:expr, $msg:literal, $($args: expr),*) => {
        crate::error::verify_macro_impl(
            $cond,
            &format!($varname, $($args),*),
            &format!($msg, $($args),*),
        )
    };
    ($varname:literal, $cond:expr, $msg:literal) => {
        verify_true!($varname, $cond, $msg,)
    }
}
pub(crate) use verify_true;

/// Checks if `$actual` is in the range, and emits err with default msgs if not.
///
/// An error is constructed using the same way as [`verify_true`].
macro_rules! verify_range {
    ($varname: literal, $actual:expr, $lowlimit:tt ..= $highlimit:tt) => {
        verify_range!($varname, $actual, ($lowlimit)..)
            .and_then(|()| verify_range!($varname, $actual, ..=($highlimit)))
    };
    ($varname: literal, $actual:expr, $lowlimit:tt ..) => {{
        #[allow(unused_parens)]
        let limit = $lowlimit;
        verify_true!(
            $varname,
            $actual >= limit,
            "must be greater than or equal to {limit}"
        )
    }};
    ($varname: literal, $actual:expr, ..= $highlimit:tt) => {{
        #[allow(unused_parens)]
        let limit = $highlimit;
        verify_true!(
            $varname,
            $actual <= limit,
            "must be less than or equal to {limit}"
        )
    }};
}
pub(crate) use verify_range;

mod seal_verify {
    pub trait Sealed {}

    impl Sealed for crate::config::Burg {}
}
