// Copyright 2022 Google LLC
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

//! Estimator configuration structs.

#[cfg(feature = "serde")]
use serde::Deserialize;
#[cfg(feature = "serde")]
use serde::Serialize;

use super::constant::burg::DEFAULT_MAX_ORDER;
use super::constant::burg::MAX_ORDER;
use super::error::verify_range;
use super::error::verify_true;
use super::error::Verify;
use super::error::VerifyError;

/// Configuration for Burg's method.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Burg {
    /// Maximum model order desired.
    ///
    /// The order actually fitted is further limited by the number of samples.
    /// Unlike the sample-count limit, which is applied silently, values above
    /// [`MAX_ORDER`] are rejected by verification.
    pub max_order: usize,
    /// If set, the sample mean is removed before the recursion.
    pub subtract_mean: bool,
    /// If set, models of all orders up to `max_order` are emitted.
    pub hierarchy: bool,
}

impl Default for Burg {
    fn default() -> Self {
        Self {
            max_order: DEFAULT_MAX_ORDER,
            subtract_mean: false,
            hierarchy: false,
        }
    }
}

impl Verify for Burg {
    fn verify(&self) -> Result<(), VerifyError> {
        verify_range!("max_order", self.max_order, ..= MAX_ORDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Burg::default().verify().is_ok());
    }

    #[test]
    fn oversized_order_is_rejected() {
        let config = Burg {
            max_order: MAX_ORDER + 1,
            ..Burg::default()
        };
        let err = config.verify().unwrap_err().within("burg");
        assert_eq!(err.path(), "burg.max_order");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialization() {
        let config = Burg::default();
        assert!(toml::to_string(&config).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialization() {
        let src = "
max_order = 7
hierarchy = true
";
        let config: Burg = toml::from_str(src).expect("Parse error.");
        assert_eq!(config.max_order, 7);
        assert!(config.hierarchy);

        // Check the rest is default.
        assert!(!config.subtract_mean);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn if_empty_source_yields_default_config() {
        let empty_src = "";
        let config: Burg = toml::from_str(empty_src).expect("Parse error.");
        let default_config = Burg::default();
        eprintln!(
            "## Current default config\n\n{}",
            toml::to_string(&config).unwrap()
        );
        assert_eq!(config, default_config);
    }
}
