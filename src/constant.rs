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

//! Configuration constants

// Constants that are used only in a specific sub-module or its caller should
// be placed in the corresponding submodule.

/// Constants related to Burg's method.
pub mod burg {
    /// Default maximum model order used in [`config::Burg`].
    ///
    /// [`config::Burg`]: crate::config::Burg
    pub const DEFAULT_MAX_ORDER: usize = 16;

    /// Maximum model order accepted by [`config::Burg`].
    ///
    /// The recursion itself works for any order below the number of samples,
    /// but the memory for the hierarchy output grows quadratically in order.
    ///
    /// [`config::Burg`]: crate::config::Burg
    pub const MAX_ORDER: usize = 4096;
}

/// Module for log targets.
#[cfg(feature = "log")]
pub(crate) mod log_target {
    /// Target for per-order traces of the Burg recursion.
    pub const BURG_RECURSION: &str = "arburg::burg::recursion";
}
