// Copyright 2023-2024 Google LLC
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

//! Test signal generator module.
//!
//! This module is primarily intended to be used for tests. However, unlike
//! `test_helper.rs`, it can be exposed to the outside of the crate via the
//! `__export_sigen` feature for external benchmarks.

use rand::Rng;
use rand::SeedableRng;

/// Test signal generators.
pub trait Signal: std::fmt::Debug {
    /// Generates a signal from t=`sample_offset` and fills the buffer `dest`.
    fn fill_buffer(&self, sample_offset: usize, dest: &mut [f64]);

    /// Generates `len` samples from t=0.
    fn to_vec(&self, len: usize) -> Vec<f64> {
        let mut ret = vec![0.0; len];
        self.fill_buffer(0, &mut ret);
        ret
    }

    /// Mixes uniform white noise generated from `seed0`.
    fn noise_with_seed(self, seed0: u64, amplitude: f64) -> Mix<Self, Noise>
    where
        Self: Sized,
    {
        self.mix(Noise::with_seed(seed0, amplitude))
    }

    /// Mixes signal from the other generator
    fn mix<T: Signal + Sized>(self, other: T) -> Mix<Self, T>
    where
        Self: Sized,
    {
        Mix::new(1.0, self, 1.0, other)
    }
}

/// Generator for constant signals.
#[derive(Clone, Debug)]
pub struct Dc {
    offset: f64,
}

impl Dc {
    /// Constructs new `Dc` signal.
    pub fn new(offset: f64) -> Self {
        Self { offset }
    }
}

impl Signal for Dc {
    fn fill_buffer(&self, _offset: usize, dest: &mut [f64]) {
        dest.fill(self.offset);
    }
}

/// Generator for a sinusoidal wave.
#[derive(Clone, Debug)]
pub struct Sine {
    period: f64,
    amplitude: f64,
}

impl Sine {
    /// Constructs new sine wave signal with `period` (in samples) and
    /// `amplitude`.
    pub fn new(period: f64, amplitude: f64) -> Self {
        Self { period, amplitude }
    }
}

impl Signal for Sine {
    fn fill_buffer(&self, offset: usize, dest: &mut [f64]) {
        for (t, p) in dest.iter_mut().enumerate() {
            let t = (t + offset) as f64;
            *p = self.amplitude * f64::sin(2.0 * std::f64::consts::PI * t / self.period);
        }
    }
}

/// Generator for a uniform random white noise in `(-amplitude, amplitude)`.
#[derive(Clone, Debug)]
pub struct Noise {
    seed0: u64,
    amplitude: f64,
}

impl Noise {
    /// Constructs new noise generator with specifying a seed.
    pub fn with_seed(seed0: u64, amplitude: f64) -> Self {
        Self { seed0, amplitude }
    }
}

impl Signal for Noise {
    /// Fills buffer with the uniform random values.
    ///
    /// # Note
    ///
    /// The seed is derived from `offset`, so filling a buffer in two calls
    /// gives a different result from filling it at once.
    fn fill_buffer(&self, offset: usize, dest: &mut [f64]) {
        let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed0.wrapping_add(offset as u64));
        for p in dest {
            *p = self.amplitude * 2.0 * (rng.sample::<f64, _>(rand::distributions::Open01) - 0.5);
        }
    }
}

/// Decorator that mixes outputs from the inner generators.
#[derive(Clone, Debug)]
pub struct Mix<T1: Signal + Sized, T2: Signal + Sized> {
    weight1: f64,
    weight2: f64,
    signal1: T1,
    signal2: T2,
}

impl<T1: Signal + Sized, T2: Signal + Sized> Mix<T1, T2> {
    /// Constructs new two-inputs mixer.
    pub fn new(weight1: f64, signal1: T1, weight2: f64, signal2: T2) -> Self {
        Self {
            weight1,
            weight2,
            signal1,
            signal2,
        }
    }
}

impl<T1: Signal + Sized, T2: Signal + Sized> Signal for Mix<T1, T2> {
    fn fill_buffer(&self, offset: usize, dest: &mut [f64]) {
        let mut buf = vec![0.0f64; dest.len()];
        self.signal1.fill_buffer(offset, dest);
        for p in &mut *dest {
            *p *= self.weight1;
        }
        self.signal2.fill_buffer(offset, &mut buf);
        for (p, x) in dest.iter_mut().zip(buf.iter()) {
            *p += self.weight2 * *x;
        }
    }
}

/// Filter that drives an AR process with the inner generator.
///
/// Computes `x[n] = e[n] - a[1] x[n-1] - ... - a[p] x[n-p]` where `e` is the
/// output of the inner generator, starting from the zero state at t=0.
#[derive(Clone, Debug)]
pub struct Ar<S: Signal + Sized> {
    params: Vec<f64>,
    innovation: S,
}

impl<S: Signal + Sized> Ar<S> {
    /// Constructs an AR filter with `params = [a[1], ..., a[p]]`.
    pub fn new(params: &[f64], innovation: S) -> Self {
        Self {
            params: params.to_vec(),
            innovation,
        }
    }
}

impl<S: Signal + Sized> Signal for Ar<S> {
    fn fill_buffer(&self, offset: usize, dest: &mut [f64]) {
        // the filter state depends on the entire history.
        let mut x = vec![0.0f64; offset + dest.len()];
        self.innovation.fill_buffer(0, &mut x);
        for t in 0..x.len() {
            let mut acc = x[t];
            for (j, a) in self.params.iter().enumerate() {
                if t > j {
                    acc -= a * x[t - 1 - j];
                }
            }
            x[t] = acc;
        }
        dest.copy_from_slice(&x[offset..]);
    }
}
