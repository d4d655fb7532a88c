//! One-Euro smoothing filter
//!
//! An adaptive low-pass filter for jittery positional input: slow motion is
//! smoothed heavily, fast motion lightly. See Casiez, Roussel and Vogel,
//! "1€ Filter: A Simple Speed-based Low-pass Filter for Noisy Input in
//! Interactive Systems" (CHI 2012).
//!
//! The cutoff is evaluated per component, so a fast move along one axis does
//! not loosen the smoothing on the other two.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::config::SmoothingConfig;

/// Exponential low-pass state: only the previous output and whether a
/// sample has been seen yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowPassFilter {
    previous: Vec3,
    has_sample: bool,
}

impl LowPassFilter {
    /// Creates a filter that passes its first sample straight through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blends `raw` into the state with per-component weight `alpha`.
    pub fn filter(&mut self, raw: Vec3, alpha: Vec3) -> Vec3 {
        let output = if self.has_sample {
            alpha * raw + (Vec3::ONE - alpha) * self.previous
        } else {
            raw
        };
        self.previous = output;
        self.has_sample = true;
        output
    }

    /// Previous output, or zero before the first sample.
    pub fn previous(&self) -> Vec3 {
        self.previous
    }

    /// Returns true until the first sample has been filtered.
    pub fn is_first_time(&self) -> bool {
        !self.has_sample
    }

    /// Forgets all history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One-Euro filter over 3D positions.
#[derive(Debug, Clone, Copy)]
pub struct SmoothingFilter {
    min_cutoff: f32,
    cutoff_slope: f32,
    delta_cutoff: f32,
    raw: LowPassFilter,
    delta: LowPassFilter,
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::from_config(&SmoothingConfig::default())
    }
}

impl SmoothingFilter {
    /// Creates a filter with explicit parameters.
    ///
    /// * `min_cutoff` - cutoff frequency (Hz) at rest; lower means smoother
    /// * `cutoff_slope` - how much the cutoff rises per unit of speed
    /// * `delta_cutoff` - fixed cutoff used when estimating speed
    pub fn new(min_cutoff: f32, cutoff_slope: f32, delta_cutoff: f32) -> Self {
        Self {
            min_cutoff,
            cutoff_slope,
            delta_cutoff,
            raw: LowPassFilter::new(),
            delta: LowPassFilter::new(),
        }
    }

    /// Creates a filter from configuration.
    pub fn from_config(config: &SmoothingConfig) -> Self {
        Self::new(config.min_cutoff, config.cutoff_slope, config.delta_cutoff)
    }

    /// Replaces the tuning parameters, keeping the filter's history.
    pub fn set_parameters(&mut self, min_cutoff: f32, cutoff_slope: f32, delta_cutoff: f32) {
        self.min_cutoff = min_cutoff;
        self.cutoff_slope = cutoff_slope;
        self.delta_cutoff = delta_cutoff;
    }

    /// Filters one sample taken `delta_time` seconds after the previous one.
    ///
    /// A non-positive `delta_time` cannot advance the filter; the previous
    /// output is returned (or `raw` if there is none yet).
    pub fn filter(&mut self, raw: Vec3, delta_time: f32) -> Vec3 {
        if delta_time <= 0.0 || !delta_time.is_finite() {
            return if self.raw.is_first_time() {
                raw
            } else {
                self.raw.previous()
            };
        }

        let delta = if self.raw.is_first_time() {
            Vec3::ZERO
        } else {
            (raw - self.raw.previous()) / delta_time
        };

        let delta_alpha = Vec3::splat(Self::alpha(self.delta_cutoff, delta_time));
        let speed = self.delta.filter(delta, delta_alpha);

        let cutoff = Vec3::splat(self.min_cutoff) + self.cutoff_slope * speed.abs();
        let alpha = Vec3::new(
            Self::alpha(cutoff.x, delta_time),
            Self::alpha(cutoff.y, delta_time),
            Self::alpha(cutoff.z, delta_time),
        );
        self.raw.filter(raw, alpha)
    }

    /// Forgets all history so the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.raw.reset();
        self.delta.reset();
    }

    fn alpha(cutoff: f32, delta_time: f32) -> f32 {
        let tau = 1.0 / (TAU * cutoff);
        1.0 / (1.0 + tau / delta_time)
    }
}
