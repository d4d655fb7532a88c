//! Linear RGBA color

use serde::{Deserialize, Serialize};

/// Linear-space RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearColor {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl LinearColor {
    /// Opaque white
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque red
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    /// Opaque green
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    /// Opaque blue
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    /// Opaque yellow
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);

    /// Creates a color from all four channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Returns the channels as an array.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns a copy with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Converts to `(hue in degrees, saturation, value, alpha)`.
    pub fn to_hsv(self) -> [f32; 4] {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let range = max - min;

        let hue = if range <= f32::EPSILON {
            0.0
        } else if max == self.r {
            60.0 * ((self.g - self.b) / range).rem_euclid(6.0)
        } else if max == self.g {
            60.0 * ((self.b - self.r) / range + 2.0)
        } else {
            60.0 * ((self.r - self.g) / range + 4.0)
        };
        let saturation = if max <= f32::EPSILON { 0.0 } else { range / max };

        [hue, saturation, max, self.a]
    }

    /// Builds a color from `(hue in degrees, saturation, value, alpha)`.
    pub fn from_hsv([hue, saturation, value, alpha]: [f32; 4]) -> Self {
        let hue = hue.rem_euclid(360.0);
        let chroma = value * saturation;
        let sector = hue / 60.0;
        let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = value - chroma;
        Self::new(r + m, g + m, b + m, alpha)
    }

    /// Interpolates through HSV space, taking the shorter way around the
    /// hue circle.
    pub fn lerp_using_hsv(from: Self, to: Self, progress: f32) -> Self {
        let [mut from_hue, from_sat, from_val, from_alpha] = from.to_hsv();
        let [mut to_hue, to_sat, to_val, to_alpha] = to.to_hsv();

        if (from_hue - to_hue).abs() > 180.0 {
            if to_hue > from_hue {
                from_hue += 360.0;
            } else {
                to_hue += 360.0;
            }
        }

        let lerp = |a: f32, b: f32| a + (b - a) * progress;
        Self::from_hsv([
            lerp(from_hue, to_hue).rem_euclid(360.0),
            lerp(from_sat, to_sat),
            lerp(from_val, to_val),
            lerp(from_alpha, to_alpha),
        ])
    }
}

impl From<[f32; 4]> for LinearColor {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

impl From<LinearColor> for [f32; 4] {
    fn from(color: LinearColor) -> Self {
        color.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_color_eq(a: LinearColor, b: LinearColor) {
        for (x, y) in a.to_array().into_iter().zip(b.to_array()) {
            assert_relative_eq!(x, y, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_hsv_round_trip() {
        for color in [
            LinearColor::RED,
            LinearColor::GREEN,
            LinearColor::BLUE,
            LinearColor::rgb(0.3, 0.6, 0.9),
            LinearColor::new(0.8, 0.2, 0.5, 0.5),
        ] {
            assert_color_eq(LinearColor::from_hsv(color.to_hsv()), color);
        }
    }

    #[test]
    fn test_lerp_endpoints() {
        let from = LinearColor::RED;
        let to = LinearColor::YELLOW;
        assert_color_eq(LinearColor::lerp_using_hsv(from, to, 0.0), from);
        assert_color_eq(LinearColor::lerp_using_hsv(from, to, 1.0), to);
    }

    #[test]
    fn test_lerp_takes_short_way_around() {
        // Magenta (300°) to red (0°) passes through 330°, not green.
        let magenta = LinearColor::rgb(1.0, 0.0, 1.0);
        let mid = LinearColor::lerp_using_hsv(magenta, LinearColor::RED, 0.5);
        let [hue, ..] = mid.to_hsv();
        assert_relative_eq!(hue, 330.0, epsilon = 1e-3);
    }
}
