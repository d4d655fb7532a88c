//! Pointer rays

use glam::Vec3;

use crate::pose::Pose;

/// A pointing device's aim: origin plus normalized direction, optionally
/// bounded in length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start of the ray
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    /// Maximum reach, `None` for unbounded
    pub max_length: Option<f32>,
}

impl Ray {
    /// Creates an unbounded ray. `direction` is normalized; a zero direction
    /// stays zero.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_length: None,
        }
    }

    /// Creates a ray that reaches at most `max_length`.
    pub fn bounded(origin: Vec3, direction: Vec3, max_length: f32) -> Self {
        Self {
            max_length: Some(max_length),
            ..Self::new(origin, direction)
        }
    }

    /// Evaluates the point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Returns true if parameter `t` lies on the ray (in front of the origin
    /// and within the maximum length).
    pub fn contains_parameter(&self, t: f32) -> bool {
        t >= 0.0 && self.max_length.is_none_or(|max| t <= max)
    }

    /// Expresses the ray in the unscaled local frame of `pose`.
    pub fn to_local_no_scale(&self, pose: &Pose) -> Ray {
        Ray {
            origin: pose.inverse_transform_point_no_scale(self.origin),
            direction: pose.inverse_transform_vector_no_scale(self.direction),
            max_length: self.max_length,
        }
    }

    /// Returns true if the direction is usable.
    pub fn is_valid(&self) -> bool {
        self.direction.length_squared() > 0.5 && self.origin.is_finite()
    }
}
