//! Intersection utilities
//!
//! Ray-casting helpers used for gizmo handle picking, for intersecting the
//! pointer with drag planes, and for constraining drags to an axis line.
//! All ray tests honour [`Ray::max_length`].

use glam::{DVec3, Vec3};

use crate::constants::PARALLEL_EPSILON;
use crate::ray::Ray;

/// Ray-plane intersection.
///
/// Returns the hit point, or `None` if the ray is parallel to the plane, the
/// plane is behind the origin, or the plane lies beyond the ray's reach.
pub fn ray_plane_intersection(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    ray_plane_parameter(ray, plane_point, plane_normal).map(|t| ray.at(t))
}

/// Ray-plane intersection returning the ray parameter.
pub fn ray_plane_parameter(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<f32> {
    let denom = ray.direction.dot(plane_normal);

    // Ray is nearly parallel to the plane
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    ray.contains_parameter(t).then_some(t)
}

/// Segment-plane intersection.
///
/// Returns the point where the segment `start..end` crosses the plane, or
/// `None` if both endpoints lie on the same side.
pub fn segment_plane_intersection(
    start: Vec3,
    end: Vec3,
    plane_point: Vec3,
    plane_normal: Vec3,
) -> Option<Vec3> {
    let direction = end - start;
    let denom = direction.dot(plane_normal);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = (plane_point - start).dot(plane_normal) / denom;
    (0.0..=1.0).contains(&t).then(|| start + direction * t)
}

/// Closest points between segments `p0..p1` and `q0..q1`.
///
/// Evaluated in double precision so a short segment paired with a very
/// long one keeps its parameter.
///
/// Returns `(point_on_p, point_on_q)`.
pub fn closest_points_between_segments(p0: Vec3, p1: Vec3, q0: Vec3, q1: Vec3) -> (Vec3, Vec3) {
    let (p0, p1, q0, q1) = (p0.as_dvec3(), p1.as_dvec3(), q0.as_dvec3(), q1.as_dvec3());
    let d1 = p1 - p0;
    let d2 = q1 - q0;
    let r = p0 - q0;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);
    let eps = 1.0e-12;

    let (s, t) = if a <= eps && e <= eps {
        (0.0, 0.0)
    } else if a <= eps {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= eps {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let s = if denom.abs() > eps {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let t = (b * s + f) / e;
            if t < 0.0 {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else if t > 1.0 {
                (((b - c) / a).clamp(0.0, 1.0), 1.0)
            } else {
                (s, t)
            }
        }
    };

    let on_p: DVec3 = p0 + d1 * s;
    let on_q: DVec3 = q0 + d2 * t;
    (on_p.as_vec3(), on_q.as_vec3())
}

/// Ray-sphere intersection.
///
/// Returns the nearest non-negative ray parameter. A ray starting inside
/// the sphere hits at `t = 0`.
pub fn ray_sphere_intersection(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let t = -b - discriminant.sqrt();
    ray.contains_parameter(t).then_some(t)
}

/// Ray-ring intersection.
///
/// The ring is the annulus of width `2 * thickness` around the circle of
/// `ring_radius` centered on `ring_center` in the plane normal to
/// `ring_normal`.
pub fn ray_ring_intersection(
    ray: &Ray,
    ring_center: Vec3,
    ring_normal: Vec3,
    ring_radius: f32,
    thickness: f32,
) -> Option<f32> {
    let t = ray_plane_parameter(ray, ring_center, ring_normal)?;
    let distance_from_center = (ray.at(t) - ring_center).length();
    ((distance_from_center - ring_radius).abs() <= thickness).then_some(t)
}
