//! Rotation helpers on top of `glm::Quat`
//!
//! `nalgebra_glm` stores quaternions as (i, j, k, w) and `glm::quat` takes
//! its arguments in that order, so the identity is `glm::quat(0, 0, 0, 1)`.
use nalgebra_glm as glm;

/// Above this cosine the two inputs are close enough that a normalized lerp
/// is used instead of slerp to avoid dividing by a tiny sine
const NLERP_THRESHOLD: f32 = 0.9995;

/// Squared vector length below which a rotation axis is considered undefined
const AXIS_EPSILON: f32 = 0.0001;

/// Returns the unit quaternion for `q`. A zero length quaternion has no
/// direction, so identity is returned for it.
#[must_use]
pub fn normalize(q: &glm::Quat) -> glm::Quat {
    let len = q.norm();
    if len <= f32::EPSILON {
        glm::Quat::identity()
    } else {
        *q / len
    }
}

/// Spherical interpolation between two rotations
///
/// `q` and `-q` are the same rotation. If the inputs are in opposite
/// hemispheres `to` is negated so that the shorter arc is taken. The result is
/// always renormalized.
#[must_use]
pub fn slerp(from: &glm::Quat, to: &glm::Quat, t: f32) -> glm::Quat {
    let from = normalize(from);
    let mut to = normalize(to);
    let mut cos_theta = glm::quat_dot(&from, &to);
    if cos_theta < 0.0 {
        to = -to;
        cos_theta = -cos_theta;
    }

    if cos_theta > NLERP_THRESHOLD {
        return normalize(&(from * (1.0 - t) + to * t));
    }

    let theta = cos_theta.min(1.0).acos();
    let sin_theta = theta.sin();
    let a = ((1.0 - t) * theta).sin() / sin_theta;
    let b = (t * theta).sin() / sin_theta;
    normalize(&(from * a + to * b))
}

/// Creates a rotation of `angle` radians about `axis`. The axis does not need
/// to be unit length.
#[must_use]
pub fn from_axis_angle(angle: f32, axis: &glm::Vec3) -> glm::Quat {
    let axis = if glm::length2(axis) < AXIS_EPSILON {
        glm::vec3(1.0, 0.0, 0.0)
    } else {
        glm::normalize(axis)
    };
    let half = angle * 0.5;
    let v = axis * half.sin();
    glm::quat(v.x, v.y, v.z, half.cos())
}

/// Converts a rotation to (angle in radians, unit axis). A rotation with no
/// meaningful axis reports +X.
#[must_use]
pub fn to_axis_angle(q: &glm::Quat) -> (f32, glm::Vec3) {
    let q = normalize(q);
    let v = glm::vec3(q.i, q.j, q.k);
    let axis = if glm::length2(&v) < AXIS_EPSILON {
        glm::vec3(1.0, 0.0, 0.0)
    } else {
        glm::normalize(&v)
    };
    (q.w.clamp(-1.0, 1.0).acos() * 2.0, axis)
}

/// Rotation matrix for a quaternion, normalizing first
#[must_use]
pub fn to_mat4(q: &glm::Quat) -> glm::Mat4 {
    glm::quat_to_mat4(&normalize(q))
}
