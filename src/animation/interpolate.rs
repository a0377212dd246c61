use super::types::{AnimationChannel, Key, QuatKey, VectorKey};
use crate::quat;
use nalgebra_glm as glm;

/// Helper to calculate the parameter used for interpolation. Keys at the
/// same time give 0.
fn weight(start: f32, end: f32, current: f32) -> f32 {
    if end <= start {
        return 0.0;
    }
    ((current - start) / (end - start)).clamp(0.0f32, 1.0f32)
}

/// Where a query time falls in a sequence of keys
#[derive(Debug)]
enum Bracket<'a, T> {
    /// Single key, or a time outside the keyed range
    Exact(&'a T),
    /// Two neighbouring keys and the interpolation parameter between them
    Between(&'a Key<T>, &'a Key<T>, f32),
}

/// Finds the keys around `time`. Times before the first key or after the last
/// key are clamped to that key's value rather than extrapolated. Returns
/// `None` only for an empty sequence.
fn bracket<T>(keys: &[Key<T>], time: f32) -> Option<Bracket<'_, T>> {
    let first = keys.first()?;
    let last = keys.last()?;
    if keys.len() == 1 || time <= first.time {
        return Some(Bracket::Exact(&first.value));
    }
    if time >= last.time {
        return Some(Bracket::Exact(&last.value));
    }

    // Scan for the first key that is later than the current time. Since
    // first.time < time < last.time one always exists, but keys that are not
    // sorted could still defeat the scan so fall back to the last segment.
    let i = keys
        .windows(2)
        .position(|pair| time < pair[1].time)
        .unwrap_or(keys.len() - 2);
    let (a, b) = (&keys[i], &keys[i + 1]);
    Some(Bracket::Between(a, b, weight(a.time, b.time, time)))
}

fn lerp_vec(keys: &[VectorKey], time: f32) -> Option<glm::Vec3> {
    bracket(keys, time).map(|b| match b {
        Bracket::Exact(v) => *v,
        Bracket::Between(a, b, factor) => {
            a.value + (b.value - a.value) * factor
        }
    })
}

/// Interpolated translation at `time`, `None` if there are no keys
#[must_use]
pub fn position(keys: &[VectorKey], time: f32) -> Option<glm::Vec3> {
    lerp_vec(keys, time)
}

/// Interpolated scale at `time`, `None` if there are no keys
#[must_use]
pub fn scale(keys: &[VectorKey], time: f32) -> Option<glm::Vec3> {
    lerp_vec(keys, time)
}

/// Spherically interpolated rotation at `time`, `None` if there are no keys.
/// The result is unit length.
#[must_use]
pub fn rotation(keys: &[QuatKey], time: f32) -> Option<glm::Quat> {
    bracket(keys, time).map(|b| match b {
        Bracket::Exact(q) => *q,
        Bracket::Between(a, b, factor) => {
            quat::slerp(&a.value, &b.value, factor)
        }
    })
}

/// Local transform of the channel's node at `time`. The components are
/// applied scale first, then rotation, then translation. A component with no
/// keys contributes nothing.
#[must_use]
pub fn local_transform(channel: &AnimationChannel, time: f32) -> glm::Mat4 {
    let t = position(&channel.positions, time)
        .unwrap_or_else(glm::Vec3::zeros);
    let r = rotation(&channel.rotations, time)
        .unwrap_or_else(glm::Quat::identity);
    let s = scale(&channel.scales, time)
        .unwrap_or_else(|| glm::vec3(1.0, 1.0, 1.0));
    glm::translation(&t) * quat::to_mat4(&r) * glm::scaling(&s)
}
