//! `RawSamplingJob`: a trivial per-track binary-search sampler over
//! `RawAnimation`. No cache, no cursor — this exists as a test oracle and
//! as a fallback for clips that haven't been baked into the compressed
//! `Animation` form.

use crate::error::ValidationError;
use crate::raw_animation::RawAnimation;
use crate::transform::Transform;
use glam::{Quat, Vec3};

pub struct RawSamplingJob<'a> {
    pub animation: &'a RawAnimation,
    pub ratio: f32,
    pub output: &'a mut [Transform],
}

impl<'a> RawSamplingJob<'a> {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.output.is_empty() {
            return Err(ValidationError::OutputEmpty);
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), ValidationError> {
        self.validate().map_err(|e| {
            log::warn!("RawSamplingJob validation failed: {e}");
            e
        })?;

        let ratio = self.ratio.clamp(0.0, 1.0);
        let time = ratio * self.animation.duration;
        let num_tracks = self.animation.num_tracks().min(self.output.len());

        for i in 0..num_tracks {
            let track = &self.animation.tracks[i];
            let translation = sample_channel(&track.translations, time, |k| k.time, |k| k.value, Vec3::lerp, Vec3::ZERO);
            let rotation = sample_channel(&track.rotations, time, |k| k.time, |k| k.value, Quat::slerp, Quat::IDENTITY);
            let scale = sample_channel(&track.scales, time, |k| k.time, |k| k.value, Vec3::lerp, Vec3::ONE);
            self.output[i] = Transform::new(translation, rotation, scale);
        }

        Ok(())
    }
}

/// Finds the pair of keys bracketing `time` and interpolates between them.
/// An empty channel returns `identity`; a channel with a single key returns
/// that key's value unchanged (no extrapolation past the ends).
fn sample_channel<K: Copy, V: Copy>(
    keys: &[K],
    time: f32,
    time_of: impl Fn(K) -> f32,
    value_of: impl Fn(K) -> V,
    interp: impl Fn(V, V, f32) -> V,
    identity: V,
) -> V {
    if keys.is_empty() {
        return identity;
    }
    if keys.len() == 1 || time <= time_of(keys[0]) {
        return value_of(keys[0]);
    }
    let last = keys.len() - 1;
    if time >= time_of(keys[last]) {
        return value_of(keys[last]);
    }

    // `keys` is short per-track (typically single digits to low hundreds);
    // linear scan is simpler than a binary search and the hot path belongs
    // to `SamplingJob`'s cached cursor, not this oracle.
    let mut left = 0;
    for i in 1..keys.len() {
        if time_of(keys[i]) > time {
            break;
        }
        left = i;
    }
    let right = (left + 1).min(last);

    let t0 = time_of(keys[left]);
    let t1 = time_of(keys[right]);
    let u = if right == left || (t1 - t0).abs() < f32::EPSILON {
        0.0
    } else {
        (time - t0) / (t1 - t0)
    };

    interp(value_of(keys[left]), value_of(keys[right]), u)
}
