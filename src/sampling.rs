//! `SamplingJob` + `Context`: the cache-coherent sampler over a compressed
//! `Animation`. A `Context` remembers, per channel, a cursor into the
//! globally time-sorted keyframe array and a per-track left/right cache,
//! so scrubbing forward through a clip costs only the keys newly crossed
//! rather than a search from the start every call.
//!
//! Grounded on `AnimationJob.cpp`'s `UpdateCacheCursor` / `UpdateInterpKeyframes`
//! / `Interpolates`. The reference implementation batches decompression in
//! SIMD lanes of 4 tracks; this crate has no SIMD backend, so it keeps the
//! same *batching granularity* without the lane-packed value storage: the
//! "outdated" flag is one bit per group of 4 tracks (`group = track / 4`,
//! `byte = group / 8`, `bit = group % 8`).

use crate::animation::{Animation, Float3Key, QuaternionKey};
use crate::error::ValidationError;
use crate::math::{decode_half3, decode_quaternion};
use crate::transform::Transform;
use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy)]
struct InterpFloat3 {
    ratio: [f32; 2],
    value: [Vec3; 2],
}

impl Default for InterpFloat3 {
    fn default() -> Self {
        Self {
            ratio: [0.0, 0.0],
            value: [Vec3::ZERO, Vec3::ZERO],
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct InterpQuaternion {
    ratio: [f32; 2],
    value: [Quat; 2],
}

impl Default for InterpQuaternion {
    fn default() -> Self {
        Self {
            ratio: [0.0, 0.0],
            value: [Quat::IDENTITY, Quat::IDENTITY],
        }
    }
}

/// Per-animation sampling cache, reused call to call. Sized once for the
/// largest track count it will ever see (`max_tracks`); resizing drops all
/// cached state.
pub struct Context {
    max_tracks: usize,
    animation_id: Option<usize>,
    ratio: f32,

    translation_cursor: usize,
    rotation_cursor: usize,
    scale_cursor: usize,

    // cache[track*2 + 0/1] = index into the animation's sorted key array of
    // the left/right bracketing key for that track.
    translation_cache: Vec<usize>,
    rotation_cache: Vec<usize>,
    scale_cache: Vec<usize>,

    // One bit per group of 4 tracks; set when any track in the group
    // crossed a keyframe boundary since the group was last decompressed.
    // `group = track / 4`, `byte = group / 8`, `bit = group % 8`.
    translation_outdated: Vec<u8>,
    rotation_outdated: Vec<u8>,
    scale_outdated: Vec<u8>,

    interp_translations: Vec<InterpFloat3>,
    interp_rotations: Vec<InterpQuaternion>,
    interp_scales: Vec<InterpFloat3>,
}

impl Context {
    pub fn new(max_tracks: usize) -> Self {
        let mut ctx = Self {
            max_tracks: 0,
            animation_id: None,
            ratio: 0.0,
            translation_cursor: 0,
            rotation_cursor: 0,
            scale_cursor: 0,
            translation_cache: Vec::new(),
            rotation_cache: Vec::new(),
            scale_cache: Vec::new(),
            translation_outdated: Vec::new(),
            rotation_outdated: Vec::new(),
            scale_outdated: Vec::new(),
            interp_translations: Vec::new(),
            interp_rotations: Vec::new(),
            interp_scales: Vec::new(),
        };
        ctx.resize(max_tracks);
        ctx
    }

    /// Reallocates the context for a new maximum track count, discarding
    /// all cached keyframe state. Internal buffers are sized to a whole
    /// number of SoA groups of 4, so `max_tracks()` reports the rounded-up
    /// capacity actually backing them rather than the raw request.
    pub fn resize(&mut self, max_tracks: usize) {
        self.invalidate();
        let num_soa = num_soa_groups(max_tracks);
        let rounded_tracks = num_soa * 4;
        self.max_tracks = rounded_tracks;

        self.translation_cache = vec![0; rounded_tracks * 2];
        self.rotation_cache = vec![0; rounded_tracks * 2];
        self.scale_cache = vec![0; rounded_tracks * 2];

        let num_outdated_bytes = (num_soa + 7) / 8;
        self.translation_outdated = vec![0u8; num_outdated_bytes];
        self.rotation_outdated = vec![0u8; num_outdated_bytes];
        self.scale_outdated = vec![0u8; num_outdated_bytes];

        self.interp_translations = vec![InterpFloat3::default(); rounded_tracks];
        self.interp_rotations = vec![InterpQuaternion::default(); rounded_tracks];
        self.interp_scales = vec![InterpFloat3::default(); rounded_tracks];
    }

    #[inline]
    pub fn max_tracks(&self) -> usize {
        self.max_tracks
    }

    /// Drops all cursor/cache state without changing capacity, forcing the
    /// next `SamplingJob::run` to rebuild from scratch.
    pub fn invalidate(&mut self) {
        self.animation_id = None;
        self.ratio = 0.0;
        self.translation_cursor = 0;
        self.rotation_cursor = 0;
        self.scale_cursor = 0;
    }

    /// Invalidates cursors if the animation identity changed or `ratio`
    /// moved backwards (a scrub/rewind), then records the new ratio.
    fn step(&mut self, animation: &Animation, ratio: f32) {
        let id = animation as *const Animation as usize;
        if self.animation_id != Some(id) || ratio < self.ratio {
            self.animation_id = Some(id);
            self.translation_cursor = 0;
            self.rotation_cursor = 0;
            self.scale_cursor = 0;
        }
        self.ratio = ratio;
    }
}

fn num_soa_groups(num_tracks: usize) -> usize {
    (num_tracks + 3) / 4
}

#[inline]
fn set_bit(bits: &mut [u8], group: usize) {
    bits[group / 8] |= 1 << (group % 8);
}

#[inline]
fn test_and_clear_bit(bits: &mut [u8], group: usize) -> bool {
    let byte = group / 8;
    let mask = 1 << (group % 8);
    let was_set = bits[byte] & mask != 0;
    bits[byte] &= !mask;
    was_set
}

#[inline]
fn mark_all_groups(bits: &mut [u8], num_groups: usize) {
    for group in 0..num_groups {
        set_bit(bits, group);
    }
}

/// Samples a compressed `Animation` at `ratio` into `output`, using `context`
/// to carry cache state between calls.
pub struct SamplingJob<'a> {
    pub animation: &'a Animation,
    pub context: &'a mut Context,
    pub ratio: f32,
    pub output: &'a mut [Transform],
}

impl<'a> SamplingJob<'a> {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.output.is_empty() {
            return Err(ValidationError::OutputEmpty);
        }
        let need = self.animation.num_tracks();
        if self.context.max_tracks() < need {
            return Err(ValidationError::ContextTooSmall {
                have: self.context.max_tracks(),
                need,
            });
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), ValidationError> {
        self.validate().map_err(|e| {
            log::warn!("SamplingJob validation failed: {e}");
            e
        })?;

        let num_tracks = self.animation.num_tracks();
        if num_tracks == 0 {
            return Ok(());
        }

        let ratio = self.ratio.clamp(0.0, 1.0);
        self.context.step(self.animation, ratio);

        update_cache_cursor(
            ratio,
            num_tracks,
            self.animation.translations(),
            &mut self.context.translation_cursor,
            &mut self.context.translation_cache,
            &mut self.context.translation_outdated,
        );
        update_interp_float3(
            num_tracks,
            self.animation.translations(),
            &self.context.translation_cache,
            &mut self.context.translation_outdated,
            &mut self.context.interp_translations,
        );

        update_cache_cursor(
            ratio,
            num_tracks,
            self.animation.rotations(),
            &mut self.context.rotation_cursor,
            &mut self.context.rotation_cache,
            &mut self.context.rotation_outdated,
        );
        update_interp_quaternion(
            num_tracks,
            self.animation.rotations(),
            &self.context.rotation_cache,
            &mut self.context.rotation_outdated,
            &mut self.context.interp_rotations,
        );

        update_cache_cursor(
            ratio,
            num_tracks,
            self.animation.scales(),
            &mut self.context.scale_cursor,
            &mut self.context.scale_cache,
            &mut self.context.scale_outdated,
        );
        update_interp_float3(
            num_tracks,
            self.animation.scales(),
            &self.context.scale_cache,
            &mut self.context.scale_outdated,
            &mut self.context.interp_scales,
        );

        let num_out = self.output.len().min(num_tracks);
        for i in 0..num_out {
            let t = &self.context.interp_translations[i];
            let r = &self.context.interp_rotations[i];
            let s = &self.context.interp_scales[i];

            let translation = Vec3::lerp(t.value[0], t.value[1], unit_ratio(ratio, t.ratio));
            let rotation = Quat::slerp(r.value[0], r.value[1], unit_ratio(ratio, r.ratio));
            let scale = Vec3::lerp(s.value[0], s.value[1], unit_ratio(ratio, s.ratio));

            self.output[i] = Transform::new(translation, rotation, scale);
        }

        Ok(())
    }
}

#[inline]
fn unit_ratio(ratio: f32, bounds: [f32; 2]) -> f32 {
    let span = bounds[1] - bounds[0];
    if span.abs() < f32::EPSILON {
        0.0
    } else {
        (ratio - bounds[0]) / span
    }
}

/// Advances `cursor` through `keys`, refreshing `cache`'s left/right key
/// indices for every track whose bracket is crossed, and flagging each
/// crossed track's group-of-4 as outdated. Mirrors `UpdateCacheCursor`.
fn update_cache_cursor<K: KeyRatioTrack>(
    ratio: f32,
    num_tracks: usize,
    keys: &[K],
    cursor: &mut usize,
    cache: &mut [usize],
    outdated: &mut [u8],
) {
    debug_assert!(keys.len() >= num_tracks * 2);

    let mut c = *cursor;
    if c == 0 {
        // The sort invariant guarantees the first 2*num_tracks keys are the
        // seeding prefix: track i's left key at index i, right key at
        // index i + num_tracks.
        for i in 0..num_tracks {
            cache[i * 2] = i;
            cache[i * 2 + 1] = i + num_tracks;
        }
        c = num_tracks * 2;
        mark_all_groups(outdated, num_soa_groups(num_tracks));
    }

    while c < keys.len() {
        let track = keys[c].track() as usize;
        let right_idx = cache[track * 2 + 1];
        if keys[right_idx].ratio() > ratio {
            break;
        }
        set_bit(outdated, track / 4);
        let base = track * 2;
        cache[base] = cache[base + 1];
        cache[base + 1] = c;
        c += 1;
    }

    *cursor = c;
}

trait KeyRatioTrack {
    fn ratio(&self) -> f32;
    fn track(&self) -> u16;
}

impl KeyRatioTrack for Float3Key {
    fn ratio(&self) -> f32 {
        self.ratio
    }
    fn track(&self) -> u16 {
        self.track
    }
}

impl KeyRatioTrack for QuaternionKey {
    fn ratio(&self) -> f32 {
        self.ratio
    }
    fn track(&self) -> u16 {
        self.track
    }
}

fn update_interp_float3(
    num_tracks: usize,
    keys: &[Float3Key],
    cache: &[usize],
    outdated: &mut [u8],
    interp: &mut [InterpFloat3],
) {
    for group in 0..num_soa_groups(num_tracks) {
        if !test_and_clear_bit(outdated, group) {
            continue;
        }
        let base = group * 4;
        let count = (num_tracks - base).min(4);
        for track in base..base + count {
            let left = keys[cache[track * 2]];
            let right = keys[cache[track * 2 + 1]];
            interp[track] = InterpFloat3 {
                ratio: [left.ratio, right.ratio],
                value: [decode_half3(left.value), decode_half3(right.value)],
            };
        }
    }
}

fn update_interp_quaternion(
    num_tracks: usize,
    keys: &[QuaternionKey],
    cache: &[usize],
    outdated: &mut [u8],
    interp: &mut [InterpQuaternion],
) {
    for group in 0..num_soa_groups(num_tracks) {
        if !test_and_clear_bit(outdated, group) {
            continue;
        }
        let base = group * 4;
        let count = (num_tracks - base).min(4);
        for track in base..base + count {
            let left = keys[cache[track * 2]];
            let right = keys[cache[track * 2 + 1]];
            interp[track] = InterpQuaternion {
                ratio: [left.ratio, right.ratio],
                value: [
                    decode_quaternion(left.largest, left.sign, left.value),
                    decode_quaternion(right.largest, right.sign, right.value),
                ],
            };
        }
    }
}
