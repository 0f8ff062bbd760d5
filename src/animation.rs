//! Compressed animation clip storage: triple-SoA keyframe arrays, globally
//! sorted by time-ratio after a per-track seeding prefix, so
//! `SamplingJob`'s cursor can sweep them once per playthrough.

use crate::math::{decode_half3, encode_half3, encode_quaternion};
use crate::raw_animation::RawAnimation;
use glam::Vec3;

/// A translation or scale keyframe: ratio + track index + half-precision
/// value. `value` is the raw IEEE binary16 bit pattern of each component,
/// decoded on demand by `SamplingJob` (see `math::decode_half3`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Float3Key {
    pub ratio: f32,
    pub track: u16,
    pub value: [u16; 3],
}

/// A rotation keyframe: the quaternion's three smallest components,
/// quantized to signed 16-bit and scaled by √2; the largest component and
/// its sign are reconstructed at decode time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuaternionKey {
    pub ratio: f32,
    /// 13-bit track index (0..=8191).
    pub track: u16,
    /// Index (0..=3) of the omitted/reconstructed component.
    pub largest: u8,
    /// Sign of the reconstructed component.
    pub sign: bool,
    pub value: [i16; 3],
}

/// A compressed animation clip. Borrowed (never owned) by `SamplingJob`.
#[derive(Debug, Clone, Default)]
pub struct Animation {
    duration: f32,
    num_tracks: u16,
    name: String,
    translations: Vec<Float3Key>,
    rotations: Vec<QuaternionKey>,
    scales: Vec<Float3Key>,
}

impl Animation {
    pub(crate) fn from_parts(
        duration: f32,
        num_tracks: u16,
        name: String,
        translations: Vec<Float3Key>,
        rotations: Vec<QuaternionKey>,
        scales: Vec<Float3Key>,
    ) -> Self {
        Self {
            duration,
            num_tracks,
            name,
            translations,
            rotations,
            scales,
        }
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn num_tracks(&self) -> usize {
        self.num_tracks as usize
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn translations(&self) -> &[Float3Key] {
        &self.translations
    }

    #[inline]
    pub fn rotations(&self) -> &[QuaternionKey] {
        &self.rotations
    }

    #[inline]
    pub fn scales(&self) -> &[Float3Key] {
        &self.scales
    }

    /// Estimated resident size in bytes, mirroring the reference
    /// implementation's `Animation::size()` (useful for budget logging).
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Float3Key>() * (self.translations.len() + self.scales.len())
            + std::mem::size_of::<QuaternionKey>() * self.rotations.len()
            + self.name.len()
    }

    /// Builds a compressed `Animation` from an already-decided set of
    /// per-track keyframes (time + value pairs in seconds), applying the
    /// quantization and keyframe-ordering invariant this module's wire
    /// layout depends on.
    ///
    /// This is *not* the offline asset bakery: it does not decide which
    /// keyframes to keep or discard (that optimization is out of scope
    /// here). It only encodes and orders keys the caller has already
    /// chosen — the same role `LoadAnimation` plays for bytes loaded from
    /// disk, but for clips assembled in memory (tests, or a host that
    /// bakes its own clips upstream of this crate).
    ///
    /// Every track must contribute at least two keys per channel (one at
    /// `ratio = 0` and one after), matching the seeding-prefix invariant;
    /// tracks may be empty only if the whole channel is empty across all
    /// tracks (no keys to seed).
    pub fn from_tracks(
        duration: f32,
        translation_tracks: &[Vec<(f32, Vec3)>],
        rotation_tracks: &[Vec<(f32, glam::Quat)>],
        scale_tracks: &[Vec<(f32, Vec3)>],
    ) -> Self {
        let num_tracks = translation_tracks
            .len()
            .max(rotation_tracks.len())
            .max(scale_tracks.len());

        let translations = order_float3(duration, translation_tracks, encode_half3);
        let scales = order_float3(duration, scale_tracks, encode_half3);
        let rotations = order_quaternion(duration, rotation_tracks);

        Self::from_parts(
            duration,
            num_tracks as u16,
            String::new(),
            translations,
            rotations,
            scales,
        )
    }

    /// Builds a degenerate but valid compressed clip directly from a
    /// `RawAnimation`'s rest-adjacent keys, for tests that want parity
    /// fixtures without hand-writing SoA arrays. Only meaningful for raw
    /// clips whose tracks already have >= 2 keys per non-empty channel.
    pub fn from_raw(raw: &RawAnimation) -> Self {
        let translation_tracks: Vec<Vec<(f32, Vec3)>> = raw
            .tracks
            .iter()
            .map(|t| t.translations.iter().map(|k| (k.time, k.value)).collect())
            .collect();
        let rotation_tracks: Vec<Vec<(f32, glam::Quat)>> = raw
            .tracks
            .iter()
            .map(|t| t.rotations.iter().map(|k| (k.time, k.value)).collect())
            .collect();
        let scale_tracks: Vec<Vec<(f32, Vec3)>> = raw
            .tracks
            .iter()
            .map(|t| t.scales.iter().map(|k| (k.time, k.value)).collect())
            .collect();

        let mut anim = Self::from_tracks(
            raw.duration,
            &translation_tracks,
            &rotation_tracks,
            &scale_tracks,
        );
        anim.name = raw.name.clone();
        anim
    }
}

fn order_float3(
    duration: f32,
    tracks: &[Vec<(f32, Vec3)>],
    encode: impl Fn(Vec3) -> [u16; 3],
) -> Vec<Float3Key> {
    if tracks.is_empty() {
        return Vec::new();
    }
    let num_tracks = tracks.len();
    let mut prefix = Vec::with_capacity(num_tracks * 2);
    let mut rest = Vec::new();

    for (t, keys) in tracks.iter().enumerate() {
        debug_assert!(keys.len() >= 2, "track {t} needs at least 2 keys to seed");
        prefix.push((t, keys[0]));
        for &(time, value) in &keys[2..] {
            rest.push(Float3Key {
                ratio: (time / duration).clamp(0.0, 1.0),
                track: t as u16,
                value: encode(value),
            });
        }
    }

    // Lefts (position 0 of each track) then rights (position 1), per the
    // seeding-prefix layout.
    let mut out = Vec::with_capacity(num_tracks * 2 + rest.len());
    for (t, (time, value)) in &prefix {
        out.push(Float3Key {
            ratio: (time / duration).clamp(0.0, 1.0),
            track: *t as u16,
            value: encode(*value),
        });
    }
    for (t, keys) in tracks.iter().enumerate() {
        let (time, value) = keys[1];
        out.push(Float3Key {
            ratio: (time / duration).clamp(0.0, 1.0),
            track: t as u16,
            value: encode(value),
        });
    }
    rest.sort_by(|a, b| a.ratio.partial_cmp(&b.ratio).unwrap());
    out.extend(rest);
    out
}

fn order_quaternion(duration: f32, tracks: &[Vec<(f32, glam::Quat)>]) -> Vec<QuaternionKey> {
    if tracks.is_empty() {
        return Vec::new();
    }
    let num_tracks = tracks.len();
    let mut out = Vec::with_capacity(num_tracks * 2);
    let mut rest = Vec::new();

    let to_key = |t: usize, time: f32, value: glam::Quat| {
        let (largest, sign, value) = encode_quaternion(value);
        QuaternionKey {
            ratio: (time / duration).clamp(0.0, 1.0),
            track: t as u16,
            largest,
            sign,
            value,
        }
    };

    for (t, keys) in tracks.iter().enumerate() {
        debug_assert!(keys.len() >= 2, "track {t} needs at least 2 keys to seed");
        out.push(to_key(t, keys[0].0, keys[0].1));
    }
    for (t, keys) in tracks.iter().enumerate() {
        out.push(to_key(t, keys[1].0, keys[1].1));
    }
    for (t, keys) in tracks.iter().enumerate() {
        for &(time, value) in &keys[2..] {
            rest.push(to_key(t, time, value));
        }
    }

    rest.sort_by(|a, b| a.ratio.partial_cmp(&b.ratio).unwrap());
    out.extend(rest);
    out
}

/// Decodes a `Float3Key`'s half-precision value to `f32`.
pub fn decode_float3_key(key: &Float3Key) -> Vec3 {
    decode_half3(key.value)
}
