//! `Animation` (compressed) and `RawAnimation` byte formats.

use crate::animation::{Animation, Float3Key, QuaternionKey};
use crate::error::AssetFormatError;
use crate::formats::reader::{check_count, ByteReader};
use crate::raw_animation::{JointTrack, RawAnimation, RotationKey, ScaleKey, TranslationKey};
use glam::{Quat, Vec3};

const ANIM_TAG: &str = "ozz-animation";
const ANIM_VERSION: u32 = 6;
const RAW_ANIM_TAG: &str = "ozz-raw_animation";
const RAW_ANIM_VERSION: u32 = 3;

const MAX_KEYS: u32 = 1 << 24;

/// Loads a compressed `Animation`. The on-disk keyframe arrays are already
/// in the §3 ordering (seeding prefix + ratio-sorted tail, per track); the
/// loader trusts that invariant rather than re-deriving it.
pub fn load_animation(bytes: &[u8]) -> Result<Animation, AssetFormatError> {
    let mut r = ByteReader::new(bytes);
    r.read_endianness()?;
    r.read_tag(ANIM_TAG)?;
    r.read_version("animation", ANIM_VERSION)?;

    let duration = r.read_f32("duration")?;
    let num_tracks = r.read_i32("num_tracks")?.max(0) as u32;
    check_count("num_tracks", num_tracks, 1 << 16)?;
    let name_len = r.read_i32("name_len")?.max(0) as u32;
    check_count("name_len", name_len, 1 << 20)?;

    let num_translations = r.read_i32("translation count")?.max(0) as u32;
    let num_rotations = r.read_i32("rotation count")?.max(0) as u32;
    let num_scales = r.read_i32("scale count")?.max(0) as u32;
    check_count("translation keys", num_translations, MAX_KEYS)?;
    check_count("rotation keys", num_rotations, MAX_KEYS)?;
    check_count("scale keys", num_scales, MAX_KEYS)?;

    let name_bytes = r.read_bytes(name_len as usize, "name")?;
    let name = String::from_utf8(name_bytes.to_vec()).map_err(|_| AssetFormatError::InvalidUtf8)?;

    let mut translations = Vec::with_capacity(num_translations as usize);
    for _ in 0..num_translations {
        translations.push(read_float3_key(&mut r)?);
    }
    let mut rotations = Vec::with_capacity(num_rotations as usize);
    for _ in 0..num_rotations {
        rotations.push(read_quaternion_key(&mut r)?);
    }
    let mut scales = Vec::with_capacity(num_scales as usize);
    for _ in 0..num_scales {
        scales.push(read_float3_key(&mut r)?);
    }

    Ok(Animation::from_parts(
        duration,
        num_tracks as u16,
        name,
        translations,
        rotations,
        scales,
    ))
}

fn read_float3_key(r: &mut ByteReader) -> Result<Float3Key, AssetFormatError> {
    let ratio = r.read_f32("key ratio")?;
    let track = r.read_u16("key track")?;
    let value = [
        r.read_u16("key value")?,
        r.read_u16("key value")?,
        r.read_u16("key value")?,
    ];
    Ok(Float3Key { ratio, track, value })
}

fn read_quaternion_key(r: &mut ByteReader) -> Result<QuaternionKey, AssetFormatError> {
    let ratio = r.read_f32("key ratio")?;
    let track = r.read_u16("key track")?;
    let largest = r.read_u8("key largest")?;
    let sign = r.read_u8("key sign")? != 0;
    let value = [
        r.read_i16("key value")?,
        r.read_i16("key value")?,
        r.read_i16("key value")?,
    ];
    Ok(QuaternionKey {
        ratio,
        track,
        largest,
        sign,
        value,
    })
}

/// Loads an uncompressed `RawAnimation`.
pub fn load_raw_animation(bytes: &[u8]) -> Result<RawAnimation, AssetFormatError> {
    let mut r = ByteReader::new(bytes);
    r.read_endianness()?;
    r.read_tag(RAW_ANIM_TAG)?;
    r.read_version("raw animation", RAW_ANIM_VERSION)?;

    let duration = r.read_f32("duration")?;
    let num_tracks = r.read_u32("num_tracks")?;
    check_count("num_tracks", num_tracks, 1 << 16)?;
    r.read_version("track", 1)?;

    let mut tracks = Vec::with_capacity(num_tracks as usize);
    for _ in 0..num_tracks {
        tracks.push(read_joint_track(&mut r)?);
    }

    let name_len = r.read_u32("name_len")?;
    check_count("name_len", name_len, 1 << 20)?;
    let name_bytes = r.read_bytes(name_len as usize, "name")?;
    let name = String::from_utf8(name_bytes.to_vec()).map_err(|_| AssetFormatError::InvalidUtf8)?;

    Ok(RawAnimation {
        duration,
        tracks,
        name,
    })
}

fn read_joint_track(r: &mut ByteReader) -> Result<JointTrack, AssetFormatError> {
    let num_trans = r.read_u32("translation key count")?;
    check_count("translation keys", num_trans, MAX_KEYS)?;
    r.read_version("translation key", 1)?;
    let mut translations = Vec::with_capacity(num_trans as usize);
    for _ in 0..num_trans {
        let time = r.read_f32("translation key time")?;
        let value = read_vec3(r, "translation key value")?;
        translations.push(TranslationKey { time, value });
    }

    let num_rot = r.read_u32("rotation key count")?;
    check_count("rotation keys", num_rot, MAX_KEYS)?;
    r.read_version("rotation key", 1)?;
    let mut rotations = Vec::with_capacity(num_rot as usize);
    for _ in 0..num_rot {
        let time = r.read_f32("rotation key time")?;
        let value = read_quat(r)?;
        rotations.push(RotationKey { time, value });
    }

    let num_scale = r.read_u32("scale key count")?;
    check_count("scale keys", num_scale, MAX_KEYS)?;
    r.read_version("scale key", 1)?;
    let mut scales = Vec::with_capacity(num_scale as usize);
    for _ in 0..num_scale {
        let time = r.read_f32("scale key time")?;
        let value = read_vec3(r, "scale key value")?;
        scales.push(ScaleKey { time, value });
    }

    Ok(JointTrack {
        translations,
        rotations,
        scales,
    })
}

fn read_vec3(r: &mut ByteReader, context: &'static str) -> Result<Vec3, AssetFormatError> {
    Ok(Vec3::new(
        r.read_f32(context)?,
        r.read_f32(context)?,
        r.read_f32(context)?,
    ))
}

fn read_quat(r: &mut ByteReader) -> Result<Quat, AssetFormatError> {
    Ok(Quat::from_xyzw(
        r.read_f32("rotation key value")?,
        r.read_f32("rotation key value")?,
        r.read_f32("rotation key value")?,
        r.read_f32("rotation key value")?,
    ))
}
