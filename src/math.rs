//! Math kernel glue.
//!
//! `glam` supplies `Vec3`, `Quat`, `Mat3`, `Mat4` and their lerp/slerp/matrix
//! algebra; this module only adds the pieces `glam` doesn't: IEEE binary16
//! conversion (via `half`) and the quantized-quaternion codec.

use half::f16;
use glam::{Quat, Vec3};

/// sqrt(2), used to scale the three smallest quaternion components before
/// quantizing them to signed 16-bit integers.
pub const SQRT_2: f32 = std::f32::consts::SQRT_2;

/// Decodes a half-precision (IEEE 754 binary16) triple into an `f32` `Vec3`.
/// Round-to-nearest-even, as `half::f16` implements.
pub fn decode_half3(bits: [u16; 3]) -> Vec3 {
    Vec3::new(
        f16::from_bits(bits[0]).to_f32(),
        f16::from_bits(bits[1]).to_f32(),
        f16::from_bits(bits[2]).to_f32(),
    )
}

/// Encodes an `f32` `Vec3` to IEEE binary16, round-to-nearest-even.
pub fn encode_half3(v: Vec3) -> [u16; 3] {
    [
        f16::from_f32(v.x).to_bits(),
        f16::from_f32(v.y).to_bits(),
        f16::from_f32(v.z).to_bits(),
    ]
}

/// For each `largest` tag (0..=3), maps each of the four quaternion slots to
/// the stored-value index (0..=2) that fills it, skipping the slot at
/// `largest` itself (it's reconstructed, not read from `value`). Mirrors the
/// reference implementation's `kCpntMapping` table.
const COMPONENT_MAPPING: [[usize; 4]; 4] = [
    [0, 0, 1, 2],
    [0, 0, 1, 2],
    [0, 1, 0, 2],
    [0, 1, 2, 0],
];

/// Reconstructs a unit quaternion from its three smallest quantized
/// components. `largest` is the index (0=x,1=y,2=z,3=w) of the component
/// that was dropped; `sign` negates the reconstructed component.
///
/// The radicand `1 - Σvᵢ²` is clamped to zero before the square root:
/// quantization error can otherwise push it slightly negative and produce a
/// NaN.
pub fn decode_quaternion(largest: u8, sign: bool, value: [i16; 3]) -> Quat {
    debug_assert!(largest < 4);
    let mapping = COMPONENT_MAPPING[largest as usize];
    let int_to_float = 1.0 / (32767.0 * SQRT_2);

    let mut cpnt = [0f32; 4];
    for i in 0..4 {
        cpnt[i] = int_to_float * value[mapping[i]] as f32;
    }
    cpnt[largest as usize] = 0.0;

    let dot = cpnt[0] * cpnt[0] + cpnt[1] * cpnt[1] + cpnt[2] * cpnt[2] + cpnt[3] * cpnt[3];
    let radicand = (1.0 - dot).max(0.0);
    let w = radicand.sqrt();
    cpnt[largest as usize] = if sign { -w } else { w };

    Quat::from_xyzw(cpnt[0], cpnt[1], cpnt[2], cpnt[3])
}

/// Quantizes a unit quaternion into the three-smallest-components + sign +
/// largest-index representation `decode_quaternion` reverses. Used by
/// `Animation::from_tracks` (test/fixture construction, see `animation.rs`)
/// and available to callers building their own clips in memory.
pub fn encode_quaternion(q: Quat) -> (u8, bool, [i16; 3]) {
    let q = q.normalize();
    let cpnt = [q.x, q.y, q.z, q.w];

    let mut largest = 0usize;
    let mut largest_abs = cpnt[0].abs();
    for i in 1..4 {
        if cpnt[i].abs() > largest_abs {
            largest_abs = cpnt[i].abs();
            largest = i;
        }
    }

    let sign = cpnt[largest] < 0.0;
    let mut value = [0i16; 3];
    let stored: Vec<usize> = (0..4).filter(|&i| i != largest).collect();
    for (i, &src) in stored.iter().enumerate() {
        value[i] = (cpnt[src] * 32767.0 * SQRT_2)
            .round()
            .clamp(-32767.0, 32767.0) as i16;
    }

    (largest as u8, sign, value)
}

/// Clamps `r` to the unit interval, matching the ratio-clamping every job
/// performs before sampling.
#[inline]
pub fn clamp_unit(r: f32) -> f32 {
    r.clamp(0.0, 1.0)
}
