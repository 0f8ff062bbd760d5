//! The TRS local transform shared by rest poses, sampled poses, and blend
//! layers.

use glam::{Mat4, Quat, Vec3};

/// A local-space translation/rotation/scale triple. This is the unit every
/// job in this crate reads and writes in local space; `LocalToModelJob`
/// converts a buffer of these into model-space `Mat4`s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Builds the local 4x4 matrix for this transform: scale, then
    /// translate, then rotate (row-vector order scale→translate→rotate).
    /// Note this is NOT the same order as
    /// `glam::Mat4::from_scale_rotation_translation` (which rotates before
    /// translating) — a joint's own rotation here also turns its offset
    /// from its parent.
    pub fn to_matrix(self) -> Mat4 {
        Mat4::from_quat(self.rotation)
            * Mat4::from_translation(self.translation)
            * Mat4::from_scale(self.scale)
    }

    /// `lerp` on translation/scale, shortest-path `slerp` on rotation —
    /// the `Blend(a, b, t)` helper.
    pub fn blend(a: Transform, b: Transform, t: f32) -> Transform {
        Transform {
            translation: a.translation.lerp(b.translation, t),
            rotation: a.rotation.slerp(b.rotation, t),
            scale: a.scale.lerp(b.scale, t),
        }
    }
}
