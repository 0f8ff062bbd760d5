//! Skinned mesh asset data: planar per-part vertex
//! attributes plus shared triangle indices, joint remap table, and inverse
//! bind poses. This is the asset-level, SoA-planar representation; the
//! generic strided-buffer interface `SkinningJob` actually consumes is
//! deliberately decoupled from it (a caller reads `Part`'s planar arrays
//! into whatever interleaved buffer layout its renderer wants).

use crate::error::ValidationError;
use glam::Mat4;

/// One drawable piece of a mesh: its own vertex attributes and skinning
/// influences, sharing the mesh's `triangle_indices`/`joint_remaps`.
#[derive(Debug, Clone, Default)]
pub struct Part {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tangents: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<[u8; 4]>,
    /// `influences_count` indices per vertex, flattened.
    pub joint_indices: Vec<u16>,
    /// `influences_count - 1` weights per vertex, flattened; the last
    /// influence's weight is reconstructed as `1 - sum(others)`.
    pub joint_weights: Vec<f32>,
}

impl Part {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// `joint_indices.len() / vertex_count`, or 0 for an empty part.
    pub fn influences_count(&self) -> usize {
        let vc = self.vertex_count();
        if vc == 0 {
            0
        } else {
            self.joint_indices.len() / vc
        }
    }

    /// `joint_weights.len == vertex_count * (influences_count - 1)`,
    /// tangents require normals.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let vc = self.vertex_count();
        let influences = self.influences_count();
        if influences == 0 {
            return Err(ValidationError::NoInfluences);
        }
        let expected_weights = vc * (influences - 1);
        if self.joint_weights.len() != expected_weights {
            return Err(ValidationError::JointWeightsTooShort {
                have: self.joint_weights.len(),
                need: expected_weights,
            });
        }
        if !self.tangents.is_empty() && self.normals.is_empty() {
            return Err(ValidationError::TangentsWithoutNormals);
        }
        Ok(())
    }
}

/// A skinned mesh: one or more `Part`s sharing a joint remap table and
/// inverse bind pose array.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub parts: Vec<Part>,
    pub triangle_indices: Vec<u16>,
    /// Mesh-local joint index → skeleton joint index.
    pub joint_remaps: Vec<u16>,
    /// Aligned with `joint_remaps`: the inverse of each remapped joint's
    /// bind-pose model-space matrix.
    pub inverse_bind_poses: Vec<Mat4>,
}

impl Mesh {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.inverse_bind_poses.len() != self.joint_remaps.len() {
            return Err(ValidationError::BufferTooSmall {
                buffer: "inverse_bind_poses",
                have: self.inverse_bind_poses.len(),
                need: self.joint_remaps.len(),
            });
        }
        for part in &self.parts {
            part.validate()?;
        }
        Ok(())
    }

    /// Builds the joint-matrix palette `SkinningJob` expects: for each
    /// mesh-local joint `k`, `inverse_bind_poses[k] * model_space[joint_remaps[k]]`.
    pub fn joint_matrix_palette(&self, model_space: &[Mat4]) -> Vec<Mat4> {
        self.joint_remaps
            .iter()
            .zip(&self.inverse_bind_poses)
            .map(|(&skeleton_joint, inverse_bind)| {
                model_space[skeleton_joint as usize] * *inverse_bind
            })
            .collect()
    }

    /// `joint_matrix_palette` as raw bytes, ready for a GPU uniform/storage
    /// buffer upload with no extra copy: `glam::Mat4` implements
    /// `bytemuck::Pod`/`Zeroable` via this crate's `glam/bytemuck` feature.
    pub fn joint_matrix_palette_bytes(&self, model_space: &[Mat4]) -> Vec<u8> {
        bytemuck::cast_slice(&self.joint_matrix_palette(model_space)).to_vec()
    }
}
