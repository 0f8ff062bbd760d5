//! `SkinningJob`: linear-blend skinning over arbitrary strided vertex
//! buffers. Deliberately independent of `Mesh` — it reads and writes raw
//! byte spans with caller-chosen strides, the same contract the reference
//! implementation exposes, so it can be driven directly against interleaved
//! GPU vertex buffers.
//!
//! Grounded on `SkinningJob.cpp`/`.h`. The header documents
//! `joint_inverse_transpose_matrices` as the matrices normals/tangents
//! should use, but the reference `Skinning()` function never reads that
//! field — it reuses `joint_matrices` for everything. This implementation
//! honors the documented contract: normals and tangents use the inverse-
//! transpose palette when one is supplied.

use crate::error::ValidationError;
use glam::{Mat4, Vec3};

pub struct SkinningJob<'a> {
    pub vertex_count: usize,
    pub influences_count: usize,

    pub joint_matrices: &'a [Mat4],
    /// Optional, palette-aligned with `joint_matrices`. Empty falls back
    /// to `joint_matrices` for normal/tangent transforms.
    pub joint_inverse_transpose_matrices: &'a [Mat4],

    pub joint_indices: &'a [u8],
    pub joint_indices_stride: usize,
    /// Empty iff `influences_count == 1`.
    pub joint_weights: &'a [u8],
    pub joint_weights_stride: usize,

    pub in_positions: &'a [u8],
    pub in_positions_stride: usize,
    pub in_normals: &'a [u8],
    pub in_normals_stride: usize,
    pub in_tangents: &'a [u8],
    pub in_tangents_stride: usize,

    pub out_positions: &'a mut [u8],
    pub out_positions_stride: usize,
    pub out_normals: &'a mut [u8],
    pub out_normals_stride: usize,
    pub out_tangents: &'a mut [u8],
    pub out_tangents_stride: usize,
}

const F32_SIZE: usize = std::mem::size_of::<f32>();
const U16_SIZE: usize = std::mem::size_of::<u16>();
const VEC3_BYTES: usize = F32_SIZE * 3;

impl<'a> SkinningJob<'a> {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.influences_count == 0 {
            return Err(ValidationError::NoInfluences);
        }
        if self.joint_matrices.is_empty() {
            return Err(ValidationError::PaletteEmpty);
        }

        let vcm1 = self.vertex_count.saturating_sub(1);
        let vc1 = usize::from(self.vertex_count > 0);

        check_buffer(
            "joint_indices",
            self.joint_indices.len(),
            self.joint_indices_stride * vcm1 + U16_SIZE * self.influences_count * vc1,
        )?;

        if self.influences_count != 1 {
            check_buffer(
                "joint_weights",
                self.joint_weights.len(),
                self.joint_weights_stride * vcm1 + F32_SIZE * (self.influences_count - 1) * vc1,
            )?;
        }

        check_buffer(
            "in_positions",
            self.in_positions.len(),
            self.in_positions_stride * vcm1 + VEC3_BYTES * vc1,
        )?;
        if self.out_positions.is_empty() {
            return Err(ValidationError::OutputEmpty);
        }
        check_buffer(
            "out_positions",
            self.out_positions.len(),
            self.out_positions_stride * vcm1 + VEC3_BYTES * vc1,
        )?;

        if !self.in_normals.is_empty() {
            check_buffer(
                "in_normals",
                self.in_normals.len(),
                self.in_normals_stride * vcm1 + VEC3_BYTES * vc1,
            )?;
            if self.out_normals.is_empty() {
                return Err(ValidationError::OutputEmpty);
            }
            check_buffer(
                "out_normals",
                self.out_normals.len(),
                self.out_normals_stride * vcm1 + VEC3_BYTES * vc1,
            )?;

            if !self.in_tangents.is_empty() {
                check_buffer(
                    "in_tangents",
                    self.in_tangents.len(),
                    self.in_tangents_stride * vcm1 + VEC3_BYTES * vc1,
                )?;
                if self.out_tangents.is_empty() {
                    return Err(ValidationError::OutputEmpty);
                }
                check_buffer(
                    "out_tangents",
                    self.out_tangents.len(),
                    self.out_tangents_stride * vcm1 + VEC3_BYTES * vc1,
                )?;
            }
        } else if !self.in_tangents.is_empty() {
            return Err(ValidationError::TangentsWithoutNormals);
        }

        Ok(())
    }

    pub fn run(&mut self) -> Result<(), ValidationError> {
        self.validate().map_err(|e| {
            log::warn!("SkinningJob validation failed: {e}");
            e
        })?;

        if self.vertex_count == 0 {
            return Ok(());
        }

        let has_normals = !self.in_normals.is_empty();
        let has_tangents = !self.in_tangents.is_empty();
        let last = self.influences_count - 1;

        for v in 0..self.vertex_count {
            let position = read_vec3(self.in_positions, v * self.in_positions_stride);
            let normal = has_normals.then(|| read_vec3(self.in_normals, v * self.in_normals_stride));
            let tangent = has_tangents.then(|| read_vec3(self.in_tangents, v * self.in_tangents_stride));

            let mut out_p = Vec3::ZERO;
            let mut out_n = Vec3::ZERO;
            let mut out_t = Vec3::ZERO;
            let mut total_weight = 0.0f32;

            for j in 0..self.influences_count {
                let weight = if j == last {
                    1.0 - total_weight
                } else {
                    let w = read_f32(
                        self.joint_weights,
                        v * self.joint_weights_stride + j * F32_SIZE,
                    );
                    total_weight += w;
                    w
                };

                let joint = read_u16(
                    self.joint_indices,
                    v * self.joint_indices_stride + j * U16_SIZE,
                ) as usize;
                let m = self.joint_matrices[joint];

                out_p += m.transform_point3(position) * weight;

                if let Some(n) = normal {
                    let nm = self
                        .joint_inverse_transpose_matrices
                        .get(joint)
                        .copied()
                        .unwrap_or(m);
                    out_n += nm.transform_vector3(n) * weight;
                    if let Some(t) = tangent {
                        out_t += nm.transform_vector3(t) * weight;
                    }
                }
            }

            write_vec3(self.out_positions, v * self.out_positions_stride, out_p);
            if has_normals {
                write_vec3(self.out_normals, v * self.out_normals_stride, out_n);
            }
            if has_tangents {
                write_vec3(self.out_tangents, v * self.out_tangents_stride, out_t);
            }
        }

        Ok(())
    }
}

fn check_buffer(name: &'static str, have: usize, need: usize) -> Result<(), ValidationError> {
    if have < need {
        Err(ValidationError::BufferTooSmall {
            buffer: name,
            have,
            need,
        })
    } else {
        Ok(())
    }
}

fn read_vec3(buf: &[u8], offset: usize) -> Vec3 {
    Vec3::new(
        read_f32(buf, offset),
        read_f32(buf, offset + F32_SIZE),
        read_f32(buf, offset + 2 * F32_SIZE),
    )
}

fn write_vec3(buf: &mut [u8], offset: usize, v: Vec3) {
    buf[offset..offset + F32_SIZE].copy_from_slice(&v.x.to_le_bytes());
    buf[offset + F32_SIZE..offset + 2 * F32_SIZE].copy_from_slice(&v.y.to_le_bytes());
    buf[offset + 2 * F32_SIZE..offset + 3 * F32_SIZE].copy_from_slice(&v.z.to_le_bytes());
}

fn read_f32(buf: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes(buf[offset..offset + F32_SIZE].try_into().unwrap())
}

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(buf[offset..offset + U16_SIZE].try_into().unwrap())
}
