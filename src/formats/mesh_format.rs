//! `Mesh` byte format: a file is a sequence of meshes packed back-to-back
//! until EOF, each with one or more parts.

use crate::error::AssetFormatError;
use crate::formats::reader::{check_count, ByteReader};
use crate::mesh::{Mesh, Part};
use glam::Mat4;

const TAG: &str = "ozz-sample-Mesh";
const VERSION: u32 = 1;

const MAX_VERTICES: u32 = 1 << 24;
const MAX_INDICES: u32 = 1 << 26;

pub fn load_meshes(bytes: &[u8]) -> Result<Vec<Mesh>, AssetFormatError> {
    let mut r = ByteReader::new(bytes);
    r.read_endianness()?;
    r.read_tag(TAG)?;
    r.read_version("mesh", VERSION)?;

    let mut meshes = Vec::new();
    while !r.is_empty() {
        meshes.push(read_mesh(&mut r)?);
    }
    Ok(meshes)
}

fn read_mesh(r: &mut ByteReader) -> Result<Mesh, AssetFormatError> {
    let num_parts = r.read_u32("num_parts")?;
    check_count("num_parts", num_parts, 1 << 16)?;
    r.read_version("part", 1)?;

    let mut parts = Vec::with_capacity(num_parts as usize);
    for _ in 0..num_parts {
        parts.push(read_part(r)?);
    }

    let triangle_indices = read_array(r, "triangle_indices", MAX_INDICES, |r| r.read_u16("triangle index"))?;
    let joint_remaps = read_array(r, "joint_remaps", 1 << 16, |r| r.read_u16("joint remap"))?;
    let inverse_bind_poses = read_array(r, "inverse_bind_poses", 1 << 16, read_mat4)?;

    Ok(Mesh {
        parts,
        triangle_indices,
        joint_remaps,
        inverse_bind_poses,
    })
}

fn read_part(r: &mut ByteReader) -> Result<Part, AssetFormatError> {
    let positions = read_array(r, "positions", MAX_VERTICES, |r| read_f32x3(r, "position"))?;
    let normals = read_array(r, "normals", MAX_VERTICES, |r| read_f32x3(r, "normal"))?;
    let tangents = read_array(r, "tangents", MAX_VERTICES, |r| read_f32x3(r, "tangent"))?;
    let uvs = read_array(r, "uvs", MAX_VERTICES, |r| {
        Ok([r.read_f32("uv")?, r.read_f32("uv")?])
    })?;
    let colors = read_array(r, "colors", MAX_VERTICES, |r| {
        Ok([
            r.read_u8("color")?,
            r.read_u8("color")?,
            r.read_u8("color")?,
            r.read_u8("color")?,
        ])
    })?;
    let joint_indices = read_array(r, "joint_indices", MAX_VERTICES * 16, |r| r.read_u16("joint index"))?;
    let joint_weights = read_array(r, "joint_weights", MAX_VERTICES * 16, |r| r.read_f32("joint weight"))?;

    Ok(Part {
        positions,
        normals,
        tangents,
        uvs,
        colors,
        joint_indices,
        joint_weights,
    })
}

fn read_array<T>(
    r: &mut ByteReader,
    what: &'static str,
    max: u32,
    mut read_one: impl FnMut(&mut ByteReader) -> Result<T, AssetFormatError>,
) -> Result<Vec<T>, AssetFormatError> {
    let count = r.read_u32(what)?;
    check_count(what, count, max)?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        out.push(read_one(r)?);
    }
    Ok(out)
}

fn read_f32x3(r: &mut ByteReader, context: &'static str) -> Result<[f32; 3], AssetFormatError> {
    Ok([r.read_f32(context)?, r.read_f32(context)?, r.read_f32(context)?])
}

/// 16 floats, row-major on the wire; `glam::Mat4` is column-major
/// internally, so the raw read is transposed after loading.
fn read_mat4(r: &mut ByteReader) -> Result<Mat4, AssetFormatError> {
    let mut rows = [0.0f32; 16];
    for v in &mut rows {
        *v = r.read_f32("inverse bind matrix")?;
    }
    Ok(Mat4::from_cols_array(&rows).transpose())
}
