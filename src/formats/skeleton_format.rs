//! `Skeleton` byte format: a recursive, depth-first joint tree, flattened
//! to the parent-index arrays `Skeleton::new` expects.

use crate::error::AssetFormatError;
use crate::formats::reader::{check_count, ByteReader};
use crate::skeleton::{Skeleton, MAX_JOINTS, NO_PARENT};
use crate::transform::Transform;
use glam::{Quat, Vec3};

const TAG: &str = "ozz-raw_skeleton";
const VERSION: u32 = 1;

pub fn load_skeleton(bytes: &[u8]) -> Result<Skeleton, AssetFormatError> {
    let mut r = ByteReader::new(bytes);
    r.read_endianness()?;
    r.read_tag(TAG)?;
    r.read_version("skeleton", VERSION)?;

    let num_roots = r.read_u32("num_roots")?;
    check_count("num_roots", num_roots, MAX_JOINTS as u32)?;
    r.read_version("joint", 1)?;

    let mut parents = Vec::new();
    let mut names = Vec::new();
    let mut rest_poses = Vec::new();

    for _ in 0..num_roots {
        read_joint(&mut r, NO_PARENT, &mut parents, &mut names, &mut rest_poses)?;
    }

    Ok(Skeleton::new(parents, names, rest_poses))
}

fn read_joint(
    r: &mut ByteReader,
    parent: i16,
    parents: &mut Vec<i16>,
    names: &mut Vec<String>,
    rest_poses: &mut Vec<Transform>,
) -> Result<(), AssetFormatError> {
    check_count("joint", parents.len() as u32 + 1, MAX_JOINTS as u32)?;

    let name = r.read_string("joint name", "joint name length")?;
    let translation = read_vec3(r, "joint translation")?;
    let rotation = read_quat(r)?;
    let scale = read_vec3(r, "joint scale")?;

    let this_index = parents.len() as i16;
    parents.push(parent);
    names.push(name);
    rest_poses.push(Transform::new(translation, rotation, scale));

    let num_children = r.read_u32("num_children")?;
    check_count("num_children", num_children, MAX_JOINTS as u32)?;
    if num_children > 0 {
        r.read_version("joint", 1)?;
    }
    for _ in 0..num_children {
        read_joint(r, this_index, parents, names, rest_poses)?;
    }

    Ok(())
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
        r.read_f32("joint rotation")?,
        r.read_f32("joint rotation")?,
        r.read_f32("joint rotation")?,
        r.read_f32("joint rotation")?,
    ))
}
