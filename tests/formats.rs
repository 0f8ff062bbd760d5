//! Byte-fixture round trips for the three asset loaders.

use animruntime::formats::{load_animation, load_meshes, load_raw_animation, load_skeleton};
use glam::{Mat4, Quat, Vec3};

struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    fn new() -> Self {
        Self { bytes: Vec::new() }
    }
    fn u8(&mut self, v: u8) -> &mut Self {
        self.bytes.push(v);
        self
    }
    fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }
    fn i16(&mut self, v: i16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }
    fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }
    fn i32(&mut self, v: i32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }
    fn f32(&mut self, v: f32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }
    fn tag(&mut self, tag: &str) -> &mut Self {
        self.bytes.extend_from_slice(tag.as_bytes());
        self.bytes.push(0);
        self
    }
    fn cstr_field(&mut self, s: &str) -> &mut Self {
        self.u32(s.len() as u32);
        self.bytes.extend_from_slice(s.as_bytes());
        self
    }
    fn vec3(&mut self, v: Vec3) -> &mut Self {
        self.f32(v.x).f32(v.y).f32(v.z);
        self
    }
    fn quat(&mut self, q: Quat) -> &mut Self {
        self.f32(q.x).f32(q.y).f32(q.z).f32(q.w);
        self
    }
}

#[test]
fn skeleton_round_trip_two_joint_chain() {
    let mut w = Writer::new();
    w.u8(0); // endianness
    w.tag("ozz-raw_skeleton");
    w.u32(1); // version
    w.u32(1); // num_roots
    w.u32(1); // joint version

    // root joint
    w.cstr_field("root");
    w.vec3(Vec3::ZERO);
    w.quat(Quat::IDENTITY);
    w.vec3(Vec3::ONE);
    w.u32(1); // num_children
    w.u32(1); // joint version for child

    // child joint
    w.cstr_field("child");
    w.vec3(Vec3::new(1.0, 0.0, 0.0));
    w.quat(Quat::IDENTITY);
    w.vec3(Vec3::ONE);
    w.u32(0); // num_children

    let skeleton = load_skeleton(&w.bytes).unwrap();
    assert_eq!(skeleton.num_joints(), 2);
    assert_eq!(skeleton.joint_name(0), Some("root"));
    assert_eq!(skeleton.joint_name(1), Some("child"));
    assert_eq!(skeleton.joint_parents(), &[-1, 0]);
    assert_eq!(skeleton.joint_rest_poses()[1].translation, Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn skeleton_rejects_wrong_tag() {
    let mut w = Writer::new();
    w.u8(0);
    w.tag("not-a-skeleton");
    assert!(load_skeleton(&w.bytes).is_err());
}

#[test]
fn skeleton_rejects_non_zero_endianness() {
    let mut w = Writer::new();
    w.u8(1);
    assert!(load_skeleton(&w.bytes).is_err());
}

#[test]
fn raw_animation_round_trip_one_track() {
    let mut w = Writer::new();
    w.u8(0);
    w.tag("ozz-raw_animation");
    w.u32(3); // version
    w.f32(2.0); // duration
    w.u32(1); // num_tracks
    w.u32(1); // track version

    // translations: 2 keys
    w.u32(2);
    w.u32(1); // translation key version
    w.f32(0.0).vec3(Vec3::ZERO);
    w.f32(2.0).vec3(Vec3::new(1.0, 0.0, 0.0));

    // rotations: 0 keys
    w.u32(0);
    w.u32(1);

    // scales: 0 keys
    w.u32(0);
    w.u32(1);

    w.cstr_field("clip");

    let raw = load_raw_animation(&w.bytes).unwrap();
    assert_eq!(raw.duration, 2.0);
    assert_eq!(raw.tracks.len(), 1);
    assert_eq!(raw.tracks[0].translations.len(), 2);
    assert_eq!(raw.tracks[0].translations[1].value, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(raw.name, "clip");
    assert!(raw.validate());
}

#[test]
fn compressed_animation_round_trip_one_track() {
    let mut w = Writer::new();
    w.u8(0);
    w.tag("ozz-animation");
    w.u32(6); // version
    w.f32(1.0); // duration
    w.i32(1); // num_tracks
    w.i32(4); // name_len

    w.i32(2); // translation count
    w.i32(0); // rotation count
    w.i32(0); // scale count

    w.bytes.extend_from_slice(b"clip");

    // two translation keys (seeding prefix for a single track)
    w.f32(0.0).u16(0).u16(0).u16(0).u16(0);
    w.f32(1.0).u16(0).u16(0x3c00).u16(0).u16(0);

    let animation = load_animation(&w.bytes).unwrap();
    assert_eq!(animation.duration(), 1.0);
    assert_eq!(animation.num_tracks(), 1);
    assert_eq!(animation.name(), "clip");
    assert_eq!(animation.translations().len(), 2);
    assert!(animation.rotations().is_empty());
}

#[test]
fn mesh_round_trip_single_part() {
    let mut w = Writer::new();
    w.u8(0);
    w.tag("ozz-sample-Mesh");
    w.u32(1); // version

    w.u32(1); // num_parts
    w.u32(1); // part version

    // part: positions (2), normals/tangents/uvs/colors empty, joint_indices
    // (2 vertices * 1 influence), joint_weights empty (influences_count==1)
    w.u32(2);
    w.vec3(Vec3::new(0.0, 0.0, 0.0));
    w.vec3(Vec3::new(1.0, 0.0, 0.0));
    w.u32(0); // normals
    w.u32(0); // tangents
    w.u32(0); // uvs
    w.u32(0); // colors
    w.u32(2); // joint_indices
    w.u16(0).u16(0);
    w.u32(0); // joint_weights

    w.u32(0); // triangle_indices
    w.u32(1); // joint_remaps
    w.u16(0);
    w.u32(1); // inverse_bind_poses
    for v in Mat4::IDENTITY.transpose().to_cols_array() {
        w.f32(v);
    }

    let meshes = load_meshes(&w.bytes).unwrap();
    assert_eq!(meshes.len(), 1);
    let mesh = &meshes[0];
    assert_eq!(mesh.parts.len(), 1);
    assert_eq!(mesh.parts[0].positions.len(), 2);
    assert_eq!(mesh.joint_remaps, vec![0]);
    assert_eq!(mesh.inverse_bind_poses[0], Mat4::IDENTITY);
    assert!(mesh.validate().is_ok());
}

#[test]
fn mesh_rejects_truncated_buffer() {
    let mut w = Writer::new();
    w.u8(0);
    w.tag("ozz-sample-Mesh");
    w.u32(1);
    w.u32(1); // num_parts, but no part data follows
    assert!(load_meshes(&w.bytes).is_err());
}
