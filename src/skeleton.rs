//! Immutable joint hierarchy.

use crate::transform::Transform;

/// Sentinel parent index for a root joint.
pub const NO_PARENT: i16 = -1;

/// Hard cap on joint count, matching the reference implementation's limit
/// on how many bits are needed to index a joint.
pub const MAX_JOINTS: usize = 1024;

/// An ordered, depth-first joint hierarchy. `parents[i] < i` for every
/// non-root joint, so a single forward sweep can compute model-space
/// transforms without recursion.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    parents: Vec<i16>,
    names: Vec<String>,
    rest_poses: Vec<Transform>,
}

impl Skeleton {
    /// Builds a skeleton from parallel per-joint arrays. Panics (a
    /// programmer-error `debug_assert`, not a recoverable `ValidationError`)
    /// if the depth-first invariant is violated, since a caller that
    /// assembles a skeleton by hand controls that invariant directly; a
    /// skeleton loaded from bytes is instead rejected by the loader before
    /// this constructor ever sees it (see `formats::skeleton_format`).
    pub fn new(parents: Vec<i16>, names: Vec<String>, rest_poses: Vec<Transform>) -> Self {
        debug_assert_eq!(parents.len(), names.len());
        debug_assert_eq!(parents.len(), rest_poses.len());
        debug_assert!(parents.len() <= MAX_JOINTS);
        debug_assert!(parents.first().map_or(true, |&p| p == NO_PARENT));
        debug_assert!(parents
            .iter()
            .enumerate()
            .skip(1)
            .all(|(i, &p)| p == NO_PARENT || ((p as usize) < i)));

        Self {
            parents,
            names,
            rest_poses,
        }
    }

    #[inline]
    pub fn num_joints(&self) -> usize {
        self.parents.len()
    }

    #[inline]
    pub fn joint_parents(&self) -> &[i16] {
        &self.parents
    }

    #[inline]
    pub fn joint_names(&self) -> &[String] {
        &self.names
    }

    #[inline]
    pub fn joint_rest_poses(&self) -> &[Transform] {
        &self.rest_poses
    }

    pub fn joint_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn is_leaf(&self, index: usize) -> bool {
        !self.parents.iter().any(|&p| p as usize == index)
    }
}
