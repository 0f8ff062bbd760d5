//! `LocalToModelJob`: hierarchical local → model space matrix propagation.
//! A single forward sweep over the skeleton's depth-first joint order is
//! enough because every joint's parent has a lower index and is therefore
//! already written to `output` by the time its children are reached.
//!
//! Grounded on `LocalToModelJob.cpp`. That file accepts `from`/`to`/
//! `from_excluded` fields but its `Run()` loop ignores them and always
//! walks every joint; this implementation honors the documented contract
//! in `LocalToModelJob.h` instead.

use crate::error::ValidationError;
use crate::skeleton::{Skeleton, NO_PARENT};
use crate::transform::Transform;
use glam::Mat4;

/// Sentinel for `to`, meaning "through the last joint" (mirrors the
/// reference implementation's `Skeleton::kMaxJoints` default).
pub const TO_LAST_JOINT: i32 = i32::MAX;

/// Converts `input` local-space transforms into `output` model-space
/// matrices, following `skeleton`'s joint hierarchy.
pub struct LocalToModelJob<'a> {
    pub skeleton: &'a Skeleton,
    /// Premultiplied onto every model matrix; `None` behaves as identity.
    pub root: Option<Mat4>,
    /// First joint to update. `NO_PARENT` (the default) updates the whole
    /// hierarchy. A non-default `from` relies on `output[parent]` already
    /// holding a valid matrix from a prior run.
    pub from: i16,
    /// Last joint to update, inclusive. `TO_LAST_JOINT` (the default)
    /// updates through the final joint.
    pub to: i32,
    /// If true, `from` itself is left untouched and only its descendants
    /// are updated (the caller is expected to have written `output[from]`
    /// directly beforehand).
    pub from_excluded: bool,
    pub input: &'a [Transform],
    pub output: &'a mut [Mat4],
}

impl<'a> LocalToModelJob<'a> {
    fn validate(&self) -> Result<(), ValidationError> {
        let num_joints = self.skeleton.num_joints();
        if self.input.len() < num_joints {
            return Err(ValidationError::InputTooShort {
                have: self.input.len(),
                need: num_joints,
            });
        }
        if self.output.len() < num_joints {
            return Err(ValidationError::OutputTooShort {
                have: self.output.len(),
                need: num_joints,
            });
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), ValidationError> {
        self.validate().map_err(|e| {
            log::warn!("LocalToModelJob validation failed: {e}");
            e
        })?;

        let num_joints = self.skeleton.num_joints();
        let parents = self.skeleton.joint_parents();
        let root_matrix = self.root.unwrap_or(Mat4::IDENTITY);

        let start = if self.from < 0 {
            0usize
        } else if self.from_excluded {
            self.from as usize + 1
        } else {
            self.from as usize
        };
        let end = (self.to as i64 + 1).clamp(0, num_joints as i64) as usize;

        for i in start..end.min(num_joints) {
            let parent = parents[i];

            // Joints in [start, end) that aren't actually descendants of
            // `from` (a sibling sub-tree whose index happens to fall in
            // range) are skipped via the `parent[i] >= from` predicate;
            // `from` itself is exempt since its own parent is necessarily
            // outside the swept range.
            if self.from >= 0 && i != self.from as usize && (parent as i32) < self.from as i32 {
                continue;
            }

            let local = self.input[i].to_matrix();
            let parent_matrix = if parent == NO_PARENT {
                root_matrix
            } else {
                self.output[parent as usize]
            };
            // glam is column-vector (`M * v`); composing "local, then
            // parent" means the parent matrix goes on the left.
            self.output[i] = parent_matrix * local;
        }

        Ok(())
    }
}
