//! `BlendingJob`: multi-layer weighted blend of local-space poses, plus
//! additive layers. Grounded on `BlendingJob.cpp`'s `BlendLayers`/
//! `AddLayers`, with two corrections to behavior the reference
//! implementation's header documents but its `Run()` never actually
//! performs: the rest-pose threshold fallback is applied per joint, and
//! additive layers are always processed.

use crate::error::ValidationError;
use crate::transform::Transform;
use glam::{Quat, Vec3};

/// Default blend threshold, matching the reference implementation's
/// constructor-initialized value.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// One blend input: a posture and a weight, with optional per-joint
/// weights layered on top of the layer weight.
pub struct Layer<'a> {
    /// Negative or zero weights are skipped entirely (treated as absent).
    pub weight: f32,
    pub transform: &'a [Transform],
    /// Empty disables per-joint weighting; otherwise must cover every
    /// joint the job processes. Values are not clamped to `[0,1]` since
    /// layers may stack past 1.0 before normalization.
    pub joint_weights: &'a [f32],
}

/// Blends `layers` (normalized against each other) and `rest_pose` (as a
/// per-joint fallback below `threshold`) into `output`, then applies
/// `additive_layers` on top.
pub struct BlendingJob<'a> {
    pub threshold: f32,
    pub layers: &'a [Layer<'a>],
    pub additive_layers: &'a [Layer<'a>],
    pub rest_pose: &'a [Transform],
    pub output: &'a mut [Transform],
}

impl<'a> BlendingJob<'a> {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.threshold <= 0.0 {
            return Err(ValidationError::ThresholdNotPositive(self.threshold));
        }
        if self.rest_pose.is_empty() {
            return Err(ValidationError::RestPoseEmpty);
        }
        if self.output.is_empty() {
            return Err(ValidationError::OutputEmpty);
        }

        let min_range = self.rest_pose.len();
        if self.output.len() < min_range {
            return Err(ValidationError::OutputTooShort {
                have: self.output.len(),
                need: min_range,
            });
        }

        for layer in self.layers.iter().chain(self.additive_layers.iter()) {
            validate_layer(layer, min_range)?;
        }
        for layer in self.additive_layers {
            if layer.weight < 0.0 {
                return Err(ValidationError::NegativeLayerWeight(layer.weight));
            }
        }

        Ok(())
    }

    pub fn run(&mut self) -> Result<(), ValidationError> {
        self.validate().map_err(|e| {
            log::warn!("BlendingJob validation failed: {e}");
            e
        })?;

        let n = self.rest_pose.len();
        let mut partial_weights = vec![0.0f32; n];
        let mut total_weight = vec![0.0f32; n];
        let mut accumulated_weight = 0.0f32;
        let mut num_passes = 0u32;

        for layer in self.layers {
            if layer.weight <= 0.0 {
                continue;
            }
            let layer_weight = layer.weight;

            if !layer.joint_weights.is_empty() {
                if num_passes == 0 {
                    for i in 0..n {
                        let bp_weight = layer_weight * layer.joint_weights[i];
                        partial_weights[i] = bp_weight;
                        total_weight[i] += bp_weight;
                        self.output[i] = layer.transform[i];
                    }
                } else {
                    for i in 0..n {
                        let bp_weight = layer_weight * layer.joint_weights[i];
                        partial_weights[i] += bp_weight;
                        total_weight[i] += bp_weight;
                        let t = bp_weight / partial_weights[i];
                        self.output[i] = Transform::blend(self.output[i], layer.transform[i], t);
                    }
                }
            } else {
                accumulated_weight += layer_weight;
                for w in total_weight.iter_mut() {
                    *w += layer_weight;
                }
                if num_passes == 0 {
                    self.output[..n].copy_from_slice(&layer.transform[..n]);
                } else {
                    let t = layer_weight / accumulated_weight;
                    for i in 0..n {
                        self.output[i] = Transform::blend(self.output[i], layer.transform[i], t);
                    }
                }
            }
            num_passes += 1;
        }

        if num_passes == 0 {
            self.output[..n].copy_from_slice(&self.rest_pose[..n]);
        } else {
            for i in 0..n {
                if total_weight[i] < self.threshold {
                    // Rest pose fills the remainder so the effective total
                    // weight for this joint is always 1.
                    let t = (1.0 - total_weight[i]).clamp(0.0, 1.0);
                    self.output[i] = Transform::blend(self.output[i], self.rest_pose[i], t);
                }
            }
        }

        for layer in self.additive_layers {
            if layer.weight <= 0.0 {
                continue;
            }
            let layer_weight = layer.weight;
            if !layer.joint_weights.is_empty() {
                for i in 0..n {
                    let w = layer_weight * layer.joint_weights[i];
                    add_transform(&layer.transform[i], &mut self.output[i], w);
                }
            } else {
                for i in 0..n {
                    add_transform(&layer.transform[i], &mut self.output[i], layer_weight);
                }
            }
        }

        Ok(())
    }
}

fn validate_layer(layer: &Layer, min_range: usize) -> Result<(), ValidationError> {
    if layer.transform.len() < min_range {
        return Err(ValidationError::LayerTooShort {
            have: layer.transform.len(),
            need: min_range,
        });
    }
    if !layer.joint_weights.is_empty() && layer.joint_weights.len() < min_range {
        return Err(ValidationError::JointWeightsTooShort {
            have: layer.joint_weights.len(),
            need: min_range,
        });
    }
    Ok(())
}

/// `out += in * w`: translation and scale factor in linearly, rotation is
/// scaled then renormalized before composing so the result stays a unit
/// quaternion. A non-positive `w` (an entirely masked-out joint under a
/// per-joint weight mask) leaves `dest` untouched rather than normalizing
/// a zero-length quaternion.
fn add_transform(src: &Transform, dest: &mut Transform, w: f32) {
    if w <= 0.0 {
        return;
    }
    dest.translation += src.translation * w;
    dest.scale *= Vec3::splat(1.0 - w) + src.scale * w;
    dest.rotation = scale_quat(src.rotation, w).normalize() * dest.rotation;
}

fn scale_quat(q: Quat, s: f32) -> Quat {
    Quat::from_xyzw(q.x * s, q.y * s, q.z * s, q.w * s)
}
