//! Uncompressed per-track keyframe animation. This is the reference/oracle
//! representation: no SoA cache, no quantization, simple per-track key
//! lists sorted by ascending time.

use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationKey {
    pub time: f32,
    pub value: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationKey {
    pub time: f32,
    pub value: Quat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleKey {
    pub time: f32,
    pub value: Vec3,
}

/// Per-joint keyframe lists. Each of the three channels is sorted
/// independently by strictly ascending `time`.
#[derive(Debug, Clone, Default)]
pub struct JointTrack {
    pub translations: Vec<TranslationKey>,
    pub rotations: Vec<RotationKey>,
    pub scales: Vec<ScaleKey>,
}

impl JointTrack {
    /// Validates strictly-ascending time and `time ∈ [0, duration]` for all
    /// three channels.
    fn validate(&self, duration: f32) -> bool {
        fn ascending_in_range<T: Copy>(keys: &[T], duration: f32, time_of: impl Fn(T) -> f32) -> bool {
            if keys.is_empty() {
                return true;
            }
            let mut prev = None;
            for &k in keys {
                let t = time_of(k);
                if t < 0.0 || t > duration {
                    return false;
                }
                if let Some(p) = prev {
                    if t <= p {
                        return false;
                    }
                }
                prev = Some(t);
            }
            true
        }

        ascending_in_range(&self.translations, duration, |k: TranslationKey| k.time)
            && ascending_in_range(&self.rotations, duration, |k: RotationKey| k.time)
            && ascending_in_range(&self.scales, duration, |k: ScaleKey| k.time)
    }
}

/// An uncompressed animation clip: one `JointTrack` per skeleton joint.
#[derive(Debug, Clone)]
pub struct RawAnimation {
    pub duration: f32,
    pub tracks: Vec<JointTrack>,
    pub name: String,
}

impl Default for RawAnimation {
    fn default() -> Self {
        Self {
            duration: 1.0,
            tracks: Vec::new(),
            name: String::new(),
        }
    }
}

impl RawAnimation {
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// Duration > 0, and every track's keys are sorted and in range.
    pub fn validate(&self) -> bool {
        self.duration > 0.0 && self.tracks.iter().all(|t| t.validate(self.duration))
    }
}
