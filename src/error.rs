//! Error types shared by every job and loader in this crate.
//!
//! Jobs never panic on bad input; they validate first and return one of
//! these before doing any work.

use thiserror::Error;

/// A job's input failed validation. No output was written.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ValidationError {
    #[error("output buffer is empty")]
    OutputEmpty,
    #[error("sampling context has room for {have} tracks, animation needs {need}")]
    ContextTooSmall { have: usize, need: usize },
    #[error("rest pose buffer is empty")]
    RestPoseEmpty,
    #[error("layer buffer has {have} transforms, needs at least {need}")]
    LayerTooShort { have: usize, need: usize },
    #[error("layer joint-weights buffer has {have} entries, needs at least {need}")]
    JointWeightsTooShort { have: usize, need: usize },
    #[error("blend threshold must be > 0, got {0}")]
    ThresholdNotPositive(f32),
    #[error("additive layer weight {0} is negative; subtractive blending is not supported")]
    NegativeLayerWeight(f32),
    #[error("skeleton is missing")]
    SkeletonMissing,
    #[error("input transform buffer has {have} entries, needs at least {need}")]
    InputTooShort { have: usize, need: usize },
    #[error("output buffer has {have} entries, needs at least {need}")]
    OutputTooShort { have: usize, need: usize },
    #[error("influences_count must be > 0")]
    NoInfluences,
    #[error("joint matrix palette is empty")]
    PaletteEmpty,
    #[error("{buffer} byte length {have} is smaller than required {need}")]
    BufferTooSmall {
        buffer: &'static str,
        have: usize,
        need: usize,
    },
    #[error("tangents were provided without normals")]
    TangentsWithoutNormals,
}

/// A byte-level asset failed to parse. The caller should discard the
/// partially built object.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AssetFormatError {
    #[error("expected tag {expected:?}, found {found:?}")]
    BadTag {
        expected: &'static str,
        found: String,
    },
    #[error("unsupported {kind} version {found}, expected {expected}")]
    UnsupportedVersion {
        kind: &'static str,
        expected: u32,
        found: u32,
    },
    #[error("unexpected end of file while reading {context}")]
    UnexpectedEof { context: &'static str },
    #[error("asset endianness byte {0:#x} does not match this host's little-endian reader")]
    UnsupportedEndianness(u8),
    #[error("{what} count {found} exceeds the supported maximum")]
    CountOverflow { what: &'static str, found: u32 },
    #[error("joint name bytes are not valid UTF-8")]
    InvalidUtf8,
}
