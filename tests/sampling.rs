//! Compressed-vs-raw sampling parity (scenario 6) and sampler invariants.

use animruntime::{Animation, RawAnimation, RawSamplingJob, SamplingContext, SamplingJob, Transform};
use animruntime::raw_animation::{JointTrack, RotationKey, ScaleKey, TranslationKey};
use glam::{Quat, Vec3};

fn build_tracks(num_tracks: usize, num_keys: usize, duration: f32) -> Vec<JointTrack> {
    (0..num_tracks)
        .map(|t| {
            let translations = (0..num_keys)
                .map(|k| {
                    let time = duration * k as f32 / (num_keys - 1) as f32;
                    TranslationKey {
                        time,
                        value: Vec3::new(t as f32 * 0.37, (k as f32).sin(), -(t as f32)),
                    }
                })
                .collect();
            let rotations = (0..num_keys)
                .map(|k| {
                    let time = duration * k as f32 / (num_keys - 1) as f32;
                    let angle = (t as f32 * 0.1 + k as f32 * 0.05) % std::f32::consts::TAU;
                    RotationKey {
                        time,
                        value: Quat::from_euler(glam::EulerRot::XYZ, angle, angle * 0.5, angle * 0.25),
                    }
                })
                .collect();
            let scales = (0..num_keys)
                .map(|k| {
                    let time = duration * k as f32 / (num_keys - 1) as f32;
                    ScaleKey {
                        time,
                        value: Vec3::splat(1.0 + 0.1 * (k as f32 / num_keys as f32)),
                    }
                })
                .collect();
            JointTrack {
                translations,
                rotations,
                scales,
            }
        })
        .collect()
}

#[test]
fn compressed_sampling_matches_raw_oracle_within_tolerance() {
    let num_tracks = 32;
    let num_keys = 64;
    let duration = 2.0;
    let tracks = build_tracks(num_tracks, num_keys, duration);
    let raw = RawAnimation {
        duration,
        tracks,
        name: "parity".to_string(),
    };
    assert!(raw.validate());

    let compressed = Animation::from_raw(&raw);
    let mut context = SamplingContext::new(num_tracks);

    let mut max_translation_error = 0.0f32;
    let mut max_scale_error = 0.0f32;
    let mut max_rotation_error = 0.0f32;

    for step in 0..100 {
        let ratio = step as f32 / 99.0;

        let mut raw_out = vec![Transform::IDENTITY; num_tracks];
        RawSamplingJob {
            animation: &raw,
            ratio,
            output: &mut raw_out,
        }
        .run()
        .unwrap();

        let mut compressed_out = vec![Transform::IDENTITY; num_tracks];
        SamplingJob {
            animation: &compressed,
            context: &mut context,
            ratio,
            output: &mut compressed_out,
        }
        .run()
        .unwrap();

        for i in 0..num_tracks {
            let dt = (raw_out[i].translation - compressed_out[i].translation).abs();
            max_translation_error = max_translation_error.max(dt.x).max(dt.y).max(dt.z);

            let ds = (raw_out[i].scale - compressed_out[i].scale).abs();
            max_scale_error = max_scale_error.max(ds.x).max(ds.y).max(ds.z);

            let a = raw_out[i].rotation;
            let b = compressed_out[i].rotation;
            let dr = [
                (a.x - b.x).abs(),
                (a.y - b.y).abs(),
                (a.z - b.z).abs(),
                (a.w - b.w).abs(),
            ];
            max_rotation_error = max_rotation_error.max(dr.iter().cloned().fold(0.0, f32::max));
        }
    }

    assert!(max_translation_error <= 2e-3, "translation error {max_translation_error}");
    assert!(max_scale_error <= 2e-3, "scale error {max_scale_error}");
    assert!(max_rotation_error <= 2e-4, "rotation error {max_rotation_error}");
}

#[test]
fn zero_track_animation_samples_successfully_and_writes_nothing() {
    let animation = Animation::from_tracks(1.0, &[], &[], &[]);
    let mut context = SamplingContext::new(0);
    let mut output = vec![Transform::new(Vec3::new(9.0, 9.0, 9.0), Quat::IDENTITY, Vec3::ONE)];

    let mut job = SamplingJob {
        animation: &animation,
        context: &mut context,
        ratio: 0.5,
        output: &mut output,
    };
    job.run().unwrap();

    assert_eq!(output[0].translation, Vec3::new(9.0, 9.0, 9.0));
}

#[test]
fn ratio_zero_and_one_reproduce_seed_and_tail_keys() {
    let tracks = build_tracks(4, 5, 1.0);
    let raw = RawAnimation {
        duration: 1.0,
        tracks,
        name: "boundary".to_string(),
    };
    let compressed = Animation::from_raw(&raw);
    let mut context = SamplingContext::new(4);

    let mut out0 = vec![Transform::IDENTITY; 4];
    SamplingJob {
        animation: &compressed,
        context: &mut context,
        ratio: 0.0,
        output: &mut out0,
    }
    .run()
    .unwrap();

    for (i, track) in raw.tracks.iter().enumerate() {
        let expected = track.translations[0].value;
        let got = out0[i].translation;
        assert!((expected - got).length() < 1e-2, "track {i}: {expected:?} vs {got:?}");
    }

    let mut out1 = vec![Transform::IDENTITY; 4];
    SamplingJob {
        animation: &compressed,
        context: &mut context,
        ratio: 1.0,
        output: &mut out1,
    }
    .run()
    .unwrap();

    for (i, track) in raw.tracks.iter().enumerate() {
        let expected = track.translations.last().unwrap().value;
        let got = out1[i].translation;
        assert!((expected - got).length() < 1e-2, "track {i}: {expected:?} vs {got:?}");
    }
}

#[test]
fn rewind_then_resample_matches_a_fresh_sample() {
    let tracks = build_tracks(8, 16, 1.0);
    let raw = RawAnimation {
        duration: 1.0,
        tracks,
        name: "rewind".to_string(),
    };
    let compressed = Animation::from_raw(&raw);

    let mut scrubbing_context = SamplingContext::new(8);
    let mut out_forward = vec![Transform::IDENTITY; 8];
    SamplingJob {
        animation: &compressed,
        context: &mut scrubbing_context,
        ratio: 0.9,
        output: &mut out_forward,
    }
    .run()
    .unwrap();

    let mut out_rewound = vec![Transform::IDENTITY; 8];
    SamplingJob {
        animation: &compressed,
        context: &mut scrubbing_context,
        ratio: 0.3,
        output: &mut out_rewound,
    }
    .run()
    .unwrap();

    let mut fresh_context = SamplingContext::new(8);
    let mut out_fresh = vec![Transform::IDENTITY; 8];
    SamplingJob {
        animation: &compressed,
        context: &mut fresh_context,
        ratio: 0.3,
        output: &mut out_fresh,
    }
    .run()
    .unwrap();

    for i in 0..8 {
        assert_eq!(out_rewound[i].translation, out_fresh[i].translation);
        assert_eq!(out_rewound[i].rotation, out_fresh[i].rotation);
        assert_eq!(out_rewound[i].scale, out_fresh[i].scale);
    }
}

#[test]
fn sampling_twice_at_the_same_ratio_is_deterministic() {
    let tracks = build_tracks(6, 10, 1.0);
    let raw = RawAnimation {
        duration: 1.0,
        tracks,
        name: "determinism".to_string(),
    };
    let compressed = Animation::from_raw(&raw);
    let mut context = SamplingContext::new(6);

    let mut first = vec![Transform::IDENTITY; 6];
    SamplingJob {
        animation: &compressed,
        context: &mut context,
        ratio: 0.42,
        output: &mut first,
    }
    .run()
    .unwrap();

    let mut second = vec![Transform::IDENTITY; 6];
    SamplingJob {
        animation: &compressed,
        context: &mut context,
        ratio: 0.42,
        output: &mut second,
    }
    .run()
    .unwrap();

    for i in 0..6 {
        assert_eq!(first[i].translation, second[i].translation);
        assert_eq!(first[i].rotation, second[i].rotation);
        assert_eq!(first[i].scale, second[i].scale);
    }
}
