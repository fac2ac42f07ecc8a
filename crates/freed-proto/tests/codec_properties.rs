//! ---
//! freed_section: "02-protocol"
//! freed_subsection: "tests"
//! freed_type: "source"
//! freed_scope: "test"
//! freed_description: "Behavioural checks for the D1 codec."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use freed_proto::{decode, encode, try_decode, OutcomeKind, Pose, ValidationOutcome, FRAME_LEN};

fn sample_poses() -> Vec<Pose> {
    vec![
        Pose::new(0),
        Pose::new(1)
            .with_position(1000.0, -500.0, 2000.0)
            .with_orientation(45.0, -30.0, 0.0)
            .with_lens(32_768, 16_384),
        Pose::new(255)
            .with_position(-131_072.0, 131_071.984_375, 0.015_625)
            .with_orientation(-180.0, 90.0, 179.999_969_482_421_9)
            .with_lens(0xFF_FFFF, 0)
            .with_spare([0x12, 0x34]),
        // Not on the wire grid; compared after quantisation.
        Pose::new(9)
            .with_position(12.345_678, -9_876.543_21, 0.001)
            .with_orientation(123.456_789, -12.345_678, -0.000_001),
    ]
}

#[test]
fn decode_of_encode_yields_quantized_pose() {
    for pose in sample_poses() {
        let outcome = decode(encode(&pose).as_bytes());
        assert_eq!(outcome, ValidationOutcome::Valid(pose.quantized()), "{pose}");
    }
}

#[test]
fn quantized_poses_are_codec_fixed_points() {
    for pose in sample_poses() {
        let once = pose.quantized();
        let frame = encode(&once);
        assert_eq!(try_decode(frame.as_bytes()), Ok(once));
        assert_eq!(encode(&once), frame, "re-encoding must be byte identical");
    }
}

#[test]
fn any_single_bit_flip_is_rejected() {
    for pose in sample_poses() {
        let frame = encode(&pose);
        for byte in 0..FRAME_LEN {
            for bit in 0..8 {
                let mut corrupted = *frame.as_bytes();
                corrupted[byte] ^= 1 << bit;
                let kind = decode(&corrupted).kind();
                assert!(
                    matches!(kind, OutcomeKind::BadChecksum | OutcomeKind::OutOfRangeField),
                    "flip of byte {byte} bit {bit} produced {kind}"
                );
            }
        }
    }
}

#[test]
fn one_byte_short_is_too_short_and_exact_length_is_valid() {
    for pose in sample_poses() {
        let frame = encode(&pose);
        let bytes = frame.as_bytes();
        assert_eq!(decode(&bytes[..FRAME_LEN - 1]).kind(), OutcomeKind::TooShort);
        assert_eq!(decode(&bytes[..FRAME_LEN]).kind(), OutcomeKind::Valid);
    }
    assert_eq!(decode(&[]).kind(), OutcomeKind::TooShort);
}

#[test]
fn legacy_ascii_header_is_rejected() {
    // Packets starting with 'D' (0x44) were emitted by an early prototype.
    let mut bytes = *encode(&Pose::new(1)).as_bytes();
    let delta = 0xD1u8.wrapping_sub(0x44);
    bytes[0] = 0x44;
    bytes[FRAME_LEN - 1] = bytes[FRAME_LEN - 1].wrapping_add(delta);
    assert_eq!(decode(&bytes).kind(), OutcomeKind::BadHeader);
}
