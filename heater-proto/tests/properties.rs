//! Property tests for framing, validation and decoding.

use heater_proto::frame::CRC_OFFSET;
use heater_proto::{
    decode, validate, CandidateFrame, FrameBuilder, FrameError, Framer, ValidatedFrame, FRAME_LEN,
    HALF_LEN,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Fields {
    current_temperature: u8,
    desired_temperature: u8,
    supply_voltage: u16,
    fan_speed: u16,
    fan_voltage: u16,
    heat_exchanger_temperature: u16,
    glow_plug_voltage: u16,
    glow_plug_current: u16,
    pump_frequency: u8,
    run_state: u8,
    error_code: u8,
    on: bool,
}

fn fields() -> impl Strategy<Value = Fields> {
    (
        (any::<u8>(), any::<u8>(), any::<u16>(), any::<u16>()),
        (any::<u16>(), any::<u16>(), any::<u16>(), any::<u16>()),
        (any::<u8>(), any::<u8>(), any::<u8>(), any::<bool>()),
    )
        .prop_map(|(a, b, c)| Fields {
            current_temperature: a.0,
            desired_temperature: a.1,
            supply_voltage: a.2,
            fan_speed: a.3,
            fan_voltage: b.0,
            heat_exchanger_temperature: b.1,
            glow_plug_voltage: b.2,
            glow_plug_current: b.3,
            pump_frequency: c.0,
            run_state: c.1,
            error_code: c.2,
            on: c.3,
        })
}

fn build(f: &Fields) -> [u8; FRAME_LEN] {
    FrameBuilder::new()
        .current_temperature(f.current_temperature)
        .desired_temperature(f.desired_temperature)
        .supply_voltage(f.supply_voltage)
        .fan_speed(f.fan_speed)
        .fan_voltage(f.fan_voltage)
        .heat_exchanger_temperature(f.heat_exchanger_temperature)
        .glow_plug_voltage(f.glow_plug_voltage)
        .glow_plug_current(f.glow_plug_current)
        .pump_frequency(f.pump_frequency)
        .run_state(f.run_state)
        .error_code(f.error_code)
        .on(f.on)
        .build()
}

/// Feed bytes and collect every frame that passes validation.
fn valid_frames(framer: &mut Framer, bytes: &[u8], now_ms: u64) -> Vec<ValidatedFrame> {
    bytes
        .iter()
        .filter_map(|&b| framer.push_byte(b, now_ms).ok().flatten())
        .filter_map(|candidate| validate(&candidate).ok())
        .collect()
}

proptest! {
    #[test]
    fn framer_buffer_is_bounded(stream in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let mut framer = Framer::default();
        for (i, &b) in stream.iter().enumerate() {
            let _ = framer.push_byte(b, i as u64);
            prop_assert!(framer.pending_len() < FRAME_LEN);
        }
    }

    #[test]
    fn framer_bounded_with_marker_heavy_noise(
        stream in proptest::collection::vec(
            prop_oneof![Just(0x76u8), Just(0x16u8), any::<u8>()],
            0..1024,
        )
    ) {
        let mut framer = Framer::default();
        for &b in &stream {
            let _ = framer.push_byte(b, 0);
            prop_assert!(framer.pending_len() < FRAME_LEN);
        }
    }

    #[test]
    fn flipped_crc_is_rejected(f in fields(), which in 0usize..4, mask in 1u8..=255) {
        let mut bytes = build(&f);
        let index = match which {
            0 => CRC_OFFSET,
            1 => CRC_OFFSET + 1,
            2 => HALF_LEN + CRC_OFFSET,
            _ => HALF_LEN + CRC_OFFSET + 1,
        };
        bytes[index] ^= mask;
        let verdict = validate(&CandidateFrame::new(bytes));
        prop_assert!(matches!(verdict, Err(FrameError::Corrupt(_))));
    }

    #[test]
    fn decode_round_trips_within_scale(f in fields()) {
        let snapshot = decode(validate(&CandidateFrame::new(build(&f))).unwrap());

        prop_assert_eq!(snapshot.current_temperature, f32::from(f.current_temperature));
        prop_assert_eq!(snapshot.desired_temperature, f32::from(f.desired_temperature));
        prop_assert_eq!(snapshot.fan_speed, f32::from(f.fan_speed));
        prop_assert_eq!(
            snapshot.heat_exchanger_temperature,
            f32::from(f.heat_exchanger_temperature)
        );
        prop_assert!((snapshot.supply_voltage - f32::from(f.supply_voltage) * 0.1).abs() < 0.01);
        prop_assert!((snapshot.fan_voltage - f32::from(f.fan_voltage) * 0.1).abs() < 0.01);
        prop_assert!(
            (snapshot.glow_plug_voltage - f32::from(f.glow_plug_voltage) * 0.1).abs() < 0.01
        );
        prop_assert!(
            (snapshot.glow_plug_current - f32::from(f.glow_plug_current) * 0.01).abs() < 0.01
        );
        prop_assert!((snapshot.pump_frequency - f32::from(f.pump_frequency) * 0.1).abs() < 0.01);
        prop_assert_eq!(snapshot.run_state.code(), f.run_state);
        prop_assert_eq!(snapshot.error_code.code(), f.error_code);
        prop_assert_eq!(snapshot.on, f.on);
    }

    #[test]
    fn decode_is_idempotent(f in fields()) {
        let validated = validate(&CandidateFrame::new(build(&f))).unwrap();
        let first = decode(validated.clone());
        let second = decode(validated);

        prop_assert_eq!(first, second);
        prop_assert_eq!(first.supply_voltage.to_bits(), second.supply_voltage.to_bits());
        prop_assert_eq!(first.glow_plug_current.to_bits(), second.glow_plug_current.to_bits());
        prop_assert_eq!(first.pump_frequency.to_bits(), second.pump_frequency.to_bits());
    }

    #[test]
    fn noise_after_frame_does_not_break_next_frame(
        first in fields(),
        second in fields(),
        noise in proptest::collection::vec(any::<u8>(), 0..200),
    ) {
        let first_bytes = build(&first);
        let second_bytes = build(&second);
        let mut framer = Framer::new(100);

        let mut frames = valid_frames(&mut framer, &first_bytes, 0);
        frames.extend(valid_frames(&mut framer, &noise, 10));
        frames.extend(valid_frames(&mut framer, &second_bytes, 1_000));

        prop_assert_eq!(frames.len(), 2);
        prop_assert_eq!(frames[0].as_bytes(), &first_bytes);
        prop_assert_eq!(frames[1].as_bytes(), &second_bytes);
    }

    #[test]
    fn mid_exchange_start_at_one_instant(
        partial in fields(),
        second in fields(),
        third in fields(),
    ) {
        let second_bytes = build(&second);
        let third_bytes = build(&third);
        let mut stream = build(&partial)[HALF_LEN..].to_vec();
        stream.extend_from_slice(&second_bytes);
        stream.extend_from_slice(&third_bytes);

        let frames = valid_frames(&mut Framer::default(), &stream, 0);

        prop_assert!(!frames.is_empty());
        for frame in &frames {
            prop_assert!(frame.as_bytes() == &second_bytes || frame.as_bytes() == &third_bytes);
        }
        prop_assert_eq!(frames[frames.len() - 1].as_bytes(), &third_bytes);
    }

    #[test]
    fn marker_noise_at_one_instant_never_splices_frames(
        partial in fields(),
        second in fields(),
        third in fields(),
        noise in proptest::collection::vec(any::<u8>(), 0..64),
        split in any::<prop::sample::Index>(),
    ) {
        let second_bytes = build(&second);
        let third_bytes = build(&third);
        let mut noise = noise;
        let at = split.index(noise.len() + 1);
        noise.splice(at..at, [0x76, 0x16]);

        let mut stream = build(&partial)[HALF_LEN..].to_vec();
        stream.extend_from_slice(&noise);
        stream.extend_from_slice(&second_bytes);
        stream.extend_from_slice(&third_bytes);

        let frames = valid_frames(&mut Framer::default(), &stream, 0);

        for frame in &frames {
            prop_assert!(frame.as_bytes() == &second_bytes || frame.as_bytes() == &third_bytes);
        }
    }
}
