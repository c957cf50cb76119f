use splash_codec::{FrameRgbx, SplashContext, SplashParams, HEADER_LENGTH};

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn noise_frame(width: u32, height: u32, seed: u64) -> FrameRgbx {
    let mut data = vec![255u8; (width * height * 4) as usize];
    for (idx, px) in data.chunks_exact_mut(4).enumerate() {
        let v = mix64(seed.wrapping_add(idx as u64));
        px[0] = v as u8;
        px[1] = (v >> 8) as u8;
        px[2] = (v >> 16) as u8;
    }
    FrameRgbx::from_bytes(width, height, data).unwrap()
}

fn rgb_equal(a: &FrameRgbx, b: &FrameRgbx) -> bool {
    a.width == b.width
        && a.height == b.height
        && a.data
            .chunks_exact(4)
            .zip(b.data.chunks_exact(4))
            .all(|(x, y)| x[..3] == y[..3])
}

#[test]
fn single_pixel_packet_matches_wire_layout() {
    let params = SplashParams {
        radius: 1,
        ppf: 1.0,
        ppk: 1.0,
    };
    let mut enc = SplashContext::open(1, 1, params).unwrap();
    let target = FrameRgbx::solid(1, 1, [10, 20, 30]).unwrap();

    let packet = enc.encode(&target).unwrap();
    assert!(packet.key_frame);

    // |0x7f-10| + |0x7f-20| + |0x7f-30| = 117 + 107 + 97 = 321 = 0x141
    let mut expected = vec![12, 0, 0];
    expected.extend_from_slice(b"splash");
    expected.extend_from_slice(&[1, 1, 0]);
    expected.extend_from_slice(&[0x41, 0x01, 0x00]); // xErr[0]
    expected.extend_from_slice(&[0x41, 0x01, 0x00]); // yErr[0]
    expected.extend_from_slice(&[10, 20, 30]);
    assert_eq!(packet.data, expected);

    let mut dec = SplashContext::open(1, 1, params).unwrap();
    let frame = dec.decode(&packet.data).unwrap();
    assert_eq!(frame.data, vec![10, 20, 30, 255]);
}

#[test]
fn uniform_gray_target_emits_no_samples() {
    let params = SplashParams {
        radius: 5,
        ..SplashParams::default()
    };
    let mut enc = SplashContext::open(8, 8, params).unwrap();
    let target = FrameRgbx::solid(8, 8, [0x7f, 0x7f, 0x7f]).unwrap();

    let packet = enc.encode(&target).unwrap();
    assert_eq!(packet.data.len(), HEADER_LENGTH + 3 * (8 + 8));

    let mut dec = SplashContext::open(8, 8, params).unwrap();
    let frame = dec.decode(&packet.data).unwrap();
    assert!(frame
        .data
        .chunks_exact(4)
        .all(|px| px == [0x7f, 0x7f, 0x7f, 255]));
}

#[test]
fn lossless_gradient_reaches_the_target_exactly() {
    let params = SplashParams {
        radius: 1,
        ppf: 1.0,
        ppk: 1.0,
    };
    let mut data = vec![255u8; 4 * 4 * 4];
    for j in 0..4u32 {
        for i in 0..4u32 {
            let k = ((j * 4 + i) * 4) as usize;
            data[k] = (16 * i) as u8;
            data[k + 1] = (16 * j) as u8;
            data[k + 2] = 0;
        }
    }
    let target = FrameRgbx::from_bytes(4, 4, data).unwrap();

    let mut enc = SplashContext::open(4, 4, params).unwrap();
    let packet = enc.encode(&target).unwrap();
    assert!(rgb_equal(&enc.canvas_frame(), &target));

    let mut dec = SplashContext::open(4, 4, params).unwrap();
    let frame = dec.decode(&packet.data).unwrap();
    assert!(rgb_equal(&frame, &target));
}

#[test]
fn two_frame_stream_stays_in_lockstep() {
    let params = SplashParams {
        radius: 3,
        ppf: 2.0,
        ppk: 1.0,
    };
    let mut enc = SplashContext::open(16, 16, params).unwrap();
    let mut dec = SplashContext::open(16, 16, params).unwrap();

    let frame0 = noise_frame(16, 16, 11);
    let packet0 = enc.encode(&frame0).unwrap();
    let decoded0 = dec.decode(&packet0.data).unwrap();
    assert!(rgb_equal(&decoded0, &enc.canvas_frame()));

    // the second frame starts from the canvas the first one left behind
    let frame1 = noise_frame(16, 16, 12);
    let packet1 = enc.encode(&frame1).unwrap();
    let decoded1 = dec.decode(&packet1.data).unwrap();
    assert!(rgb_equal(&decoded1, &enc.canvas_frame()));
}

#[test]
fn budgeted_encode_still_roundtrips() {
    let params = SplashParams {
        radius: 4,
        ppf: 8.0,
        ppk: 4.0,
    };
    let mut enc = SplashContext::open(16, 16, params).unwrap();
    let target = noise_frame(16, 16, 21);

    let packet = enc.encode(&target).unwrap();
    // the budget caps the sample stream well below one sample per pixel
    let samples = (packet.data.len() - HEADER_LENGTH - 3 * (16 + 16)) / 3;
    assert!(samples < 16 * 16 / 2);

    let mut dec = SplashContext::open(16, 16, params).unwrap();
    let decoded = dec.decode(&packet.data).unwrap();
    assert!(rgb_equal(&decoded, &enc.canvas_frame()));
}

#[test]
fn truncated_packet_decodes_to_a_partial_canvas() {
    let params = SplashParams {
        radius: 3,
        ppf: 1.0,
        ppk: 1.0,
    };
    let mut enc = SplashContext::open(8, 8, params).unwrap();
    let target = noise_frame(8, 8, 31);
    let packet = enc.encode(&target).unwrap();

    let mut dec = SplashContext::open(8, 8, params).unwrap();
    let frame = dec.decode(&packet.data[..packet.data.len() - 2]).unwrap();
    assert_eq!(frame.width, 8);
    assert_eq!(frame.height, 8);
    assert_eq!(frame.data.len(), 8 * 8 * 4);

    // a full decode from a fresh context still matches the encoder
    let mut dec_full = SplashContext::open(8, 8, params).unwrap();
    let full = dec_full.decode(&packet.data).unwrap();
    assert!(rgb_equal(&full, &enc.canvas_frame()));
}
