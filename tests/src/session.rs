/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use nanorand::{Rng, WyRand};
use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;
use zune_core::options::EncoderOptions;
use zune_jpeg2000::{
    output_capacity, probe, J2kEncodeErrors, J2kEncoder, J2kFormat, J2kParameters,
    SessionState
};

use crate::reference::decode;
use crate::synthetic_image;

const JP2_SIGNATURE: [u8; 12] = [0, 0, 0, 12, b'j', b'P', b' ', b' ', 13, 10, 135, 10];

fn rgb_session(width: usize, height: usize, parameters: J2kParameters) -> J2kEncoder {
    let pixels = synthetic_image(width, height, ColorSpace::RGB, BitDepth::Eight);
    let options = EncoderOptions::new(width, height, ColorSpace::RGB, BitDepth::Eight);
    J2kEncoder::new_with_parameters(&pixels, options, parameters).unwrap()
}

/// Length and offset of the `jp2c` box of a JP2 file
fn codestream_box(data: &[u8]) -> Option<(usize, usize)> {
    let mut offset = 0;

    while offset + 8 <= data.len() {
        let length = u32::from_be_bytes(data[offset..offset + 4].try_into().ok()?) as usize;
        let kind = &data[offset + 4..offset + 8];

        if kind == b"jp2c" {
            return Some((offset, length));
        }
        if length < 8 {
            return None;
        }
        offset += length;
    }
    None
}

#[test]
fn test_capacity_covers_image() {
    let encoder = rgb_session(40, 30, J2kParameters::default());

    assert_eq!(encoder.capacity(), output_capacity(40 * 30 * 3).unwrap());
    assert!(encoder.capacity() > 40 * 30 * 3 * 3 / 2);
    assert_eq!(encoder.state(), SessionState::Configured);
    assert_eq!((encoder.width(), encoder.height()), (40, 30));
}

#[test]
fn test_lossless_noise_fits_buffer() {
    let mut rng = WyRand::new_seed(0x2000);

    let cases = [
        (64, 64, ColorSpace::RGB, BitDepth::Eight),
        (256, 256, ColorSpace::RGB, BitDepth::Eight),
        (256, 256, ColorSpace::Luma, BitDepth::Eight),
        (128, 128, ColorSpace::RGBA, BitDepth::Sixteen),
        (8, 8, ColorSpace::RGB, BitDepth::Eight),
        (1, 1, ColorSpace::RGB, BitDepth::Eight)
    ];

    for (width, height, colorspace, depth) in cases {
        let mut pixels = vec![0_u8; width * height * colorspace.num_components() * depth.size_of()];
        rng.fill_bytes(&mut pixels);

        let options = EncoderOptions::new(width, height, colorspace, depth);
        let mut encoder = J2kEncoder::new(&pixels, options).unwrap();

        let encoded = match encoder.encode() {
            Ok(encoded) => encoded,
            Err(e) => panic!("{width}x{height} {colorspace:?} {depth:?} noise: {e:?}")
        };
        assert!(!encoded.is_empty());
        assert!(encoded.len() < encoder.capacity());

        let decoded = decode(&encoded).unwrap();
        assert_eq!((decoded.width, decoded.height), (width, height));
        assert_eq!(decoded.first_mismatch(&pixels, depth), None);
    }
}

#[test]
fn test_j2k_codestream_markers() {
    let mut encoder = rgb_session(64, 40, J2kParameters::default());
    let encoded = encoder.encode().unwrap();

    // SOC then SIZ
    assert_eq!(&encoded[..4], &[0xFF, 0x4F, 0xFF, 0x51]);
    // EOC
    assert_eq!(&encoded[encoded.len() - 2..], &[0xFF, 0xD9]);
    assert_eq!(encoder.state(), SessionState::Completed);
}

#[test]
fn test_jp2_patches_codestream_box() {
    let mut encoder = rgb_session(48, 48, J2kParameters::default().set_format(J2kFormat::Jp2));
    let encoded = encoder.encode().unwrap();

    assert!(encoded.starts_with(&JP2_SIGNATURE));

    // the codec writes the box header last, after seeking back to it
    let (offset, length) = codestream_box(&encoded).unwrap();
    assert_eq!(offset + length, encoded.len());
    assert_eq!(&encoded[offset + 8..offset + 10], &[0xFF, 0x4F]);

    let info = probe(&encoded).unwrap();
    assert_eq!(info.format, J2kFormat::Jp2);
    assert!(info.has_eoc);
}

#[test]
fn test_switch_container_before_encoding() {
    let mut encoder = rgb_session(32, 32, J2kParameters::default());

    encoder
        .set_parameters(J2kParameters::default().set_format(J2kFormat::Jp2))
        .unwrap();
    encoder
        .set_parameters(J2kParameters::default().set_format(J2kFormat::J2k))
        .unwrap();

    let encoded = encoder.encode().unwrap();
    assert_eq!(probe(&encoded).unwrap().format, J2kFormat::J2k);
}

#[test]
fn test_single_use_session() {
    let mut encoder = rgb_session(16, 16, J2kParameters::default());
    encoder.encode().unwrap();

    assert!(matches!(
        encoder.encode(),
        Err(J2kEncodeErrors::InvalidState(SessionState::Completed))
    ));
    assert!(matches!(
        encoder.set_parameters(J2kParameters::default()),
        Err(J2kEncodeErrors::InvalidState(SessionState::Completed))
    ));

    encoder.dispose();
    encoder.dispose();
    assert!(encoder.is_disposed());
    assert!(matches!(
        encoder.encode(),
        Err(J2kEncodeErrors::InvalidState(SessionState::Disposed))
    ));
}

#[test]
fn test_dispose_before_encoding() {
    let mut encoder = rgb_session(16, 16, J2kParameters::default());
    encoder.dispose();

    assert_eq!(encoder.state(), SessionState::Disposed);
    assert!(encoder.encode().is_err());
}

#[test]
fn test_more_layers_cost_more_bytes() {
    let single = rgb_session(96, 96, J2kParameters::default().set_layer_targets(vec![40.0]))
        .encode()
        .unwrap();
    let lossless = rgb_session(96, 96, J2kParameters::default()).encode().unwrap();

    // a 1:40 target must be smaller than the lossless stream
    assert!(single.len() < lossless.len());

    let layered = rgb_session(
        96,
        96,
        J2kParameters::default()
            .set_quality_layers(3)
            .set_layer_targets(vec![40.0, 20.0, 10.0])
    )
    .encode()
    .unwrap();

    assert_eq!(probe(&layered).unwrap().quality_layers, 3);
    assert!(layered.len() > single.len());
}

#[test]
fn test_rejected_parameters() {
    let pixels = synthetic_image(8, 8, ColorSpace::Luma, BitDepth::Eight);
    let options = EncoderOptions::new(8, 8, ColorSpace::Luma, BitDepth::Eight);

    // two layers, three targets
    let parameters = J2kParameters::default()
        .set_quality_layers(2)
        .set_layer_targets(vec![40.0, 20.0, 10.0]);

    assert!(matches!(
        J2kEncoder::new_with_parameters(&pixels, options, parameters),
        Err(J2kEncodeErrors::InvalidParameters(_))
    ));
}
