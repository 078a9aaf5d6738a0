/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A 240 line photo taken through the whole pipeline, JPEG in, J2K out

use jpeg_encoder::{ColorType, Encoder};
use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;
use zune_core::options::EncoderOptions;
use zune_jpeg::JpegDecoder;
use zune_jpeg2000::{probe, J2kEncoder, J2kFormat, J2kParameters};

use crate::reference::decode;

const WIDTH: u16 = 320;
const HEIGHT: u16 = 240;

/// Something photo like, smooth shading with a bright disc and stripes
fn test_photo() -> Vec<u8> {
    let mut pixels = Vec::with_capacity(usize::from(WIDTH) * usize::from(HEIGHT) * 3);
    let (cx, cy) = (f32::from(WIDTH) * 0.6, f32::from(HEIGHT) * 0.4);

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let (fx, fy) = (f32::from(x), f32::from(y));
            let distance = ((fx - cx).powi(2) + (fy - cy).powi(2)).sqrt();
            let disc = (1.0 - distance / 90.0).max(0.0);
            let stripes = ((fx * 0.15).sin() * 0.5 + 0.5) * 40.0;

            let r = 60.0 + fy * 0.5 + disc * 150.0;
            let g = 90.0 + stripes + disc * 120.0;
            let b = 180.0 - fy * 0.4 + disc * 40.0;

            pixels.extend([r, g, b].map(|v| v.clamp(0.0, 255.0) as u8));
        }
    }
    pixels
}

fn test_photo_jpeg() -> Vec<u8> {
    let mut jpeg = Vec::new();
    let encoder = Encoder::new(&mut jpeg, 90);
    encoder
        .encode(&test_photo(), WIDTH, HEIGHT, ColorType::Rgb)
        .unwrap();
    jpeg
}

fn decode_photo() -> (Vec<u8>, usize, usize) {
    let jpeg = test_photo_jpeg();
    let mut decoder = JpegDecoder::new(&jpeg);
    let pixels = decoder.decode().unwrap();
    let (width, height) = decoder.dimensions().unwrap();
    (pixels, width, height)
}

#[test]
fn test_encode_photo_defaults() {
    let (pixels, width, height) = decode_photo();
    assert_eq!((width, height), (320, 240));

    let options = EncoderOptions::new(width, height, ColorSpace::RGB, BitDepth::Eight);
    let mut encoder = J2kEncoder::new(&pixels, options).unwrap();
    let encoded = encoder.encode().unwrap();
    let capacity = encoder.capacity();
    encoder.dispose();

    assert!(!encoded.is_empty());
    assert!(encoded.len() < capacity);
    // smooth content compresses even losslessly
    assert!(encoded.len() < pixels.len());
    assert_eq!(&encoded[..2], &[0xFF, 0x4F]);

    let info = probe(&encoded).unwrap();
    assert_eq!((info.width, info.height), (320, 240));
    assert_eq!(info.num_components(), 3);
    assert_eq!(info.quality_layers, 1);
    assert!(info.reversible);
    assert!(info.mct);
    assert!(info.has_eoc);

    let decoded = decode(&encoded).unwrap();
    assert_eq!((decoded.width, decoded.height), (320, 240));
    assert_eq!(decoded.num_components(), 3);
    assert_eq!(decoded.first_mismatch(&pixels, BitDepth::Eight), None);
}

#[test]
fn test_encode_photo_lossy_jp2() {
    let (pixels, width, height) = decode_photo();

    let options = EncoderOptions::new(width, height, ColorSpace::RGB, BitDepth::Eight);
    let parameters = J2kParameters::default()
        .set_format(J2kFormat::Jp2)
        .set_irreversible(true)
        .set_layer_targets(vec![20.0]);

    let encoded = zune_jpeg2000::encode_jpeg2000(&pixels, options, parameters).unwrap();

    // about a twentieth of the raw size, with room for headers
    assert!(encoded.len() < pixels.len() / 10);

    let info = probe(&encoded).unwrap();
    assert_eq!(info.format, J2kFormat::Jp2);
    assert_eq!((info.width, info.height), (320, 240));
    assert!(!info.reversible);

    let decoded = decode(&encoded).unwrap();
    assert_eq!((decoded.width, decoded.height), (320, 240));
    assert_eq!(decoded.num_components(), 3);

    // lossy, but still the same picture
    let total_error: u64 = pixels
        .iter()
        .enumerate()
        .map(|(i, x)| decoded.planes[i % 3][i / 3].abs_diff(i32::from(*x)) as u64)
        .sum();
    assert!(total_error / (pixels.len() as u64) < 8);
}
