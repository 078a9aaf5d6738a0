/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Smooth interleaved test image, `components` 8 bit samples per pixel
pub fn gradient_image(width: usize, height: usize, components: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * components);

    for y in 0..height {
        for x in 0..width {
            for c in 0..components {
                pixels.push(((x * 3 + y * 2 + c * 64) % 256) as u8);
            }
        }
    }
    pixels
}
