/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Reading input images into interleaved pixels
use log::debug;
use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;
use zune_core::options::{DecoderOptions, EncoderOptions};
use zune_image::image::Image;

use crate::errors::CliErrors;

/// Pixels of a decoded input, laid out the way the encoder expects
pub struct DecodedImage {
    pub pixels:     Vec<u8>,
    pub width:      usize,
    pub height:     usize,
    pub colorspace: ColorSpace,
    pub depth:      BitDepth
}

impl DecodedImage {
    pub fn encoder_options(&self) -> EncoderOptions {
        EncoderOptions::new(self.width, self.height, self.colorspace, self.depth)
    }

    /// Interleave the first frame of an image
    ///
    /// Colorspace and depth are the ones the decoder reported, 16 bit
    /// samples become native endian bytes
    fn from_image(image: &Image) -> Result<DecodedImage, CliErrors> {
        let (width, height) = image.dimensions();
        let colorspace = image.colorspace();
        let depth = image.depth();

        let frame = match depth {
            BitDepth::Eight => image.flatten_to_u8().into_iter().next(),
            BitDepth::Sixteen => image
                .flatten_frames::<u16>()
                .into_iter()
                .next()
                .map(|frame| frame.iter().flat_map(|x| x.to_ne_bytes()).collect()),
            _ => {
                return Err(CliErrors::DecodeFailed(format!(
                    "{depth:?} images cannot be encoded"
                )))
            }
        };
        let pixels =
            frame.ok_or_else(|| CliErrors::DecodeFailed("image has no frames".to_string()))?;

        Ok(DecodedImage {
            pixels,
            width,
            height,
            colorspace,
            depth
        })
    }
}

/// Decode an in memory image file
pub fn decode_image(data: &[u8], name: &str) -> Result<DecodedImage, CliErrors> {
    let image = Image::read(data, DecoderOptions::default())?;
    debug!(
        "Read {:?} as a {:?} image with depth {:?}",
        name,
        image.colorspace(),
        image.depth()
    );

    DecodedImage::from_image(&image)
}
