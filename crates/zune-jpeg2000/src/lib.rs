/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! JPEG 2000 encoding into memory
//!
//! This crate drives the [OpenJPEG](https://www.openjpeg.org/) compressor
//! and collects its output in a fixed size memory buffer instead of a file.
//!
//! The codec writes through a stream of callbacks (write, seek and skip),
//! [`MemoryStreamBuffer`] implements those over a byte buffer sized for the
//! worst case output and [`J2kEncoder`] runs the compress lifecycle and
//! hands back the encoded bytes.
//!
//! # Features
//! - J2K codestreams and JP2 files
//! - 8 and 16 bit images, grayscale, RGB, CMYK and YCbCr with optional alpha
//! - Lossless and lossy (rate or PSNR driven) quality layers
//! - Main header inspection via [`probe`]
//!
//! Decoding JPEG 2000 is not supported.
//!
//! # Example
//! ```no_run
//! use zune_core::bit_depth::BitDepth;
//! use zune_core::colorspace::ColorSpace;
//! use zune_core::options::EncoderOptions;
//! use zune_jpeg2000::{J2kEncoder, J2kParameters, J2kFormat};
//!
//! let pixels = vec![0_u8; 100 * 100 * 3];
//! let options = EncoderOptions::new(100, 100, ColorSpace::RGB, BitDepth::Eight);
//! let parameters = J2kParameters::default().set_format(J2kFormat::Jp2);
//!
//! let mut encoder = J2kEncoder::new_with_parameters(&pixels, options, parameters).unwrap();
//! let jp2 = encoder.encode().unwrap();
//! ```
pub use encoder::{encode_jpeg2000, EncodeStage, J2kEncoder, SessionState};
pub use errors::*;
pub use header::{probe, CodestreamInfo, ComponentInfo};
pub use options::{AllocationMode, J2kFormat, J2kParameters, MAX_QUALITY_LAYERS, MAX_RESOLUTIONS};
pub use stream::{
    output_capacity, MemoryStreamBuffer, EXPANSION_DIVISOR, SEEK_FAILED, SEEK_OK, SKIP_FAILED,
    STREAM_OVERHEAD, WRITE_FAILED
};
pub use zune_core;

mod encoder;
mod errors;
mod header;
mod native;
mod options;
mod stream;
