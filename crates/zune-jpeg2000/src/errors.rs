/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::uninlined_format_args)]

use core::fmt::{Debug, Display, Formatter};

use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;

use crate::encoder::{EncodeStage, SessionState};

/// Colorspaces the encoder can map to a JPEG 2000 component layout
pub const SUPPORTED_COLORSPACES: [ColorSpace; 6] = [
    ColorSpace::Luma,
    ColorSpace::LumaA,
    ColorSpace::RGB,
    ColorSpace::RGBA,
    ColorSpace::YCbCr,
    ColorSpace::CMYK
];

pub const SUPPORTED_DEPTHS: [BitDepth; 2] = [BitDepth::Eight, BitDepth::Sixteen];

/// Errors that may arise during encoding
pub enum J2kEncodeErrors {
    /// One of the image dimensions is zero
    ZeroDimension(&'static str),
    /// A dimension cannot be represented in a codestream,
    /// or the buffer needed to hold the output overflows
    TooLargeDimensions(usize),
    /// Pixel data length doesn't match the image description
    ///
    /// # Arguments
    /// - 1st argument is the expected length
    /// - 2nd argument is the length found
    LengthMismatch(usize, usize),
    UnsupportedColorspace(ColorSpace, &'static [ColorSpace]),
    UnsupportedDepth(BitDepth),
    /// Parameters were rejected before reaching the codec
    InvalidParameters(String),
    /// The codec, stream or image could not be created or the
    /// codec refused the parameters
    ConfigurationFailure(&'static str),
    /// A stage of the compress lifecycle reported failure
    EncodeFailed(EncodeStage),
    /// The codec aborted because the output buffer was full
    ///
    /// The argument is the buffer capacity
    CapacityExhausted(usize),
    /// The operation isn't allowed in the current session state
    InvalidState(SessionState)
}

impl Debug for J2kEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            J2kEncodeErrors::ZeroDimension(param) => writeln!(f, "The {param} is zero"),
            J2kEncodeErrors::TooLargeDimensions(value) => {
                writeln!(
                    f,
                    "Too large dimensions {value}, JPEG 2000 can only encode images less than {}",
                    u32::MAX
                )
            }
            J2kEncodeErrors::LengthMismatch(expected, found) => {
                writeln!(f, "Expected array of length {expected} but found {found}")
            }
            J2kEncodeErrors::UnsupportedColorspace(found, supported) => {
                writeln!(
                    f,
                    "Cannot encode image with colorspace {found:?} into JPEG 2000, supported ones are {supported:?}"
                )
            }
            J2kEncodeErrors::UnsupportedDepth(depth) => {
                writeln!(
                    f,
                    "JPEG 2000 encoder cannot encode images in depth {depth:?}, supported ones are {:?}",
                    SUPPORTED_DEPTHS
                )
            }
            J2kEncodeErrors::InvalidParameters(reason) => {
                writeln!(f, "Invalid encoder parameters: {reason}")
            }
            J2kEncodeErrors::ConfigurationFailure(reason) => {
                writeln!(f, "Could not configure the compressor: {reason}")
            }
            J2kEncodeErrors::EncodeFailed(stage) => {
                writeln!(f, "Compression failed during {stage:?} stage")
            }
            J2kEncodeErrors::CapacityExhausted(capacity) => {
                writeln!(
                    f,
                    "Output buffer of {capacity} bytes exhausted before compression finished"
                )
            }
            J2kEncodeErrors::InvalidState(state) => {
                writeln!(f, "Operation not allowed, session is in {state:?} state")
            }
        }
    }
}

impl Display for J2kEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for J2kEncodeErrors {}

/// Errors encountered when reading codestream headers
pub enum J2kHeaderErrors {
    /// The input ended before a header could be read
    ///
    /// # Arguments
    /// - 1st argument is the number of bytes we expected
    /// - 2nd argument is number of bytes actually left
    InsufficientData(usize, usize),
    /// The codestream does not start with the SOC marker `0xFF4F`
    NoSocMarker,
    /// The SOC marker isn't followed by a SIZ segment
    NoSizMarker,
    /// A JP2 file without a contiguous codestream box
    NoCodestreamBox,
    Generic(&'static str)
}

impl Debug for J2kHeaderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            J2kHeaderErrors::InsufficientData(expected, found) => {
                writeln!(
                    f,
                    "Insufficient data required {expected} but remaining stream has {found}"
                )
            }
            J2kHeaderErrors::NoSocMarker => {
                writeln!(f, "No SOC marker, expected 0xFF4F as codestream start")
            }
            J2kHeaderErrors::NoSizMarker => {
                writeln!(f, "No SIZ marker after SOC, expected 0xFF51")
            }
            J2kHeaderErrors::NoCodestreamBox => {
                writeln!(f, "JP2 file does not contain a jp2c box")
            }
            J2kHeaderErrors::Generic(val) => writeln!(f, "{val}")
        }
    }
}

impl Display for J2kHeaderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for J2kHeaderErrors {}

impl From<&'static str> for J2kHeaderErrors {
    fn from(r: &'static str) -> Self {
        Self::Generic(r)
    }
}
