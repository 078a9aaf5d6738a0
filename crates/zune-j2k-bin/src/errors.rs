/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Formatter};

use zune_image::errors::ImageErrors;
use zune_jpeg2000::{J2kEncodeErrors, J2kHeaderErrors};

/// Errors that stop the command line workflow
pub enum CliErrors {
    Io(std::io::Error),
    /// The input is not an image we can read, or its decoder failed
    Image(ImageErrors),
    /// The decoded image has no encodable pixels
    DecodeFailed(String),
    /// An argument could not be turned into encoder parameters
    InvalidArgument(String),
    Encode(J2kEncodeErrors),
    Probe(J2kHeaderErrors)
}

impl Debug for CliErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CliErrors::Io(err) => writeln!(f, "I/O error: {err}"),
            CliErrors::Image(err) => writeln!(f, "{err:?}"),
            CliErrors::DecodeFailed(reason) => writeln!(f, "Decoding failed: {reason}"),
            CliErrors::InvalidArgument(reason) => writeln!(f, "Invalid argument: {reason}"),
            CliErrors::Encode(err) => writeln!(f, "{err:?}"),
            CliErrors::Probe(err) => writeln!(f, "{err:?}")
        }
    }
}

impl std::fmt::Display for CliErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for CliErrors {}

impl From<std::io::Error> for CliErrors {
    fn from(value: std::io::Error) -> Self {
        CliErrors::Io(value)
    }
}

impl From<ImageErrors> for CliErrors {
    fn from(value: ImageErrors) -> Self {
        CliErrors::Image(value)
    }
}

impl From<J2kEncodeErrors> for CliErrors {
    fn from(value: J2kEncodeErrors) -> Self {
        CliErrors::Encode(value)
    }
}

impl From<J2kHeaderErrors> for CliErrors {
    fn from(value: J2kHeaderErrors) -> Self {
        CliErrors::Probe(value)
    }
}
