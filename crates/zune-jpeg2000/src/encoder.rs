/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encode sessions driving the codec into a memory buffer
use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;
use zune_core::log::{trace, warn};
use zune_core::options::EncoderOptions;

use crate::errors::{J2kEncodeErrors, SUPPORTED_COLORSPACES};
use crate::native::{Codec, NativeImage, NativeParameters, Stream};
use crate::options::J2kParameters;
use crate::stream::{output_capacity, MemoryStreamBuffer, StreamBufferHandle};

/// Where a session is in its lifecycle
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionState {
    /// Resources are allocated and parameters bound, ready to encode
    Configured,
    /// The compress lifecycle is running
    Encoding,
    /// Output was extracted, the session can't encode again
    Completed,
    /// A compress stage failed, the session can't encode again
    Failed,
    /// Resources were released
    Disposed
}

/// Stages of the compress lifecycle
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EncodeStage {
    Start,
    Encode,
    Finish
}

/// A JPEG 2000 encoder writing into a fixed size memory buffer
///
/// A session owns the output buffer and every codec object it needs, it
/// encodes exactly once. Resources are released by [`dispose`](Self::dispose)
/// or when the session is dropped, whichever comes first.
///
/// The output buffer is sized by [`output_capacity`], the raw image with
/// room for lossless growth and headers.
///
/// [`output_capacity`]: crate::output_capacity
///
/// # Example
/// - Encode a 64 by 64 RGB gradient
/// ```no_run
/// use zune_core::bit_depth::BitDepth;
/// use zune_core::colorspace::ColorSpace;
/// use zune_core::options::EncoderOptions;
/// use zune_jpeg2000::{J2kEncodeErrors, J2kEncoder};
///
/// const W: usize = 64;
/// const H: usize = 64;
///
/// fn main() -> Result<(), J2kEncodeErrors> {
///     let pixels = std::array::from_fn::<u8, { W * H * 3 }, _>(|i| (i % 256) as u8);
///     let options = EncoderOptions::new(W, H, ColorSpace::RGB, BitDepth::Eight);
///
///     let mut encoder = J2kEncoder::new(&pixels, options)?;
///     let codestream = encoder.encode()?;
///     encoder.dispose();
///     // write codestream, or do something
///     Ok(())
/// }
/// ```
pub struct J2kEncoder {
    state:      SessionState,
    width:      usize,
    height:     usize,
    colorspace: ColorSpace,
    capacity:   usize,
    parameters: J2kParameters,
    // the codec and stream reference the image and buffer, dispose
    // releases them in declaration order
    codec:      Option<Codec>,
    stream:     Option<Stream>,
    image:      Option<NativeImage>,
    buffer:     Option<StreamBufferHandle>
}

impl J2kEncoder {
    /// Create a session for the pixels with the default parameters,
    /// a single quality layer and rate-distortion allocation
    ///
    /// # Arguments
    /// - data: Interleaved pixels, size must be equal to
    ///   `width*height*colorspace channels*depth bytes`.
    ///   16 bit samples are native endian `u16`s viewed as bytes
    /// - options: Dimensions, colorspace and depth of `data`
    pub fn new(data: &[u8], options: EncoderOptions) -> Result<J2kEncoder, J2kEncodeErrors> {
        J2kEncoder::new_with_parameters(data, options, J2kParameters::default())
    }

    /// Create a session for the pixels with custom parameters
    pub fn new_with_parameters(
        data: &[u8], options: EncoderOptions, parameters: J2kParameters
    ) -> Result<J2kEncoder, J2kEncodeErrors> {
        let image = check_image(data, &options)?;
        let capacity = output_capacity(image.length)
            .ok_or(J2kEncodeErrors::TooLargeDimensions(image.width.max(image.height)))?;

        J2kEncoder::with_capacity(data, image, parameters, capacity)
    }

    /// Create a session with an explicit output buffer size instead of
    /// the worst case estimate
    pub(crate) fn with_capacity(
        data: &[u8], image: CheckedImage, parameters: J2kParameters, capacity: usize
    ) -> Result<J2kEncoder, J2kEncodeErrors> {
        let CheckedImage {
            width,
            height,
            colorspace,
            depth,
            ..
        } = image;

        let buffer = StreamBufferHandle::new(MemoryStreamBuffer::new(capacity));
        trace!("Allocated {} byte output buffer", capacity);

        let stream = Stream::writer(&buffer)
            .ok_or(J2kEncodeErrors::ConfigurationFailure("could not create output stream"))?;

        // dimensions were checked to fit a u32
        let image = NativeImage::from_interleaved(
            data,
            width as u32,
            height as u32,
            colorspace,
            depth
        )
        .ok_or(J2kEncodeErrors::ConfigurationFailure("could not create codec image"))?;

        let mut encoder = J2kEncoder {
            state: SessionState::Configured,
            width,
            height,
            colorspace,
            capacity,
            parameters: J2kParameters::default(),
            codec: None,
            stream: Some(stream),
            image: Some(image),
            buffer: Some(buffer)
        };
        encoder.bind(parameters)?;

        Ok(encoder)
    }

    /// Replace the compression parameters
    ///
    /// A new compressor is created for the parameters' container format
    /// and the image is bound to it again.
    ///
    /// # Errors
    /// - `InvalidState` if the session already encoded, failed or was disposed
    /// - `InvalidParameters`/`ConfigurationFailure` if the parameters are rejected,
    ///   the previous parameters stay bound
    pub fn set_parameters(&mut self, parameters: J2kParameters) -> Result<(), J2kEncodeErrors> {
        if self.state != SessionState::Configured {
            return Err(J2kEncodeErrors::InvalidState(self.state));
        }
        self.bind(parameters)
    }

    fn bind(&mut self, parameters: J2kParameters) -> Result<(), J2kEncodeErrors> {
        parameters
            .validate()
            .map_err(J2kEncodeErrors::InvalidParameters)?;

        let image = self
            .image
            .as_mut()
            .ok_or(J2kEncodeErrors::InvalidState(self.state))?;

        let mut codec = Codec::compressor(parameters.format())
            .ok_or(J2kEncodeErrors::ConfigurationFailure("could not create compressor"))?;

        let mut native =
            NativeParameters::new(&parameters, self.width, self.height, self.colorspace);

        if i32::from(parameters.resolutions()) != native.resolutions() {
            warn!(
                "Reduced resolutions from {} to {} for a {}x{} image",
                parameters.resolutions(),
                native.resolutions(),
                self.width,
                self.height
            );
        }
        if !codec.setup(&mut native, image) {
            return Err(J2kEncodeErrors::ConfigurationFailure(
                "compressor rejected the parameters"
            ));
        }
        trace!("Bound parameters {:?}", parameters);

        // the previous compressor is released only once its replacement is set up
        self.codec = Some(codec);
        self.parameters = parameters;

        Ok(())
    }

    /// Run the compress lifecycle and return the encoded bytes
    ///
    /// This may be called once, after success or failure the session
    /// can only be disposed.
    ///
    /// # Returns
    /// - Ok(bytes): A copy of the buffer from the start up to the final
    ///   stream position
    /// - Err: The stage that failed, or `CapacityExhausted` if the output
    ///   didn't fit. No partial output is returned
    pub fn encode(&mut self) -> Result<Vec<u8>, J2kEncodeErrors> {
        if self.state != SessionState::Configured {
            return Err(J2kEncodeErrors::InvalidState(self.state));
        }
        let (Some(codec), Some(stream), Some(image), Some(buffer)) = (
            self.codec.as_mut(),
            self.stream.as_mut(),
            self.image.as_mut(),
            self.buffer.as_ref()
        ) else {
            return Err(J2kEncodeErrors::ConfigurationFailure(
                "session has no compressor bound"
            ));
        };

        self.state = SessionState::Encoding;

        let result = if !codec.start_compress(image, stream) {
            Err(EncodeStage::Start)
        } else if !codec.encode(stream) {
            Err(EncodeStage::Encode)
        } else if !codec.end_compress(stream) {
            Err(EncodeStage::Finish)
        } else {
            Ok(())
        };

        let buffer = buffer.buffer();

        match result {
            Ok(()) => {
                self.state = SessionState::Completed;
                trace!(
                    "Encoded {} bytes into a {} byte buffer",
                    buffer.position(),
                    buffer.capacity()
                );
                Ok(buffer.written().to_vec())
            }
            Err(stage) => {
                self.state = SessionState::Failed;

                if buffer.is_exhausted() {
                    Err(J2kEncodeErrors::CapacityExhausted(buffer.capacity()))
                } else {
                    Err(J2kEncodeErrors::EncodeFailed(stage))
                }
            }
        }
    }

    /// Release the compressor, stream, codec image and output buffer
    ///
    /// Calling it again does nothing
    pub fn dispose(&mut self) {
        if self.state == SessionState::Disposed {
            return;
        }
        self.codec = None;
        self.stream = None;
        self.image = None;
        self.buffer = None;

        self.state = SessionState::Disposed;
        trace!("Disposed encode session");
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn is_disposed(&self) -> bool {
        matches!(self.state, SessionState::Disposed)
    }

    /// Size of the output buffer, see [`output_capacity`](crate::output_capacity)
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub const fn parameters(&self) -> &J2kParameters {
        &self.parameters
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }
}

impl Drop for J2kEncoder {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Encode pixels in one call, creating and disposing a session
///
/// # Example
/// ```no_run
/// use zune_core::bit_depth::BitDepth;
/// use zune_core::colorspace::ColorSpace;
/// use zune_core::options::EncoderOptions;
/// use zune_jpeg2000::{encode_jpeg2000, J2kParameters};
///
/// let pixels = vec![128_u8; 32 * 32];
/// let options = EncoderOptions::new(32, 32, ColorSpace::Luma, BitDepth::Eight);
/// let codestream = encode_jpeg2000(&pixels, options, J2kParameters::default()).unwrap();
/// ```
pub fn encode_jpeg2000(
    data: &[u8], options: EncoderOptions, parameters: J2kParameters
) -> Result<Vec<u8>, J2kEncodeErrors> {
    J2kEncoder::new_with_parameters(data, options, parameters)?.encode()
}

/// Pixel layout that matched its data
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct CheckedImage {
    width:      usize,
    height:     usize,
    colorspace: ColorSpace,
    depth:      BitDepth,
    /// Raw size in bytes
    length:     usize
}

/// Validate pixels against their description
fn check_image(data: &[u8], options: &EncoderOptions) -> Result<CheckedImage, J2kEncodeErrors> {
    let (width, height) = (options.get_width(), options.get_height());

    if width == 0 {
        return Err(J2kEncodeErrors::ZeroDimension("width"));
    }
    if height == 0 {
        return Err(J2kEncodeErrors::ZeroDimension("height"));
    }
    if (width as u64) > u64::from(u32::MAX) {
        return Err(J2kEncodeErrors::TooLargeDimensions(width));
    }
    if (height as u64) > u64::from(u32::MAX) {
        return Err(J2kEncodeErrors::TooLargeDimensions(height));
    }
    let colorspace = options.get_colorspace();

    if !SUPPORTED_COLORSPACES.contains(&colorspace) {
        return Err(J2kEncodeErrors::UnsupportedColorspace(
            colorspace,
            &SUPPORTED_COLORSPACES
        ));
    }
    let depth = options.get_depth();

    if !matches!(depth, BitDepth::Eight | BitDepth::Sixteen) {
        return Err(J2kEncodeErrors::UnsupportedDepth(depth));
    }
    let expected = width
        .checked_mul(height)
        .and_then(|x| x.checked_mul(colorspace.num_components()))
        .and_then(|x| x.checked_mul(depth.size_of()))
        .ok_or(J2kEncodeErrors::TooLargeDimensions(width.max(height)))?;

    if data.len() != expected {
        return Err(J2kEncodeErrors::LengthMismatch(expected, data.len()));
    }
    Ok(CheckedImage {
        width,
        height,
        colorspace,
        depth,
        length: expected
    })
}
