/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Owned handles around the OpenJPEG objects used by a session
//!
//! Each handle destroys its object on drop, so a session releases
//! everything it acquired however it exits.
use core::ffi::{c_char, c_void, CStr};
use core::ptr::NonNull;
use std::ffi::CString;

use openjpeg_sys as opj;
use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;
use zune_core::log::{error, trace, warn};

use crate::options::{AllocationMode, J2kFormat, J2kParameters};
use crate::stream::{stream_seek, stream_skip, stream_write, StreamBufferHandle};

/// Size of the codec's internal staging buffer in front of our callbacks
const STREAM_CHUNK_SIZE: usize = 1 << 20;

unsafe extern "C" fn log_info(msg: *const c_char, _client_data: *mut c_void) {
    if let Some(msg) = message(msg) {
        trace!("openjpeg: {}", msg);
    }
}

unsafe extern "C" fn log_warning(msg: *const c_char, _client_data: *mut c_void) {
    if let Some(msg) = message(msg) {
        warn!("openjpeg: {}", msg);
    }
}

unsafe extern "C" fn log_error(msg: *const c_char, _client_data: *mut c_void) {
    if let Some(msg) = message(msg) {
        error!("openjpeg: {}", msg);
    }
}

unsafe fn message(msg: *const c_char) -> Option<String> {
    if msg.is_null() {
        return None;
    }
    let msg = CStr::from_ptr(msg).to_string_lossy();
    Some(msg.trim_end().to_string())
}

/// A compressor instance for one container format
pub(crate) struct Codec {
    ptr: NonNull<opj::opj_codec_t>
}

impl Codec {
    /// Create a compressor and route its messages to the logger
    pub fn compressor(format: J2kFormat) -> Option<Codec> {
        let codec_format = match format {
            J2kFormat::J2k => opj::CODEC_FORMAT::OPJ_CODEC_J2K,
            J2kFormat::Jp2 => opj::CODEC_FORMAT::OPJ_CODEC_JP2
        };
        let ptr = NonNull::new(unsafe { opj::opj_create_compress(codec_format) })?;

        unsafe {
            opj::opj_set_info_handler(ptr.as_ptr(), Some(log_info), core::ptr::null_mut());
            opj::opj_set_warning_handler(ptr.as_ptr(), Some(log_warning), core::ptr::null_mut());
            opj::opj_set_error_handler(ptr.as_ptr(), Some(log_error), core::ptr::null_mut());
        }
        trace!("Created {:?} compressor", format);

        Some(Codec { ptr })
    }

    /// Bind parameters and image to the compressor
    pub fn setup(&mut self, parameters: &mut NativeParameters, image: &mut NativeImage) -> bool {
        let ok = unsafe {
            opj::opj_setup_encoder(self.ptr.as_ptr(), &mut parameters.raw, image.ptr.as_ptr())
        };
        ok != 0
    }

    pub fn start_compress(&mut self, image: &mut NativeImage, stream: &mut Stream) -> bool {
        let ok = unsafe {
            opj::opj_start_compress(self.ptr.as_ptr(), image.ptr.as_ptr(), stream.ptr.as_ptr())
        };
        ok != 0
    }

    pub fn encode(&mut self, stream: &mut Stream) -> bool {
        unsafe { opj::opj_encode(self.ptr.as_ptr(), stream.ptr.as_ptr()) != 0 }
    }

    pub fn end_compress(&mut self, stream: &mut Stream) -> bool {
        unsafe { opj::opj_end_compress(self.ptr.as_ptr(), stream.ptr.as_ptr()) != 0 }
    }
}

impl Drop for Codec {
    fn drop(&mut self) {
        unsafe { opj::opj_destroy_codec(self.ptr.as_ptr()) }
    }
}

/// An output stream whose callbacks write into a [`StreamBufferHandle`]
///
/// The stream only borrows the buffer through its user data pointer, it
/// must be dropped before the handle.
pub(crate) struct Stream {
    ptr: NonNull<opj::opj_stream_t>
}

impl Stream {
    pub fn writer(buffer: &StreamBufferHandle) -> Option<Stream> {
        let capacity = buffer.buffer().capacity();
        let chunk_size = capacity.clamp(1, STREAM_CHUNK_SIZE);

        // 0: output stream
        let ptr = NonNull::new(unsafe { opj::opj_stream_create(chunk_size, 0) })?;

        unsafe {
            // no free function, the session owns the buffer
            opj::opj_stream_set_user_data(ptr.as_ptr(), buffer.user_data(), None);
            opj::opj_stream_set_user_data_length(ptr.as_ptr(), capacity as u64);
            opj::opj_stream_set_write_function(ptr.as_ptr(), Some(stream_write));
            opj::opj_stream_set_seek_function(ptr.as_ptr(), Some(stream_seek));
            opj::opj_stream_set_skip_function(ptr.as_ptr(), Some(stream_skip));
        }
        Some(Stream { ptr })
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        unsafe { opj::opj_stream_destroy(self.ptr.as_ptr()) }
    }
}

/// Codec image built from interleaved pixels
///
/// The codec stores one `i32` plane per component, the interleaved
/// samples are split into those planes on creation.
pub(crate) struct NativeImage {
    ptr: NonNull<opj::opj_image_t>
}

impl NativeImage {
    /// Create the image, `pixels` must already be validated against the
    /// dimensions, colorspace and depth
    pub fn from_interleaved(
        pixels: &[u8], width: u32, height: u32, colorspace: ColorSpace, depth: BitDepth
    ) -> Option<NativeImage> {
        let num_components = colorspace.num_components();
        let precision: u32 = match depth {
            BitDepth::Sixteen => 16,
            _ => 8
        };
        let mut component_params: Vec<opj::opj_image_cmptparm_t> = (0..num_components)
            .map(|_| {
                // plain C struct, all zero is a valid starting point
                let mut param: opj::opj_image_cmptparm_t = unsafe { core::mem::zeroed() };
                param.dx = 1;
                param.dy = 1;
                param.w = width;
                param.h = height;
                param.x0 = 0;
                param.y0 = 0;
                param.prec = precision;
                param.sgnd = 0;
                param
            })
            .collect();

        let ptr = NonNull::new(unsafe {
            opj::opj_image_create(
                num_components as u32,
                component_params.as_mut_ptr(),
                color_space(colorspace)
            )
        })?;
        // take ownership first so the image is released if a plane is missing
        let image = NativeImage { ptr };

        let raw = unsafe { &mut *image.ptr.as_ptr() };
        raw.x0 = 0;
        raw.y0 = 0;
        raw.x1 = width;
        raw.y1 = height;

        if raw.comps.is_null() {
            return None;
        }
        let components = unsafe { core::slice::from_raw_parts_mut(raw.comps, num_components) };
        let plane_len = width as usize * height as usize;
        let alpha_index = alpha_channel(colorspace);

        for (index, component) in components.iter_mut().enumerate() {
            if component.data.is_null() {
                return None;
            }
            if alpha_index == Some(index) {
                component.alpha = 1;
            }
            let plane = unsafe { core::slice::from_raw_parts_mut(component.data, plane_len) };

            match depth {
                BitDepth::Sixteen => {
                    let stride = num_components * 2;
                    for (sample, pixel) in plane.iter_mut().zip(pixels.chunks_exact(stride)) {
                        let offset = index * 2;
                        *sample = i32::from(u16::from_ne_bytes([pixel[offset], pixel[offset + 1]]));
                    }
                }
                _ => {
                    for (sample, pixel) in plane.iter_mut().zip(pixels.chunks_exact(num_components))
                    {
                        *sample = i32::from(pixel[index]);
                    }
                }
            }
        }
        trace!(
            "Created {}x{} image with {} components of {} bits",
            width,
            height,
            num_components,
            precision
        );
        Some(image)
    }
}

impl Drop for NativeImage {
    fn drop(&mut self) {
        unsafe { opj::opj_image_destroy(self.ptr.as_ptr()) }
    }
}

fn color_space(colorspace: ColorSpace) -> opj::COLOR_SPACE {
    match colorspace {
        ColorSpace::Luma | ColorSpace::LumaA => opj::COLOR_SPACE::OPJ_CLRSPC_GRAY,
        ColorSpace::RGB | ColorSpace::RGBA => opj::COLOR_SPACE::OPJ_CLRSPC_SRGB,
        ColorSpace::YCbCr => opj::COLOR_SPACE::OPJ_CLRSPC_SYCC,
        ColorSpace::CMYK => opj::COLOR_SPACE::OPJ_CLRSPC_CMYK,
        _ => opj::COLOR_SPACE::OPJ_CLRSPC_UNSPECIFIED
    }
}

/// Index of the alpha sample in an interleaved pixel
fn alpha_channel(colorspace: ColorSpace) -> Option<usize> {
    match colorspace {
        ColorSpace::LumaA => Some(1),
        ColorSpace::RGBA => Some(3),
        _ => None
    }
}

/// Codec encoder parameters, codec defaults with a session's
/// [`J2kParameters`] applied on top
pub(crate) struct NativeParameters {
    raw:      opj::opj_cparameters_t,
    // cp_comment points into this, keep it alive as long as `raw`
    _comment: Option<CString>
}

impl NativeParameters {
    pub fn new(
        parameters: &J2kParameters, width: usize, height: usize, colorspace: ColorSpace
    ) -> NativeParameters {
        // SAFETY: opj_cparameters_t is a plain C struct, the codec fills
        // every field with its defaults below
        let mut raw: opj::opj_cparameters_t = unsafe { core::mem::zeroed() };
        unsafe { opj::opj_set_default_encoder_parameters(&mut raw) };

        let layers = usize::from(parameters.quality_layers());
        raw.tcp_numlayers = layers as i32;

        let targets = parameters.layer_targets();
        match parameters.allocation() {
            AllocationMode::RateDistortion => {
                raw.cp_disto_alloc = 1;
                raw.cp_fixed_quality = 0;
                for (rate, target) in raw.tcp_rates.iter_mut().zip(targets) {
                    *rate = *target;
                }
            }
            AllocationMode::FixedQuality => {
                raw.cp_disto_alloc = 0;
                raw.cp_fixed_quality = 1;
                for (ratio, target) in raw.tcp_distoratio.iter_mut().zip(targets) {
                    *ratio = *target;
                }
            }
        }
        raw.numresolution = i32::from(parameters.effective_resolutions(width, height));
        raw.irreversible = i32::from(parameters.irreversible());

        let color_channels =
            colorspace.num_components() - usize::from(alpha_channel(colorspace).is_some());
        let mct = parameters.mct().unwrap_or(color_channels >= 3);
        // the transform needs three components to work on
        raw.tcp_mct = u8::from(mct && colorspace.num_components() >= 3) as _;

        if let Some((tile_width, tile_height)) = parameters.tile_size() {
            raw.tile_size_on = 1;
            raw.cp_tdx = tile_width as i32;
            raw.cp_tdy = tile_height as i32;
        }
        let comment = parameters
            .comment()
            .and_then(|text| CString::new(text).ok());

        if let Some(text) = &comment {
            raw.cp_comment = text.as_ptr().cast_mut();
        }
        NativeParameters {
            raw,
            _comment: comment
        }
    }

    pub const fn resolutions(&self) -> i32 {
        self.raw.numresolution
    }
}
