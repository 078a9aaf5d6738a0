/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoding encoded output with OpenJPEG's own decompressor
//!
//! Tests compare these planes with the pixels that went in, so a broken
//! codestream body fails even when its headers look right.
use core::ffi::c_void;
use core::ptr;

use openjpeg_sys as opj;
use zune_core::bit_depth::BitDepth;

const JP2_SIGNATURE: [u8; 12] = [0, 0, 0, 12, b'j', b'P', b' ', b' ', 13, 10, 135, 10];

/// An image as the decoder returned it, one plane per component
pub struct DecodedPlanes {
    pub width:     usize,
    pub height:    usize,
    pub precision: Vec<u32>,
    pub planes:    Vec<Vec<i32>>
}

impl DecodedPlanes {
    pub fn num_components(&self) -> usize {
        self.planes.len()
    }

    /// Index of the first sample that differs from interleaved `pixels`
    pub fn first_mismatch(&self, pixels: &[u8], depth: BitDepth) -> Option<usize> {
        let components = self.num_components();

        let samples: Vec<i32> = match depth {
            BitDepth::Sixteen => pixels
                .chunks_exact(2)
                .map(|x| i32::from(u16::from_ne_bytes([x[0], x[1]])))
                .collect(),
            _ => pixels.iter().map(|x| i32::from(*x)).collect()
        };
        if samples.len() != self.width * self.height * components {
            return Some(0);
        }
        samples
            .iter()
            .enumerate()
            .position(|(i, sample)| self.planes[i % components][i / components] != *sample)
    }
}

struct Source<'a> {
    data:     &'a [u8],
    position: usize
}

unsafe extern "C" fn source_read(buffer: *mut c_void, len: usize, user_data: *mut c_void) -> usize {
    let source = &mut *user_data.cast::<Source>();
    let count = len.min(source.data.len() - source.position);

    if count == 0 {
        // (OPJ_SIZE_T)-1 is end of stream
        return usize::MAX;
    }
    ptr::copy_nonoverlapping(
        source.data.as_ptr().add(source.position),
        buffer.cast::<u8>(),
        count
    );
    source.position += count;
    count
}

unsafe extern "C" fn source_skip(offset: i64, user_data: *mut c_void) -> i64 {
    let source = &mut *user_data.cast::<Source>();
    let target = (source.position as i64)
        .saturating_add(offset)
        .clamp(0, source.data.len() as i64);
    let skipped = target - source.position as i64;

    source.position = target as usize;
    skipped
}

unsafe extern "C" fn source_seek(offset: i64, user_data: *mut c_void) -> i32 {
    let source = &mut *user_data.cast::<Source>();

    if offset < 0 || offset as usize > source.data.len() {
        return 0;
    }
    source.position = offset as usize;
    1
}

/// Decode a J2K codestream or JP2 file, `None` if the decoder rejects it
pub fn decode(data: &[u8]) -> Option<DecodedPlanes> {
    let format = if data.starts_with(&JP2_SIGNATURE) {
        opj::CODEC_FORMAT::OPJ_CODEC_JP2
    } else {
        opj::CODEC_FORMAT::OPJ_CODEC_J2K
    };
    let mut source = Source { data, position: 0 };

    unsafe {
        let codec = opj::opj_create_decompress(format);

        if codec.is_null() {
            return None;
        }
        // 1: input stream
        let stream = opj::opj_stream_create(data.len().clamp(1, 1 << 20), 1);

        if stream.is_null() {
            opj::opj_destroy_codec(codec);
            return None;
        }
        opj::opj_stream_set_user_data(stream, ptr::addr_of_mut!(source).cast(), None);
        opj::opj_stream_set_user_data_length(stream, data.len() as u64);
        opj::opj_stream_set_read_function(stream, Some(source_read));
        opj::opj_stream_set_skip_function(stream, Some(source_skip));
        opj::opj_stream_set_seek_function(stream, Some(source_seek));

        let mut parameters: opj::opj_dparameters_t = core::mem::zeroed();
        opj::opj_set_default_decoder_parameters(&mut parameters);

        let mut image: *mut opj::opj_image_t = ptr::null_mut();

        let ok = opj::opj_setup_decoder(codec, &mut parameters) != 0
            && opj::opj_read_header(stream, codec, &mut image) != 0
            && opj::opj_decode(codec, stream, image) != 0
            && opj::opj_end_decompress(codec, stream) != 0;

        let planes = if ok { copy_planes(image) } else { None };

        if !image.is_null() {
            opj::opj_image_destroy(image);
        }
        opj::opj_stream_destroy(stream);
        opj::opj_destroy_codec(codec);

        planes
    }
}

unsafe fn copy_planes(image: *const opj::opj_image_t) -> Option<DecodedPlanes> {
    let image = image.as_ref()?;
    let components = core::slice::from_raw_parts(image.comps, image.numcomps as usize);

    let first = components.first()?;
    let (width, height) = (first.w as usize, first.h as usize);

    let mut precision = Vec::with_capacity(components.len());
    let mut planes = Vec::with_capacity(components.len());

    for component in components {
        if component.data.is_null() || (component.w, component.h) != (first.w, first.h) {
            return None;
        }
        precision.push(component.prec);
        planes.push(core::slice::from_raw_parts(component.data, width * height).to_vec());
    }
    Some(DecodedPlanes {
        width,
        height,
        precision,
        planes
    })
}
