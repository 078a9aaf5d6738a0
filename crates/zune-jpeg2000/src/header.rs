/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Main header inspection for encoded output
//!
//! This reads the markers before the first tile of a codestream, enough to
//! tell dimensions, components and coding style without decoding any
//! pixels.
use zune_core::bytestream::ZByteReader;

use crate::errors::J2kHeaderErrors;
use crate::options::J2kFormat;

const SOC: u16 = 0xFF4F;
const SIZ: u16 = 0xFF51;
const COD: u16 = 0xFF52;
const COM: u16 = 0xFF64;
const SOT: u16 = 0xFF90;
const EOC: u16 = 0xFFD9;

const JP2_SIGNATURE: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A
];
const JP2C: [u8; 4] = *b"jp2c";

/// Information about one image component from the SIZ segment
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ComponentInfo {
    /// Bits per sample
    pub precision: u8,
    pub signed:    bool,
    /// Horizontal subsampling
    pub dx:        u8,
    /// Vertical subsampling
    pub dy:        u8
}

/// Main header contents of a codestream
#[derive(Clone, Debug, PartialEq)]
pub struct CodestreamInfo {
    pub format:               J2kFormat,
    pub width:                u32,
    pub height:               u32,
    pub tile_width:           u32,
    pub tile_height:          u32,
    pub components:           Vec<ComponentInfo>,
    /// Progression order, 0 is LRCP
    pub progression:          u8,
    pub quality_layers:       u16,
    pub mct:                  bool,
    pub decomposition_levels: u8,
    /// Whether the 5/3 reversible wavelet is used
    pub reversible:           bool,
    pub comment:              Option<String>,
    /// Whether the codestream is terminated by an EOC marker
    pub has_eoc:              bool
}

impl CodestreamInfo {
    pub fn num_components(&self) -> usize {
        self.components.len()
    }
}

/// Read the main header of a J2K codestream or JP2 file
///
/// # Example
/// ```no_run
/// use zune_jpeg2000::probe;
///
/// let data = std::fs::read("image.j2k").unwrap();
/// let info = probe(&data).unwrap();
/// println!("{}x{} with {} components", info.width, info.height, info.num_components());
/// ```
pub fn probe(data: &[u8]) -> Result<CodestreamInfo, J2kHeaderErrors> {
    if data.starts_with(&JP2_SIGNATURE) {
        let codestream = find_codestream_box(data)?;
        let mut info = probe_codestream(codestream)?;
        info.format = J2kFormat::Jp2;

        return Ok(info);
    }
    probe_codestream(data)
}

/// Walk top level JP2 boxes and return the contents of `jp2c`
fn find_codestream_box(data: &[u8]) -> Result<&[u8], J2kHeaderErrors> {
    let mut reader = ZByteReader::new(data);

    while reader.remaining() >= 8 {
        let start = reader.get_position();
        let length = u64::from(reader.get_u32_be_err()?);
        let box_type = reader.get_u32_be_err()?;

        let length = match length {
            // extends to the end of the file
            0 => (data.len() - start) as u64,
            1 => reader.get_u64_be_err()?,
            _ => length
        };
        let header_len = (reader.get_position() - start) as u64;

        if length < header_len {
            return Err(J2kHeaderErrors::Generic("JP2 box shorter than its header"));
        }
        let contents_len = usize::try_from(length - header_len)
            .map_err(|_| J2kHeaderErrors::Generic("JP2 box too large"))?;
        let contents_start = reader.get_position();

        ensure_bytes(&reader, contents_len)?;
        reader.skip(contents_len);

        if box_type == u32::from_be_bytes(JP2C) {
            return Ok(&data[contents_start..contents_start + contents_len]);
        }
    }
    Err(J2kHeaderErrors::NoCodestreamBox)
}

/// Fail with the sizes involved when fewer than `len` bytes are left
fn ensure_bytes(reader: &ZByteReader<&[u8]>, len: usize) -> Result<(), J2kHeaderErrors> {
    if !reader.has(len) {
        return Err(J2kHeaderErrors::InsufficientData(len, reader.remaining()));
    }
    Ok(())
}

fn probe_codestream(data: &[u8]) -> Result<CodestreamInfo, J2kHeaderErrors> {
    let mut reader = ZByteReader::new(data);

    if reader.get_u16_be_err()? != SOC {
        return Err(J2kHeaderErrors::NoSocMarker);
    }
    if reader.get_u16_be_err()? != SIZ {
        return Err(J2kHeaderErrors::NoSizMarker);
    }
    let lsiz = usize::from(reader.get_u16_be_err()?);

    // Rsiz up to Csiz, before the per component triplets
    if lsiz < 38 {
        return Err(J2kHeaderErrors::Generic("SIZ segment too short"));
    }
    ensure_bytes(&reader, lsiz - 2)?;

    let _rsiz = reader.get_u16_be_err()?;
    let x_siz = reader.get_u32_be_err()?;
    let y_siz = reader.get_u32_be_err()?;
    let x_offset = reader.get_u32_be_err()?;
    let y_offset = reader.get_u32_be_err()?;
    let tile_width = reader.get_u32_be_err()?;
    let tile_height = reader.get_u32_be_err()?;
    let _tile_x_offset = reader.get_u32_be_err()?;
    let _tile_y_offset = reader.get_u32_be_err()?;
    let num_components = reader.get_u16_be_err()?;

    if x_offset > x_siz || y_offset > y_siz {
        return Err(J2kHeaderErrors::Generic("image offset larger than image size"));
    }
    if lsiz != 38 + 3 * usize::from(num_components) {
        return Err(J2kHeaderErrors::Generic("SIZ length does not match its components"));
    }
    let mut components = Vec::with_capacity(usize::from(num_components));

    for _ in 0..num_components {
        let ssiz = reader.get_u8_err()?;
        let dx = reader.get_u8_err()?;
        let dy = reader.get_u8_err()?;

        components.push(ComponentInfo {
            precision: (ssiz & 0x7F) + 1,
            signed: ssiz & 0x80 != 0,
            dx,
            dy
        });
    }
    let mut info = CodestreamInfo {
        format: J2kFormat::J2k,
        width: x_siz - x_offset,
        height: y_siz - y_offset,
        tile_width,
        tile_height,
        components,
        progression: 0,
        quality_layers: 0,
        mct: false,
        decomposition_levels: 0,
        reversible: false,
        comment: None,
        has_eoc: data.ends_with(&EOC.to_be_bytes())
    };

    // remaining main header markers, up to the first tile
    loop {
        let marker = reader.get_u16_be_err()?;

        if marker == SOT || marker == EOC {
            break;
        }
        let length = usize::from(reader.get_u16_be_err()?);

        if length < 2 {
            return Err(J2kHeaderErrors::Generic("marker segment length below 2"));
        }
        ensure_bytes(&reader, length - 2)?;
        let segment = reader.get(length - 2)?;

        match marker {
            COD => read_cod(segment, &mut info)?,
            COM if info.comment.is_none() => info.comment = read_com(segment)?,
            _ => ()
        }
    }
    Ok(info)
}

fn read_cod(segment: &[u8], info: &mut CodestreamInfo) -> Result<(), J2kHeaderErrors> {
    let mut reader = ZByteReader::new(segment);

    let _scod = reader.get_u8_err()?;
    info.progression = reader.get_u8_err()?;
    info.quality_layers = reader.get_u16_be_err()?;
    info.mct = reader.get_u8_err()? != 0;
    info.decomposition_levels = reader.get_u8_err()?;
    // code block width, height and style
    reader.skip(3);
    info.reversible = reader.get_u8_err()? == 1;

    Ok(())
}

fn read_com(segment: &[u8]) -> Result<Option<String>, J2kHeaderErrors> {
    let mut reader = ZByteReader::new(segment);
    // 1 = Latin-1 text, 0 = binary
    let registration = reader.get_u16_be_err()?;

    if registration != 1 {
        return Ok(None);
    }
    let text = reader.remaining_bytes();

    Ok(Some(text.iter().map(|c| char::from(*c)).collect()))
}
