/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Compression parameters for the JPEG 2000 encoder
//!
//! These are passed through to the codec when a session binds its image,
//! see [`J2kEncoder::set_parameters`](crate::J2kEncoder::set_parameters)

/// Maximum number of quality layers the codec accepts
pub const MAX_QUALITY_LAYERS: u16 = 100;
/// Maximum number of resolutions the codec accepts
pub const MAX_RESOLUTIONS: u8 = 33;

/// Container the encoded image is written in
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum J2kFormat {
    /// A raw codestream, starting with the SOC marker
    #[default]
    J2k,
    /// A JP2 file, the codestream is wrapped in a `jp2c` box
    Jp2
}

impl J2kFormat {
    /// Guess the container from a file extension, anything that
    /// isn't `jp2` is a raw codestream
    pub fn from_extension(extension: &str) -> J2kFormat {
        if extension.eq_ignore_ascii_case("jp2") {
            J2kFormat::Jp2
        } else {
            J2kFormat::J2k
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            J2kFormat::J2k => "j2k",
            J2kFormat::Jp2 => "jp2"
        }
    }
}

/// How quality layers are allocated
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum AllocationMode {
    /// Rate-distortion allocation, layer targets are compression ratios.
    ///
    /// A single target of zero (or no targets) means lossless
    #[default]
    RateDistortion,
    /// Fixed quality allocation, layer targets are PSNR values in dB
    FixedQuality
}

/// Options for the JPEG 2000 encoder
///
/// Defaults produce one quality layer with rate-distortion allocation
/// enabled and a reversible transform, i.e. a lossless codestream.
///
/// # Example
/// - Three progressively refined layers at 40:1, 20:1 and 10:1
/// ```
/// use zune_jpeg2000::J2kParameters;
///
/// let parameters = J2kParameters::default()
///     .set_quality_layers(3)
///     .set_layer_targets(vec![40.0, 20.0, 10.0]);
/// assert_eq!(parameters.quality_layers(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct J2kParameters {
    format:         J2kFormat,
    quality_layers: u16,
    allocation:     AllocationMode,
    layer_targets:  Vec<f32>,
    resolutions:    u8,
    irreversible:   bool,
    mct:            Option<bool>,
    tile_size:      Option<(u32, u32)>,
    comment:        Option<String>
}

impl Default for J2kParameters {
    fn default() -> Self {
        J2kParameters {
            format:         J2kFormat::J2k,
            quality_layers: 1,
            allocation:     AllocationMode::RateDistortion,
            layer_targets:  Vec::new(),
            resolutions:    6,
            irreversible:   false,
            mct:            None,
            tile_size:      None,
            comment:        None
        }
    }
}

impl J2kParameters {
    pub const fn format(&self) -> J2kFormat {
        self.format
    }

    pub const fn quality_layers(&self) -> u16 {
        self.quality_layers
    }

    pub const fn allocation(&self) -> AllocationMode {
        self.allocation
    }

    pub fn layer_targets(&self) -> &[f32] {
        &self.layer_targets
    }

    /// Requested number of resolutions, the encoder may use fewer for
    /// small images
    pub const fn resolutions(&self) -> u8 {
        self.resolutions
    }

    pub const fn irreversible(&self) -> bool {
        self.irreversible
    }

    pub const fn mct(&self) -> Option<bool> {
        self.mct
    }

    pub const fn tile_size(&self) -> Option<(u32, u32)> {
        self.tile_size
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Set the container to write
    pub fn set_format(mut self, format: J2kFormat) -> Self {
        self.format = format;
        self
    }

    /// Set number of quality layers, clamped to `1..=100`
    pub fn set_quality_layers(mut self, layers: u16) -> Self {
        self.quality_layers = layers.clamp(1, MAX_QUALITY_LAYERS);
        self
    }

    pub fn set_allocation(mut self, allocation: AllocationMode) -> Self {
        self.allocation = allocation;
        self
    }

    /// Set the per layer targets
    ///
    /// Either empty or one entry per quality layer. For rate-distortion
    /// allocation ratios should decrease from layer to layer, for fixed
    /// quality PSNR values should increase.
    pub fn set_layer_targets(mut self, targets: Vec<f32>) -> Self {
        self.layer_targets = targets;
        self
    }

    /// Set number of resolutions, clamped to `1..=33`
    pub fn set_resolutions(mut self, resolutions: u8) -> Self {
        self.resolutions = resolutions.clamp(1, MAX_RESOLUTIONS);
        self
    }

    /// Use the irreversible 9/7 wavelet instead of the reversible 5/3 one
    pub fn set_irreversible(mut self, yes: bool) -> Self {
        self.irreversible = yes;
        self
    }

    /// Force the multi component transform on or off.
    ///
    /// `None` enables it for images with three or more color channels
    pub fn set_mct(mut self, mct: Option<bool>) -> Self {
        self.mct = mct;
        self
    }

    pub fn set_tile_size(mut self, tile_size: Option<(u32, u32)>) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Text for the COM marker, `None` lets the codec write its own
    pub fn set_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// Check parameters that the codec would otherwise reject with a
    /// vague message
    pub(crate) fn validate(&self) -> Result<(), String> {
        let targets = self.layer_targets.len();

        if targets != 0 && targets != usize::from(self.quality_layers) {
            return Err(format!(
                "{targets} layer targets given for {} quality layers",
                self.quality_layers
            ));
        }
        if self.layer_targets.iter().any(|x| !x.is_finite() || *x < 0.0) {
            return Err("layer targets must be finite and non-negative".to_string());
        }
        if let Some((w, h)) = self.tile_size {
            if w == 0 || h == 0 {
                return Err(format!("tile size {w}x{h} has a zero dimension"));
            }
            if w > i32::MAX as u32 || h > i32::MAX as u32 {
                return Err(format!("tile size {w}x{h} is too large"));
            }
        }
        if let Some(comment) = &self.comment {
            if comment.as_bytes().contains(&0) {
                return Err("comment contains a nul byte".to_string());
            }
        }
        Ok(())
    }

    /// Resolutions the codec can use for an image of this size
    ///
    /// The smallest resolution must keep at least one sample in each
    /// direction, so `2^(resolutions-1)` can't exceed the smaller dimension
    pub(crate) fn effective_resolutions(&self, width: usize, height: usize) -> u8 {
        let (w, h) = match self.tile_size {
            Some((tw, th)) => (width.min(tw as usize), height.min(th as usize)),
            None => (width, height)
        };
        let smallest = w.min(h).max(1);
        // floor(log2(smallest)) + 1
        let max_for_size = (usize::BITS - smallest.leading_zeros()) as u8;

        self.resolutions.min(max_for_size).max(1)
    }
}
