/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::builder::PossibleValue;
use clap::{value_parser, Arg, ArgAction, Command, ValueEnum};
use zune_jpeg2000::{J2kFormat, MAX_QUALITY_LAYERS, MAX_RESOLUTIONS};

static TARGETS_HELP: &str = "Comma separated targets, one per quality layer

With rate allocation each target is a compression ratio, e.g 40,20,10
produces three layers at 1:40, 1:20 and 1:10.
With --fixed-quality each target is a PSNR in dB.
A target of 0 means lossless.";

static TILE_HELP: &str = "Split the image into tiles of WIDTHxHEIGHT pixels

By default the whole image is one tile.";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum FormatArg {
    J2k,
    Jp2
}

impl FormatArg {
    pub const fn to_format(self) -> J2kFormat {
        match self {
            FormatArg::J2k => J2kFormat::J2k,
            FormatArg::Jp2 => J2kFormat::Jp2
        }
    }
}

impl ValueEnum for FormatArg {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::J2k, Self::Jp2]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::J2k => PossibleValue::new("j2k").help("Raw codestream"),
            Self::Jp2 => PossibleValue::new("jp2").help("JP2 file format")
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Toggle {
    On,
    Off
}

impl Toggle {
    pub const fn is_on(self) -> bool {
        matches!(self, Toggle::On)
    }
}

impl ValueEnum for Toggle {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::On, Self::Off]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::On => PossibleValue::new("on"),
            Self::Off => PossibleValue::new("off")
        })
    }
}

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("zune-j2k")
        .about("Encode JPEG, PNG and PPM images to JPEG 2000")
        .arg(Arg::new("in")
            .short('i')
            .help("Input file to read data from")
            .long("input")
            .action(ArgAction::Append)
            .required(true))
        .arg(Arg::new("out")
            .short('o')
            .help("Output to write the data to")
            .long("output")
            .action(ArgAction::Append)
            .required(true))
        .arg(Arg::new("probe")
            .long("probe")
            .action(ArgAction::SetTrue)
            .help("Print the header of every written file as json"))
        .arg(Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display debug information and higher"))
        .arg(Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display very verbose information"))
        .arg(Arg::new("warn")
            .long("warn")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display warnings and errors"))
        .arg(Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display information about the encoding options"))
        .arg(Arg::new("format")
            .long("format")
            .help_heading("ENCODING")
            .help("Output container, guessed from the output extension if absent")
            .value_parser(value_parser!(FormatArg)))
        .arg(Arg::new("layers")
            .long("layers")
            .help_heading("ENCODING")
            .help("Number of quality layers")
            .value_parser(value_parser!(u16).range(1..=i64::from(MAX_QUALITY_LAYERS))))
        .arg(Arg::new("targets")
            .long("targets")
            .help_heading("ENCODING")
            .help("Per layer compression targets")
            .long_help(TARGETS_HELP)
            .value_delimiter(',')
            .action(ArgAction::Append)
            .value_parser(value_parser!(f32)))
        .arg(Arg::new("fixed-quality")
            .long("fixed-quality")
            .help_heading("ENCODING")
            .action(ArgAction::SetTrue)
            .help("Treat targets as PSNR values instead of compression ratios"))
        .arg(Arg::new("resolutions")
            .long("resolutions")
            .help_heading("ENCODING")
            .help("Number of wavelet resolutions")
            .value_parser(value_parser!(u8).range(1..=i64::from(MAX_RESOLUTIONS))))
        .arg(Arg::new("irreversible")
            .long("irreversible")
            .help_heading("ENCODING")
            .action(ArgAction::SetTrue)
            .help("Use the lossy 9/7 wavelet"))
        .arg(Arg::new("mct")
            .long("mct")
            .help_heading("ENCODING")
            .help("Force the multi component transform on or off")
            .value_parser(value_parser!(Toggle)))
        .arg(Arg::new("tile")
            .long("tile")
            .help_heading("ENCODING")
            .help("Tile size as WIDTHxHEIGHT")
            .long_help(TILE_HELP))
        .arg(Arg::new("comment")
            .long("comment")
            .help_heading("ENCODING")
            .help("Comment stored in the codestream"))
}
