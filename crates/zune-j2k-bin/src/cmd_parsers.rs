/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::ArgMatches;
use log::{info, Level};
use zune_jpeg2000::{AllocationMode, J2kParameters};

use crate::cmd_args::{FormatArg, Toggle};
use crate::errors::CliErrors;

/// Set up logging options
pub fn setup_logger(options: &ArgMatches) {
    let log_level = if options.get_flag("debug") {
        Level::Debug
    } else if options.get_flag("trace") {
        Level::Trace
    } else if options.get_flag("warn") {
        Level::Warn
    } else if options.get_flag("info") {
        Level::Info
    } else {
        Level::Warn
    };

    if simple_logger::init_with_level(log_level).is_err() {
        // a logger is already installed, keep it
        return;
    }

    info!("Initialized logger");
    info!("Log level :{}", log_level);
}

/// Build encoder parameters from the encoding arguments
///
/// The container format is left at its default when `--format` is absent,
/// the workflow picks it per output file.
pub fn parse_parameters(options: &ArgMatches) -> Result<J2kParameters, CliErrors> {
    let mut parameters = J2kParameters::default();

    if let Some(format) = options.get_one::<FormatArg>("format") {
        info!("Output format forced to {:?}", format);
        parameters = parameters.set_format(format.to_format());
    }

    let targets: Vec<f32> = options
        .get_many::<f32>("targets")
        .map(|values| values.copied().collect())
        .unwrap_or_default();

    // layers default to the number of targets when only targets are given
    let layers = match options.get_one::<u16>("layers") {
        Some(layers) => *layers,
        None => u16::try_from(targets.len().max(1)).unwrap_or(u16::MAX)
    };
    info!("Quality layers: {}", layers);
    parameters = parameters.set_quality_layers(layers);

    if !targets.is_empty() {
        info!("Layer targets: {:?}", targets);
        parameters = parameters.set_layer_targets(targets);
    }
    if options.get_flag("fixed-quality") {
        parameters = parameters.set_allocation(AllocationMode::FixedQuality);
    }
    if let Some(resolutions) = options.get_one::<u8>("resolutions") {
        parameters = parameters.set_resolutions(*resolutions);
    }
    if options.get_flag("irreversible") {
        parameters = parameters.set_irreversible(true);
    }
    if let Some(mct) = options.get_one::<Toggle>("mct") {
        parameters = parameters.set_mct(Some(mct.is_on()));
    }
    if let Some(tile) = options.get_one::<String>("tile") {
        parameters = parameters.set_tile_size(Some(parse_tile_size(tile)?));
    }
    if let Some(comment) = options.get_one::<String>("comment") {
        parameters = parameters.set_comment(Some(comment.clone()));
    }
    Ok(parameters)
}

/// Parse `WIDTHxHEIGHT`, a single number means a square tile
fn parse_tile_size(value: &str) -> Result<(u32, u32), CliErrors> {
    let invalid = || CliErrors::InvalidArgument(format!("tile size `{value}`"));

    let mut parts = value.split(['x', 'X']);
    let width = parts.next().ok_or_else(invalid)?;
    let height = parts.next().unwrap_or(width);

    if parts.next().is_some() {
        return Err(invalid());
    }
    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;

    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}
