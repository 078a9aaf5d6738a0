/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::path::Path;
use std::time::Instant;

use clap::ArgMatches;
use log::{debug, info};
use zune_jpeg2000::{J2kEncoder, J2kFormat, J2kParameters};

use crate::errors::CliErrors;
use crate::file_io::decode_image;
use crate::probe_files::probe_encoded;

/// Decode every input, encode it and write it to the matching output
pub(crate) fn encode_files_from_cmd(
    args: &ArgMatches, parameters: &J2kParameters
) -> Result<(), CliErrors> {
    info!("Creating workflows from input");

    let inputs: Vec<&String> = args.get_many::<String>("in").into_iter().flatten().collect();
    let outputs: Vec<&String> = args.get_many::<String>("out").into_iter().flatten().collect();

    if inputs.len() != outputs.len() {
        return Err(CliErrors::InvalidArgument(format!(
            "{} inputs but {} outputs, every input needs one output",
            inputs.len(),
            outputs.len()
        )));
    }
    let format_forced = args.get_one::<crate::cmd_args::FormatArg>("format").is_some();

    for (in_file, out_file) in inputs.into_iter().zip(outputs) {
        verify_file_paths(in_file, out_file)?;

        let parameters = if format_forced {
            parameters.clone()
        } else {
            parameters.clone().set_format(output_format(out_file))
        };
        let encoded = encode_file(in_file, parameters)?;

        std::fs::write(out_file, &encoded)?;
        info!("Wrote {} bytes to {:?}", encoded.len(), out_file);

        if args.get_flag("probe") {
            probe_encoded(out_file, &encoded)?;
        }
    }
    Ok(())
}

fn encode_file(in_file: &str, parameters: J2kParameters) -> Result<Vec<u8>, CliErrors> {
    let data = std::fs::read(in_file)?;

    let start = Instant::now();
    let image = decode_image(&data, in_file)?;
    debug!(
        "Decoded {}x{} {:?} image in {:?}",
        image.width,
        image.height,
        image.colorspace,
        start.elapsed()
    );

    let start = Instant::now();
    let mut encoder = J2kEncoder::new_with_parameters(
        &image.pixels,
        image.encoder_options(),
        parameters
    )?;
    debug!("Output buffer capacity: {} bytes", encoder.capacity());

    let encoded = encoder.encode()?;
    encoder.dispose();
    debug!("Encoded {:?} in {:?}", in_file, start.elapsed());

    Ok(encoded)
}

/// Container for an output file when none was requested
fn output_format(out_file: &str) -> J2kFormat {
    Path::new(out_file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(J2kFormat::from_extension)
        .unwrap_or_default()
}

fn verify_file_paths(in_file: &str, out_file: &str) -> Result<(), CliErrors> {
    if in_file == out_file {
        return Err(CliErrors::InvalidArgument(format!(
            "Cannot use {:?} as both input and output",
            in_file
        )));
    }
    let in_path = Path::new(in_file);

    if !in_path.exists() {
        return Err(CliErrors::InvalidArgument(format!(
            "Path {:?}, does not exist",
            in_path
        )));
    }
    if !in_path.is_file() {
        return Err(CliErrors::InvalidArgument(format!(
            "Path {:?} is not a file",
            in_path
        )));
    }
    if Path::new(out_file).exists() {
        info!("Overwriting path {:?}", out_file);
    }
    Ok(())
}
