/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use log::warn;
use zune_jpeg2000::probe;

use crate::errors::CliErrors;
use crate::serde::Metadata;

/// Read the header of an encoded file and print it to standard output.
pub fn probe_encoded(file: &str, encoded: &[u8]) -> Result<(), CliErrors> {
    let info = probe(encoded)?;

    if !info.has_eoc {
        warn!("{} does not end with an EOC marker", file);
    }
    let metadata = Metadata::new(file, encoded.len(), &info);

    let json = serde_json::to_string_pretty(&metadata).map_err(std::io::Error::from)?;
    println!("{}", json);

    Ok(())
}
