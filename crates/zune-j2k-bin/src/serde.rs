/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use zune_jpeg2000::{CodestreamInfo, ComponentInfo};

/// Probe result of one written file
pub struct Metadata<'a> {
    file: &'a str,
    size: usize,
    info: &'a CodestreamInfo
}

impl<'a> Metadata<'a> {
    pub fn new(file: &'a str, size: usize, info: &'a CodestreamInfo) -> Metadata<'a> {
        Metadata { file, size, info }
    }
}

struct Components<'a>(&'a [ComponentInfo]);

struct Component<'a>(&'a ComponentInfo);

impl<'a> Serialize for Metadata<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let info = self.info;
        let mut state = serializer.serialize_struct("CodestreamInfo", 14)?;

        state.serialize_field("file", self.file)?;
        state.serialize_field("size", &self.size)?;
        state.serialize_field("format", info.format.extension())?;
        state.serialize_field("width", &info.width)?;
        state.serialize_field("height", &info.height)?;
        state.serialize_field("tile_width", &info.tile_width)?;
        state.serialize_field("tile_height", &info.tile_height)?;
        state.serialize_field("components", &Components(&info.components))?;
        state.serialize_field("progression", &info.progression)?;
        state.serialize_field("quality_layers", &info.quality_layers)?;
        state.serialize_field("mct", &info.mct)?;
        state.serialize_field("decomposition_levels", &info.decomposition_levels)?;
        state.serialize_field("reversible", &info.reversible)?;
        state.serialize_field("comment", &info.comment)?;

        state.end()
    }
}

impl<'a> Serialize for Components<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for component in self.0 {
            seq.serialize_element(&Component(component))?;
        }
        seq.end()
    }
}

impl<'a> Serialize for Component<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("ComponentInfo", 4)?;

        state.serialize_field("precision", &self.0.precision)?;
        state.serialize_field("signed", &self.0.signed)?;
        state.serialize_field("dx", &self.0.dx)?;
        state.serialize_field("dy", &self.0.dy)?;

        state.end()
    }
}
