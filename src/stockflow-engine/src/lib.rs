// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

//! Turns an extracted stock-and-flow model graph into an XMILE document
//! with a synthesized diagram.

use std::path::Path;

use tracing::info;

pub mod common;
pub mod datamodel;
pub mod equation;
#[cfg(test)]
mod equation_proptest;
pub mod json;
pub mod layout;
pub mod provider;
pub mod summary;
pub mod xmile;

pub use self::common::{Error, ErrorCode, ErrorKind, Result};
pub use self::equation::{EquationNormalizer, normalize_equation};
pub use self::layout::config::LayoutConfig;
pub use self::layout::{Layout, generate_layout};
pub use self::summary::ModelSummary;
pub use self::xmile::{XmileOptions, model_to_xmile};
use crate::common::io_error;

/// Lay out `model` and serialize it as an XMILE document.
pub fn to_xmile(
    model: &datamodel::Model,
    options: &XmileOptions,
    layout_config: &LayoutConfig,
) -> Result<String> {
    let layout = generate_layout(model, layout_config);
    model_to_xmile(model, &layout, options)
}

/// Parse a JSON model graph and convert it to XMILE in one step.
pub fn convert_json(
    json_str: &str,
    options: &XmileOptions,
    layout_config: &LayoutConfig,
) -> Result<String> {
    let model: json::Model = json_str.parse()?;
    to_xmile(&datamodel::Model::from(model), options, layout_config)
}

pub fn write_xmile_file(
    path: &Path,
    model: &datamodel::Model,
    options: &XmileOptions,
    layout_config: &LayoutConfig,
) -> Result<()> {
    let contents = to_xmile(model, options, layout_config)?;
    std::fs::write(path, contents).map_err(|err| io_error(ErrorCode::WriteFailed, path, err))?;
    info!(path = %path.display(), "wrote XMILE model");
    Ok(())
}
