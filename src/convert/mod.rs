// Author: Dustin Pilgrim
// License: MIT

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::File;
use crate::error::Context;
use crate::tree::{LineMap, ValueMap};
use crate::HclError;

mod block;
mod body;
mod expression;
mod source;
mod template;

/// Conversion options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Reserved for a mode that evaluates expressions where possible.
    /// Accepted and carried, but conversion does not read it yet.
    pub simplify: bool,
}

impl Options {
    /// Load options from a JSON object such as `{"simplify": true}`.
    /// Missing fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self, HclError> {
        serde_json::from_str(input).map_err(|e| HclError::SerializeError {
            message: format!("Invalid options: {}", e),
            hint: Some("Options are a JSON object like {\"simplify\": false}".into()),
            code: Some(311),
        })
    }
}

/// Walks a syntax tree, reading expression source text out of `bytes`.
pub(crate) struct Converter<'a> {
    bytes: &'a [u8],
    options: Options,
}

/// Convert a parsed file into its value tree and line tree.
pub fn convert_file(file: &File, options: Options) -> Result<(ValueMap, LineMap), HclError> {
    let converter = Converter {
        bytes: file.bytes(),
        options,
    };

    debug!(
        filename = %file.filename,
        attributes = file.body.attributes.len(),
        blocks = file.body.blocks.len(),
        simplify = converter.options.simplify,
        "converting file"
    );

    converter.convert_body(&file.body).context("convert body")
}
