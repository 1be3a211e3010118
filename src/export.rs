// Author: Dustin Pilgrim
// License: MIT

use tracing::debug;

use crate::ast::File;
use crate::convert::{convert_file, Options};
use crate::error::Context;
use crate::parser::parse_config;
use crate::tree::{LineNode, ValueNode};
use crate::HclError;

/// Parse HCL source and serialize its value tree and line tree to JSON.
///
/// Returns `(value_json, line_json)`. Object keys come out sorted.
///
/// # Examples
/// ```
/// use hcl2json::{export, Options};
///
/// let (values, _lines) = export::bytes(b"name = \"web\"\n", "main.tf", Options::default()).unwrap();
/// assert_eq!(values, br#"{"name":"web"}"#);
/// ```
///
/// # Errors
/// Fails with `parse config: ...` on invalid syntax, and with
/// `convert file: ...` when the tree cannot be converted.
pub fn bytes(source: &[u8], filename: &str, options: Options) -> Result<(Vec<u8>, Vec<u8>), HclError> {
    debug!(filename, len = source.len(), "exporting source");

    let file = parse_config(source, filename).context("parse config")?;
    self::file(&file, options)
}

/// Serialize an already parsed file.
pub fn file(file: &File, options: Options) -> Result<(Vec<u8>, Vec<u8>), HclError> {
    let (values, lines) = convert_file(file, options).context("convert file")?;

    let value_json = ValueNode::Mapping(values).to_json();
    let line_json = LineNode::Mapping(lines).to_json();

    let value_bytes = serde_json::to_vec(&value_json)?;
    let line_bytes = serde_json::to_vec(&line_json)?;

    debug!(
        filename = %file.filename,
        value_bytes = value_bytes.len(),
        line_bytes = line_bytes.len(),
        "exported file"
    );

    Ok((value_bytes, line_bytes))
}
