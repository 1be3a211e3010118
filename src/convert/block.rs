use super::*;
use crate::ast::Block;
use crate::tree::{merge_entry, LineEntries, LineMap, LineNode, Position, ValueNode};

impl Converter<'_> {
    /// Nest a block under its type name and labels, then store its body at
    /// the innermost key.
    ///
    /// `block "a" "b" {}` ends up as `{"block": {"a": {"b": {...}}}}`. The
    /// body converter hands in fresh maps per block, so every label level
    /// is created here; an existing level is only entered when the caller
    /// passes maps that already hold one.
    pub(crate) fn convert_block(
        &self,
        block: &Block,
        values: &mut ValueMap,
        lines: &mut LineEntries,
    ) -> Result<(), HclError> {
        let mut values = values;
        let mut lines = lines;
        let mut key = block.block_type.as_str();

        for (depth, label) in block.labels.iter().enumerate() {
            let value_entry = values
                .entry(key.to_string())
                .or_insert_with(|| ValueNode::Mapping(ValueMap::new()));
            let line_entry = lines
                .entry(key.to_string())
                .or_insert_with(|| LineNode::Mapping(LineMap::default()));

            match (value_entry, line_entry) {
                (ValueNode::Mapping(inner_values), LineNode::Mapping(inner_lines)) => {
                    values = inner_values;
                    lines = &mut inner_lines.entries;
                }
                _ => return Err(label_conflict(block, depth)),
            }

            key = label;
        }

        let (body_values, mut body_lines) = self.convert_body(&block.body).context("convert body")?;
        body_lines.key = Some(Position::from(&block.type_range));

        merge_entry(
            values,
            lines,
            key,
            ValueNode::Mapping(body_values),
            LineNode::Mapping(body_lines),
        );

        Ok(())
    }
}

/// `depth` labels were entered before the walk hit a non-object entry.
fn label_conflict(block: &Block, depth: usize) -> HclError {
    let mut path = vec![block.block_type.as_str()];
    path.extend(block.labels.iter().map(String::as_str));

    HclError::StructureError {
        message: format!("unable to convert block to JSON: {}", path.join(".")),
        hint: Some(format!(
            "`{}` is already used by a value that is not an object",
            path[..=depth].join(".")
        )),
        code: Some(402),
    }
}
