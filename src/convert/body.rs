use super::*;
use crate::ast::Body;
use crate::tree::{merge_entry, LineEntries, Position};
use tracing::trace;

impl Converter<'_> {
    /// Convert a body: blocks first, in source order, then attributes in
    /// the order their names appear. Same-named entries are merged.
    pub(crate) fn convert_body(&self, body: &Body) -> Result<(ValueMap, LineMap), HclError> {
        let mut values = ValueMap::new();
        let mut lines = LineMap::default();

        for block in &body.blocks {
            trace!(
                block_type = %block.block_type,
                labels = block.labels.len(),
                line = block.type_range.start.line,
                "converting block"
            );

            // Each block nests into its own maps; the single type-keyed
            // result is then merged like any other sibling.
            let mut block_values = ValueMap::new();
            let mut block_lines = LineEntries::new();
            self.convert_block(block, &mut block_values, &mut block_lines)
                .context("convert block")?;

            for ((key, value), (_, line)) in block_values.into_iter().zip(block_lines) {
                merge_entry(&mut values, &mut lines.entries, &key, value, line);
            }
        }

        let mut attributes: Vec<_> = body.attributes.values().collect();
        attributes.sort_by_key(|attr| (attr.name_range.start.line, attr.name_range.start.column));

        for attr in attributes {
            trace!(name = %attr.name, kind = attr.expr.kind(), "converting attribute");

            let (value, mut line) = self.convert_expression(&attr.expr).context("convert expression")?;
            line.annotate_key(Position::from(&attr.name_range));
            merge_entry(&mut values, &mut lines.entries, &attr.name, value, line);
        }

        lines.position = Some(Position::from(&body.src_range));

        Ok((values, lines))
    }
}
