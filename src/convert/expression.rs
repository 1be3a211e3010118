use super::*;
use crate::ast::Expression;
use crate::tree::{merge_entry, LineMap, LineNode, ValueNode};

impl Converter<'_> {
    /// Convert one expression into a value node and its line node.
    ///
    /// Constants become plain values, templates are collapsed or rebuilt
    /// as markup, tuples and objects recurse, and everything else is kept
    /// as `${...}` source text.
    pub(crate) fn convert_expression(&self, expr: &Expression) -> Result<(ValueNode, LineNode), HclError> {
        let line = LineNode::record(&expr.start_range());

        match expr {
            Expression::Literal { value, .. } => Ok((ValueNode::from(value), line)),
            Expression::Template(template) => {
                let text = self.convert_template(template).context("convert template")?;
                Ok((ValueNode::String(text), line))
            }
            Expression::TemplateWrap { wrapped, .. } => self.convert_expression(wrapped),
            Expression::Tuple { exprs, .. } => {
                // Elements carry no line information of their own.
                let items = exprs
                    .iter()
                    .map(|e| self.convert_expression(e).map(|(value, _)| value))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((ValueNode::Sequence(items), line))
            }
            Expression::Object { items, .. } => {
                let mut values = ValueMap::new();
                // Object line maps hold only their items.
                let mut lines = LineMap::default();

                for item in items {
                    let key = self.convert_key(&item.key_expr).context("convert object key")?;
                    let (value, value_line) = self.convert_expression(&item.value_expr)?;
                    merge_entry(&mut values, &mut lines.entries, &key, value, value_line);
                }

                Ok((ValueNode::Mapping(values), LineNode::Mapping(lines)))
            }
            _ => Ok((ValueNode::String(self.wrap_expr(expr)), line)),
        }
    }

    /// Object keys are never evaluated. A bare name is taken verbatim from
    /// the source; any other key goes through the string-part rules.
    pub(crate) fn convert_key(&self, key_expr: &Expression) -> Result<String, HclError> {
        let key_expr = match key_expr {
            Expression::ObjectKey { wrapped } => {
                if let Expression::ScopeTraversal { src_range, .. } = wrapped.as_ref() {
                    return Ok(self.range_source(src_range));
                }
                wrapped.as_ref()
            }
            other => other,
        };
        self.convert_string_part(key_expr)
    }
}
