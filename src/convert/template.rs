use super::*;
use crate::ast::{Expression, ForExpr, LiteralValue, Range, TemplateExpr};

impl Converter<'_> {
    /// A constant template becomes its string; any other template is
    /// rebuilt part by part as markup.
    pub(crate) fn convert_template(&self, template: &TemplateExpr) -> Result<String, HclError> {
        if template.is_string_literal() {
            if let [Expression::Literal { value, .. }] = template.parts.as_slice() {
                return self.literal_string(value, &template.src_range);
            }
        }

        template
            .parts
            .iter()
            .map(|part| self.convert_string_part(part))
            .collect()
    }

    /// The textual form of one template part.
    pub(crate) fn convert_string_part(&self, expr: &Expression) -> Result<String, HclError> {
        match expr {
            Expression::Literal { value, src_range } => self.literal_string(value, src_range),
            Expression::Template(template) => self.convert_template(template),
            Expression::TemplateWrap { wrapped, .. } => self.convert_string_part(wrapped),
            Expression::Conditional { condition, true_result, false_result, .. } => {
                self.convert_template_conditional(condition, true_result, false_result)
            }
            Expression::TemplateJoin(for_expr) => self.convert_template_for(for_expr),
            // an embedded expression
            _ => Ok(self.wrap_expr(expr)),
        }
    }

    fn literal_string(&self, value: &LiteralValue, range: &Range) -> Result<String, HclError> {
        value.to_template_string().ok_or_else(|| HclError::ValueError {
            message: format!(
                "Cannot convert {} literal `{}` to string",
                value.type_name(),
                self.range_source(range)
            ),
            line: range.start.line,
            column: range.start.column,
            hint: Some("Only strings, numbers and bools can be used in a template".into()),
            code: Some(401),
        })
    }

    fn convert_template_conditional(
        &self,
        condition: &Expression,
        true_result: &Expression,
        false_result: &Expression,
    ) -> Result<String, HclError> {
        let mut out = String::new();
        out.push_str("%{if ");
        out.push_str(&self.range_source(&condition.range()));
        out.push('}');

        out.push_str(&self.convert_string_part(true_result).context("convert true branch")?);

        let false_text = self.convert_string_part(false_result).context("convert false branch")?;
        if !false_text.is_empty() {
            out.push_str("%{else}");
            out.push_str(&false_text);
        }
        out.push_str("%{endif}");

        Ok(out)
    }

    fn convert_template_for(&self, for_expr: &ForExpr) -> Result<String, HclError> {
        let mut out = String::new();
        out.push_str("%{for ");
        if let Some(key_var) = &for_expr.key_var {
            out.push_str(key_var);
            out.push_str(", ");
        }
        out.push_str(&for_expr.val_var);
        out.push_str(" in ");
        out.push_str(&self.range_source(&for_expr.coll_expr.range()));
        out.push('}');

        out.push_str(&self.convert_string_part(&for_expr.val_expr).context("convert for body")?);
        out.push_str("%{endfor}");

        Ok(out)
    }
}
