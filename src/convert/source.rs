use super::*;
use crate::ast::{Expression, Range};

impl Converter<'_> {
    /// The source text of `range`.
    ///
    /// Some ranges stop short of the `)` closing a call. When the text has
    /// an unmatched `(` and the next byte is `)`, that byte is included, so
    /// a range that already ends with its `)` never gets a second one.
    pub(crate) fn range_source(&self, range: &Range) -> String {
        let start = range.start.byte.min(self.bytes.len());
        let mut end = range.end.byte.clamp(start, self.bytes.len());

        if self.bytes.get(end) == Some(&b')') && has_unclosed_paren(&self.bytes[start..end]) {
            end += 1;
        }

        String::from_utf8_lossy(&self.bytes[start..end]).into_owned()
    }

    /// `${<source>}`: an expression kept as interpolation markup.
    pub(crate) fn wrap_expr(&self, expr: &Expression) -> String {
        format!("${{{}}}", self.range_source(&expr.range()))
    }
}

/// More `(` than `)` outside of string literals.
fn has_unclosed_paren(text: &[u8]) -> bool {
    let mut depth = 0i64;
    let mut in_string = false;
    let mut escaped = false;

    for &b in text {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ => {}
        }
    }

    depth > 0
}
