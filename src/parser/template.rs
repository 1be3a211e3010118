use super::*;
use crate::ast::{Expression, ForExpr, LiteralValue, TemplateExpr};

/// A template control directive: `%{if ...}`, `%{else}`, `%{endif}`,
/// `%{for ...}` or `%{endfor}`.
enum Directive {
    If(Expression),
    Else,
    EndIf,
    For {
        key_var: Option<String>,
        val_var: String,
        coll_expr: Expression,
    },
    EndFor,
}

impl Directive {
    fn name(&self) -> &'static str {
        match self {
            Directive::If(_) => "if",
            Directive::Else => "else",
            Directive::EndIf => "endif",
            Directive::For { .. } => "for",
            Directive::EndFor => "endfor",
        }
    }
}

/// Flat template content, before directives are nested.
enum Item {
    Literal {
        text: String,
        range: Range,
    },
    Interp {
        expr: Expression,
        strip_before: bool,
        strip_after: bool,
        range: Range,
    },
    Directive {
        directive: Directive,
        strip_before: bool,
        strip_after: bool,
        range: Range,
    },
}

impl Item {
    fn range(&self) -> Range {
        match self {
            Item::Literal { range, .. } | Item::Interp { range, .. } | Item::Directive { range, .. } => *range,
        }
    }
}

/// Parse a quoted template or heredoc, starting at its opening token.
pub(super) fn parse_template(parser: &mut Parser) -> Result<Expression, HclError> {
    let open = parser.bump()?;
    let (heredoc, flush) = match open.token {
        Token::OQuote => (false, false),
        Token::OHeredoc { flush, .. } => (true, flush),
        _ => return Err(parser.unexpected(&open, "Expected a template", 217)),
    };

    let mut items = Vec::new();
    let close = loop {
        let next = parser.bump()?;
        match next.token {
            Token::CQuote if !heredoc => break next,
            Token::CHeredoc if heredoc => break next,
            Token::TemplateLiteral(text) => items.push(Item::Literal { text, range: next.range }),
            Token::TemplateInterp { strip } => items.push(parse_interpolation(parser, next.range, strip)?),
            Token::TemplateControl { strip } => items.push(parse_directive(parser, next.range, strip)?),
            _ => return Err(parser.unexpected(&next, "Expected template content", 217)),
        }
    };

    if flush {
        flush_indentation(&mut items);
    }
    apply_strip_markers(&mut items);

    let src_range = open.range.join(&close.range);
    let passthrough = matches!(items.as_slice(), [Item::Interp { .. }]);

    let mut items = items.into_iter();
    let (mut parts, stray) = build_parts(parser, &mut items)?;
    if let Some((directive, range)) = stray {
        return Err(parser.syntax_error(
            &range,
            format!("Unexpected %{{{}}} directive", directive.name()),
            Some("Directives must be opened and closed in matching pairs".into()),
            218,
        ));
    }

    if passthrough {
        if let Some(wrapped) = parts.pop() {
            return Ok(Expression::TemplateWrap {
                wrapped: Box::new(wrapped),
                src_range,
            });
        }
    }

    if parts.is_empty() {
        let inner = Range::new(open.range.end, close.range.start);
        parts.push(Expression::Literal {
            value: LiteralValue::String(String::new()),
            src_range: inner,
        });
    }

    Ok(Expression::Template(TemplateExpr { parts, src_range }))
}

fn parse_interpolation(parser: &mut Parser, open: Range, strip_before: bool) -> Result<Item, HclError> {
    parser.nested(true, |p| {
        let expr = expression::parse_expression(p)?;
        let end = p.bump()?;
        let Token::TemplateSeqEnd { strip } = end.token else {
            return Err(p.unexpected(&end, "Expected '}' to close the interpolation", 219));
        };
        Ok(Item::Interp {
            expr,
            strip_before,
            strip_after: strip,
            range: open.join(&end.range),
        })
    })
}

fn parse_directive(parser: &mut Parser, open: Range, strip_before: bool) -> Result<Item, HclError> {
    parser.nested(true, |p| {
        let (keyword, keyword_range) = p.expect_ident("Expected if, else, endif, for or endfor")?;
        let directive = match keyword.as_str() {
            "if" => Directive::If(expression::parse_expression(p)?),
            "else" => Directive::Else,
            "endif" => Directive::EndIf,
            "endfor" => Directive::EndFor,
            "for" => {
                let (first, _) = p.expect_ident("Expected an iterator variable after 'for'")?;
                let (key_var, val_var) = if p.peek_token()? == &Token::Comma {
                    p.bump()?;
                    let (second, _) = p.expect_ident("Expected a value variable after ','")?;
                    (Some(first), second)
                } else {
                    (None, first)
                };
                p.expect_keyword("in")?;
                Directive::For {
                    key_var,
                    val_var,
                    coll_expr: expression::parse_expression(p)?,
                }
            }
            other => {
                return Err(p.syntax_error(
                    &keyword_range,
                    format!("Unknown template directive '{}'", other),
                    Some("Expected if, else, endif, for or endfor".into()),
                    217,
                ));
            }
        };

        let end = p.bump()?;
        let Token::TemplateSeqEnd { strip } = end.token else {
            return Err(p.unexpected(&end, "Expected '}' to close the directive", 219));
        };
        Ok(Item::Directive {
            directive,
            strip_before,
            strip_after: strip,
            range: open.join(&end.range),
        })
    })
}

/// `${~` and `%{~` trim whitespace before the sequence, `~}` after it.
fn apply_strip_markers(items: &mut [Item]) {
    for i in 0..items.len() {
        let (strip_before, strip_after) = match &items[i] {
            Item::Interp { strip_before, strip_after, .. }
            | Item::Directive { strip_before, strip_after, .. } => (*strip_before, *strip_after),
            Item::Literal { .. } => continue,
        };

        if strip_before && i > 0 {
            if let Item::Literal { text, .. } = &mut items[i - 1] {
                let trimmed = text.trim_end().len();
                text.truncate(trimmed);
            }
        }
        if strip_after {
            if let Some(Item::Literal { text, .. }) = items.get_mut(i + 1) {
                *text = text.trim_start().to_string();
            }
        }
    }
}

/// Remove the indentation shared by every line of a `<<-` heredoc.
fn flush_indentation(items: &mut [Item]) {
    let indentation = |text: &str| text.chars().take_while(|c| *c == ' ' || *c == '\t').count();

    let common = items
        .iter()
        .filter(|item| item.range().start.column == 1)
        .filter_map(|item| match item {
            Item::Literal { text, .. } if text.ends_with('\n') && text.trim().is_empty() => None,
            Item::Literal { text, .. } => Some(indentation(text)),
            _ => Some(0),
        })
        .min()
        .unwrap_or(0);

    if common == 0 {
        return;
    }

    for item in items.iter_mut() {
        if let Item::Literal { text, range } = item {
            if range.start.column == 1 {
                let strip = indentation(text).min(common);
                *text = text.chars().skip(strip).collect();
            }
        }
    }
}

type Stray = Option<(Directive, Range)>;

/// Nest directives into conditional and for parts. Stops at the end of the
/// items or at an `else`/`endif`/`endfor`, which is handed back to the caller.
fn build_parts(
    parser: &Parser,
    items: &mut std::vec::IntoIter<Item>,
) -> Result<(Vec<Expression>, Stray), HclError> {
    let mut parts = Vec::new();

    while let Some(item) = items.next() {
        match item {
            Item::Literal { text, range } => {
                if !text.is_empty() {
                    parts.push(Expression::Literal {
                        value: LiteralValue::String(text),
                        src_range: range,
                    });
                }
            }
            Item::Interp { expr, .. } => parts.push(expr),
            Item::Directive { directive, range, .. } => match directive {
                Directive::If(condition) => parts.push(build_conditional(parser, items, condition, range)?),
                Directive::For { key_var, val_var, coll_expr } => {
                    parts.push(build_for(parser, items, key_var, val_var, coll_expr, range)?)
                }
                closer => return Ok((parts, Some((closer, range)))),
            },
        }
    }

    Ok((parts, None))
}

fn branch(parts: Vec<Expression>, from: Range, to: Range) -> Expression {
    Expression::Template(TemplateExpr {
        parts,
        src_range: Range::new(from.end, to.start),
    })
}

fn unclosed(parser: &Parser, opener: &str, closer: &str, range: &Range, stray: Stray) -> HclError {
    let message = match stray {
        Some((directive, _)) => format!(
            "Expected %{{{}}} to close %{{{}}}, found %{{{}}}",
            closer,
            opener,
            directive.name()
        ),
        None => format!("Unclosed %{{{}}} directive", opener),
    };
    parser.syntax_error(range, message, Some(format!("Add a matching %{{{}}}", closer)), 218)
}

fn build_conditional(
    parser: &Parser,
    items: &mut std::vec::IntoIter<Item>,
    condition: Expression,
    if_range: Range,
) -> Result<Expression, HclError> {
    let (true_parts, stray) = build_parts(parser, items)?;

    let (true_result, false_result, end_range) = match stray {
        Some((Directive::EndIf, endif_range)) => (
            branch(true_parts, if_range, endif_range),
            Expression::Template(TemplateExpr {
                parts: Vec::new(),
                src_range: Range::new(endif_range.start, endif_range.start),
            }),
            endif_range,
        ),
        Some((Directive::Else, else_range)) => {
            let (false_parts, stray) = build_parts(parser, items)?;
            match stray {
                Some((Directive::EndIf, endif_range)) => (
                    branch(true_parts, if_range, else_range),
                    branch(false_parts, else_range, endif_range),
                    endif_range,
                ),
                other => return Err(unclosed(parser, "if", "endif", &if_range, other)),
            }
        }
        other => return Err(unclosed(parser, "if", "endif", &if_range, other)),
    };

    Ok(Expression::Conditional {
        condition: Box::new(condition),
        true_result: Box::new(true_result),
        false_result: Box::new(false_result),
        src_range: if_range.join(&end_range),
    })
}

fn build_for(
    parser: &Parser,
    items: &mut std::vec::IntoIter<Item>,
    key_var: Option<String>,
    val_var: String,
    coll_expr: Expression,
    for_range: Range,
) -> Result<Expression, HclError> {
    let (body_parts, stray) = build_parts(parser, items)?;
    let endfor_range = match stray {
        Some((Directive::EndFor, range)) => range,
        other => return Err(unclosed(parser, "for", "endfor", &for_range, other)),
    };

    Ok(Expression::TemplateJoin(ForExpr {
        key_var,
        val_var,
        coll_expr: Box::new(coll_expr),
        key_expr: None,
        val_expr: Box::new(branch(body_parts, for_range, endfor_range)),
        cond_expr: None,
        group: false,
        src_range: for_range.join(&endfor_range),
        open_range: for_range,
        close_range: endfor_range,
    }))
}
