use super::*;
use crate::ast::{BinaryOp, Expression, ForExpr, LiteralValue, ObjectItem, TraversalStep, UnaryOp};

pub(super) fn parse_expression(parser: &mut Parser) -> Result<Expression, HclError> {
    parse_conditional(parser)
}

fn parse_conditional(parser: &mut Parser) -> Result<Expression, HclError> {
    let condition = parse_binary(parser, 1)?;
    if parser.peek_token()? != &Token::Question {
        return Ok(condition);
    }
    parser.bump()?; // consume '?'

    let true_result = parse_expression(parser)?;
    parser.expect(Token::Colon, "Expected ':' in conditional expression")?;
    let false_result = parse_expression(parser)?;

    let src_range = condition.range().join(&false_result.range());
    Ok(Expression::Conditional {
        condition: Box::new(condition),
        true_result: Box::new(true_result),
        false_result: Box::new(false_result),
        src_range,
    })
}

fn binary_op(token: &Token) -> Option<BinaryOp> {
    let op = match token {
        Token::Or => BinaryOp::Or,
        Token::And => BinaryOp::And,
        Token::EqualEqual => BinaryOp::Equal,
        Token::NotEqual => BinaryOp::NotEqual,
        Token::Less => BinaryOp::LessThan,
        Token::LessEqual => BinaryOp::LessThanOrEqual,
        Token::Greater => BinaryOp::GreaterThan,
        Token::GreaterEqual => BinaryOp::GreaterThanOrEqual,
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Subtract,
        Token::Star => BinaryOp::Multiply,
        Token::Slash => BinaryOp::Divide,
        Token::Percent => BinaryOp::Modulo,
        _ => return None,
    };
    Some(op)
}

/// Precedence climbing; all binary operators are left-associative.
fn parse_binary(parser: &mut Parser, min_precedence: u8) -> Result<Expression, HclError> {
    let mut lhs = parse_unary(parser)?;

    loop {
        let Some(op) = binary_op(parser.peek_token()?) else {
            break;
        };
        if op.precedence() < min_precedence {
            break;
        }
        parser.bump()?;

        let rhs = parse_binary(parser, op.precedence() + 1)?;
        let src_range = lhs.range().join(&rhs.range());
        lhs = Expression::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            src_range,
        };
    }

    Ok(lhs)
}

fn parse_unary(parser: &mut Parser) -> Result<Expression, HclError> {
    let op = match parser.peek_token()? {
        Token::Minus => UnaryOp::Negate,
        Token::Bang => UnaryOp::Not,
        _ => {
            let term = parse_term(parser)?;
            return parse_postfix(parser, term);
        }
    };

    let symbol = parser.bump()?;
    let operand = parse_unary(parser)?;
    let src_range = symbol.range.join(&operand.range());
    Ok(Expression::Unary {
        op,
        operand: Box::new(operand),
        src_range,
        symbol_range: symbol.range,
    })
}

fn parse_term(parser: &mut Parser) -> Result<Expression, HclError> {
    let next = parser.peek()?.clone();

    match next.token {
        Token::Number(n) => {
            parser.bump()?;
            Ok(Expression::Literal {
                value: LiteralValue::Number(n),
                src_range: next.range,
            })
        }
        Token::Ident(name) => {
            parser.bump()?;
            parse_identifier_term(parser, name, next.range)
        }
        Token::OQuote | Token::OHeredoc { .. } => template::parse_template(parser),
        Token::LParen => parse_parentheses(parser),
        Token::LBracket => parse_tuple(parser),
        Token::LBrace => parse_object(parser),
        _ => Err(parser.unexpected(&next, "Expected an expression", 210)),
    }
}

fn parse_identifier_term(parser: &mut Parser, name: String, range: Range) -> Result<Expression, HclError> {
    let literal = match name.as_str() {
        "true" => Some(LiteralValue::Bool(true)),
        "false" => Some(LiteralValue::Bool(false)),
        "null" => Some(LiteralValue::Null),
        _ => None,
    };
    if let Some(value) = literal {
        return Ok(Expression::Literal { value, src_range: range });
    }

    if parser.peek_token()? == &Token::LParen {
        return parse_function_call(parser, name, range);
    }

    Ok(Expression::ScopeTraversal {
        root: name,
        steps: Vec::new(),
        src_range: range,
    })
}

fn parse_function_call(parser: &mut Parser, name: String, name_range: Range) -> Result<Expression, HclError> {
    let open = parser.bump()?;

    parser.nested(true, |p| {
        let mut args = Vec::new();
        let mut expand_final = false;

        while p.peek_token()? != &Token::RParen {
            if expand_final {
                let next = p.peek()?.clone();
                return Err(p.unexpected(&next, "Expanded argument must be the last argument", 211));
            }
            args.push(parse_expression(p)?);

            let next = p.peek()?.clone();
            match next.token {
                Token::Comma => {
                    p.bump()?;
                }
                Token::Ellipsis => {
                    p.bump()?;
                    expand_final = true;
                    if p.peek_token()? == &Token::Comma {
                        p.bump()?;
                    }
                }
                Token::RParen => {}
                _ => return Err(p.unexpected(&next, "Expected ',' or ')' in function call", 211)),
            }
        }
        let close = p.bump()?;

        Ok(Expression::FunctionCall {
            name,
            args,
            expand_final,
            name_range,
            open_paren_range: open.range,
            close_paren_range: close.range,
        })
    })
}

fn parse_parentheses(parser: &mut Parser) -> Result<Expression, HclError> {
    let open = parser.bump()?;

    parser.nested(true, |p| {
        let inner = parse_expression(p)?;
        let close = p.expect(Token::RParen, "Expected ')' to close the parentheses")?;
        Ok(Expression::Parentheses {
            inner: Box::new(inner),
            src_range: open.range.join(&close.range),
        })
    })
}

fn parse_tuple(parser: &mut Parser) -> Result<Expression, HclError> {
    let open = parser.bump()?;

    parser.nested(true, |p| {
        if p.at_keyword("for")? {
            return parse_for(p, open.range, false);
        }

        let mut exprs = Vec::new();
        while p.peek_token()? != &Token::RBracket {
            exprs.push(parse_expression(p)?);

            let next = p.peek()?.clone();
            match next.token {
                Token::Comma => {
                    p.bump()?;
                }
                Token::RBracket => {}
                _ => return Err(p.unexpected(&next, "Expected ',' or ']' in tuple", 212)),
            }
        }
        let close = p.bump()?;

        Ok(Expression::Tuple {
            exprs,
            src_range: open.range.join(&close.range),
            open_range: open.range,
        })
    })
}

fn skip_newlines(parser: &mut Parser) -> Result<(), HclError> {
    while parser.peek_token()? == &Token::Newline {
        parser.bump()?;
    }
    Ok(())
}

/// Object constructor items are separated by newlines or commas.
fn parse_object(parser: &mut Parser) -> Result<Expression, HclError> {
    let open = parser.bump()?;

    parser.nested(false, |p| {
        skip_newlines(p)?;
        if p.at_keyword("for")? {
            return p.nested(true, |p| parse_for(p, open.range, true));
        }

        let mut items = Vec::new();
        loop {
            skip_newlines(p)?;
            if p.peek_token()? == &Token::RBrace {
                break;
            }

            let key = p.nested(true, parse_expression)?;
            let next = p.bump()?;
            if !matches!(next.token, Token::Equals | Token::Colon) {
                return Err(p.unexpected(&next, "Expected '=' or ':' after object key", 213));
            }
            let value = parse_expression(p)?;

            items.push(ObjectItem {
                key_expr: Expression::ObjectKey { wrapped: Box::new(key) },
                value_expr: value,
            });

            let next = p.peek()?.clone();
            match next.token {
                Token::Comma | Token::Newline => {
                    p.bump()?;
                }
                Token::RBrace => {}
                _ => return Err(p.unexpected(&next, "Expected ',', a newline or '}' after object item", 213)),
            }
        }
        let close = p.bump()?;

        Ok(Expression::Object {
            items,
            src_range: open.range.join(&close.range),
            open_range: open.range,
        })
    })
}

/// `for` expression after its opening bracket; `object` selects the
/// `{for k, v in coll : key => value}` form.
fn parse_for(parser: &mut Parser, open_range: Range, object: bool) -> Result<Expression, HclError> {
    parser.expect_keyword("for")?;
    let (first, _) = parser.expect_ident("Expected an iterator variable after 'for'")?;
    let (key_var, val_var) = if parser.peek_token()? == &Token::Comma {
        parser.bump()?;
        let (second, _) = parser.expect_ident("Expected a value variable after ','")?;
        (Some(first), second)
    } else {
        (None, first)
    };

    parser.expect_keyword("in")?;
    let coll_expr = parse_expression(parser)?;
    parser.expect(Token::Colon, "Expected ':' after the for collection")?;

    let (key_expr, val_expr) = if object {
        let key = parse_expression(parser)?;
        parser.expect(Token::FatArrow, "Expected '=>' in object for expression")?;
        (Some(Box::new(key)), parse_expression(parser)?)
    } else {
        (None, parse_expression(parser)?)
    };

    let group = object && parser.peek_token()? == &Token::Ellipsis;
    if group {
        parser.bump()?;
    }

    let cond_expr = if parser.at_keyword("if")? {
        parser.bump()?;
        Some(Box::new(parse_expression(parser)?))
    } else {
        None
    };

    let (closer, hint) = if object {
        (Token::RBrace, "Expected '}' to close the for expression")
    } else {
        (Token::RBracket, "Expected ']' to close the for expression")
    };
    let close = parser.expect(closer, hint)?;

    Ok(Expression::For(ForExpr {
        key_var,
        val_var,
        coll_expr: Box::new(coll_expr),
        key_expr,
        val_expr: Box::new(val_expr),
        cond_expr,
        group,
        src_range: open_range.join(&close.range),
        open_range,
        close_range: close.range,
    }))
}

/// Attribute access, indexing and splats following a term.
fn parse_postfix(parser: &mut Parser, mut expr: Expression) -> Result<Expression, HclError> {
    loop {
        match parser.peek_token()? {
            Token::Dot => {
                let dot = parser.bump()?;
                let next = parser.bump()?;
                let range = dot.range.join(&next.range);
                expr = match next.token {
                    Token::Ident(name) => push_step(expr, TraversalStep::Attr { name, range }),
                    Token::Number(n) => push_step(
                        expr,
                        TraversalStep::Index { key: LiteralValue::Number(n), range },
                    ),
                    Token::Star => splat(expr, range, false),
                    _ => return Err(parser.unexpected(&next, "Expected an attribute name after '.'", 214)),
                };
            }
            Token::LBracket => {
                let open = parser.bump()?;
                expr = parser.nested(true, |p| {
                    if p.peek_token()? == &Token::Star {
                        p.bump()?;
                        let close = p.expect(Token::RBracket, "Expected ']' after '[*'")?;
                        return Ok(splat(expr, open.range.join(&close.range), true));
                    }

                    let key = parse_expression(p)?;
                    let close = p.expect(Token::RBracket, "Expected ']' to close the index")?;
                    let bracket_range = open.range.join(&close.range);
                    Ok(index(expr, key, bracket_range))
                })?;
            }
            _ => break,
        }
    }

    Ok(expr)
}

fn push_step(expr: Expression, step: TraversalStep) -> Expression {
    let end = match &step {
        TraversalStep::Attr { range, .. } | TraversalStep::Index { range, .. } => range.end,
    };

    match expr {
        Expression::ScopeTraversal { root, mut steps, src_range } => {
            steps.push(step);
            Expression::ScopeTraversal { root, steps, src_range: Range::new(src_range.start, end) }
        }
        Expression::RelativeTraversal { source, mut steps, src_range } => {
            steps.push(step);
            Expression::RelativeTraversal { source, steps, src_range: Range::new(src_range.start, end) }
        }
        Expression::Splat { source, mut steps, full, src_range, marker_range } => {
            steps.push(step);
            Expression::Splat {
                source,
                steps,
                full,
                src_range: Range::new(src_range.start, end),
                marker_range,
            }
        }
        other => {
            let start = other.range().start;
            Expression::RelativeTraversal {
                source: Box::new(other),
                steps: vec![step],
                src_range: Range::new(start, end),
            }
        }
    }
}

/// Literal keys extend a traversal; anything else becomes an index expression.
fn index(expr: Expression, key: Expression, bracket_range: Range) -> Expression {
    let traversable = matches!(
        expr,
        Expression::ScopeTraversal { .. } | Expression::RelativeTraversal { .. } | Expression::Splat { .. }
    );

    match key {
        Expression::Literal { value, .. } if traversable => {
            push_step(expr, TraversalStep::Index { key: value, range: bracket_range })
        }
        key => {
            let start = expr.range().start;
            Expression::Index {
                collection: Box::new(expr),
                key: Box::new(key),
                src_range: Range::new(start, bracket_range.end),
                bracket_range,
            }
        }
    }
}

fn splat(expr: Expression, marker_range: Range, full: bool) -> Expression {
    let start = expr.range().start;
    Expression::Splat {
        source: Box::new(expr),
        steps: Vec::new(),
        full,
        src_range: Range::new(start, marker_range.end),
        marker_range,
    }
}
